pub mod document_api;
pub mod transport;

pub use document_api::{DocumentApi, DocumentApiOptions};
pub use transport::{GenerationTransport, HttpTransport};
