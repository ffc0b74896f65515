pub mod api;
pub mod core;
pub mod generators;
pub mod models;
pub mod storage;

// Re-export commonly used types
pub use api::{DocumentApi, DocumentApiOptions, GenerationTransport, HttpTransport};
pub use crate::core::{
    default_config, get_config, install, set_config, ConfigPatch, ConfigStore, DocgenConfig,
    DocgenError, DocgenResult,
};
pub use models::{
    DocumentSetEntry, DocumentSetRequest, EnhancedDocumentData, GeneratedArtifact,
    GenerationOutcome, GenerationRequest, OutputFormat,
};
pub use storage::{DownloadSink, FsDownloadSink, MemorySink};
