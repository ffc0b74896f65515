pub mod common;
pub mod document;

pub use common::*;
pub use document::*;
