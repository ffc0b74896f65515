pub mod archive;

pub use archive::ArchiveBuilder;
