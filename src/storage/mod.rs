pub mod fs;
pub mod memory;

use async_trait::async_trait;

use crate::core::DocgenResult;
use crate::models::GeneratedArtifact;

pub use fs::FsDownloadSink;
pub use memory::MemorySink;

/// Destination for finished files: whatever "offer this download to the user" means for the host.
#[async_trait]
pub trait DownloadSink: Send + Sync {
    /// Saves exactly one file named `artifact.filename` holding `artifact.bytes`.
    async fn save(&self, artifact: GeneratedArtifact) -> DocgenResult<()>;
}
