use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::DownloadSink;
use crate::core::DocgenResult;
use crate::models::GeneratedArtifact;

/// Keeps every saved artifact in memory, in save order.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    saved: Arc<Mutex<Vec<GeneratedArtifact>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn artifacts(&self) -> Vec<GeneratedArtifact> {
        match self.saved.lock() {
            Ok(saved) => saved.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn take(&self) -> Vec<GeneratedArtifact> {
        match self.saved.lock() {
            Ok(mut saved) => std::mem::take(&mut *saved),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    pub fn count(&self) -> usize {
        self.artifacts().len()
    }
}

#[async_trait]
impl DownloadSink for MemorySink {
    async fn save(&self, artifact: GeneratedArtifact) -> DocgenResult<()> {
        match self.saved.lock() {
            Ok(mut saved) => saved.push(artifact),
            Err(poisoned) => poisoned.into_inner().push(artifact),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OutputFormat;

    #[tokio::test]
    async fn test_records_in_order_and_drains() {
        let sink = MemorySink::new();
        sink.save(GeneratedArtifact::new("a.docx", OutputFormat::Docx, vec![1u8])).await.unwrap();
        sink.save(GeneratedArtifact::new("b.zip", OutputFormat::Zip, vec![2u8])).await.unwrap();

        let names: Vec<_> = sink.artifacts().into_iter().map(|a| a.filename).collect();
        assert_eq!(names, vec!["a.docx", "b.zip"]);

        assert_eq!(sink.take().len(), 2);
        assert_eq!(sink.count(), 0);
    }
}
