use crate::error::UpdateError;
use crate::metadata::{UpdateMetadata, VersionEntry, VersionIndex};
use crate::metadata_source::MetadataSource;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory metadata source that counts how often it was asked.
#[derive(Clone)]
pub struct MockMetadataSource {
    metadata: UpdateMetadata,
    versions: Vec<VersionEntry>,
    metadata_requests: Arc<AtomicUsize>,
}

impl MockMetadataSource {
    pub fn new(metadata: UpdateMetadata) -> Self {
        Self {
            metadata,
            versions: Vec::new(),
            metadata_requests: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Serve the given `versions/index.json` document.
    pub fn with_versions(mut self, index_json: &str) -> Self {
        let index: VersionIndex =
            serde_json::from_str(index_json).expect("test version index must be valid");
        self.versions = index.versions;
        self
    }

    pub fn metadata_requests(&self) -> usize {
        self.metadata_requests.load(Ordering::SeqCst)
    }
}

impl MetadataSource for MockMetadataSource {
    async fn fetch_metadata(&self, _url: &str) -> Result<UpdateMetadata, UpdateError> {
        self.metadata_requests.fetch_add(1, Ordering::SeqCst);
        Ok(self.metadata.clone())
    }

    async fn fetch_versions(&self, _url: &str) -> Result<Vec<VersionEntry>, UpdateError> {
        Ok(self.versions.clone())
    }
}
