use crate::error::UpdateError;
use crate::metadata::{UpdateMetadata, VersionEntry};

/// Where update metadata comes from. Implemented over HTTP by
/// [crate::http::HttpClient]; tests swap in an in-memory source.
pub trait MetadataSource {
    fn fetch_metadata(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<UpdateMetadata, UpdateError>> + Send;

    fn fetch_versions(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<Vec<VersionEntry>, UpdateError>> + Send;
}
