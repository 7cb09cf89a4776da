mod mock_metadata_source;
pub mod test_server;

pub use mock_metadata_source::MockMetadataSource;
