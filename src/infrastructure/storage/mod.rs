mod azure_blob_store;
mod connection_string;
mod local_filesystem_store;
mod object_store_reader;
mod path_builder;

pub use azure_blob_store::AzureBlobStore;
pub use connection_string::StorageConnectionString;
pub use local_filesystem_store::LocalFilesystemStore;
pub use object_store_reader::{map_object_store_error, read_object};
pub use path_builder::PathBuilder;
