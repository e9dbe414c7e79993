mod blob_reference;
mod size_kb;
mod write_mode;

pub use blob_reference::BlobReference;
pub use size_kb::SizeKb;
pub use write_mode::WriteMode;
