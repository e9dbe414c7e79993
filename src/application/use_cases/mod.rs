mod extract_metadata;
mod store_metadata;

pub use extract_metadata::{ExtractError, ExtractMetadataUseCase};
pub use store_metadata::{StoreError, StoreMetadataUseCase};
