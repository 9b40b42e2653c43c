pub mod metadata;

pub use metadata::{
    AssetFile, CreateNftRequest, CreatedNft, HttpMetadataService, MetadataError, MetadataService,
};
