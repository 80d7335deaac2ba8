pub mod document;
pub mod edits;
pub mod export;
pub mod form;
pub mod icons;
pub mod image_codec;
pub mod models;
pub mod store;

pub use document::{Document, render};
pub use export::export_filename;
pub use form::FormController;
pub use image_codec::{CompressOptions, EncodedImage, ImageCodecError};
pub use models::*;
pub use store::{
    DraftError, DraftStore, KeyValueStore, MemoryStore, MemoryStoreFactory, StoreConfig, StoreError,
    StoreFactory, StoreRegistry,
};
