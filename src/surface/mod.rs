mod texture;

pub use texture::{CacheBlock, TextureError};
