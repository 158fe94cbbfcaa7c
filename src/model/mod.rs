mod animation;
mod bodypart;
mod model;
mod skeleton;
mod texture;

pub use animation::*;
pub use bodypart::*;
pub use model::*;
pub use skeleton::*;
pub use texture::*;
