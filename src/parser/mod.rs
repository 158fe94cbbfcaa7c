mod decode;
pub mod load;
mod reader;
pub mod textures;

pub use decode::convert_to_editable;
pub use load::{load_model, save_model, texture_file_path};
pub use textures::{TextureContainer, remap_dol_index};
