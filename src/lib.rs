pub mod animation;
pub mod error;
pub mod format;
pub mod model;
pub mod parser;
pub mod settings;
pub mod texture;
pub mod writer;

pub const CONFY_APP_NAME: &str = "studiovis-rs";

pub use error::{EncodeError, FormatError, StudioError};
pub use model::EditableModel;
pub use parser::{TextureContainer, convert_to_editable, load_model, save_model};
pub use writer::convert_from_editable;
