mod buffer;
mod encode;

pub use encode::{convert_from_editable, validate};
