use std::io;
use thiserror::Error;

/// Problems with the bytes of a studio model file. Fatal to a load.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("bad magic id {0:?}, expected IDST")]
    BadMagic([u8; 4]),
    #[error("sequence group file loaded where a main model was expected")]
    SequenceGroupFile,
    #[error("unsupported version {0}")]
    BadVersion(i32),
    #[error("declared length {declared} does not match file size {actual}")]
    LengthMismatch { declared: i64, actual: usize },
    #[error("texture file loaded where a main model was expected")]
    TextureHeaderAsMain,
    #[error("{what} at offset {offset} runs past the end of the buffer")]
    Truncated { what: &'static str, offset: usize },
    #[error("{what} {index} references {target} {value}, which does not exist")]
    InvalidReference {
        what: &'static str,
        index: usize,
        target: &'static str,
        value: i64,
    },
    #[error("negative count {count} for {what}")]
    NegativeCount { what: &'static str, count: i32 },
    #[error("bone controller {index} has an empty range")]
    EmptyControllerRange { index: usize },
    #[error("bone hierarchy contains a cycle")]
    CyclicHierarchy,
    #[error("animation curve of sequence {sequence}, bone {bone}, axis {axis} is malformed")]
    MalformedAnimation {
        sequence: usize,
        bone: usize,
        axis: usize,
    },
    #[error("companion texture file {0} is missing")]
    MissingTextureFile(String),
}

/// The editable model cannot be expressed in the binary format. Fatal to a
/// save; nothing is written.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("too many {what}: {count} exceeds the limit of {max}")]
    TooMany {
        what: &'static str,
        count: usize,
        max: usize,
    },
    #[error("{what} name {name:?} is longer than {max} bytes")]
    NameTooLong {
        what: &'static str,
        name: String,
        max: usize,
    },
    #[error("{what} name {name:?} has characters outside Latin-1")]
    NameNotLatin1 { what: &'static str, name: String },
    #[error("bone controller {index} has an empty range")]
    EmptyControllerRange { index: usize },
    #[error("{what} value {value} does not fit the format")]
    ValueOutOfRange { what: &'static str, value: i64 },
    #[error("animation data offset {offset} of sequence {sequence} does not fit 16 bits")]
    OffsetOverflow { sequence: usize, offset: usize },
    #[error("{what} {index} references missing {target} {value}")]
    InvalidReference {
        what: &'static str,
        index: usize,
        target: &'static str,
        value: usize,
    },
    #[error("texture {name:?} has {pixels} pixels and {palette} palette entries for {width}x{height}")]
    InvalidTexture {
        name: String,
        width: u32,
        height: u32,
        pixels: usize,
        palette: usize,
    },
    #[error("buffer grew past 2 GiB")]
    BufferTooLarge,
    #[error("write failed: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum StudioError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}
