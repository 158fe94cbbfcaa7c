// On-disk layout of studio model files
// Every record is a fixed-size little-endian structure; relationships are byte offsets.

pub mod anim_value;
pub mod header;
pub mod records;

pub use anim_value::AnimValue;
pub use header::StudioHeader;
pub use records::*;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

pub const STUDIO_VERSION: i32 = 10;
pub const MAIN_MAGIC: [u8; 4] = *b"IDST";
pub const SEQUENCE_GROUP_MAGIC: [u8; 4] = *b"IDSQ";

// Format maxima
pub const MAX_BONES: usize = 128;
pub const MAX_BONE_CONTROLLERS: usize = 8;
pub const MAX_HITBOXES: usize = 512;
pub const MAX_SEQUENCES: usize = 2048;
pub const MAX_EVENTS: usize = 1024;
pub const MAX_PIVOTS: usize = 256;
pub const MAX_BLENDS: usize = 16;
pub const MAX_SKIN_REFS: usize = 100;
pub const MAX_SKIN_FAMILIES: usize = 100;
pub const MAX_BODYPARTS: usize = 32;
pub const MAX_MODELS: usize = 32;
pub const MAX_MESHES: usize = 256;
pub const MAX_VERTICES: usize = 2048;
pub const MAX_ATTACHMENTS: usize = 512;
pub const MAX_TEXTURES: usize = 512;

/// Bone controller slot reserved for the mouth.
pub const MOUTH_CONTROLLER: i32 = 4;

pub const PALETTE_ENTRIES: usize = 256;

// Motion / controller type flags
pub const STUDIO_X: i32 = 0x0001;
pub const STUDIO_Y: i32 = 0x0002;
pub const STUDIO_Z: i32 = 0x0004;
pub const STUDIO_XR: i32 = 0x0008;
pub const STUDIO_YR: i32 = 0x0010;
pub const STUDIO_ZR: i32 = 0x0020;
pub const STUDIO_TYPES: i32 = 0x7FFF;
pub const STUDIO_RLOOP: i32 = 0x8000;
pub const STUDIO_ROTATION_TYPES: i32 = STUDIO_XR | STUDIO_YR | STUDIO_ZR;

// Sequence flags
pub const STUDIO_LOOPING: i32 = 0x0001;

/// Number of animated channels per bone: X, Y, Z, XR, YR, ZR.
pub const BONE_AXES: usize = 6;

/// A fixed-size record of the binary format.
pub trait Record: Sized {
    const SIZE: usize;

    fn read<R: Read>(r: &mut R) -> io::Result<Self>;

    fn write<W: Write>(&self, w: &mut W) -> io::Result<()>;
}

pub(crate) fn read_name<R: Read, const N: usize>(r: &mut R) -> io::Result<String> {
    let mut bytes = [0u8; N];
    r.read_exact(&mut bytes)?;
    Ok(name_from_bytes(&bytes))
}

/// Names are stored as Latin-1: every byte maps to the code point of the
/// same value, so any name read back writes the same bytes.
pub(crate) fn name_from_bytes(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    bytes[..end].iter().map(|&b| char::from(b)).collect()
}

/// Latin-1 bytes of `name`, or `None` if it holds a character past U+00FF.
pub fn name_to_bytes(name: &str) -> Option<Vec<u8>> {
    name.chars().map(|c| u8::try_from(c).ok()).collect()
}

/// Writes `name` into a zero padded field of `N` bytes. Callers check the
/// name beforehand; characters outside Latin-1 become `?` and anything past
/// `N - 1` bytes is cut so the field stays NUL terminated.
pub(crate) fn write_name<W: Write, const N: usize>(w: &mut W, name: &str) -> io::Result<()> {
    let mut bytes = [0u8; N];
    for (slot, c) in bytes[..N - 1].iter_mut().zip(name.chars()) {
        *slot = u8::try_from(c).unwrap_or(b'?');
    }
    w.write_all(&bytes)
}

pub(crate) fn read_vec3<R: Read>(r: &mut R) -> io::Result<[f32; 3]> {
    Ok([
        r.read_f32::<LittleEndian>()?,
        r.read_f32::<LittleEndian>()?,
        r.read_f32::<LittleEndian>()?,
    ])
}

pub(crate) fn write_vec3<W: Write>(w: &mut W, v: &[f32; 3]) -> io::Result<()> {
    for c in v {
        w.write_f32::<LittleEndian>(*c)?;
    }
    Ok(())
}
