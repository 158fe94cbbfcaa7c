// Texture pixel and palette decoding for the two on-disk containers

use crate::error::FormatError;
use crate::format::{PALETTE_ENTRIES, TextureRecord};
use crate::model::Texture;
use crate::parser::reader::{BufferReader, checked_count};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Layout of the texture data block, chosen by file extension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextureContainer {
    /// Indexed pixels followed by a 256 x RGB palette.
    #[default]
    Mdl,
    /// 32-byte name, 256 x RGBA palette, then remapped indexed pixels.
    Dol,
}

const DOL_NAME_SIZE: usize = 32;

impl TextureContainer {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("dol") => Self::Dol,
            _ => Self::Mdl,
        }
    }
}

/// Maps a Dol palette index onto the palette order used by Mdl files.
pub fn remap_dol_index(index: u8) -> u8 {
    let masked = index & 0x1F;
    if (8..16).contains(&masked) {
        index.wrapping_add(8)
    } else if masked >= 16 {
        index.wrapping_sub(8)
    } else {
        index
    }
}

pub(crate) fn read_texture(
    reader: &BufferReader<'_>,
    record: &TextureRecord,
    container: TextureContainer,
) -> Result<Texture, FormatError> {
    let width = checked_count(record.width, "texture width")?;
    let height = checked_count(record.height, "texture height")?;
    let offset = checked_count(record.index, "texture data offset")?;
    let size = width * height;

    let (pixels, palette) = match container {
        TextureContainer::Mdl => {
            let pixels = reader.bytes(offset, size, "texture pixels")?.to_vec();
            let palette = reader
                .bytes(offset + size, PALETTE_ENTRIES * 3, "texture palette")?
                .chunks_exact(3)
                .map(|c| [c[0], c[1], c[2]])
                .collect();
            (pixels, palette)
        }
        TextureContainer::Dol => {
            let palette_offset = offset + DOL_NAME_SIZE;
            let palette = reader
                .bytes(palette_offset, PALETTE_ENTRIES * 4, "texture palette")?
                .chunks_exact(4)
                .map(|c| [c[0], c[1], c[2]])
                .collect();
            let pixels = reader
                .bytes(palette_offset + PALETTE_ENTRIES * 4, size, "texture pixels")?
                .iter()
                .map(|&p| remap_dol_index(p))
                .collect();
            (pixels, palette)
        }
    };

    Ok(Texture {
        name: record.name.clone(),
        flags: record.flags,
        width: width as u32,
        height: height as u32,
        pixels,
        palette,
    })
}
