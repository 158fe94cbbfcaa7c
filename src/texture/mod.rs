// Conversion of indexed model textures to RGBA images

use crate::error::StudioError;
use crate::model::{EditableModel, Texture, TextureFlags};
use image::{Rgba, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};

/// Palette index that is see-through on masked textures.
pub const MASK_INDEX: u8 = 255;

/// Expands palette indices to RGBA. Masked textures get a transparent
/// `MASK_INDEX` when `masked_transparency` is set.
pub fn to_rgba_image(texture: &Texture, masked_transparency: bool) -> RgbaImage {
    let masked = masked_transparency && texture.has_flag(TextureFlags::Masked);
    RgbaImage::from_fn(texture.width, texture.height, |x, y| {
        let i = (y * texture.width + x) as usize;
        let index = texture.pixels.get(i).copied().unwrap_or(0);
        let [r, g, b] = texture
            .palette
            .get(index as usize)
            .copied()
            .unwrap_or([0, 0, 0]);
        let alpha = if masked && index == MASK_INDEX { 0 } else { 255 };
        Rgba([r, g, b, alpha])
    })
}

pub fn export_png(texture: &Texture, path: &Path, masked_transparency: bool) -> Result<(), StudioError> {
    to_rgba_image(texture, masked_transparency).save(path)?;
    Ok(())
}

/// File name a texture is exported under: its stored name with a `.png`
/// extension, or its index when the name is empty.
pub fn export_name(texture: &Texture, index: usize) -> String {
    let stem = Path::new(&texture.name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| format!("texture{index}"));
    format!("{stem}.png")
}

/// Writes every texture of the model into `dir` as PNG.
pub fn export_all(model: &EditableModel, dir: &Path, masked_transparency: bool) -> Result<Vec<PathBuf>, StudioError> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(model.textures.len());
    for (i, texture) in model.textures.iter().enumerate() {
        let path = dir.join(export_name(texture, i));
        export_png(texture, &path, masked_transparency)?;
        log::debug!("Exported texture {} to {}", texture.name, path.display());
        written.push(path);
    }
    Ok(written)
}
