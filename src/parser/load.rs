// File level loading and saving of studio models

use crate::error::{FormatError, StudioError};
use crate::format::{MAIN_MAGIC, SEQUENCE_GROUP_MAGIC, STUDIO_VERSION, StudioHeader};
use crate::model::EditableModel;
use crate::parser::decode::convert_to_editable;
use crate::parser::reader::BufferReader;
use crate::parser::textures::TextureContainer;
use crate::writer::convert_from_editable;
use std::fs;
use std::path::{Path, PathBuf};

/// Companion texture file of a model: `<stem>T.<ext>` next to it.
pub fn texture_file_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut name = format!("{stem}T");
    if let Some(ext) = path.extension() {
        name.push('.');
        name.push_str(&ext.to_string_lossy());
    }
    path.with_file_name(name)
}

/// Checks the fixed header fields shared by main and texture files.
fn validate_header(bytes: &[u8]) -> Result<StudioHeader, FormatError> {
    let header: StudioHeader = BufferReader::new(bytes).record(0, "header")?;

    if header.id == SEQUENCE_GROUP_MAGIC {
        return Err(FormatError::SequenceGroupFile);
    }
    if header.id != MAIN_MAGIC {
        return Err(FormatError::BadMagic(header.id));
    }
    if header.version != STUDIO_VERSION {
        return Err(FormatError::BadVersion(header.version));
    }
    if i64::from(header.length) != bytes.len() as i64 {
        return Err(FormatError::LengthMismatch {
            declared: header.length.into(),
            actual: bytes.len(),
        });
    }

    Ok(header)
}

/// Reads, validates and decodes a main model file, pulling in its texture
/// file when the model stores no textures of its own.
pub fn load_model(path: impl AsRef<Path>) -> Result<EditableModel, StudioError> {
    let path = path.as_ref();
    log::info!("Loading model: {}", path.display());

    let main = fs::read(path)?;
    let header = validate_header(&main)?;
    // Texture files carry no model name
    if header.name.is_empty() {
        return Err(FormatError::TextureHeaderAsMain.into());
    }

    let container = TextureContainer::from_path(path);

    let texture_file = if header.num_textures == 0 {
        let texture_path = texture_file_path(path);
        log::debug!("Loading texture file: {}", texture_path.display());
        let bytes = fs::read(&texture_path).map_err(|_| {
            FormatError::MissingTextureFile(texture_path.display().to_string())
        })?;
        validate_header(&bytes)?;
        Some(bytes)
    } else {
        None
    };

    let model = convert_to_editable(&main, texture_file.as_deref(), container)?;
    log::info!(
        "Loaded '{}' ({} bytes, {} textures)",
        model.name,
        main.len(),
        model.textures.len()
    );
    Ok(model)
}

/// Encodes the model completely before touching the destination, so a
/// failed encode leaves any existing file intact.
pub fn save_model(path: impl AsRef<Path>, model: &EditableModel) -> Result<(), StudioError> {
    let path = path.as_ref();
    let bytes = convert_from_editable(model)?;
    fs::write(path, &bytes)?;
    log::info!("Saved '{}' to {} ({} bytes)", model.name, path.display(), bytes.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Record;

    #[test]
    fn texture_file_sits_next_to_the_model() {
        assert_eq!(
            texture_file_path(Path::new("models/scientist.mdl")),
            PathBuf::from("models/scientistT.mdl")
        );
        assert_eq!(texture_file_path(Path::new("barney")), PathBuf::from("barneyT"));
    }

    #[test]
    fn short_buffers_fail_header_validation() {
        assert!(matches!(
            validate_header(&[0u8; 16]),
            Err(FormatError::Truncated { what: "header", .. })
        ));
    }

    #[test]
    fn header_checks_run_in_order() {
        let mut header = StudioHeader {
            id: *b"IDSQ",
            version: STUDIO_VERSION,
            length: StudioHeader::SIZE as i32,
            ..Default::default()
        };
        let encode = |h: &StudioHeader| {
            let mut out = Vec::new();
            h.write(&mut out).unwrap();
            out
        };

        assert!(matches!(
            validate_header(&encode(&header)),
            Err(FormatError::SequenceGroupFile)
        ));

        header.id = MAIN_MAGIC;
        header.version = 6;
        assert!(matches!(
            validate_header(&encode(&header)),
            Err(FormatError::BadVersion(6))
        ));

        header.version = STUDIO_VERSION;
        header.length = 1000;
        assert!(matches!(
            validate_header(&encode(&header)),
            Err(FormatError::LengthMismatch { declared: 1000, actual: 244 })
        ));

        header.length = StudioHeader::SIZE as i32;
        assert!(validate_header(&encode(&header)).is_ok());
    }
}
