mod common;

use common::{fixture_model, texture};
use std::fs;
use studiovis::{
    EditableModel, EncodeError, FormatError, StudioError, convert_from_editable, load_model,
    save_model,
};
use tempfile::tempdir;

fn write(path: &std::path::Path, bytes: &[u8]) {
    fs::write(path, bytes).unwrap();
}

#[test]
fn saved_models_load_back() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("fixture.mdl");
    let model = fixture_model();

    save_model(&path, &model).unwrap();
    assert_eq!(load_model(&path).unwrap(), model);
}

#[test]
fn header_problems_are_reported() {
    let dir = tempdir().unwrap();
    let bytes = convert_from_editable(&fixture_model()).unwrap();

    let path = dir.path().join("magic.mdl");
    let mut bad = bytes.clone();
    bad[..4].copy_from_slice(b"IDPO");
    write(&path, &bad);
    assert!(matches!(
        load_model(&path),
        Err(StudioError::Format(FormatError::BadMagic(id))) if &id == b"IDPO"
    ));

    let path = dir.path().join("group.mdl");
    let mut group = bytes.clone();
    group[..4].copy_from_slice(b"IDSQ");
    write(&path, &group);
    assert!(matches!(
        load_model(&path),
        Err(StudioError::Format(FormatError::SequenceGroupFile))
    ));

    let path = dir.path().join("version.mdl");
    let mut old = bytes.clone();
    old[4..8].copy_from_slice(&6i32.to_le_bytes());
    write(&path, &old);
    assert!(matches!(
        load_model(&path),
        Err(StudioError::Format(FormatError::BadVersion(6)))
    ));

    let path = dir.path().join("padded.mdl");
    let mut padded = bytes;
    padded.extend_from_slice(&[0; 4]);
    write(&path, &padded);
    assert!(matches!(
        load_model(&path),
        Err(StudioError::Format(FormatError::LengthMismatch { actual, .. })) if actual == padded.len()
    ));
}

#[test]
fn texture_files_are_not_main_models() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("fixtureT.mdl");
    let textures = EditableModel {
        textures: vec![texture("skin.bmp", 3)],
        skin_families: vec![vec![0]],
        ..Default::default()
    };
    save_model(&path, &textures).unwrap();

    assert!(matches!(
        load_model(&path),
        Err(StudioError::Format(FormatError::TextureHeaderAsMain))
    ));
}

#[test]
fn textures_are_read_from_the_companion_file() {
    let dir = tempdir().unwrap();
    let main_path = dir.path().join("m.mdl");

    let mut main = fixture_model();
    main.textures.clear();
    main.skin_families.clear();
    save_model(&main_path, &main).unwrap();

    let missing = load_model(&main_path);
    assert!(matches!(
        missing,
        Err(StudioError::Format(FormatError::MissingTextureFile(ref name))) if name.ends_with("mT.mdl")
    ));

    let textures = EditableModel {
        textures: vec![texture("a.bmp", 1), texture("b.bmp", 2)],
        skin_families: vec![vec![0, 1], vec![1, 0]],
        ..Default::default()
    };
    save_model(dir.path().join("mT.mdl"), &textures).unwrap();

    let loaded = load_model(&main_path).unwrap();
    assert_eq!(loaded.textures, textures.textures);
    assert_eq!(loaded.skin_families, textures.skin_families);
    assert_eq!(loaded.sequences, main.sequences);

    // Saving merges the textures into the main file
    let merged = dir.path().join("merged.mdl");
    save_model(&merged, &loaded).unwrap();
    assert_eq!(load_model(&merged).unwrap(), loaded);
}

#[test]
fn broken_companion_file_is_a_format_error() {
    let dir = tempdir().unwrap();
    let mut main = fixture_model();
    main.textures.clear();
    main.skin_families.clear();
    save_model(dir.path().join("m.mdl"), &main).unwrap();
    write(&dir.path().join("mT.mdl"), b"not a model");

    assert!(matches!(
        load_model(dir.path().join("m.mdl")),
        Err(StudioError::Format(FormatError::Truncated { .. }))
    ));
}

#[test]
fn failed_save_keeps_the_existing_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("keep.mdl");
    write(&path, b"previous contents");

    let mut model = fixture_model();
    model.bones[0].name = "a bone name that is far too long for the field".into();

    assert!(matches!(
        save_model(&path, &model),
        Err(StudioError::Encode(EncodeError::NameTooLong { what: "bone", .. }))
    ));
    assert_eq!(fs::read(&path).unwrap(), b"previous contents");
}

#[test]
fn missing_files_are_io_errors() {
    let dir = tempdir().unwrap();
    assert!(matches!(
        load_model(dir.path().join("nope.mdl")),
        Err(StudioError::Io(_))
    ));
}
