// Editable model graph -> binary studio model

use crate::error::EncodeError;
use crate::format::{
    AnimRecord, AttachmentRecord, BONE_AXES, BodypartRecord, BoneControllerRecord, BoneRecord,
    EventRecord, HitboxRecord, MAIN_MAGIC, MAX_ATTACHMENTS, MAX_BLENDS, MAX_BODYPARTS,
    MAX_BONE_CONTROLLERS, MAX_BONES, MAX_EVENTS, MAX_HITBOXES, MAX_MESHES, MAX_MODELS,
    MAX_PIVOTS, MAX_SEQUENCES, MAX_SKIN_FAMILIES, MAX_SKIN_REFS, MAX_TEXTURES, MAX_VERTICES,
    MeshRecord, ModelRecord, PALETTE_ENTRIES, PivotRecord, Record, STUDIO_VERSION,
    SequenceGroupRecord, SequenceRecord, StudioHeader, TextureRecord, name_to_bytes,
};
use crate::model::{EditableModel, Sequence, SubModel, TriangleRun};
use crate::writer::buffer::ByteWriter;

fn check_count(what: &'static str, count: usize, max: usize) -> Result<(), EncodeError> {
    if count > max {
        return Err(EncodeError::TooMany { what, count, max });
    }
    Ok(())
}

/// Names are stored as Latin-1, NUL terminated, in fixed fields of `field`
/// bytes.
fn check_name(what: &'static str, name: &str, field: usize) -> Result<(), EncodeError> {
    let Some(bytes) = name_to_bytes(name) else {
        return Err(EncodeError::NameNotLatin1 {
            what,
            name: name.to_string(),
        });
    };
    if bytes.len() >= field {
        return Err(EncodeError::NameTooLong {
            what,
            name: name.to_string(),
            max: field - 1,
        });
    }
    Ok(())
}

fn check_ref(
    what: &'static str,
    index: usize,
    target: &'static str,
    value: usize,
    len: usize,
) -> Result<(), EncodeError> {
    if value >= len {
        return Err(EncodeError::InvalidReference {
            what,
            index,
            target,
            value,
        });
    }
    Ok(())
}

/// Checks every limit of the fixed format. Runs before any output is built.
pub fn validate(model: &EditableModel) -> Result<(), EncodeError> {
    let num_bones = model.bones.len();

    check_name("model", &model.name, 64)?;
    check_count("bones", num_bones, MAX_BONES)?;
    check_count("bone controllers", model.bone_controllers.len(), MAX_BONE_CONTROLLERS)?;
    check_count("hitboxes", model.hitboxes.len(), MAX_HITBOXES)?;
    check_count("attachments", model.attachments.len(), MAX_ATTACHMENTS)?;
    check_count("sequences", model.sequences.len(), MAX_SEQUENCES)?;
    check_count("bodyparts", model.bodyparts.len(), MAX_BODYPARTS)?;
    check_count("textures", model.textures.len(), MAX_TEXTURES)?;

    for (i, bone) in model.bones.iter().enumerate() {
        check_name("bone", &bone.name, 32)?;
        if let Some(parent) = bone.parent {
            check_ref("bone", i, "parent bone", parent, num_bones)?;
        }
        for controller in bone.controllers.iter().flatten() {
            check_ref("bone", i, "bone controller", *controller, model.bone_controllers.len())?;
        }
    }
    for (index, controller) in model.bone_controllers.iter().enumerate() {
        if controller.start == controller.end {
            return Err(EncodeError::EmptyControllerRange { index });
        }
    }
    for (i, hitbox) in model.hitboxes.iter().enumerate() {
        check_ref("hitbox", i, "bone", hitbox.bone, num_bones)?;
    }
    for (i, attachment) in model.attachments.iter().enumerate() {
        check_name("attachment", &attachment.name, 32)?;
        check_ref("attachment", i, "bone", attachment.bone, num_bones)?;
    }

    for (i, sequence) in model.sequences.iter().enumerate() {
        check_name("sequence", &sequence.label, 32)?;
        check_count("events", sequence.events.len(), MAX_EVENTS)?;
        check_count("pivots", sequence.pivots.len(), MAX_PIVOTS)?;
        check_count("blends", sequence.blends.len(), MAX_BLENDS)?;
        for event in &sequence.events {
            check_name("event options", &event.options, 64)?;
        }
        for blend in &sequence.blends {
            if blend.bones.len() != num_bones {
                return Err(EncodeError::InvalidReference {
                    what: "sequence",
                    index: i,
                    target: "bone animations for bone",
                    value: blend.bones.len(),
                });
            }
        }
    }
    check_name("sequence group", &model.sequence_group.label, 32)?;
    check_name("sequence group file", &model.sequence_group.name, 64)?;

    let num_nodes = model.transitions.len();
    if num_nodes > usize::from(u8::MAX) {
        return Err(EncodeError::ValueOutOfRange {
            what: "transition nodes",
            value: num_nodes as i64,
        });
    }
    for row in &model.transitions {
        if row.len() != num_nodes {
            return Err(EncodeError::ValueOutOfRange {
                what: "transition row length",
                value: row.len() as i64,
            });
        }
    }

    for bodypart in &model.bodyparts {
        check_name("bodypart", &bodypart.name, 64)?;
        check_count("models", bodypart.models.len(), MAX_MODELS)?;
        for submodel in &bodypart.models {
            validate_submodel(submodel, num_bones)?;
        }
    }

    for texture in &model.textures {
        check_name("texture", &texture.name, 64)?;
        let size = texture.width as usize * texture.height as usize;
        if texture.pixels.len() != size
            || texture.palette.len() != PALETTE_ENTRIES
            || i32::try_from(texture.width).is_err()
            || i32::try_from(texture.height).is_err()
        {
            return Err(EncodeError::InvalidTexture {
                name: texture.name.clone(),
                width: texture.width,
                height: texture.height,
                pixels: texture.pixels.len(),
                palette: texture.palette.len(),
            });
        }
    }

    check_count("skin families", model.skin_families.len(), MAX_SKIN_FAMILIES)?;
    let num_refs = model.num_skin_refs();
    check_count("skin references", num_refs, MAX_SKIN_REFS)?;
    for (family, refs) in model.skin_families.iter().enumerate() {
        if refs.len() != num_refs {
            return Err(EncodeError::ValueOutOfRange {
                what: "skin family length",
                value: refs.len() as i64,
            });
        }
        for &texture in refs {
            check_ref("skin family", family, "texture", texture, model.textures.len())?;
            if i16::try_from(texture).is_err() {
                return Err(EncodeError::ValueOutOfRange {
                    what: "skin texture index",
                    value: texture as i64,
                });
            }
        }
    }

    Ok(())
}

fn validate_submodel(submodel: &SubModel, num_bones: usize) -> Result<(), EncodeError> {
    check_name("model", &submodel.name, 64)?;
    check_count("meshes", submodel.meshes.len(), MAX_MESHES)?;
    check_count("vertices", submodel.vertices.len(), MAX_VERTICES)?;
    check_count("normals", submodel.normals.len(), MAX_VERTICES)?;

    for (i, point) in submodel.vertices.iter().chain(&submodel.normals).enumerate() {
        check_ref("vertex", i, "bone", point.bone, num_bones)?;
        if point.bone > usize::from(u8::MAX) {
            return Err(EncodeError::ValueOutOfRange {
                what: "vertex bone",
                value: point.bone as i64,
            });
        }
    }

    for mesh in &submodel.meshes {
        for command in &mesh.commands {
            let len = command.vertices.len();
            if len == 0 || len > i16::MAX as usize {
                return Err(EncodeError::ValueOutOfRange {
                    what: "triangle command length",
                    value: len as i64,
                });
            }
        }
    }

    Ok(())
}

/// Encodes the model into a complete main file. Validation runs first; on
/// any error no bytes are produced.
pub fn convert_from_editable(model: &EditableModel) -> Result<Vec<u8>, EncodeError> {
    validate(model)?;

    let mut w = ByteWriter::new();
    let mut header = StudioHeader {
        id: MAIN_MAGIC,
        version: STUDIO_VERSION,
        name: model.name.clone(),
        eye_position: model.eye_position,
        min: model.min,
        max: model.max,
        bbmin: model.bbmin,
        bbmax: model.bbmax,
        flags: model.flags,
        ..Default::default()
    };
    w.reserve::<StudioHeader>(1)?;

    write_skeleton(&mut w, model, &mut header)?;
    write_sequences(&mut w, model, &mut header)?;
    write_bodyparts(&mut w, model, &mut header)?;
    write_textures(&mut w, model, &mut header)?;

    w.align();
    header.length = w.position()?;
    w.patch(0, 0, &header)?;

    let data = w.into_inner();
    log::debug!("Encoded '{}' into {} bytes", model.name, data.len());
    Ok(data)
}

fn index_or_none(index: Option<usize>) -> i32 {
    index.map_or(-1, |i| i as i32)
}

fn write_skeleton(
    w: &mut ByteWriter,
    model: &EditableModel,
    header: &mut StudioHeader,
) -> Result<(), EncodeError> {
    header.num_bones = model.bones.len() as i32;
    header.bone_index = w.section()?;
    for bone in &model.bones {
        w.record(&BoneRecord {
            name: bone.name.clone(),
            parent: index_or_none(bone.parent),
            flags: bone.flags,
            bone_controller: bone.controllers.map(index_or_none),
            value: bone.value,
            scale: bone.scale,
        })?;
    }

    header.num_bone_controllers = model.bone_controllers.len() as i32;
    header.bone_controller_index = w.section()?;
    for (i, controller) in model.bone_controllers.iter().enumerate() {
        w.record(&BoneControllerRecord {
            bone: index_or_none(model.controller_bone(i)),
            kind: controller.kind,
            start: controller.start,
            end: controller.end,
            rest: controller.rest,
            index: controller.index,
        })?;
    }

    header.num_attachments = model.attachments.len() as i32;
    header.attachment_index = w.section()?;
    for attachment in &model.attachments {
        w.record(&AttachmentRecord {
            name: attachment.name.clone(),
            kind: attachment.kind,
            bone: attachment.bone as i32,
            origin: attachment.origin,
            vectors: attachment.vectors,
        })?;
    }

    header.num_hitboxes = model.hitboxes.len() as i32;
    header.hitbox_index = w.section()?;
    for hitbox in &model.hitboxes {
        w.record(&HitboxRecord {
            bone: hitbox.bone as i32,
            group: hitbox.group,
            bbmin: hitbox.min,
            bbmax: hitbox.max,
        })?;
    }

    Ok(())
}

/// Writes every blend's offset records followed by their curves. Offsets
/// are relative to the bone's own record.
fn write_animation(
    w: &mut ByteWriter,
    sequence: &Sequence,
    index: usize,
    num_bones: usize,
) -> Result<i32, EncodeError> {
    let anim_index = w.section()?;
    let num_records = sequence.blends.len() * num_bones;
    w.reserve::<AnimRecord>(num_records)?;

    let mut records = Vec::with_capacity(num_records);
    for blend in &sequence.blends {
        for (bone, animation) in blend.bones.iter().enumerate() {
            let record_offset = anim_index as usize + records.len() * AnimRecord::SIZE;
            let mut record = AnimRecord::default();
            for axis in 0..BONE_AXES {
                let curve = &animation.data[axis];
                if curve.is_empty() {
                    continue;
                }
                let relative = w.position()? as usize - record_offset;
                record.offset[axis] =
                    u16::try_from(relative).map_err(|_| EncodeError::OffsetOverflow {
                        sequence: index,
                        offset: relative,
                    })?;
                for value in curve {
                    w.u16(value.0)?;
                }
            }
            log::trace!("sequence {index} bone {bone}: {:?}", record.offset);
            records.push(record);
        }
    }

    for (i, record) in records.iter().enumerate() {
        w.patch(anim_index, i, record)?;
    }
    Ok(anim_index)
}

fn write_sequences(
    w: &mut ByteWriter,
    model: &EditableModel,
    header: &mut StudioHeader,
) -> Result<(), EncodeError> {
    let num_bones = model.bones.len();

    let anim_indices = model
        .sequences
        .iter()
        .enumerate()
        .map(|(i, sequence)| write_animation(w, sequence, i, num_bones))
        .collect::<Result<Vec<_>, _>>()?;

    header.num_seq = model.sequences.len() as i32;
    header.seq_index = w.section()?;
    w.reserve::<SequenceRecord>(model.sequences.len())?;

    for (i, (sequence, &anim_index)) in model.sequences.iter().zip(&anim_indices).enumerate() {
        let event_index = w.section()?;
        for event in &sequence.events {
            w.record(&EventRecord {
                frame: event.frame,
                event: event.event,
                kind: event.kind,
                options: event.options.clone(),
            })?;
        }
        let pivot_index = w.section()?;
        for pivot in &sequence.pivots {
            w.record(&PivotRecord {
                origin: pivot.origin,
                start: pivot.start,
                end: pivot.end,
            })?;
        }

        let record = SequenceRecord {
            label: sequence.label.clone(),
            fps: sequence.fps,
            flags: sequence.flags,
            activity: sequence.activity,
            activity_weight: sequence.activity_weight,
            num_events: sequence.events.len() as i32,
            event_index,
            num_frames: sequence.num_frames,
            num_pivots: sequence.pivots.len() as i32,
            pivot_index,
            motion_type: sequence.motion_type,
            motion_bone: sequence.motion_bone,
            linear_movement: sequence.linear_movement,
            automove_pos_index: 0,
            automove_angle_index: 0,
            bbmin: sequence.bbmin,
            bbmax: sequence.bbmax,
            num_blends: sequence.blends.len() as i32,
            anim_index,
            blend_type: sequence.blend.map(|b| b.kind),
            blend_start: sequence.blend.map(|b| b.start),
            blend_end: sequence.blend.map(|b| b.end),
            blend_parent: sequence.blend_parent,
            seq_group: 0,
            entry_node: sequence.entry_node,
            exit_node: sequence.exit_node,
            node_flags: sequence.node_flags,
            next_seq: sequence.next_sequence,
        };
        w.patch(header.seq_index, i, &record)?;
    }

    header.num_seq_groups = 1;
    header.seq_group_index = w.section()?;
    w.record(&SequenceGroupRecord {
        label: model.sequence_group.label.clone(),
        name: model.sequence_group.name.clone(),
        unused1: 0,
        unused2: 0,
    })?;

    header.num_transitions = model.transitions.len() as i32;
    header.transition_index = w.section()?;
    for row in &model.transitions {
        w.bytes(row);
    }

    Ok(())
}

fn write_bodyparts(
    w: &mut ByteWriter,
    model: &EditableModel,
    header: &mut StudioHeader,
) -> Result<(), EncodeError> {
    header.num_bodyparts = model.bodyparts.len() as i32;
    header.bodypart_index = w.section()?;
    w.reserve::<BodypartRecord>(model.bodyparts.len())?;

    let num_models: usize = model.bodyparts.iter().map(|b| b.models.len()).sum();
    let models_index = w.section()?;
    w.reserve::<ModelRecord>(num_models)?;

    let mut model_slot = 0;
    for (i, bodypart) in model.bodyparts.iter().enumerate() {
        let model_index = models_index + (model_slot * ModelRecord::SIZE) as i32;
        w.patch(
            header.bodypart_index,
            i,
            &BodypartRecord {
                name: bodypart.name.clone(),
                num_models: bodypart.models.len() as i32,
                base: bodypart.base,
                model_index,
            },
        )?;

        for submodel in &bodypart.models {
            let record = write_submodel(w, submodel)?;
            w.patch(models_index, model_slot, &record)?;
            model_slot += 1;
        }
    }

    Ok(())
}

fn write_submodel(w: &mut ByteWriter, submodel: &SubModel) -> Result<ModelRecord, EncodeError> {
    let vert_info_index = w.section()?;
    for point in &submodel.vertices {
        w.bytes(&[point.bone as u8]);
    }
    let norm_info_index = w.section()?;
    for point in &submodel.normals {
        w.bytes(&[point.bone as u8]);
    }
    let vert_index = w.section()?;
    for point in &submodel.vertices {
        w.vec3(&point.position)?;
    }
    let norm_index = w.section()?;
    for point in &submodel.normals {
        w.vec3(&point.position)?;
    }

    let mesh_index = w.section()?;
    w.reserve::<MeshRecord>(submodel.meshes.len())?;
    for (i, mesh) in submodel.meshes.iter().enumerate() {
        let tri_index = w.section()?;
        for command in &mesh.commands {
            // Validated to fit
            let len = command.vertices.len() as i16;
            w.i16(match command.run {
                TriangleRun::Strip => len,
                TriangleRun::Fan => -len,
            })?;
            for v in &command.vertices {
                for c in [v.vertex, v.normal, v.s, v.t] {
                    w.i16(c)?;
                }
            }
        }
        w.i16(0)?;

        w.patch(
            mesh_index,
            i,
            &MeshRecord {
                num_tris: mesh.num_triangles,
                tri_index,
                skin_ref: mesh.skin_ref,
                num_norms: mesh.num_normals,
                norm_index: 0,
            },
        )?;
    }

    Ok(ModelRecord {
        name: submodel.name.clone(),
        kind: submodel.kind,
        bounding_radius: submodel.bounding_radius,
        num_mesh: submodel.meshes.len() as i32,
        mesh_index,
        num_verts: submodel.vertices.len() as i32,
        vert_info_index,
        vert_index,
        num_norms: submodel.normals.len() as i32,
        norm_info_index,
        norm_index,
        num_groups: 0,
        group_index: 0,
    })
}

fn write_textures(
    w: &mut ByteWriter,
    model: &EditableModel,
    header: &mut StudioHeader,
) -> Result<(), EncodeError> {
    header.num_textures = model.textures.len() as i32;
    header.texture_index = w.section()?;
    w.reserve::<TextureRecord>(model.textures.len())?;

    header.num_skin_ref = model.num_skin_refs() as i32;
    header.num_skin_families = model.skin_families.len() as i32;
    header.skin_index = w.section()?;
    for &texture in model.skin_families.iter().flatten() {
        w.i16(texture as i16)?;
    }

    header.texture_data_index = w.section()?;
    for (i, texture) in model.textures.iter().enumerate() {
        let index = w.position()?;
        w.bytes(&texture.pixels);
        for rgb in &texture.palette {
            w.bytes(rgb);
        }
        w.patch(
            header.texture_index,
            i,
            &TextureRecord {
                name: texture.name.clone(),
                flags: texture.flags,
                width: texture.width as i32,
                height: texture.height as i32,
                index,
            },
        )?;
    }

    Ok(())
}
