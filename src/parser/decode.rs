// Binary studio model -> editable model graph

use crate::error::FormatError;
use crate::format::{
    AnimRecord, AnimValue, AttachmentRecord, BONE_AXES, BodypartRecord, BoneControllerRecord,
    BoneRecord, EventRecord, HitboxRecord, MeshRecord, ModelRecord, PivotRecord, Record,
    SequenceGroupRecord, SequenceRecord, StudioHeader, TextureRecord,
};
use crate::model::{
    AnimationBlend, Attachment, BlendAxis, Bodypart, Bone, BoneAnimation, BoneController,
    EditableModel, Hitbox, Mesh, Pivot, Sequence, SequenceEvent, SequenceGroup, SkinnedPoint,
    SubModel, TriangleCommand, TriangleRun, TriangleVertex,
};
use crate::parser::reader::{BufferReader, checked_count};
use crate::parser::textures::{TextureContainer, read_texture};
use byteorder::{LittleEndian, ReadBytesExt};

/// Decodes a main model buffer (and the companion texture file, if the main
/// file carries no textures) into an owned editable model.
///
/// Only sequence group 0 is decoded. Sequences stored in external groups keep
/// their metadata but get curve-less blends.
pub fn convert_to_editable(
    main: &[u8],
    texture_file: Option<&[u8]>,
    container: TextureContainer,
) -> Result<EditableModel, FormatError> {
    let reader = BufferReader::new(main);
    let header: StudioHeader = reader.record(0, "header")?;

    let mut model = EditableModel {
        name: header.name.clone(),
        eye_position: header.eye_position,
        min: header.min,
        max: header.max,
        bbmin: header.bbmin,
        bbmax: header.bbmax,
        flags: header.flags,
        ..Default::default()
    };

    model.bone_controllers = read_bone_controllers(&reader, &header)?;
    model.bones = read_bones(&reader, &header, model.bone_controllers.len())?;
    if !model.hierarchy_is_valid() {
        return Err(FormatError::CyclicHierarchy);
    }

    let num_bones = model.bones.len();
    model.hitboxes = read_hitboxes(&reader, &header, num_bones)?;
    model.attachments = read_attachments(&reader, &header, num_bones)?;
    model.sequences = read_sequences(&reader, &header, num_bones)?;
    model.sequence_group = read_sequence_group(&reader, &header)?;
    model.transitions = read_transitions(&reader, &header)?;
    model.bodyparts = read_bodyparts(&reader, &header, num_bones)?;

    match (header.num_textures, texture_file) {
        (0, Some(bytes)) => {
            let texture_reader = BufferReader::new(bytes);
            let texture_header: StudioHeader = texture_reader.record(0, "texture header")?;
            read_textures(&texture_reader, &texture_header, container, &mut model)?;
        }
        _ => read_textures(&reader, &header, container, &mut model)?,
    }

    log::debug!(
        "Decoded '{}': {} bones, {} sequences, {} bodyparts, {} textures",
        model.name,
        model.bones.len(),
        model.sequences.len(),
        model.bodyparts.len(),
        model.textures.len()
    );

    Ok(model)
}

fn bone_ref(
    what: &'static str,
    index: usize,
    value: i32,
    num_bones: usize,
) -> Result<usize, FormatError> {
    usize::try_from(value)
        .ok()
        .filter(|&b| b < num_bones)
        .ok_or(FormatError::InvalidReference {
            what,
            index,
            target: "bone",
            value: value.into(),
        })
}

fn read_bone_controllers(
    reader: &BufferReader<'_>,
    header: &StudioHeader,
) -> Result<Vec<BoneController>, FormatError> {
    let records: Vec<BoneControllerRecord> = reader.records(
        header.bone_controller_index,
        header.num_bone_controllers,
        "bone controllers",
    )?;
    // The owning bone is implied by the bones' axis references
    records
        .into_iter()
        .enumerate()
        .map(|(index, r)| {
            if r.start == r.end {
                return Err(FormatError::EmptyControllerRange { index });
            }
            Ok(BoneController {
                kind: r.kind,
                start: r.start,
                end: r.end,
                rest: r.rest,
                index: r.index,
            })
        })
        .collect()
}

fn read_bones(
    reader: &BufferReader<'_>,
    header: &StudioHeader,
    num_controllers: usize,
) -> Result<Vec<Bone>, FormatError> {
    let records: Vec<BoneRecord> = reader.records(header.bone_index, header.num_bones, "bones")?;
    let num_bones = records.len();

    records
        .into_iter()
        .enumerate()
        .map(|(i, r)| -> Result<Bone, FormatError> {
            let parent = match r.parent {
                -1 => None,
                p => Some(bone_ref("bone", i, p, num_bones)?),
            };
            let mut controllers = [None; BONE_AXES];
            for (slot, &c) in controllers.iter_mut().zip(r.bone_controller.iter()) {
                if c == -1 {
                    continue;
                }
                let c = usize::try_from(c)
                    .ok()
                    .filter(|&c| c < num_controllers)
                    .ok_or(FormatError::InvalidReference {
                        what: "bone",
                        index: i,
                        target: "bone controller",
                        value: c.into(),
                    })?;
                *slot = Some(c);
            }
            Ok(Bone {
                name: r.name,
                parent,
                flags: r.flags,
                controllers,
                value: r.value,
                scale: r.scale,
            })
        })
        .collect()
}

fn read_hitboxes(
    reader: &BufferReader<'_>,
    header: &StudioHeader,
    num_bones: usize,
) -> Result<Vec<Hitbox>, FormatError> {
    let records: Vec<HitboxRecord> =
        reader.records(header.hitbox_index, header.num_hitboxes, "hitboxes")?;
    records
        .into_iter()
        .enumerate()
        .map(|(i, r)| -> Result<Hitbox, FormatError> {
            Ok(Hitbox {
                bone: bone_ref("hitbox", i, r.bone, num_bones)?,
                group: r.group,
                min: r.bbmin,
                max: r.bbmax,
            })
        })
        .collect()
}

fn read_attachments(
    reader: &BufferReader<'_>,
    header: &StudioHeader,
    num_bones: usize,
) -> Result<Vec<Attachment>, FormatError> {
    let records: Vec<AttachmentRecord> =
        reader.records(header.attachment_index, header.num_attachments, "attachments")?;
    records
        .into_iter()
        .enumerate()
        .map(|(i, r)| -> Result<Attachment, FormatError> {
            Ok(Attachment {
                bone: bone_ref("attachment", i, r.bone, num_bones)?,
                name: r.name,
                kind: r.kind,
                origin: r.origin,
                vectors: r.vectors,
            })
        })
        .collect()
}

fn read_sequences(
    reader: &BufferReader<'_>,
    header: &StudioHeader,
    num_bones: usize,
) -> Result<Vec<Sequence>, FormatError> {
    let records: Vec<SequenceRecord> =
        reader.records(header.seq_index, header.num_seq, "sequences")?;

    let mut sequences = Vec::with_capacity(records.len());
    for (index, r) in records.into_iter().enumerate() {
        let events: Vec<EventRecord> = reader.records(r.event_index, r.num_events, "events")?;
        let pivots: Vec<PivotRecord> = reader.records(r.pivot_index, r.num_pivots, "pivots")?;
        let num_blends = checked_count(r.num_blends, "blends")?;

        let blends = if r.seq_group == 0 {
            (0..num_blends)
                .map(|blend| read_blend(reader, &r, index, blend, num_bones))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            log::warn!(
                "Sequence '{}' lives in external group {}; its animation is not loaded",
                r.label,
                r.seq_group
            );
            vec![AnimationBlend::new_static(num_bones); num_blends]
        };

        let mut sequence = Sequence {
            label: r.label,
            fps: r.fps,
            flags: r.flags,
            activity: r.activity,
            activity_weight: r.activity_weight,
            num_frames: r.num_frames,
            events: events
                .into_iter()
                .map(|e| SequenceEvent {
                    frame: e.frame,
                    event: e.event,
                    kind: e.kind,
                    options: e.options,
                })
                .collect(),
            sorted_events: Vec::new(),
            pivots: pivots
                .into_iter()
                .map(|p| Pivot {
                    origin: p.origin,
                    start: p.start,
                    end: p.end,
                })
                .collect(),
            motion_type: r.motion_type,
            motion_bone: r.motion_bone,
            linear_movement: r.linear_movement,
            bbmin: r.bbmin,
            bbmax: r.bbmax,
            blend: [0, 1].map(|axis| BlendAxis {
                kind: r.blend_type[axis],
                start: r.blend_start[axis],
                end: r.blend_end[axis],
            }),
            blend_parent: r.blend_parent,
            blends,
            entry_node: r.entry_node,
            exit_node: r.exit_node,
            node_flags: r.node_flags,
            next_sequence: r.next_seq,
        };
        sequence.sort_events();
        sequences.push(sequence);
    }

    Ok(sequences)
}

/// Reads one blend: `num_bones` offset records followed by their curves.
/// Curve offsets count from the start of the bone's own record.
fn read_blend(
    reader: &BufferReader<'_>,
    sequence: &SequenceRecord,
    sequence_index: usize,
    blend: usize,
    num_bones: usize,
) -> Result<AnimationBlend, FormatError> {
    let base = checked_count(sequence.anim_index, "animation offset")?
        + blend * num_bones * AnimRecord::SIZE;

    let mut bones = Vec::with_capacity(num_bones);
    for bone in 0..num_bones {
        let record_offset = base + bone * AnimRecord::SIZE;
        let record: AnimRecord = reader.record(record_offset, "animation record")?;

        let mut animation = BoneAnimation::default();
        for (axis, &offset) in record.offset.iter().enumerate() {
            if offset == 0 {
                continue;
            }
            animation.data[axis] = read_curve(
                reader,
                record_offset + offset as usize,
                sequence.num_frames,
            )
            .ok_or(FormatError::MalformedAnimation {
                sequence: sequence_index,
                bone,
                axis,
            })?;
        }
        bones.push(animation);
    }

    Ok(AnimationBlend { bones })
}

/// Walks run headers until their totals cover `num_frames` (one run when the
/// sequence has no frames). Returns `None` for truncated or zero-length runs.
fn read_curve(reader: &BufferReader<'_>, start: usize, num_frames: i32) -> Option<Vec<AnimValue>> {
    let mut values = Vec::new();
    let mut offset = start;
    let mut covered = 0i32;

    loop {
        let header = AnimValue(reader.u16_at(offset, "animation value").ok()?);
        values.push(header);
        offset += 2;
        for _ in 0..header.valid() {
            values.push(AnimValue(reader.u16_at(offset, "animation value").ok()?));
            offset += 2;
        }

        covered += i32::from(header.total());
        if num_frames <= 0 || covered >= num_frames {
            break;
        }
        if header.total() == 0 {
            return None;
        }
    }

    Some(values)
}

fn read_sequence_group(
    reader: &BufferReader<'_>,
    header: &StudioHeader,
) -> Result<SequenceGroup, FormatError> {
    if header.num_seq_groups > 1 {
        log::warn!(
            "Dropping {} external sequence groups",
            header.num_seq_groups - 1
        );
    }
    let groups: Vec<SequenceGroupRecord> = reader.records(
        header.seq_group_index,
        header.num_seq_groups.min(1),
        "sequence groups",
    )?;
    Ok(groups
        .into_iter()
        .next()
        .map(|g| SequenceGroup {
            label: g.label,
            name: g.name,
        })
        .unwrap_or_default())
}

fn read_transitions(
    reader: &BufferReader<'_>,
    header: &StudioHeader,
) -> Result<Vec<Vec<u8>>, FormatError> {
    let count = checked_count(header.num_transitions, "transitions")?;
    if count == 0 {
        return Ok(Vec::new());
    }
    let offset = checked_count(header.transition_index, "transition offset")?;
    let table = reader.bytes(offset, count * count, "transitions")?;
    Ok(table.chunks_exact(count).map(<[u8]>::to_vec).collect())
}

fn read_bodyparts(
    reader: &BufferReader<'_>,
    header: &StudioHeader,
    num_bones: usize,
) -> Result<Vec<Bodypart>, FormatError> {
    let records: Vec<BodypartRecord> =
        reader.records(header.bodypart_index, header.num_bodyparts, "bodyparts")?;

    records
        .into_iter()
        .map(|part| -> Result<Bodypart, FormatError> {
            let models: Vec<ModelRecord> =
                reader.records(part.model_index, part.num_models, "models")?;
            Ok(Bodypart {
                name: part.name,
                base: part.base,
                models: models
                    .into_iter()
                    .map(|m| read_model(reader, m, num_bones))
                    .collect::<Result<_, _>>()?,
            })
        })
        .collect()
}

fn read_model(
    reader: &BufferReader<'_>,
    record: ModelRecord,
    num_bones: usize,
) -> Result<SubModel, FormatError> {
    let num_verts = checked_count(record.num_verts, "vertices")?;
    let num_norms = checked_count(record.num_norms, "normals")?;

    let skinned = |info_index: i32,
                   index: i32,
                   count: usize,
                   what: &'static str|
     -> Result<Vec<SkinnedPoint>, FormatError> {
        let bones = reader.bytes(checked_count(info_index, what)?, count, what)?;
        let points = reader.vec3s(index, count, what)?;
        bones
            .iter()
            .zip(points)
            .enumerate()
            .map(|(i, (&bone, position))| {
                Ok(SkinnedPoint {
                    position,
                    bone: bone_ref(what, i, bone.into(), num_bones)?,
                })
            })
            .collect()
    };

    let vertices = skinned(record.vert_info_index, record.vert_index, num_verts, "vertex")?;
    let normals = skinned(record.norm_info_index, record.norm_index, num_norms, "normal")?;

    let meshes: Vec<MeshRecord> = reader.records(record.mesh_index, record.num_mesh, "meshes")?;
    let meshes = meshes
        .into_iter()
        .map(|m| -> Result<Mesh, FormatError> {
            Ok(Mesh {
                skin_ref: m.skin_ref,
                num_triangles: m.num_tris,
                num_normals: m.num_norms,
                commands: read_triangle_commands(reader, m.tri_index)?,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SubModel {
        name: record.name,
        kind: record.kind,
        bounding_radius: record.bounding_radius,
        vertices,
        normals,
        meshes,
    })
}

/// Reads runs of `(vertex, normal, s, t)` until the 0 terminator. A positive
/// length is a strip, a negative one a fan.
fn read_triangle_commands(
    reader: &BufferReader<'_>,
    offset: i32,
) -> Result<Vec<TriangleCommand>, FormatError> {
    const WHAT: &str = "triangle commands";
    let truncated = || FormatError::Truncated {
        what: WHAT,
        offset: offset.max(0) as usize,
    };
    let mut cursor = reader.tail(offset, WHAT)?;
    let mut commands = Vec::new();

    loop {
        let count = cursor.read_i16::<LittleEndian>().map_err(|_| truncated())?;
        if count == 0 {
            break;
        }
        let run = if count > 0 {
            TriangleRun::Strip
        } else {
            TriangleRun::Fan
        };
        let mut vertices = Vec::with_capacity(count.unsigned_abs() as usize);
        for _ in 0..count.unsigned_abs() {
            let mut v = [0i16; 4];
            for c in v.iter_mut() {
                *c = cursor.read_i16::<LittleEndian>().map_err(|_| truncated())?;
            }
            vertices.push(TriangleVertex {
                vertex: v[0],
                normal: v[1],
                s: v[2],
                t: v[3],
            });
        }
        commands.push(TriangleCommand { run, vertices });
    }

    Ok(commands)
}

fn read_textures(
    reader: &BufferReader<'_>,
    header: &StudioHeader,
    container: TextureContainer,
    model: &mut EditableModel,
) -> Result<(), FormatError> {
    let records: Vec<TextureRecord> =
        reader.records(header.texture_index, header.num_textures, "textures")?;
    model.textures = records
        .iter()
        .map(|r| read_texture(reader, r, container))
        .collect::<Result<_, _>>()?;

    let num_refs = checked_count(header.num_skin_ref, "skin references")?;
    let num_families = checked_count(header.num_skin_families, "skin families")?;
    let table = reader.i16s(header.skin_index, num_refs * num_families, "skins")?;

    let num_textures = model.textures.len();
    model.skin_families = table
        .chunks(num_refs.max(1))
        .take(num_families)
        .enumerate()
        .map(|(family, refs)| {
            refs.iter()
                .map(|&t| {
                    usize::try_from(t)
                        .ok()
                        .filter(|&t| t < num_textures)
                        .ok_or(FormatError::InvalidReference {
                            what: "skin family",
                            index: family,
                            target: "texture",
                            value: t.into(),
                        })
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(())
}
