use super::{BONE_AXES, Record, read_name, read_vec3, write_name, write_vec3};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

fn read_i32s<R: Read, const N: usize>(r: &mut R) -> io::Result<[i32; N]> {
    let mut out = [0i32; N];
    for v in out.iter_mut() {
        *v = r.read_i32::<LittleEndian>()?;
    }
    Ok(out)
}

fn read_f32s<R: Read, const N: usize>(r: &mut R) -> io::Result<[f32; N]> {
    let mut out = [0f32; N];
    for v in out.iter_mut() {
        *v = r.read_f32::<LittleEndian>()?;
    }
    Ok(out)
}

fn write_i32s<W: Write>(w: &mut W, values: &[i32]) -> io::Result<()> {
    for v in values {
        w.write_i32::<LittleEndian>(*v)?;
    }
    Ok(())
}

fn write_f32s<W: Write>(w: &mut W, values: &[f32]) -> io::Result<()> {
    for v in values {
        w.write_f32::<LittleEndian>(*v)?;
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoneRecord {
    pub name: String,
    pub parent: i32,
    pub flags: i32,
    pub bone_controller: [i32; BONE_AXES],
    pub value: [f32; BONE_AXES],
    pub scale: [f32; BONE_AXES],
}

impl Record for BoneRecord {
    const SIZE: usize = 112;

    fn read<R: Read>(r: &mut R) -> io::Result<Self> {
        Ok(Self {
            name: read_name::<_, 32>(r)?,
            parent: r.read_i32::<LittleEndian>()?,
            flags: r.read_i32::<LittleEndian>()?,
            bone_controller: read_i32s(r)?,
            value: read_f32s(r)?,
            scale: read_f32s(r)?,
        })
    }

    fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write_name::<_, 32>(w, &self.name)?;
        w.write_i32::<LittleEndian>(self.parent)?;
        w.write_i32::<LittleEndian>(self.flags)?;
        write_i32s(w, &self.bone_controller)?;
        write_f32s(w, &self.value)?;
        write_f32s(w, &self.scale)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoneControllerRecord {
    pub bone: i32,
    pub kind: i32,
    pub start: f32,
    pub end: f32,
    pub rest: i32,
    pub index: i32,
}

impl Record for BoneControllerRecord {
    const SIZE: usize = 24;

    fn read<R: Read>(r: &mut R) -> io::Result<Self> {
        Ok(Self {
            bone: r.read_i32::<LittleEndian>()?,
            kind: r.read_i32::<LittleEndian>()?,
            start: r.read_f32::<LittleEndian>()?,
            end: r.read_f32::<LittleEndian>()?,
            rest: r.read_i32::<LittleEndian>()?,
            index: r.read_i32::<LittleEndian>()?,
        })
    }

    fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_i32::<LittleEndian>(self.bone)?;
        w.write_i32::<LittleEndian>(self.kind)?;
        w.write_f32::<LittleEndian>(self.start)?;
        w.write_f32::<LittleEndian>(self.end)?;
        w.write_i32::<LittleEndian>(self.rest)?;
        w.write_i32::<LittleEndian>(self.index)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HitboxRecord {
    pub bone: i32,
    pub group: i32,
    pub bbmin: [f32; 3],
    pub bbmax: [f32; 3],
}

impl Record for HitboxRecord {
    const SIZE: usize = 32;

    fn read<R: Read>(r: &mut R) -> io::Result<Self> {
        Ok(Self {
            bone: r.read_i32::<LittleEndian>()?,
            group: r.read_i32::<LittleEndian>()?,
            bbmin: read_vec3(r)?,
            bbmax: read_vec3(r)?,
        })
    }

    fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_i32::<LittleEndian>(self.bone)?;
        w.write_i32::<LittleEndian>(self.group)?;
        write_vec3(w, &self.bbmin)?;
        write_vec3(w, &self.bbmax)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SequenceRecord {
    pub label: String,
    pub fps: f32,
    pub flags: i32,
    pub activity: i32,
    pub activity_weight: i32,
    pub num_events: i32,
    pub event_index: i32,
    pub num_frames: i32,
    pub num_pivots: i32,
    pub pivot_index: i32,
    pub motion_type: i32,
    pub motion_bone: i32,
    pub linear_movement: [f32; 3],
    pub automove_pos_index: i32,
    pub automove_angle_index: i32,
    pub bbmin: [f32; 3],
    pub bbmax: [f32; 3],
    pub num_blends: i32,
    pub anim_index: i32,
    pub blend_type: [i32; 2],
    pub blend_start: [f32; 2],
    pub blend_end: [f32; 2],
    pub blend_parent: i32,
    pub seq_group: i32,
    pub entry_node: i32,
    pub exit_node: i32,
    pub node_flags: i32,
    pub next_seq: i32,
}

impl Record for SequenceRecord {
    const SIZE: usize = 176;

    fn read<R: Read>(r: &mut R) -> io::Result<Self> {
        let label = read_name::<_, 32>(r)?;
        let fps = r.read_f32::<LittleEndian>()?;
        let [flags, activity, activity_weight, num_events, event_index, num_frames] =
            read_i32s::<_, 6>(r)?;
        let [num_pivots, pivot_index, motion_type, motion_bone] = read_i32s::<_, 4>(r)?;
        let linear_movement = read_vec3(r)?;
        let [automove_pos_index, automove_angle_index] = read_i32s::<_, 2>(r)?;
        let bbmin = read_vec3(r)?;
        let bbmax = read_vec3(r)?;
        let [num_blends, anim_index] = read_i32s::<_, 2>(r)?;
        let blend_type = read_i32s::<_, 2>(r)?;
        let blend_start = read_f32s::<_, 2>(r)?;
        let blend_end = read_f32s::<_, 2>(r)?;
        let [blend_parent, seq_group, entry_node, exit_node, node_flags, next_seq] =
            read_i32s::<_, 6>(r)?;

        Ok(Self {
            label,
            fps,
            flags,
            activity,
            activity_weight,
            num_events,
            event_index,
            num_frames,
            num_pivots,
            pivot_index,
            motion_type,
            motion_bone,
            linear_movement,
            automove_pos_index,
            automove_angle_index,
            bbmin,
            bbmax,
            num_blends,
            anim_index,
            blend_type,
            blend_start,
            blend_end,
            blend_parent,
            seq_group,
            entry_node,
            exit_node,
            node_flags,
            next_seq,
        })
    }

    fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write_name::<_, 32>(w, &self.label)?;
        w.write_f32::<LittleEndian>(self.fps)?;
        write_i32s(
            w,
            &[
                self.flags,
                self.activity,
                self.activity_weight,
                self.num_events,
                self.event_index,
                self.num_frames,
                self.num_pivots,
                self.pivot_index,
                self.motion_type,
                self.motion_bone,
            ],
        )?;
        write_vec3(w, &self.linear_movement)?;
        write_i32s(w, &[self.automove_pos_index, self.automove_angle_index])?;
        write_vec3(w, &self.bbmin)?;
        write_vec3(w, &self.bbmax)?;
        write_i32s(w, &[self.num_blends, self.anim_index])?;
        write_i32s(w, &self.blend_type)?;
        write_f32s(w, &self.blend_start)?;
        write_f32s(w, &self.blend_end)?;
        write_i32s(
            w,
            &[
                self.blend_parent,
                self.seq_group,
                self.entry_node,
                self.exit_node,
                self.node_flags,
                self.next_seq,
            ],
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SequenceGroupRecord {
    pub label: String,
    pub name: String,
    pub unused1: i32,
    pub unused2: i32,
}

impl Record for SequenceGroupRecord {
    const SIZE: usize = 104;

    fn read<R: Read>(r: &mut R) -> io::Result<Self> {
        Ok(Self {
            label: read_name::<_, 32>(r)?,
            name: read_name::<_, 64>(r)?,
            unused1: r.read_i32::<LittleEndian>()?,
            unused2: r.read_i32::<LittleEndian>()?,
        })
    }

    fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write_name::<_, 32>(w, &self.label)?;
        write_name::<_, 64>(w, &self.name)?;
        w.write_i32::<LittleEndian>(self.unused1)?;
        w.write_i32::<LittleEndian>(self.unused2)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventRecord {
    pub frame: i32,
    pub event: i32,
    pub kind: i32,
    pub options: String,
}

impl Record for EventRecord {
    const SIZE: usize = 76;

    fn read<R: Read>(r: &mut R) -> io::Result<Self> {
        Ok(Self {
            frame: r.read_i32::<LittleEndian>()?,
            event: r.read_i32::<LittleEndian>()?,
            kind: r.read_i32::<LittleEndian>()?,
            options: read_name::<_, 64>(r)?,
        })
    }

    fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_i32::<LittleEndian>(self.frame)?;
        w.write_i32::<LittleEndian>(self.event)?;
        w.write_i32::<LittleEndian>(self.kind)?;
        write_name::<_, 64>(w, &self.options)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PivotRecord {
    pub origin: [f32; 3],
    pub start: i32,
    pub end: i32,
}

impl Record for PivotRecord {
    const SIZE: usize = 20;

    fn read<R: Read>(r: &mut R) -> io::Result<Self> {
        Ok(Self {
            origin: read_vec3(r)?,
            start: r.read_i32::<LittleEndian>()?,
            end: r.read_i32::<LittleEndian>()?,
        })
    }

    fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write_vec3(w, &self.origin)?;
        w.write_i32::<LittleEndian>(self.start)?;
        w.write_i32::<LittleEndian>(self.end)
    }
}

/// Per-bone curve offsets of one animation blend. Each offset is relative to
/// the start of this record; 0 means the axis has no curve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnimRecord {
    pub offset: [u16; BONE_AXES],
}

impl Record for AnimRecord {
    const SIZE: usize = 12;

    fn read<R: Read>(r: &mut R) -> io::Result<Self> {
        let mut offset = [0u16; BONE_AXES];
        for o in offset.iter_mut() {
            *o = r.read_u16::<LittleEndian>()?;
        }
        Ok(Self { offset })
    }

    fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        for o in &self.offset {
            w.write_u16::<LittleEndian>(*o)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttachmentRecord {
    pub name: String,
    pub kind: i32,
    pub bone: i32,
    pub origin: [f32; 3],
    pub vectors: [[f32; 3]; 3],
}

impl Record for AttachmentRecord {
    const SIZE: usize = 88;

    fn read<R: Read>(r: &mut R) -> io::Result<Self> {
        Ok(Self {
            name: read_name::<_, 32>(r)?,
            kind: r.read_i32::<LittleEndian>()?,
            bone: r.read_i32::<LittleEndian>()?,
            origin: read_vec3(r)?,
            vectors: [read_vec3(r)?, read_vec3(r)?, read_vec3(r)?],
        })
    }

    fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write_name::<_, 32>(w, &self.name)?;
        w.write_i32::<LittleEndian>(self.kind)?;
        w.write_i32::<LittleEndian>(self.bone)?;
        write_vec3(w, &self.origin)?;
        for v in &self.vectors {
            write_vec3(w, v)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BodypartRecord {
    pub name: String,
    pub num_models: i32,
    pub base: i32,
    pub model_index: i32,
}

impl Record for BodypartRecord {
    const SIZE: usize = 76;

    fn read<R: Read>(r: &mut R) -> io::Result<Self> {
        Ok(Self {
            name: read_name::<_, 64>(r)?,
            num_models: r.read_i32::<LittleEndian>()?,
            base: r.read_i32::<LittleEndian>()?,
            model_index: r.read_i32::<LittleEndian>()?,
        })
    }

    fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write_name::<_, 64>(w, &self.name)?;
        write_i32s(w, &[self.num_models, self.base, self.model_index])
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelRecord {
    pub name: String,
    pub kind: i32,
    pub bounding_radius: f32,
    pub num_mesh: i32,
    pub mesh_index: i32,
    pub num_verts: i32,
    pub vert_info_index: i32,
    pub vert_index: i32,
    pub num_norms: i32,
    pub norm_info_index: i32,
    pub norm_index: i32,
    pub num_groups: i32,
    pub group_index: i32,
}

impl Record for ModelRecord {
    const SIZE: usize = 112;

    fn read<R: Read>(r: &mut R) -> io::Result<Self> {
        let name = read_name::<_, 64>(r)?;
        let kind = r.read_i32::<LittleEndian>()?;
        let bounding_radius = r.read_f32::<LittleEndian>()?;
        let [
            num_mesh,
            mesh_index,
            num_verts,
            vert_info_index,
            vert_index,
            num_norms,
            norm_info_index,
            norm_index,
            num_groups,
            group_index,
        ] = read_i32s::<_, 10>(r)?;
        Ok(Self {
            name,
            kind,
            bounding_radius,
            num_mesh,
            mesh_index,
            num_verts,
            vert_info_index,
            vert_index,
            num_norms,
            norm_info_index,
            norm_index,
            num_groups,
            group_index,
        })
    }

    fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write_name::<_, 64>(w, &self.name)?;
        w.write_i32::<LittleEndian>(self.kind)?;
        w.write_f32::<LittleEndian>(self.bounding_radius)?;
        write_i32s(
            w,
            &[
                self.num_mesh,
                self.mesh_index,
                self.num_verts,
                self.vert_info_index,
                self.vert_index,
                self.num_norms,
                self.norm_info_index,
                self.norm_index,
                self.num_groups,
                self.group_index,
            ],
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshRecord {
    pub num_tris: i32,
    pub tri_index: i32,
    pub skin_ref: i32,
    pub num_norms: i32,
    pub norm_index: i32,
}

impl Record for MeshRecord {
    const SIZE: usize = 20;

    fn read<R: Read>(r: &mut R) -> io::Result<Self> {
        let [num_tris, tri_index, skin_ref, num_norms, norm_index] = read_i32s::<_, 5>(r)?;
        Ok(Self {
            num_tris,
            tri_index,
            skin_ref,
            num_norms,
            norm_index,
        })
    }

    fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write_i32s(
            w,
            &[
                self.num_tris,
                self.tri_index,
                self.skin_ref,
                self.num_norms,
                self.norm_index,
            ],
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextureRecord {
    pub name: String,
    pub flags: i32,
    pub width: i32,
    pub height: i32,
    pub index: i32,
}

impl Record for TextureRecord {
    const SIZE: usize = 80;

    fn read<R: Read>(r: &mut R) -> io::Result<Self> {
        let name = read_name::<_, 64>(r)?;
        let [flags, width, height, index] = read_i32s::<_, 4>(r)?;
        Ok(Self {
            name,
            flags,
            width,
            height,
            index,
        })
    }

    fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write_name::<_, 64>(w, &self.name)?;
        write_i32s(w, &[self.flags, self.width, self.height, self.index])
    }
}
