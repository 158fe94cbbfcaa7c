use super::{Record, read_name, read_vec3, write_name, write_vec3};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

/// File header shared by main and texture files.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudioHeader {
    pub id: [u8; 4],
    pub version: i32,
    pub name: String,
    pub length: i32,

    pub eye_position: [f32; 3],
    pub min: [f32; 3],
    pub max: [f32; 3],
    pub bbmin: [f32; 3],
    pub bbmax: [f32; 3],

    pub flags: i32,

    pub num_bones: i32,
    pub bone_index: i32,

    pub num_bone_controllers: i32,
    pub bone_controller_index: i32,

    pub num_hitboxes: i32,
    pub hitbox_index: i32,

    pub num_seq: i32,
    pub seq_index: i32,

    pub num_seq_groups: i32,
    pub seq_group_index: i32,

    pub num_textures: i32,
    pub texture_index: i32,
    pub texture_data_index: i32,

    pub num_skin_ref: i32,
    pub num_skin_families: i32,
    pub skin_index: i32,

    pub num_bodyparts: i32,
    pub bodypart_index: i32,

    pub num_attachments: i32,
    pub attachment_index: i32,

    pub sound_table: i32,
    pub sound_index: i32,
    pub sound_groups: i32,
    pub sound_group_index: i32,

    pub num_transitions: i32,
    pub transition_index: i32,
}

impl Record for StudioHeader {
    const SIZE: usize = 244;

    fn read<R: Read>(r: &mut R) -> io::Result<Self> {
        let mut id = [0u8; 4];
        r.read_exact(&mut id)?;
        let version = r.read_i32::<LittleEndian>()?;
        let name = read_name::<_, 64>(r)?;
        let length = r.read_i32::<LittleEndian>()?;

        let eye_position = read_vec3(r)?;
        let min = read_vec3(r)?;
        let max = read_vec3(r)?;
        let bbmin = read_vec3(r)?;
        let bbmax = read_vec3(r)?;

        let mut ints = [0i32; 27];
        for v in ints.iter_mut() {
            *v = r.read_i32::<LittleEndian>()?;
        }

        Ok(Self {
            id,
            version,
            name,
            length,
            eye_position,
            min,
            max,
            bbmin,
            bbmax,
            flags: ints[0],
            num_bones: ints[1],
            bone_index: ints[2],
            num_bone_controllers: ints[3],
            bone_controller_index: ints[4],
            num_hitboxes: ints[5],
            hitbox_index: ints[6],
            num_seq: ints[7],
            seq_index: ints[8],
            num_seq_groups: ints[9],
            seq_group_index: ints[10],
            num_textures: ints[11],
            texture_index: ints[12],
            texture_data_index: ints[13],
            num_skin_ref: ints[14],
            num_skin_families: ints[15],
            skin_index: ints[16],
            num_bodyparts: ints[17],
            bodypart_index: ints[18],
            num_attachments: ints[19],
            attachment_index: ints[20],
            sound_table: ints[21],
            sound_index: ints[22],
            sound_groups: ints[23],
            sound_group_index: ints[24],
            num_transitions: ints[25],
            transition_index: ints[26],
        })
    }

    fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.id)?;
        w.write_i32::<LittleEndian>(self.version)?;
        write_name::<_, 64>(w, &self.name)?;
        w.write_i32::<LittleEndian>(self.length)?;

        write_vec3(w, &self.eye_position)?;
        write_vec3(w, &self.min)?;
        write_vec3(w, &self.max)?;
        write_vec3(w, &self.bbmin)?;
        write_vec3(w, &self.bbmax)?;

        for v in [
            self.flags,
            self.num_bones,
            self.bone_index,
            self.num_bone_controllers,
            self.bone_controller_index,
            self.num_hitboxes,
            self.hitbox_index,
            self.num_seq,
            self.seq_index,
            self.num_seq_groups,
            self.seq_group_index,
            self.num_textures,
            self.texture_index,
            self.texture_data_index,
            self.num_skin_ref,
            self.num_skin_families,
            self.skin_index,
            self.num_bodyparts,
            self.bodypart_index,
            self.num_attachments,
            self.attachment_index,
            self.sound_table,
            self.sound_index,
            self.sound_groups,
            self.sound_group_index,
            self.num_transitions,
            self.transition_index,
        ] {
            w.write_i32::<LittleEndian>(v)?;
        }
        Ok(())
    }
}
