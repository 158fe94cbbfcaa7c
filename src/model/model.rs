use crate::model::animation::{Sequence, SequenceGroup};
use crate::model::bodypart::Bodypart;
use crate::model::skeleton::{Attachment, Bone, BoneController, Hitbox};
use crate::model::texture::Texture;
use serde::{Deserialize, Serialize};

/// Owned, pointer free representation of a studio model. Every cross
/// reference is an index into one of the vectors below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditableModel {
    pub name: String,
    pub eye_position: [f32; 3],
    pub min: [f32; 3],
    pub max: [f32; 3],
    pub bbmin: [f32; 3],
    pub bbmax: [f32; 3],
    pub flags: i32,

    pub bones: Vec<Bone>,
    pub bone_controllers: Vec<BoneController>,
    pub hitboxes: Vec<Hitbox>,
    pub attachments: Vec<Attachment>,

    pub sequences: Vec<Sequence>,
    pub sequence_group: SequenceGroup,
    pub transitions: Vec<Vec<u8>>, // square node table

    pub bodyparts: Vec<Bodypart>,

    pub textures: Vec<Texture>,
    pub skin_families: Vec<Vec<usize>>, // texture index per skin reference
}

impl EditableModel {
    pub fn bone(&self, index: usize) -> Option<&Bone> {
        self.bones.get(index)
    }

    pub fn parent_of(&self, index: usize) -> Option<&Bone> {
        self.bone(index)?.parent.and_then(|p| self.bone(p))
    }

    pub fn find_bone(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|b| b.name == name)
    }

    pub fn sequence(&self, index: usize) -> Option<&Sequence> {
        self.sequences.get(index)
    }

    pub fn texture(&self, index: usize) -> Option<&Texture> {
        self.textures.get(index)
    }

    pub fn num_skin_refs(&self) -> usize {
        self.skin_families.first().map_or(0, Vec::len)
    }

    /// First controller exposed through the given slot (0-3, 4 = mouth).
    pub fn controller_for_slot(&self, slot: i32) -> Option<(usize, &BoneController)> {
        self.bone_controllers
            .iter()
            .enumerate()
            .find(|(_, c)| c.index == slot)
    }

    /// Bone owning a controller: the first bone, in index order, with an
    /// axis driven by it.
    pub fn controller_bone(&self, controller: usize) -> Option<usize> {
        self.bones
            .iter()
            .position(|b| b.controllers.iter().any(|c| *c == Some(controller)))
    }

    /// Checks that every bone's parent chain ends at a root without running
    /// out of bounds or looping.
    pub fn hierarchy_is_valid(&self) -> bool {
        let count = self.bones.len();
        (0..count).all(|start| {
            let mut current = start;
            for _ in 0..=count {
                match self.bones[current].parent {
                    None => return true,
                    Some(p) if p < count => current = p,
                    Some(_) => return false,
                }
            }
            false
        })
    }
}
