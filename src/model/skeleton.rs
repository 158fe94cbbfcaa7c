use crate::format::{BONE_AXES, MOUTH_CONTROLLER, STUDIO_RLOOP, STUDIO_ROTATION_TYPES, STUDIO_TYPES};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bone {
    pub name: String,
    pub parent: Option<usize>, // None means root
    pub flags: i32,
    // Bone controller driving each axis (X, Y, Z, XR, YR, ZR)
    pub controllers: [Option<usize>; BONE_AXES],
    pub value: [f32; BONE_AXES],
    pub scale: [f32; BONE_AXES],
}

impl Default for Bone {
    fn default() -> Self {
        Self {
            name: String::new(),
            parent: None,
            flags: 0,
            controllers: [None; BONE_AXES],
            value: [0.0; BONE_AXES],
            scale: [1.0; BONE_AXES],
        }
    }
}

impl Bone {
    pub fn new(name: impl Into<String>, parent: Option<usize>) -> Self {
        Self {
            name: name.into(),
            parent,
            ..Default::default()
        }
    }

    pub fn position(&self) -> [f32; 3] {
        [self.value[0], self.value[1], self.value[2]]
    }

    pub fn rotation(&self) -> [f32; 3] {
        [self.value[3], self.value[4], self.value[5]]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoneController {
    pub kind: i32, // STUDIO_X .. STUDIO_ZR, optionally | STUDIO_RLOOP
    pub start: f32,
    pub end: f32,
    pub rest: i32,
    pub index: i32, // 0-3, or 4 for the mouth
}

impl Default for BoneController {
    fn default() -> Self {
        Self {
            kind: 0,
            start: 0.0,
            end: 1.0,
            rest: 0,
            index: 0,
        }
    }
}

impl BoneController {
    pub fn is_rotation(&self) -> bool {
        self.kind & STUDIO_ROTATION_TYPES != 0
    }

    pub fn wraps(&self) -> bool {
        self.kind & STUDIO_RLOOP != 0
    }

    pub fn is_mouth(&self) -> bool {
        self.index == MOUTH_CONTROLLER
    }

    /// Bone axis (0..6) this controller drives, if its type names one.
    pub fn axis(&self) -> Option<usize> {
        let kind = self.kind & STUDIO_TYPES;
        (0..BONE_AXES).find(|&axis| kind & (1 << axis) != 0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hitbox {
    pub bone: usize,
    pub group: i32,
    pub min: [f32; 3],
    pub max: [f32; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub kind: i32,
    pub bone: usize,
    pub origin: [f32; 3],
    pub vectors: [[f32; 3]; 3],
}

impl Default for Attachment {
    fn default() -> Self {
        Self {
            name: String::new(),
            kind: 0,
            bone: 0,
            origin: [0.0; 3],
            vectors: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{STUDIO_XR, STUDIO_Y, STUDIO_ZR};

    #[test]
    fn controller_axis_follows_type_bits() {
        let yaw = BoneController {
            kind: STUDIO_ZR | STUDIO_RLOOP,
            ..Default::default()
        };
        assert_eq!(yaw.axis(), Some(5));
        assert!(yaw.is_rotation());
        assert!(yaw.wraps());

        let lift = BoneController {
            kind: STUDIO_Y,
            ..Default::default()
        };
        assert_eq!(lift.axis(), Some(1));
        assert!(!lift.is_rotation());

        let pitch = BoneController {
            kind: STUDIO_XR,
            index: 4,
            ..Default::default()
        };
        assert!(pitch.is_mouth());
    }
}
