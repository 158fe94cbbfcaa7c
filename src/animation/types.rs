// Solver inputs, outputs and scratch space

use crate::format::MAX_BONES;
use nalgebra_glm as glm;

/// World space transform of one bone: rotation then translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneTransform {
    pub rotation: glm::Mat3,
    pub position: glm::Vec3,
}

impl Default for BoneTransform {
    fn default() -> Self {
        Self {
            rotation: glm::identity(),
            position: glm::vec3(0.0, 0.0, 0.0),
        }
    }
}

impl BoneTransform {
    pub fn transform_point(&self, point: &glm::Vec3) -> glm::Vec3 {
        self.rotation * point + self.position
    }

    /// Inverse of the rotation part with the translation zeroed. Used to
    /// bring world space light and view vectors into bone space.
    pub fn inverse_rotation(&self) -> Self {
        Self {
            rotation: self.rotation.transpose(),
            position: glm::vec3(0.0, 0.0, 0.0),
        }
    }
}

/// Everything the solver needs besides the model.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PoseInput {
    pub sequence: Option<usize>,
    pub frame: f32,
    pub blending: [u8; 2],
    pub controllers: [u8; 4],
    pub mouth: u8,
}

/// Number of per-bone buffers; enough for a 2x2 cell of a blend grid.
pub(crate) const SCRATCH_SLOTS: usize = 4;

/// Working buffers for the solver, sized for the largest skeleton the format
/// allows. Reuse one across calls to avoid per-frame allocation.
#[derive(Debug, Clone)]
pub struct PoseScratch {
    pub(crate) quaternions: [Vec<glm::Quat>; SCRATCH_SLOTS],
    pub(crate) positions: [Vec<glm::Vec3>; SCRATCH_SLOTS],
    pub(crate) ready: Vec<bool>,
}

impl Default for PoseScratch {
    fn default() -> Self {
        Self::with_capacity(MAX_BONES)
    }
}

impl PoseScratch {
    pub fn with_capacity(bones: usize) -> Self {
        Self {
            quaternions: std::array::from_fn(|_| vec![glm::quat_identity(); bones]),
            positions: std::array::from_fn(|_| vec![glm::vec3(0.0, 0.0, 0.0); bones]),
            ready: vec![false; bones],
        }
    }

    /// Grows the buffers for skeletons past the format maximum.
    pub(crate) fn ensure(&mut self, bones: usize) {
        if self.ready.len() >= bones {
            return;
        }
        for q in &mut self.quaternions {
            q.resize(bones, glm::quat_identity());
        }
        for p in &mut self.positions {
            p.resize(bones, glm::vec3(0.0, 0.0, 0.0));
        }
        self.ready.resize(bones, false);
    }
}

/// Solver output, one entry per bone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pose {
    pub bones: Vec<BoneTransform>,
    pub inverse_rotations: Vec<BoneTransform>,
}
