// Skeletal animation: pose solving and per-instance playback

pub mod blend;
pub mod controller;
pub mod curve;
pub mod entity;
pub mod interpolation;
pub mod skeleton;
pub mod types;

pub use blend::BlendMode;
pub use controller::{encode_blend, encode_controller, encode_mouth};
pub use entity::{Clock, LoopingMode, ManualClock, StudioEntity, SystemClock};
pub use interpolation::{angle_quaternion, quaternion_matrix, quaternion_slerp};
pub use skeleton::{bone_adjustments, nine_way_cell, setup_bones};
pub use types::{BoneTransform, Pose, PoseInput, PoseScratch};
