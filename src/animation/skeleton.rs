// Skeleton pose solving: curves, controllers, blends and hierarchy

use super::curve::{sample_pair, sample_position};
use super::interpolation::{angle_quaternion, lerp_vec3, quaternion_matrix, quaternion_slerp};
use super::types::{BoneTransform, Pose, PoseInput, PoseScratch};
use crate::format::{MAX_BONE_CONTROLLERS, STUDIO_X, STUDIO_Y, STUDIO_Z};
use crate::model::{Bone, BoneAnimation, EditableModel, Sequence};
use nalgebra_glm as glm;

/// Controller adjustments indexed by bone controller.
pub type BoneAdjustments = [f32; MAX_BONE_CONTROLLERS];

/// Converts controller and mouth bytes into per-controller offsets.
/// Rotational controllers yield radians.
pub fn bone_adjustments(model: &EditableModel, controllers: &[u8; 4], mouth: u8) -> BoneAdjustments {
    let mut adj = [0.0; MAX_BONE_CONTROLLERS];

    for (j, controller) in model.bone_controllers.iter().take(MAX_BONE_CONTROLLERS).enumerate() {
        let value = match usize::try_from(controller.index) {
            Ok(slot) if slot <= 3 => {
                let byte = f32::from(controllers[slot]);
                if controller.wraps() {
                    byte * (360.0 / 256.0) + controller.start
                } else {
                    let t = (byte / 255.0).clamp(0.0, 1.0);
                    (1.0 - t) * controller.start + t * controller.end
                }
            }
            _ => {
                let t = (f32::from(mouth) / 64.0).min(1.0);
                (1.0 - t) * controller.start + t * controller.end
            }
        };

        adj[j] = if controller.is_rotation() {
            value.to_radians()
        } else {
            value
        };
    }

    adj
}

fn adjustment(bone: &Bone, axis: usize, adj: &BoneAdjustments) -> f32 {
    bone.controllers[axis]
        .and_then(|c| adj.get(c))
        .copied()
        .unwrap_or(0.0)
}

/// Local rotation of a bone at `frame + s`.
pub fn bone_quaternion(
    frame: usize,
    s: f32,
    bone: &Bone,
    animation: Option<&BoneAnimation>,
    adj: &BoneAdjustments,
) -> glm::Quat {
    let mut first = glm::vec3(0.0, 0.0, 0.0);
    let mut second = glm::vec3(0.0, 0.0, 0.0);

    for j in 0..3 {
        let axis = j + 3;
        let curve = animation.map_or(&[][..], |a| a.data[axis].as_slice());
        let (a, b) = match sample_pair(curve, frame) {
            Some((a, b)) => (
                bone.value[axis] + a * bone.scale[axis],
                bone.value[axis] + b * bone.scale[axis],
            ),
            None => (bone.value[axis], bone.value[axis]),
        };
        let offset = adjustment(bone, axis, adj);
        first[j] = a + offset;
        second[j] = b + offset;
    }

    if first == second {
        angle_quaternion(&first)
    } else {
        quaternion_slerp(&angle_quaternion(&first), &angle_quaternion(&second), s)
    }
}

/// Local position of a bone at `frame + s`.
pub fn bone_position(
    frame: usize,
    s: f32,
    bone: &Bone,
    animation: Option<&BoneAnimation>,
    adj: &BoneAdjustments,
) -> glm::Vec3 {
    let mut position = glm::vec3(0.0, 0.0, 0.0);
    for axis in 0..3 {
        let curve = animation.map_or(&[][..], |a| a.data[axis].as_slice());
        position[axis] = bone.value[axis]
            + sample_position(curve, frame, s).map_or(0.0, |v| v * bone.scale[axis])
            + adjustment(bone, axis, adj);
    }
    position
}

/// Samples one blend of a sequence into scratch slot `slot`.
fn calc_rotations(
    model: &EditableModel,
    sequence: &Sequence,
    blend: usize,
    frame: usize,
    s: f32,
    adj: &BoneAdjustments,
    scratch: &mut PoseScratch,
    slot: usize,
) {
    let animation = sequence.blends.get(blend);
    for (i, bone) in model.bones.iter().enumerate() {
        let bone_animation = animation.and_then(|a| a.bones.get(i));
        scratch.quaternions[slot][i] = bone_quaternion(frame, s, bone, bone_animation, adj);
        scratch.positions[slot][i] = bone_position(frame, s, bone, bone_animation, adj);
    }

    // Motion extraction removes the root's travel along the flagged axes
    if let Ok(motion_bone) = usize::try_from(sequence.motion_bone) {
        if motion_bone < model.bones.len() {
            for (axis, flag) in [STUDIO_X, STUDIO_Y, STUDIO_Z].into_iter().enumerate() {
                if sequence.motion_type & flag != 0 {
                    scratch.positions[slot][motion_bone][axis] = 0.0;
                }
            }
        }
    }
}

/// Blends slot `from` into slot `into` by `s`, clamped to [0, 1].
fn slerp_bones(scratch: &mut PoseScratch, into: usize, from: usize, s: f32, num_bones: usize) {
    let s = s.clamp(0.0, 1.0);
    for i in 0..num_bones {
        let q = quaternion_slerp(&scratch.quaternions[into][i], &scratch.quaternions[from][i], s);
        scratch.quaternions[into][i] = q;
        let p = lerp_vec3(&scratch.positions[into][i], &scratch.positions[from][i], s);
        scratch.positions[into][i] = p;
    }
}

/// Picks the 2x2 cell of a 3x3 blend grid for the given blend bytes.
/// Returns the four blend indices (low/high column of the low row, then of
/// the high row) and the interpolation factors along each axis.
pub fn nine_way_cell(blending: [u8; 2]) -> ([usize; 4], f32, f32) {
    let axis = |byte: u8| {
        let byte = f32::from(byte);
        if byte <= 127.0 {
            (0, (2.0 * byte / 255.0).clamp(0.0, 1.0))
        } else {
            (1, (2.0 * (byte - 127.0) / 255.0).clamp(0.0, 1.0))
        }
    };
    let (col, s0) = axis(blending[0]);
    let (row, s1) = axis(blending[1]);
    let base = row * 3 + col;
    ([base, base + 1, base + 3, base + 4], s0, s1)
}

/// Computes the world transform of every bone for the given input. Without a
/// valid sequence the skeleton is posed from the bones' static values.
pub fn setup_bones(
    model: &EditableModel,
    input: &PoseInput,
    scratch: &mut PoseScratch,
    pose: &mut Pose,
) {
    let num_bones = model.bones.len();
    scratch.ensure(num_bones);

    let sequence = input
        .sequence
        .and_then(|i| model.sequence(i))
        .filter(|s| !s.blends.is_empty());

    match sequence {
        Some(sequence) => animate(model, sequence, input, scratch),
        None => {
            for (i, bone) in model.bones.iter().enumerate() {
                scratch.quaternions[0][i] = angle_quaternion(&glm::make_vec3(&bone.rotation()));
                scratch.positions[0][i] = glm::make_vec3(&bone.position());
            }
        }
    }

    pose.bones.clear();
    pose.bones.resize(num_bones, BoneTransform::default());
    scratch.ready[..num_bones].fill(false);
    for i in 0..num_bones {
        calc_bone(model, i, scratch, &mut pose.bones, 0);
    }

    pose.inverse_rotations.clear();
    pose.inverse_rotations
        .extend(pose.bones.iter().map(BoneTransform::inverse_rotation));
}

fn animate(model: &EditableModel, sequence: &Sequence, input: &PoseInput, scratch: &mut PoseScratch) {
    let num_bones = model.bones.len();
    let last_frame = sequence.num_frames.saturating_sub(1).max(0) as f32;
    let frame = input.frame.clamp(0.0, last_frame);
    let whole = frame.floor();
    let s = frame - whole;
    let frame = whole as usize;

    let adj = bone_adjustments(model, &input.controllers, input.mouth);
    let blend0 = f32::from(input.blending[0]) / 255.0;
    let blend1 = f32::from(input.blending[1]) / 255.0;

    match sequence.blends.len() {
        9 => {
            let (cells, s0, s1) = nine_way_cell(input.blending);
            for (slot, &blend) in cells.iter().enumerate() {
                calc_rotations(model, sequence, blend, frame, s, &adj, scratch, slot);
            }
            slerp_bones(scratch, 0, 1, s0, num_bones);
            slerp_bones(scratch, 2, 3, s0, num_bones);
            slerp_bones(scratch, 0, 2, s1, num_bones);
        }
        4 => {
            for slot in 0..4 {
                calc_rotations(model, sequence, slot, frame, s, &adj, scratch, slot);
            }
            slerp_bones(scratch, 0, 1, blend0, num_bones);
            slerp_bones(scratch, 2, 3, blend0, num_bones);
            slerp_bones(scratch, 0, 2, blend1, num_bones);
        }
        1 => calc_rotations(model, sequence, 0, frame, s, &adj, scratch, 0),
        _ => {
            calc_rotations(model, sequence, 0, frame, s, &adj, scratch, 0);
            calc_rotations(model, sequence, 1, frame, s, &adj, scratch, 1);
            slerp_bones(scratch, 0, 1, blend0, num_bones);
        }
    }
}

/// Resolves a bone's world transform, resolving its parent chain first.
/// Parents may be stored after their children.
fn calc_bone(
    model: &EditableModel,
    index: usize,
    scratch: &mut PoseScratch,
    out: &mut [BoneTransform],
    depth: usize,
) {
    if scratch.ready[index] {
        return;
    }

    let local = BoneTransform {
        rotation: quaternion_matrix(&scratch.quaternions[0][index]),
        position: scratch.positions[0][index],
    };

    // A broken chain is treated as a root rather than recursing forever
    let parent = model.bones[index]
        .parent
        .filter(|&p| p < model.bones.len() && p != index && depth < model.bones.len());

    out[index] = match parent {
        None => local,
        Some(parent) => {
            calc_bone(model, parent, scratch, out, depth + 1);
            let parent = out[parent];
            BoneTransform {
                rotation: parent.rotation * local.rotation,
                position: parent.rotation * local.position + parent.position,
            }
        }
    };
    scratch.ready[index] = true;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{STUDIO_RLOOP, STUDIO_ZR};
    use crate::model::BoneController;

    #[test]
    fn nine_way_quadrants() {
        assert_eq!(nine_way_cell([0, 0]).0, [0, 1, 3, 4]);
        assert_eq!(nine_way_cell([127, 127]).0, [0, 1, 3, 4]);
        assert_eq!(nine_way_cell([200, 64]).0, [1, 2, 4, 5]);
        assert_eq!(nine_way_cell([64, 200]).0, [3, 4, 6, 7]);
        assert_eq!(nine_way_cell([255, 255]).0, [4, 5, 7, 8]);

        let (_, s0, s1) = nine_way_cell([0, 255]);
        assert_eq!(s0, 0.0);
        assert_eq!(s1, 1.0);
    }

    #[test]
    fn controller_bytes_map_to_ranges() {
        let model = EditableModel {
            bone_controllers: vec![
                BoneController {
                    kind: STUDIO_X,
                    start: -10.0,
                    end: 10.0,
                    index: 0,
                    ..Default::default()
                },
                BoneController {
                    kind: STUDIO_ZR | STUDIO_RLOOP,
                    start: 0.0,
                    end: 360.0,
                    index: 1,
                    ..Default::default()
                },
                BoneController {
                    kind: STUDIO_X,
                    start: 0.0,
                    end: 2.0,
                    index: 4,
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        let adj = bone_adjustments(&model, &[255, 64, 0, 0], 32);
        assert_eq!(adj[0], 10.0);
        assert!((adj[1] - 90f32.to_radians()).abs() < 1e-6);
        assert_eq!(adj[2], 1.0);

        let adj = bone_adjustments(&model, &[0, 0, 0, 0], 200);
        assert_eq!(adj[0], -10.0);
        assert_eq!(adj[2], 2.0);
    }

    #[test]
    fn child_stored_before_parent_still_composes() {
        let mut child = Bone::new("child", Some(1));
        child.value[0] = 1.0;
        let mut root = Bone::new("root", None);
        root.value[2] = 5.0;
        root.value[5] = std::f32::consts::FRAC_PI_2;

        let model = EditableModel {
            bones: vec![child, root],
            ..Default::default()
        };

        let mut scratch = PoseScratch::default();
        let mut pose = Pose::default();
        setup_bones(&model, &PoseInput::default(), &mut scratch, &mut pose);

        let child = pose.bones[0].position;
        assert!((child - glm::vec3(0.0, 1.0, 5.0)).norm() < 1e-5);
        assert!(pose.inverse_rotations[0].position.norm() == 0.0);
    }
}
