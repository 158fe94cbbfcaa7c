mod common;

use common::{approx, bind_pose_model, fixture_model};
use nalgebra_glm as glm;
use std::f32::consts::FRAC_PI_2;
use studiovis::{EditableModel, TextureContainer, convert_from_editable, convert_to_editable};
use studiovis::animation::{Pose, PoseInput, PoseScratch, setup_bones};
use studiovis::format::{AnimValue, STUDIO_X};
use studiovis::model::{AnimationBlend, Bone, BoneAnimation, Sequence};

fn solve(model: &EditableModel, input: PoseInput) -> Pose {
    let mut scratch = PoseScratch::default();
    let mut pose = Pose::default();
    setup_bones(model, &input, &mut scratch, &mut pose);
    pose
}

fn assert_vec(actual: &glm::Vec3, expected: [f32; 3]) {
    for axis in 0..3 {
        approx(actual[axis], expected[axis], 1e-4);
    }
}

fn root_x_sequence(values: &[i16]) -> Sequence {
    let blends = values
        .iter()
        .map(|&x| {
            let mut root = BoneAnimation::default();
            root.data[0] = vec![AnimValue::header(1, 1), AnimValue::literal(x)];
            AnimationBlend {
                bones: vec![root, BoneAnimation::default()],
            }
        })
        .collect();
    Sequence {
        label: "slide".into(),
        num_frames: 1,
        blends,
        ..Default::default()
    }
}

#[test]
fn static_pose_composes_parent_rotation() {
    let mut model = fixture_model();
    model.bones[0].value[5] = FRAC_PI_2;

    let pose = solve(&model, PoseInput::default());
    assert_eq!(pose.bones.len(), 2);
    assert_vec(&pose.bones[0].position, [0.0, 0.0, 10.0]);
    assert_vec(&pose.bones[1].position, [0.0, 5.0, 10.0]);
}

#[test]
fn decoded_single_frame_sequence_poses_the_bind_pose() {
    let bytes = convert_from_editable(&bind_pose_model()).unwrap();
    let model = convert_to_editable(&bytes, None, TextureContainer::Mdl).unwrap();
    assert_eq!(model.sequences[0].num_frames, 1);

    let pose = solve(
        &model,
        PoseInput {
            sequence: Some(0),
            frame: 0.0,
            ..Default::default()
        },
    );
    assert_eq!(pose.bones.len(), 2);
    assert_vec(&pose.bones[0].position, [0.0, 0.0, 10.0]);
    assert_vec(&pose.bones[1].position, [0.0, 5.0, 10.0]);

    // Quarter yaw takes +X to +Y
    let x_axis = pose.bones[0].rotation * glm::vec3(1.0, 0.0, 0.0);
    assert_vec(&x_axis, [0.0, 1.0, 0.0]);
    let child_x = pose.bones[1].rotation * glm::vec3(1.0, 0.0, 0.0);
    assert_vec(&child_x, [0.0, 1.0, 0.0]);
}

#[test]
fn animated_yaw_follows_the_curve() {
    let model = fixture_model();
    let input = PoseInput {
        sequence: Some(0),
        frame: 1.0,
        ..Default::default()
    };

    let pose = solve(&model, input);
    assert_vec(&pose.bones[1].position, [5.0 * 1f32.cos(), 5.0 * 1f32.sin(), 10.0]);

    let pose = solve(&model, PoseInput { frame: 0.5, ..input });
    assert_vec(&pose.bones[1].position, [5.0 * 0.5f32.cos(), 5.0 * 0.5f32.sin(), 10.0]);
}

#[test]
fn frames_past_the_end_hold_the_last_frame() {
    let model = fixture_model();
    let input = PoseInput {
        sequence: Some(0),
        frame: 9.0,
        ..Default::default()
    };
    let last = solve(&model, input);
    let past = solve(&model, PoseInput { frame: 42.0, ..input });
    assert_vec(&past.bones[1].position, {
        let p = last.bones[1].position;
        [p.x, p.y, p.z]
    });
    // Frame 9 holds the raw value 200
    assert_vec(&last.bones[1].position, [5.0 * 2f32.cos(), 5.0 * 2f32.sin(), 10.0]);
}

#[test]
fn controllers_and_mouth_offset_their_bones() {
    let model = fixture_model();
    let pose = solve(
        &model,
        PoseInput {
            sequence: Some(0),
            controllers: [64, 0, 0, 0],
            mouth: 64,
            ..Default::default()
        },
    );

    // 64 / 256 of a full turn, and a fully open mouth pushes the child 2 out
    assert_vec(&pose.bones[1].position, [0.0, 7.0, 10.0]);
}

#[test]
fn nine_way_blends_interpolate_within_the_cell() {
    let model = fixture_model();
    let root_x = |blending: [u8; 2]| {
        solve(
            &model,
            PoseInput {
                sequence: Some(1),
                blending,
                ..Default::default()
            },
        )
        .bones[0]
            .position
            .x
    };

    approx(root_x([0, 0]), 0.0, 1e-4);
    approx(root_x([255, 255]), 80.0, 1e-3);

    let low = 128.0 / 255.0;
    let high = 146.0 / 255.0;
    approx(root_x([64, 200]), 30.0 + 10.0 * low + 30.0 * high, 1e-3);
    approx(root_x([200, 64]), 10.0 + 10.0 * high + 30.0 * low, 1e-3);
}

#[test]
fn two_blend_sequences_use_the_first_blender() {
    let mut model = fixture_model();
    model.sequences = vec![root_x_sequence(&[0, 100])];

    let pose = solve(
        &model,
        PoseInput {
            sequence: Some(0),
            blending: [128, 255],
            ..Default::default()
        },
    );
    approx(pose.bones[0].position.x, 100.0 * 128.0 / 255.0, 1e-3);
}

#[test]
fn motion_axes_are_zeroed_on_the_motion_bone() {
    let mut model = fixture_model();
    let mut sequence = root_x_sequence(&[25]);
    model.sequences = vec![sequence.clone()];

    let input = PoseInput {
        sequence: Some(0),
        ..Default::default()
    };
    approx(solve(&model, input).bones[0].position.x, 25.0, 1e-5);

    sequence.motion_type = STUDIO_X;
    sequence.motion_bone = 0;
    model.sequences = vec![sequence];
    let pose = solve(&model, input);
    assert_vec(&pose.bones[0].position, [0.0, 0.0, 10.0]);
}

#[test]
fn missing_sequence_falls_back_to_static_values() {
    let model = fixture_model();
    let pose = solve(
        &model,
        PoseInput {
            sequence: Some(99),
            controllers: [64, 0, 0, 0],
            mouth: 64,
            ..Default::default()
        },
    );
    assert_vec(&pose.bones[0].position, [0.0, 0.0, 10.0]);
    assert_vec(&pose.bones[1].position, [5.0, 0.0, 10.0]);
}

#[test]
fn inverse_rotations_undo_bone_rotations() {
    let model = fixture_model();
    let pose = solve(
        &model,
        PoseInput {
            sequence: Some(0),
            frame: 3.25,
            controllers: [17, 0, 0, 0],
            ..Default::default()
        },
    );

    assert_eq!(pose.inverse_rotations.len(), pose.bones.len());
    for (bone, inverse) in pose.bones.iter().zip(&pose.inverse_rotations) {
        let product = inverse.rotation * bone.rotation;
        let identity: glm::Mat3 = glm::identity();
        assert!((product - identity).norm() < 1e-5);
        assert_eq!(inverse.position, glm::vec3(0.0, 0.0, 0.0));
    }
}

#[test]
fn cyclic_parents_do_not_hang_the_solver() {
    let model = EditableModel {
        bones: vec![Bone::new("a", Some(1)), Bone::new("b", Some(0))],
        ..Default::default()
    };
    let pose = solve(&model, PoseInput::default());
    assert_eq!(pose.bones.len(), 2);
    assert!(pose.bones.iter().all(|b| b.position.iter().all(|c| c.is_finite())));
}

#[test]
fn scratch_is_reusable_across_models() {
    let mut scratch = PoseScratch::with_capacity(1);
    let mut pose = Pose::default();

    let model = fixture_model();
    setup_bones(&model, &PoseInput::default(), &mut scratch, &mut pose);
    assert_eq!(pose.bones.len(), 2);

    let single = EditableModel {
        bones: vec![Bone::new("only", None)],
        ..Default::default()
    };
    setup_bones(&single, &PoseInput::default(), &mut scratch, &mut pose);
    assert_eq!(pose.bones.len(), 1);
}
