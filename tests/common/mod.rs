#![allow(dead_code)]

use studiovis::EditableModel;
use studiovis::format::{AnimValue, STUDIO_LOOPING, STUDIO_RLOOP, STUDIO_X, STUDIO_ZR};
use studiovis::model::{
    AnimationBlend, Attachment, Bodypart, Bone, BoneAnimation, BoneController, Hitbox, Mesh,
    Sequence, SequenceEvent, SkinnedPoint, SubModel, Texture, TriangleCommand, TriangleRun,
    TriangleVertex,
};

pub fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

pub fn event(frame: i32, id: i32, options: &str) -> SequenceEvent {
    SequenceEvent {
        frame,
        event: id,
        kind: 0,
        options: options.to_string(),
    }
}

/// Root at (0, 0, 10) driven in yaw by controller slot 0, child 5 units out
/// along the root's X axis.
pub fn two_bones() -> Vec<Bone> {
    let mut root = Bone::new("root", None);
    root.value[2] = 10.0;
    root.scale[5] = 0.01;
    root.controllers[5] = Some(0);

    let mut child = Bone::new("child", Some(0));
    child.value[0] = 5.0;
    child.controllers[0] = Some(1);

    vec![root, child]
}

/// Yaw curve on the root: 0, 100, 200 raw, held to frame 9.
pub fn yaw_curve() -> Vec<AnimValue> {
    vec![
        AnimValue::header(3, 10),
        AnimValue::literal(0),
        AnimValue::literal(100),
        AnimValue::literal(200),
    ]
}

pub fn idle_sequence() -> Sequence {
    let mut root = BoneAnimation::default();
    root.data[5] = yaw_curve();

    let mut sequence = Sequence {
        label: "idle".into(),
        fps: 30.0,
        flags: STUDIO_LOOPING,
        num_frames: 10,
        events: vec![event(5, 1004, "step"), event(2, 5001, "muzzle")],
        blends: vec![AnimationBlend {
            bones: vec![root, BoneAnimation::default()],
        }],
        ..Default::default()
    };
    sequence.sort_events();
    sequence
}

/// Nine blends over a one frame sequence; blend `b` puts the root at
/// x = 10 * b.
pub fn aim_sequence() -> Sequence {
    let blends = (0..9)
        .map(|b| {
            let mut root = BoneAnimation::default();
            root.data[0] = vec![AnimValue::header(1, 1), AnimValue::literal(b * 10)];
            AnimationBlend {
                bones: vec![root, BoneAnimation::default()],
            }
        })
        .collect();

    Sequence {
        label: "aim".into(),
        num_frames: 1,
        blends,
        ..Default::default()
    }
}

/// Two bones with the root turned a quarter yaw, no controllers, and one
/// single frame sequence that carries no curves.
pub fn bind_pose_model() -> EditableModel {
    let mut bones = two_bones();
    for bone in &mut bones {
        bone.controllers = [None; 6];
    }
    bones[0].value[5] = std::f32::consts::FRAC_PI_2;

    EditableModel {
        name: "bind.mdl".into(),
        bones,
        sequences: vec![Sequence {
            label: "ref".into(),
            fps: 30.0,
            num_frames: 1,
            blends: vec![AnimationBlend::new_static(2)],
            ..Default::default()
        }],
        ..Default::default()
    }
}

pub fn texture(name: &str, fill: u8) -> Texture {
    let mut palette = vec![[0u8; 3]; 256];
    palette[fill as usize] = [fill, 255 - fill, 7];
    Texture {
        name: name.into(),
        flags: 0,
        width: 4,
        height: 2,
        pixels: vec![fill; 8],
        palette,
    }
}

pub fn body() -> Bodypart {
    let tv = |vertex: i16, s: i16| TriangleVertex {
        vertex,
        normal: vertex,
        s,
        t: -s,
    };
    let head = SubModel {
        name: "head".into(),
        bounding_radius: 3.5,
        vertices: vec![
            SkinnedPoint {
                position: [0.0, 0.0, 0.0],
                bone: 0,
            },
            SkinnedPoint {
                position: [1.0, 0.0, 0.0],
                bone: 1,
            },
            SkinnedPoint {
                position: [0.0, 1.0, 0.0],
                bone: 1,
            },
        ],
        normals: vec![
            SkinnedPoint {
                position: [0.0, 0.0, 1.0],
                bone: 1,
            };
            3
        ],
        meshes: vec![Mesh {
            skin_ref: 0,
            num_triangles: 1,
            num_normals: 3,
            commands: vec![
                TriangleCommand {
                    run: TriangleRun::Strip,
                    vertices: vec![tv(0, 0), tv(1, 4), tv(2, 8)],
                },
                TriangleCommand {
                    run: TriangleRun::Fan,
                    vertices: vec![tv(2, 1), tv(1, 2), tv(0, 3)],
                },
            ],
        }],
        ..Default::default()
    };

    Bodypart {
        name: "body".into(),
        base: 1,
        models: vec![
            head,
            SubModel {
                name: "blank".into(),
                ..Default::default()
            },
        ],
    }
}

pub fn fixture_model() -> EditableModel {
    EditableModel {
        name: "fixture.mdl".into(),
        eye_position: [0.0, 0.0, 64.0],
        min: [-16.0, -16.0, 0.0],
        max: [16.0, 16.0, 72.0],
        bones: two_bones(),
        bone_controllers: vec![
            BoneController {
                kind: STUDIO_ZR | STUDIO_RLOOP,
                start: 0.0,
                end: 360.0,
                rest: 0,
                index: 0,
            },
            BoneController {
                kind: STUDIO_X,
                start: 0.0,
                end: 2.0,
                rest: 0,
                index: 4,
            },
        ],
        hitboxes: vec![Hitbox {
            bone: 1,
            group: 3,
            min: [-1.0, -1.0, -1.0],
            max: [1.0, 1.0, 1.0],
        }],
        attachments: vec![Attachment {
            name: "muzzle".into(),
            bone: 1,
            origin: [2.0, 0.0, 0.5],
            ..Default::default()
        }],
        sequences: vec![
            idle_sequence(),
            aim_sequence(),
            Sequence {
                label: "die".into(),
                num_frames: 20,
                events: vec![event(19, 1000, "")],
                blends: vec![AnimationBlend::new_static(2)],
                ..Default::default()
            }
            .with_sorted_events(),
        ],
        transitions: vec![vec![0, 1], vec![1, 0]],
        bodyparts: vec![body()],
        textures: vec![texture("skin.bmp", 3), texture("face.bmp", 9)],
        skin_families: vec![vec![0, 1], vec![1, 1]],
        ..Default::default()
    }
}

trait SortedEvents {
    fn with_sorted_events(self) -> Self;
}

impl SortedEvents for Sequence {
    fn with_sorted_events(mut self) -> Self {
        self.sort_events();
        self
    }
}
