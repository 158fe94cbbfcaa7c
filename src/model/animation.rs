use crate::format::{AnimValue, BONE_AXES, STUDIO_LOOPING};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SequenceEvent {
    pub frame: i32,
    pub event: i32,
    pub kind: i32,
    pub options: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pivot {
    pub origin: [f32; 3],
    pub start: i32,
    pub end: i32,
}

/// One blend axis of a sequence (aim pitch, yaw, ...). `kind == 0` means
/// the axis is not used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BlendAxis {
    pub kind: i32,
    pub start: f32,
    pub end: f32,
}

/// Run-length curves of a single bone, one per axis. An empty curve means
/// the bone's static value is used for that axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoneAnimation {
    pub data: [Vec<AnimValue>; BONE_AXES],
}

impl BoneAnimation {
    pub fn is_static(&self) -> bool {
        self.data.iter().all(Vec::is_empty)
    }
}

/// A full skeleton's worth of curves; sequences carry one per blend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationBlend {
    pub bones: Vec<BoneAnimation>,
}

impl AnimationBlend {
    pub fn new_static(num_bones: usize) -> Self {
        Self {
            bones: vec![BoneAnimation::default(); num_bones],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sequence {
    pub label: String,
    pub fps: f32,
    pub flags: i32,
    pub activity: i32,
    pub activity_weight: i32,
    pub num_frames: i32,

    pub events: Vec<SequenceEvent>, // declaration order
    pub sorted_events: Vec<usize>,  // indices into `events`, ascending frame
    pub pivots: Vec<Pivot>,

    pub motion_type: i32,
    pub motion_bone: i32,
    pub linear_movement: [f32; 3],

    pub bbmin: [f32; 3],
    pub bbmax: [f32; 3],

    pub blend: [BlendAxis; 2],
    pub blend_parent: i32,
    pub blends: Vec<AnimationBlend>,

    pub entry_node: i32,
    pub exit_node: i32,
    pub node_flags: i32,
    pub next_sequence: i32,
}

impl Default for Sequence {
    fn default() -> Self {
        Self {
            label: String::new(),
            fps: 30.0,
            flags: 0,
            activity: 0,
            activity_weight: 0,
            num_frames: 1,
            events: Vec::new(),
            sorted_events: Vec::new(),
            pivots: Vec::new(),
            motion_type: 0,
            motion_bone: 0,
            linear_movement: [0.0; 3],
            bbmin: [0.0; 3],
            bbmax: [0.0; 3],
            blend: [BlendAxis::default(); 2],
            blend_parent: 0,
            blends: Vec::new(),
            entry_node: 0,
            exit_node: 0,
            node_flags: 0,
            next_sequence: 0,
        }
    }
}

impl Sequence {
    pub fn is_looping(&self) -> bool {
        self.flags & STUDIO_LOOPING != 0
    }

    /// Rebuilds the frame ordered event index. Events sharing a frame keep
    /// their declaration order.
    pub fn sort_events(&mut self) {
        let mut order: Vec<usize> = (0..self.events.len()).collect();
        order.sort_by_key(|&i| self.events[i].frame);
        self.sorted_events = order;
    }

    pub fn events_by_frame(&self) -> impl Iterator<Item = &SequenceEvent> {
        self.sorted_events.iter().filter_map(|&i| self.events.get(i))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceGroup {
    pub label: String,
    pub name: String,
}

impl Default for SequenceGroup {
    fn default() -> Self {
        Self {
            label: "default".to_string(),
            name: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(frame: i32, id: i32) -> SequenceEvent {
        SequenceEvent {
            frame,
            event: id,
            ..Default::default()
        }
    }

    #[test]
    fn sort_events_is_stable_by_frame() {
        let mut seq = Sequence {
            events: vec![event(9, 1), event(2, 2), event(9, 3), event(0, 4)],
            ..Default::default()
        };
        seq.sort_events();
        assert_eq!(seq.sorted_events, vec![3, 1, 0, 2]);
        let ids: Vec<i32> = seq.events_by_frame().map(|e| e.event).collect();
        assert_eq!(ids, vec![4, 2, 1, 3]);
    }
}
