// Per-instance playback state: sequence, frame, controllers and events

use super::blend::BlendMode;
use super::controller::{encode_controller, encode_mouth};
use super::skeleton::setup_bones;
use super::types::{Pose, PoseInput, PoseScratch};
use crate::format::MOUTH_CONTROLLER;
use crate::model::{EditableModel, Sequence, SequenceEvent};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Source of the current time in seconds.
pub trait Clock {
    fn now(&self) -> f64;
}

/// Wall clock measured from creation.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Hand-driven clock. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    time: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn set(&self, time: f64) {
        self.time.set(time);
    }

    pub fn advance(&self, seconds: f64) {
        self.time.set(self.time.get() + seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.time.get()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopingMode {
    AlwaysLoop,
    NeverLoop,
    #[default]
    UseSequenceSetting,
}

impl LoopingMode {
    pub fn should_loop(&self, sequence: &Sequence) -> bool {
        match self {
            Self::AlwaysLoop => true,
            Self::NeverLoop => false,
            Self::UseSequenceSetting => sequence.is_looping(),
        }
    }
}

/// A model being played back. Owns its model; all range errors on setters
/// leave the state untouched.
pub struct StudioEntity {
    model: EditableModel,
    clock: Box<dyn Clock>,

    sequence: Option<usize>,
    frame: f32,
    frame_rate: f32,
    anim_time: f64,
    last_event_check: f32,
    looping_mode: LoopingMode,
    blend_mode: BlendMode,

    controllers: [u8; 4],
    controller_values: [f32; 4],
    mouth: u8,
    mouth_value: f32,
    blending: [u8; 2],
    blending_values: [f32; 2],

    body: i32,
    skin: usize,
}

impl StudioEntity {
    pub fn new(model: EditableModel, clock: Box<dyn Clock>) -> Self {
        let anim_time = clock.now();
        let sequence = (!model.sequences.is_empty()).then_some(0);
        Self {
            model,
            clock,
            sequence,
            frame: 0.0,
            frame_rate: 1.0,
            anim_time,
            last_event_check: 0.0,
            looping_mode: LoopingMode::default(),
            blend_mode: BlendMode::default(),
            controllers: [0; 4],
            controller_values: [0.0; 4],
            mouth: 0,
            mouth_value: 0.0,
            blending: [0; 2],
            blending_values: [0.0; 2],
            body: 0,
            skin: 0,
        }
    }

    pub fn model(&self) -> &EditableModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut EditableModel {
        &mut self.model
    }

    pub fn into_model(self) -> EditableModel {
        self.model
    }

    pub fn sequence(&self) -> Option<usize> {
        self.sequence
    }

    fn current_sequence(&self) -> Option<&Sequence> {
        self.sequence.and_then(|i| self.model.sequence(i))
    }

    /// Selects a sequence. `None` is only valid for a model without
    /// sequences. Frame and event cursor restart at 0 even when the index is
    /// unchanged.
    pub fn set_sequence(&mut self, sequence: Option<usize>) -> bool {
        let valid = match sequence {
            None => self.model.sequences.is_empty(),
            Some(i) => i < self.model.sequences.len(),
        };
        if !valid {
            log::debug!("Ignoring invalid sequence {sequence:?}");
            return false;
        }

        self.sequence = sequence;
        self.frame = 0.0;
        self.last_event_check = 0.0;
        true
    }

    pub fn frame(&self) -> f32 {
        self.frame
    }

    pub fn last_event_check(&self) -> f32 {
        self.last_event_check
    }

    pub fn set_frame(&mut self, frame: f32) {
        let Some(sequence) = self.current_sequence() else {
            return;
        };
        let last = sequence.num_frames.saturating_sub(1).max(0) as f32;
        let frame = frame.clamp(0.0, last);
        self.frame = frame;
        self.last_event_check = frame;
    }

    pub fn frame_rate(&self) -> f32 {
        self.frame_rate
    }

    pub fn set_frame_rate(&mut self, frame_rate: f32) {
        self.frame_rate = frame_rate;
    }

    pub fn looping_mode(&self) -> LoopingMode {
        self.looping_mode
    }

    pub fn set_looping_mode(&mut self, mode: LoopingMode) {
        self.looping_mode = mode;
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    pub fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend_mode = mode;
    }

    /// Moves the frame forward by `delta` seconds, or by the time elapsed
    /// since the last advance when `delta` is 0. Returns the delta applied.
    pub fn advance_frame(&mut self, delta: f32, maximum: Option<f32>) -> f32 {
        let now = self.clock.now();
        let mut delta = delta;
        if delta == 0.0 {
            delta = (now - self.anim_time) as f32;
            if delta <= 0.001 {
                self.anim_time = now;
                return 0.0;
            }
        }
        if let Some(maximum) = maximum {
            delta = delta.min(maximum);
        }

        let Some(sequence) = self.current_sequence() else {
            self.anim_time = now;
            return delta;
        };

        let num_frames = sequence.num_frames;
        let looping = self.looping_mode.should_loop(sequence);
        let increment = delta * sequence.fps * self.frame_rate;

        if num_frames <= 1 {
            self.frame = 0.0;
        } else {
            let span = (num_frames - 1) as f32;
            let advanced = self.frame + increment;
            if looping {
                let wrapped = advanced.rem_euclid(span);
                if wrapped != advanced {
                    // Rewind the event cursor so the wrapped range is scanned
                    self.last_event_check = wrapped - increment;
                }
                self.frame = wrapped;
            } else {
                self.frame = advanced.clamp(0.0, span);
            }
        }

        self.anim_time = now;
        delta
    }

    /// Sets a bone controller slot (0-3). Returns the value the stored byte
    /// represents, or `None` when the model has no controller there.
    pub fn set_controller(&mut self, slot: usize, value: f32) -> Option<f32> {
        if slot >= self.controllers.len() {
            return None;
        }
        let (_, controller) = self.model.controller_for_slot(slot as i32)?;
        if controller.start == controller.end {
            return None;
        }
        let (byte, represented) = encode_controller(controller, value);
        self.controllers[slot] = byte;
        self.controller_values[slot] = value;
        Some(represented)
    }

    pub fn controller(&self, slot: usize) -> Option<u8> {
        self.controllers.get(slot).copied()
    }

    pub fn controller_value(&self, slot: usize) -> Option<f32> {
        self.controller_values.get(slot).copied()
    }

    pub fn set_mouth(&mut self, value: f32) -> Option<f32> {
        let (_, controller) = self
            .model
            .controller_for_slot(MOUTH_CONTROLLER)
            .filter(|(_, c)| c.start != c.end)?;
        let (byte, represented) = encode_mouth(controller, value);
        self.mouth = byte;
        self.mouth_value = value;
        Some(represented)
    }

    pub fn mouth(&self) -> u8 {
        self.mouth
    }

    pub fn mouth_value(&self) -> f32 {
        self.mouth_value
    }

    /// Sets a blend axis of the current sequence through the active blend
    /// mode.
    pub fn set_blending(&mut self, blender: usize, value: f32) -> Option<f32> {
        if blender >= self.blending.len() {
            return None;
        }
        let sequence = self.current_sequence()?;
        let (byte, represented) = self.blend_mode.encode(sequence, blender, value)?;
        self.blending[blender] = byte;
        self.blending_values[blender] = value;
        Some(represented)
    }

    pub fn blending(&self, blender: usize) -> Option<u8> {
        self.blending.get(blender).copied()
    }

    pub fn blending_value(&self, blender: usize) -> Option<f32> {
        self.blending_values.get(blender).copied()
    }

    pub fn body(&self) -> i32 {
        self.body
    }

    /// Selects the model shown for one bodypart, keeping the others.
    pub fn set_bodygroup(&mut self, bodypart: usize, value: usize) -> bool {
        let Some(part) = self.model.bodyparts.get(bodypart) else {
            return false;
        };
        if value >= part.models.len() {
            return false;
        }
        let current = part.active_model(self.body) as i32;
        let body = (value as i32 - current)
            .checked_mul(part.base)
            .and_then(|delta| self.body.checked_add(delta));
        match body {
            Some(body) => {
                self.body = body;
                true
            }
            None => false,
        }
    }

    /// Model index currently shown for a bodypart.
    pub fn active_model(&self, bodypart: usize) -> Option<usize> {
        self.model
            .bodyparts
            .get(bodypart)
            .map(|part| part.active_model(self.body))
    }

    pub fn skin(&self) -> usize {
        self.skin
    }

    pub fn set_skin(&mut self, skin: usize) -> bool {
        if skin >= self.model.skin_families.len() {
            return false;
        }
        self.skin = skin;
        true
    }

    /// Texture index for a mesh skin reference under the current skin.
    pub fn skin_texture(&self, skin_ref: usize) -> Option<usize> {
        self.model.skin_families.get(self.skin)?.get(skin_ref).copied()
    }

    /// Events of the current sequence whose frame lies in `[start, end)`,
    /// plus the wrapped-around head of a looping sequence. Returns the index
    /// to resume from after the event found, in frame order.
    fn animation_event(sequence: &Sequence, start: f32, end: f32, index: usize) -> Option<(usize, &SequenceEvent)> {
        let num_frames = sequence.num_frames as f32;
        let looping = sequence.is_looping();

        sequence
            .sorted_events
            .iter()
            .enumerate()
            .skip(index)
            .filter_map(|(i, &e)| sequence.events.get(e).map(|event| (i, event)))
            .find(|(_, event)| {
                let frame = event.frame as f32;
                (frame >= start && frame < end)
                    || (looping && end >= num_frames - 1.0 && frame < end - num_frames + 1.0)
            })
            .map(|(i, event)| (i + 1, event))
    }

    /// Fires every event crossed since the last dispatch. Returns how many
    /// were dispatched.
    pub fn dispatch_anim_events(&mut self, mut handler: impl FnMut(&SequenceEvent)) -> usize {
        let start = self.last_event_check;
        let end = self.frame;
        self.last_event_check = self.frame;

        let Some(sequence) = self.current_sequence() else {
            return 0;
        };

        let mut index = 0;
        let mut count = 0;
        while let Some((next, event)) = Self::animation_event(sequence, start, end, index) {
            log::trace!("event {} at frame {} ({})", event.event, event.frame, event.options);
            handler(event);
            count += 1;
            index = next;
        }
        count
    }

    pub fn pose_input(&self) -> PoseInput {
        PoseInput {
            sequence: self.sequence,
            frame: self.frame,
            blending: self.blending,
            controllers: self.controllers,
            mouth: self.mouth,
        }
    }

    /// Poses the skeleton for the current state.
    pub fn pose(&self, scratch: &mut PoseScratch, pose: &mut Pose) {
        setup_bones(&self.model, &self.pose_input(), scratch, pose);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{STUDIO_LOOPING, STUDIO_ZR};
    use crate::model::{Bodypart, BoneController, SubModel};

    fn entity_with(model: EditableModel) -> (StudioEntity, ManualClock) {
        let clock = ManualClock::default();
        (StudioEntity::new(model, Box::new(clock.clone())), clock)
    }

    #[test]
    fn none_sequence_only_without_sequences() {
        let (mut empty, _) = entity_with(EditableModel::default());
        assert_eq!(empty.sequence(), None);
        assert!(empty.set_sequence(None));

        let model = EditableModel {
            sequences: vec![Sequence::default()],
            ..Default::default()
        };
        let (mut entity, _) = entity_with(model);
        assert_eq!(entity.sequence(), Some(0));
        assert!(!entity.set_sequence(None));
        assert!(!entity.set_sequence(Some(1)));
        assert_eq!(entity.sequence(), Some(0));
    }

    #[test]
    fn zero_delta_uses_the_clock() {
        let model = EditableModel {
            sequences: vec![Sequence {
                num_frames: 100,
                fps: 10.0,
                ..Default::default()
            }],
            ..Default::default()
        };
        let (mut entity, clock) = entity_with(model);

        assert_eq!(entity.advance_frame(0.0, None), 0.0);
        clock.advance(0.5);
        assert_eq!(entity.advance_frame(0.0, None), 0.5);
        assert_eq!(entity.frame(), 5.0);

        clock.advance(2.0);
        assert_eq!(entity.advance_frame(0.0, Some(0.1)), 0.1);
        assert_eq!(entity.frame(), 6.0);
    }

    #[test]
    fn single_frame_sequence_stays_put() {
        let model = EditableModel {
            sequences: vec![Sequence {
                flags: STUDIO_LOOPING,
                ..Default::default()
            }],
            ..Default::default()
        };
        let (mut entity, _) = entity_with(model);
        entity.advance_frame(3.0, None);
        assert_eq!(entity.frame(), 0.0);
    }

    #[test]
    fn bodygroups_keep_other_parts() {
        let part = |count: usize, base: i32| Bodypart {
            base,
            models: vec![SubModel::default(); count],
            ..Default::default()
        };
        let model = EditableModel {
            bodyparts: vec![part(2, 1), part(3, 2)],
            ..Default::default()
        };
        let (mut entity, _) = entity_with(model);

        assert!(entity.set_bodygroup(1, 2));
        assert!(entity.set_bodygroup(0, 1));
        assert_eq!(entity.body(), 5);
        assert_eq!(entity.active_model(0), Some(1));
        assert_eq!(entity.active_model(1), Some(2));

        assert!(!entity.set_bodygroup(1, 3));
        assert!(!entity.set_bodygroup(2, 0));
        assert_eq!(entity.body(), 5);
    }

    #[test]
    fn unknown_controller_slots_are_ignored() {
        let model = EditableModel {
            bone_controllers: vec![BoneController {
                kind: STUDIO_ZR,
                start: -30.0,
                end: 30.0,
                index: 1,
                ..Default::default()
            }],
            ..Default::default()
        };
        let (mut entity, _) = entity_with(model);

        assert_eq!(entity.set_controller(0, 10.0), None);
        assert_eq!(entity.set_controller(9, 10.0), None);
        assert_eq!(entity.set_mouth(1.0), None);
        assert!(entity.set_controller(1, 30.0).is_some());
        assert_eq!(entity.controller(1), Some(255));
        assert_eq!(entity.controller_value(1), Some(30.0));
    }

    #[test]
    fn skin_must_exist() {
        let model = EditableModel {
            skin_families: vec![vec![0], vec![1]],
            ..Default::default()
        };
        let (mut entity, _) = entity_with(model);
        assert!(entity.set_skin(1));
        assert_eq!(entity.skin_texture(0), Some(1));
        assert!(!entity.set_skin(2));
        assert_eq!(entity.skin(), 1);
    }
}
