// How blend axis values are mapped onto blend bytes

use super::controller::encode_blend;
use crate::format::STUDIO_ROTATION_TYPES;
use crate::model::Sequence;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlendMode {
    /// Uses each sequence's declared blend ranges.
    #[default]
    Standard,
    /// Fixed aim ranges: pitch -90..90 on blender 0, yaw -180..180 on
    /// blender 1, regardless of what the sequence declares.
    CounterStrike,
}

impl BlendMode {
    pub const ALL: [Self; 2] = [Self::Standard, Self::CounterStrike];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::CounterStrike => "Counter-Strike",
        }
    }

    /// Mode whose display name matches `name`, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.name().eq_ignore_ascii_case(name))
    }

    /// Byte and represented value for `value` on `blender`, or `None` when
    /// this mode has no mapping for it or the declared range is empty.
    pub fn encode(&self, sequence: &Sequence, blender: usize, value: f32) -> Option<(u8, f32)> {
        match self {
            Self::Standard => {
                let axis = sequence.blend.get(blender)?;
                if axis.kind == 0 || axis.start == axis.end {
                    return None;
                }
                let rotational = axis.kind & STUDIO_ROTATION_TYPES != 0;
                Some(encode_blend(value, axis.start, axis.end, rotational))
            }
            Self::CounterStrike => {
                let (start, end) = match blender {
                    0 => (-90.0, 90.0),
                    1 => (-180.0, 180.0),
                    _ => return None,
                };
                let setting = (255.0 * (value - start) / (end - start)).clamp(0.0, 255.0) as u8;
                Some((setting, f32::from(setting) / 255.0 * (end - start) + start))
            }
        }
    }

    pub fn compute_blend(&self, sequence: &Sequence, blender: usize, value: f32) -> Option<u8> {
        self.encode(sequence, blender, value).map(|(byte, _)| byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{STUDIO_XR, STUDIO_YR};
    use crate::model::BlendAxis;

    fn aim_sequence() -> Sequence {
        Sequence {
            blend: [
                BlendAxis {
                    kind: STUDIO_XR,
                    start: -45.0,
                    end: 45.0,
                },
                BlendAxis::default(),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn modes_are_found_by_name() {
        for mode in BlendMode::ALL {
            assert_eq!(BlendMode::from_name(mode.name()), Some(mode));
        }
        assert_eq!(BlendMode::from_name("counter-strike"), Some(BlendMode::CounterStrike));
        assert_eq!(BlendMode::from_name("cs"), None);
    }

    #[test]
    fn standard_needs_a_declared_axis() {
        let seq = aim_sequence();
        assert_eq!(BlendMode::Standard.compute_blend(&seq, 0, -45.0), Some(0));
        assert_eq!(BlendMode::Standard.compute_blend(&seq, 0, 45.0), Some(255));
        assert_eq!(BlendMode::Standard.compute_blend(&seq, 1, 10.0), None);
        assert_eq!(BlendMode::Standard.compute_blend(&seq, 2, 10.0), None);
    }

    #[test]
    fn counter_strike_ignores_sequence_ranges() {
        let seq = aim_sequence();
        let cs = BlendMode::CounterStrike;
        assert_eq!(cs.compute_blend(&seq, 0, -90.0), Some(0));
        assert_eq!(cs.compute_blend(&seq, 0, 0.0), Some(127));
        assert_eq!(cs.compute_blend(&seq, 0, 200.0), Some(255));
        assert_eq!(cs.compute_blend(&seq, 1, 180.0), Some(255));
        assert_eq!(cs.compute_blend(&seq, 1, -180.0), Some(0));
        assert_eq!(cs.compute_blend(&seq, 2, 0.0), None);
    }

    #[test]
    fn rotational_blend_wraps_around_the_midpoint() {
        let seq = Sequence {
            blend: [
                BlendAxis {
                    kind: STUDIO_YR,
                    start: -90.0,
                    end: 90.0,
                },
                BlendAxis::default(),
            ],
            ..Default::default()
        };
        // 300 degrees is -60 once wrapped
        assert_eq!(BlendMode::Standard.compute_blend(&seq, 0, 300.0), Some(42));
        assert_eq!(BlendMode::Standard.compute_blend(&seq, 0, -60.0), Some(42));
    }
}
