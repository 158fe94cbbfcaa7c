// Float <-> byte encoding of controllers, mouth and blend axes

use crate::model::BoneController;

/// Brings a rotational value into the controller's range: inverted for
/// descending ranges, then wrapped around the range midpoint.
fn wrap_rotation(value: f32, start: f32, end: f32, modulo_fallback: bool) -> f32 {
    let mut value = if end < start { -value } else { value };

    if start + 359.0 >= end {
        let mid = (start + end) / 2.0;
        if value > mid + 180.0 {
            value -= 360.0;
        }
        if value < mid - 180.0 {
            value += 360.0;
        }
    } else if modulo_fallback {
        if value > 360.0 {
            value -= (value / 360.0).trunc() * 360.0;
        } else if value < 0.0 {
            value += ((value / -360.0).trunc() + 1.0) * 360.0;
        }
    }

    value
}

/// Linear byte setting of `value` in `[start, end]`, clamped to `0..=scale`.
fn quantize(value: f32, start: f32, end: f32, scale: f32) -> u8 {
    let setting = (scale * (value - start) / (end - start)) as i32;
    setting.clamp(0, scale as i32) as u8
}

fn dequantize(setting: u8, start: f32, end: f32, scale: f32) -> f32 {
    f32::from(setting) * (1.0 / scale) * (end - start) + start
}

/// Encodes a bone controller value (slots 0-3). Returns the byte and the
/// value it represents.
pub fn encode_controller(controller: &BoneController, value: f32) -> (u8, f32) {
    let (start, end) = (controller.start, controller.end);
    let value = if controller.is_rotation() {
        wrap_rotation(value, start, end, true)
    } else {
        value
    };
    let setting = quantize(value, start, end, 255.0);
    (setting, dequantize(setting, start, end, 255.0))
}

/// Encodes the mouth controller, which uses a 0-64 scale.
pub fn encode_mouth(controller: &BoneController, value: f32) -> (u8, f32) {
    let (start, end) = (controller.start, controller.end);
    let value = if controller.is_rotation() {
        wrap_rotation(value, start, end, false)
    } else {
        value
    };
    let setting = quantize(value, start, end, 64.0);
    (setting, dequantize(setting, start, end, 64.0))
}

/// Encodes a blend axis value. `rotational` applies the wrap around the
/// range midpoint.
pub fn encode_blend(value: f32, start: f32, end: f32, rotational: bool) -> (u8, f32) {
    let value = if rotational {
        wrap_rotation(value, start, end, false)
    } else {
        value
    };
    let setting = quantize(value, start, end, 255.0);
    (setting, dequantize(setting, start, end, 255.0))
}
