// Sampling of run-length animation curves

use crate::format::AnimValue;

/// Position of a frame inside a curve: the run that covers it and the
/// frame's offset within that run.
struct RunCursor {
    run: usize,
    valid: usize,
    total: usize,
    k: usize,
}

fn locate(curve: &[AnimValue], frame: usize) -> Option<RunCursor> {
    let mut run = 0;
    let mut k = frame;
    loop {
        let header = curve.get(run)?;
        let (valid, total) = (header.valid() as usize, header.total() as usize);
        if total < valid {
            k = 0;
        }
        if total > k {
            return Some(RunCursor { run, valid, total, k });
        }
        k -= total;
        run += valid + 1;
    }
}

fn raw(curve: &[AnimValue], index: usize) -> f32 {
    curve.get(index).map_or(0.0, |v| f32::from(v.value()))
}

/// Raw values bracketing `frame` and `frame + 1`. Past the last literal of a
/// run the last literal repeats, unless the run ends there, in which case the
/// next run's first literal is used.
pub fn sample_pair(curve: &[AnimValue], frame: usize) -> Option<(f32, f32)> {
    let RunCursor { run, valid, total, k } = locate(curve, frame)?;

    let pair = if valid > k {
        let first = raw(curve, run + k + 1);
        let second = if valid > k + 1 {
            raw(curve, run + k + 2)
        } else if total > k + 1 {
            first
        } else {
            raw(curve, run + valid + 2)
        };
        (first, second)
    } else {
        let first = raw(curve, run + valid);
        let second = if total > k + 1 {
            first
        } else {
            raw(curve, run + valid + 2)
        };
        (first, second)
    };
    Some(pair)
}

/// Raw positional value at `frame + s`. Only interpolates within a run, or
/// across into the next run once the repeated tail is exhausted.
pub fn sample_position(curve: &[AnimValue], frame: usize, s: f32) -> Option<f32> {
    let RunCursor { run, valid, total, k } = locate(curve, frame)?;

    let value = if valid > k {
        if valid > k + 1 {
            raw(curve, run + k + 1) * (1.0 - s) + s * raw(curve, run + k + 2)
        } else {
            raw(curve, run + k + 1)
        }
    } else if total <= k + 1 {
        raw(curve, run + valid) * (1.0 - s) + s * raw(curve, run + valid + 2)
    } else {
        raw(curve, run + valid)
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(valid: u8, total: u8) -> AnimValue {
        AnimValue::header(valid, total)
    }

    fn v(value: i16) -> AnimValue {
        AnimValue::literal(value)
    }

    #[test]
    fn literals_and_repeated_tail() {
        // 3 literals over 5 frames, then a second run of one literal
        let curve = [h(3, 5), v(10), v(20), v(30), h(1, 2), v(90)];

        assert_eq!(sample_pair(&curve, 0), Some((10.0, 20.0)));
        assert_eq!(sample_pair(&curve, 1), Some((20.0, 30.0)));
        // Last literal of a run that still covers the next frame repeats
        assert_eq!(sample_pair(&curve, 2), Some((30.0, 30.0)));
        assert_eq!(sample_pair(&curve, 3), Some((30.0, 30.0)));
        // Final frame of the run reaches into the next run
        assert_eq!(sample_pair(&curve, 4), Some((30.0, 90.0)));
        assert_eq!(sample_pair(&curve, 5), Some((90.0, 90.0)));
    }

    #[test]
    fn position_interpolates_only_where_the_engine_does() {
        let curve = [h(2, 2), v(0), v(10), h(1, 1), v(50)];
        assert_eq!(sample_position(&curve, 0, 0.5), Some(5.0));
        // Last literal of a full run holds
        assert_eq!(sample_position(&curve, 1, 0.5), Some(10.0));
        assert_eq!(sample_position(&curve, 2, 0.0), Some(50.0));
    }

    #[test]
    fn frames_past_the_curve_have_no_sample() {
        let curve = [h(1, 1), v(3)];
        assert_eq!(sample_pair(&curve, 0), Some((3.0, 0.0)));
        assert_eq!(sample_pair(&curve, 4), None);
        assert_eq!(sample_pair(&[], 0), None);
    }
}
