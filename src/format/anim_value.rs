use serde::{Deserialize, Serialize};

/// One 16-bit entry of a run-length animation curve.
///
/// The same two bytes are either a run header (`valid` literal count in the
/// low byte, `total` frame count in the high byte) or a signed literal value,
/// depending on where they sit in the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnimValue(pub u16);

impl AnimValue {
    pub fn header(valid: u8, total: u8) -> Self {
        Self(u16::from(valid) | (u16::from(total) << 8))
    }

    pub fn literal(value: i16) -> Self {
        Self(value as u16)
    }

    pub fn valid(self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    pub fn total(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub fn value(self) -> i16 {
        self.0 as i16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_packs_valid_in_low_byte() {
        let v = AnimValue::header(3, 10);
        assert_eq!(v.0.to_le_bytes(), [3, 10]);
        assert_eq!(v.valid(), 3);
        assert_eq!(v.total(), 10);
    }

    #[test]
    fn literal_keeps_sign() {
        assert_eq!(AnimValue::literal(-1200).value(), -1200);
    }
}
