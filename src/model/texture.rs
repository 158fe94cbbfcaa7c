use crate::format::PALETTE_ENTRIES;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TextureFlags {
    FlatShade = 0x1,
    Chrome = 0x2,
    Fullbright = 0x4,
    NoMips = 0x8,
    Alpha = 0x10,
    Additive = 0x20,
    Masked = 0x40,
}

impl TextureFlags {
    pub const ALL: [Self; 7] = [
        Self::FlatShade,
        Self::Chrome,
        Self::Fullbright,
        Self::NoMips,
        Self::Alpha,
        Self::Additive,
        Self::Masked,
    ];

    /// Get all flags present in the bitfield
    pub fn from_bits(bits: i32) -> Vec<Self> {
        Self::ALL
            .into_iter()
            .filter(|flag| bits & *flag as i32 != 0)
            .collect()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::FlatShade => "FlatShade",
            Self::Chrome => "Chrome",
            Self::Fullbright => "Fullbright",
            Self::NoMips => "NoMips",
            Self::Alpha => "Alpha",
            Self::Additive => "Additive",
            Self::Masked => "Masked",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Texture {
    pub name: String,
    pub flags: i32, // raw bits, unknown ones survive a save
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,         // palette indices, row major
    pub palette: Vec<[u8; 3]>,   // 256 RGB entries
}

impl Default for Texture {
    fn default() -> Self {
        Self {
            name: String::new(),
            flags: 0,
            width: 0,
            height: 0,
            pixels: Vec::new(),
            palette: vec![[0; 3]; PALETTE_ENTRIES],
        }
    }
}

impl Texture {
    pub fn has_flag(&self, flag: TextureFlags) -> bool {
        self.flags & flag as i32 != 0
    }

    pub fn set_flag(&mut self, flag: TextureFlags, on: bool) {
        if on {
            self.flags |= flag as i32;
        } else {
            self.flags &= !(flag as i32);
        }
    }

    pub fn flags(&self) -> Vec<TextureFlags> {
        TextureFlags::from_bits(self.flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_list_known_bits_and_keep_the_rest() {
        let mut texture = Texture {
            flags: 0x100 | TextureFlags::Chrome as i32,
            ..Default::default()
        };
        texture.set_flag(TextureFlags::Masked, true);
        assert!(texture.has_flag(TextureFlags::Masked));

        let names: Vec<_> = texture.flags().iter().map(TextureFlags::name).collect();
        assert_eq!(names, vec!["Chrome", "Masked"]);

        texture.set_flag(TextureFlags::Chrome, false);
        assert_eq!(texture.flags, 0x100 | 0x40);
    }
}
