use crate::CONFY_APP_NAME;
use crate::animation::{BlendMode, LoopingMode, StudioEntity};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackSettings {
    pub looping_mode: LoopingMode,
    pub blend_mode: BlendMode,
    pub frame_rate: f32,
    pub max_frame_delta: Option<f32>, // seconds, caps a single advance
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            looping_mode: LoopingMode::UseSequenceSetting,
            blend_mode: BlendMode::Standard,
            frame_rate: 1.0,
            max_frame_delta: Some(0.1),
        }
    }
}

impl PlaybackSettings {
    pub fn load() -> Self {
        confy::load(CONFY_APP_NAME, "playback").unwrap_or_default()
    }

    pub fn save(&self) {
        if let Err(e) = confy::store(CONFY_APP_NAME, "playback", self) {
            log::warn!("Failed to store playback settings: {e}");
        }
    }

    pub fn apply(&self, entity: &mut StudioEntity) {
        entity.set_looping_mode(self.looping_mode);
        entity.set_blend_mode(self.blend_mode);
        entity.set_frame_rate(self.frame_rate);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    pub masked_transparency: bool, // palette index 255 becomes transparent on masked textures
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            masked_transparency: true,
        }
    }
}

impl ExportSettings {
    pub fn load() -> Self {
        confy::load(CONFY_APP_NAME, "export").unwrap_or_default()
    }

    pub fn save(&self) {
        if let Err(e) = confy::store(CONFY_APP_NAME, "export", self) {
            log::warn!("Failed to store export settings: {e}");
        }
    }
}

// Aggregate struct for convenience
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub playback: PlaybackSettings,
    pub export: ExportSettings,
}

impl Settings {
    pub fn load() -> Self {
        Self {
            playback: PlaybackSettings::load(),
            export: ExportSettings::load(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EditableModel;
    use crate::animation::ManualClock;

    #[test]
    fn playback_settings_configure_the_entity() {
        let mut entity = StudioEntity::new(EditableModel::default(), Box::new(ManualClock::default()));
        let settings = PlaybackSettings {
            looping_mode: LoopingMode::AlwaysLoop,
            blend_mode: BlendMode::CounterStrike,
            frame_rate: 2.0,
            max_frame_delta: None,
        };
        settings.apply(&mut entity);
        assert_eq!(entity.looping_mode(), LoopingMode::AlwaysLoop);
        assert_eq!(entity.blend_mode(), BlendMode::CounterStrike);
        assert_eq!(entity.frame_rate(), 2.0);
    }

    #[test]
    fn settings_survive_json() {
        let json = serde_json::to_string(&PlaybackSettings::default()).unwrap();
        let back: PlaybackSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.looping_mode, LoopingMode::UseSequenceSetting);
        assert_eq!(back.max_frame_delta, Some(0.1));
    }
}
