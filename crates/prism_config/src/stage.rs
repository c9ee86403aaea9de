use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageConfig {
    #[serde(default = "crate::defaults::default_stage_width")]
    pub width: f64,
    #[serde(default = "crate::defaults::default_stage_height")]
    pub height: f64,
    /// Max frames per second of the frame loop
    #[serde(default = "crate::defaults::default_framerate")]
    pub framerate: f64,
    #[serde(default)]
    pub turbo: bool,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            width: crate::defaults::default_stage_width(),
            height: crate::defaults::default_stage_height(),
            framerate: crate::defaults::default_framerate(),
            turbo: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Interval after which accumulated scroll deltas are zeroed
    #[serde(default = "crate::defaults::default_reset_interval_ms")]
    pub reset_interval_ms: u64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            reset_interval_ms: crate::defaults::default_reset_interval_ms(),
        }
    }
}
