use std::sync::{Arc, RwLock};

use serde::Serialize;

/// Media-element style playback device shared by all audio blocks.
///
/// Rates and volumes use the device's native unit interval (`1.0` = 100%).
pub trait AudioDevice: Send + Sync {
    fn set_source(&self, src: &str);
    fn play(&self);
    fn pause(&self);
    fn set_looping(&self, looping: bool);
    fn set_playback_rate(&self, rate: f64);
    fn playback_rate(&self) -> f64;
    fn set_current_time(&self, seconds: f64);
    fn current_time(&self) -> f64;
    fn set_volume(&self, volume: f64);
    fn volume(&self) -> f64;
}

/// Converts a block percentage into the device unit interval
pub fn percent_to_unit(percent: f64) -> f64 {
    percent / 100.0
}

/// Converts a device unit value back into a block percentage.
///
/// Values within rounding noise of an integer are snapped, so integral
/// percentages read back exactly as written.
pub fn unit_to_percent(unit: f64) -> f64 {
    let percent = unit * 100.0;
    let rounded = percent.round();
    if (percent - rounded).abs() < 1e-9 {
        rounded
    } else {
        percent
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioState {
    pub source: Option<String>,
    pub playing: bool,
    pub looping: bool,
    pub playback_rate: f64,
    pub current_time: f64,
    pub volume: f64,
}

impl Default for AudioState {
    fn default() -> Self {
        Self {
            source: None,
            playing: false,
            looping: false,
            playback_rate: 1.0,
            current_time: 0.0,
            volume: 1.0,
        }
    }
}

/// Audio device without an output, it only tracks transport state
#[derive(Debug, Clone, Default)]
pub struct HeadlessAudio {
    state: Arc<RwLock<AudioState>>,
}

impl HeadlessAudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the transport state
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned
    pub fn state(&self) -> AudioState {
        self.state.read().unwrap().clone()
    }
}

impl AudioDevice for HeadlessAudio {
    fn set_source(&self, src: &str) {
        self.state.write().unwrap().source = Some(src.to_string());
    }

    fn play(&self) {
        self.state.write().unwrap().playing = true;
    }

    fn pause(&self) {
        self.state.write().unwrap().playing = false;
    }

    fn set_looping(&self, looping: bool) {
        self.state.write().unwrap().looping = looping;
    }

    fn set_playback_rate(&self, rate: f64) {
        self.state.write().unwrap().playback_rate = rate;
    }

    fn playback_rate(&self) -> f64 {
        self.state.read().unwrap().playback_rate
    }

    fn set_current_time(&self, seconds: f64) {
        self.state.write().unwrap().current_time = seconds;
    }

    fn current_time(&self) -> f64 {
        self.state.read().unwrap().current_time
    }

    fn set_volume(&self, volume: f64) {
        self.state.write().unwrap().volume = volume;
    }

    fn volume(&self) -> f64 {
        self.state.read().unwrap().volume
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_round_trip() {
        for percent in [0.0, 7.0, 29.0, 57.0, 100.0, 150.0, 333.0] {
            assert_eq!(unit_to_percent(percent_to_unit(percent)), percent);
        }
        assert!((unit_to_percent(0.123_456) - 12.3456).abs() < 1e-9);
    }

    #[test]
    fn test_headless_defaults() {
        let audio = HeadlessAudio::new();
        assert_eq!(audio.playback_rate(), 1.0);
        assert_eq!(audio.volume(), 1.0);
        assert_eq!(audio.state(), AudioState::default());
    }
}
