//! Configuration of the scene scheduler and the video system. Every field
//! has a default, so partial JSON documents are accepted.

use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::errors::*;
use crate::math::Color;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub scene: SceneParams,
    pub video: VideoParams,
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self> {
        let settings = serde_json::from_str(json)?;
        Ok(settings)
    }

    pub fn load<T: AsRef<Path>>(path: T) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|err| format_err!("Failed to read settings {:?}: {}", path, err))?;

        Self::from_json(&json)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneParams {
    /// The rate at which async updateables are ticked.
    pub fixed_update_hz: u32,
    /// How long stopping a fixed-rate task may wait for its thread.
    pub stop_timeout_ms: u64,
    /// Waits shorter than this are spent yielding instead of sleeping.
    pub sleep_threshold_ms: u64,
    /// Initial capacity of the per-frame render command queue.
    pub queue_capacity: usize,
}

impl Default for SceneParams {
    fn default() -> Self {
        SceneParams {
            fixed_update_hz: 30,
            stop_timeout_ms: 500,
            sleep_threshold_ms: 2,
            queue_capacity: 256,
        }
    }
}

impl SceneParams {
    #[inline]
    pub fn fixed_interval(&self) -> Duration {
        Duration::from_secs(1) / self.fixed_update_hz.max(1)
    }

    #[inline]
    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }

    #[inline]
    pub fn sleep_threshold(&self) -> Duration {
        Duration::from_millis(self.sleep_threshold_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoParams {
    /// Number of texture units shared by all materials.
    pub max_texture_units: usize,
    /// Flat color of the shader which replaces shaders that failed to build.
    pub error_color: Color,
}

impl Default for VideoParams {
    fn default() -> Self {
        VideoParams {
            max_texture_units: 16,
            error_color: Color::yellow(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn intervals() {
        let params = SceneParams::default();
        assert_eq!(params.fixed_interval(), Duration::from_nanos(33_333_333));
        assert_eq!(params.stop_timeout(), Duration::from_millis(500));

        let params = SceneParams {
            fixed_update_hz: 0,
            ..Default::default()
        };
        assert_eq!(params.fixed_interval(), Duration::from_secs(1));
    }
}
