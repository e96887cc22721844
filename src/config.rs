use std::io::Read;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use cgmath::Deg;
use serde::Deserialize;

use crate::camera::{ZoomController, DEFAULT_FOV, DEFAULT_WHEEL_SCALE, MAX_FOV, MIN_FOV};
use crate::retry::RetryPolicy;
use crate::source::SourceReference;

pub const DEFAULT_SOURCE: &str = "https://cdn.aframe.io/360-image-gallery-boilerplate/img/sechelt.jpg";

/// Viewer settings. Every field is optional in the JSON form.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    /// Panorama shown right after mount.
    pub default_source: String,
    /// Camera yaw applied while the default panorama is shown.
    pub default_yaw_deg: f32,
    pub initial_fov_deg: f32,
    pub min_fov_deg: f32,
    pub max_fov_deg: f32,
    pub wheel_scale: f32,
    pub poll_interval_ms: u64,
    pub load_timeout_ms: u64,
    pub startup_grace_ms: u64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            default_source: DEFAULT_SOURCE.to_string(),
            default_yaw_deg: 50.,
            initial_fov_deg: DEFAULT_FOV.0,
            min_fov_deg: MIN_FOV.0,
            max_fov_deg: MAX_FOV.0,
            wheel_scale: DEFAULT_WHEEL_SCALE,
            poll_interval_ms: 200,
            load_timeout_ms: 5_000,
            startup_grace_ms: 800,
        }
    }
}

impl ViewerConfig {
    pub fn from_json<R: Read>(reader: R) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("opening viewer config {}", path.display()))?;
        Self::from_json(std::io::BufReader::new(file))
            .with_context(|| format!("parsing viewer config {}", path.display()))
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.min_fov_deg > 0. && self.min_fov_deg <= self.max_fov_deg && self.max_fov_deg < 180.,
            "field of view range {}..{} is invalid",
            self.min_fov_deg,
            self.max_fov_deg
        );
        anyhow::ensure!(self.poll_interval_ms > 0, "poll_interval_ms must be positive");
        anyhow::ensure!(!self.default_source.trim().is_empty(), "default_source is empty");
        Ok(())
    }

    pub fn default_source(&self) -> SourceReference {
        SourceReference::new(self.default_source.as_str())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            Duration::from_millis(self.poll_interval_ms),
            Duration::from_millis(self.load_timeout_ms),
        )
    }

    pub fn startup_grace(&self) -> Duration {
        Duration::from_millis(self.startup_grace_ms)
    }

    pub fn zoom_controller(&self) -> ZoomController {
        ZoomController::new(
            Deg(self.initial_fov_deg),
            Deg(self.min_fov_deg),
            Deg(self.max_fov_deg),
            self.wheel_scale,
        )
    }
}
