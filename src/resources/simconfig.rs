//! Simulation configuration resource.
//!
//! Loaded from an INI file. Every value has a safe default so a missing or
//! partial file still yields a runnable simulation.
//!
//! # Configuration File Format
//!
//! ```ini
//! [simulation]
//! fixed_dt = 0.016666668
//! ppm = 32
//! max_frame_dt = 0.25
//! gravity = -30
//!
//! [culling]
//! cull_time = 1.0
//! camera_width = 16
//! camera_height = 14
//! ```

use std::path::{Path, PathBuf};

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::info;

use crate::error::{SimError, SimResult};

const DEFAULT_FIXED_DT: f32 = 1.0 / 60.0;
const DEFAULT_PPM: f32 = 32.0;
const DEFAULT_MAX_FRAME_DT: f32 = 0.25;
const DEFAULT_GRAVITY: f32 = -30.0;
const DEFAULT_CULL_TIME: f32 = 1.0;
const DEFAULT_CAMERA_WIDTH: f32 = 16.0;
const DEFAULT_CAMERA_HEIGHT: f32 = 14.0;
const DEFAULT_CONFIG_PATH: &str = "./enemysim.ini";

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct SimConfig {
    /// Seconds per simulation tick.
    pub fixed_dt: f32,
    /// World units per tile. Speeds and sizes in definitions are in tiles.
    pub ppm: f32,
    /// Longest real frame the fixed-step accumulator will absorb.
    pub max_frame_dt: f32,
    /// Default gravity in tiles per second squared, scaled by `ppm` at spawn.
    pub gravity: f32,
    /// Out-of-bounds grace period before culling, in seconds.
    pub cull_time: f32,
    /// Camera size in tiles.
    pub camera_width: f32,
    pub camera_height: f32,
    pub config_path: PathBuf,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SimConfig {
    pub fn new() -> Self {
        Self {
            fixed_dt: DEFAULT_FIXED_DT,
            ppm: DEFAULT_PPM,
            max_frame_dt: DEFAULT_MAX_FRAME_DT,
            gravity: DEFAULT_GRAVITY,
            cull_time: DEFAULT_CULL_TIME,
            camera_width: DEFAULT_CAMERA_WIDTH,
            camera_height: DEFAULT_CAMERA_HEIGHT,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Defaults with one world unit per tile, convenient for tests.
    pub fn unscaled() -> Self {
        Self {
            ppm: 1.0,
            ..Self::new()
        }
    }

    /// Load from `config_path`. Missing values keep their current values.
    pub fn load_from_file(&mut self) -> SimResult<()> {
        let mut ini = Ini::new();
        ini.load(&self.config_path)
            .map_err(|e| SimError::Config(format!("failed to load {:?}: {e}", self.config_path)))?;
        self.apply(&ini)?;
        info!(
            "Loaded config: dt={}, ppm={}, max_frame_dt={}, gravity={}, cull_time={}, camera={}x{}",
            self.fixed_dt,
            self.ppm,
            self.max_frame_dt,
            self.gravity,
            self.cull_time,
            self.camera_width,
            self.camera_height
        );
        Ok(())
    }

    /// Parse INI text directly.
    pub fn load_from_str(&mut self, text: &str) -> SimResult<()> {
        let mut ini = Ini::new();
        ini.read(text.to_string()).map_err(SimError::Config)?;
        self.apply(&ini)
    }

    /// Parse every value into a copy and validate it; `self` only changes on
    /// success.
    fn apply(&mut self, ini: &Ini) -> SimResult<()> {
        let float = |section: &str, key: &str| -> SimResult<Option<f32>> {
            ini.getfloat(section, key)
                .map(|v| v.map(|v| v as f32))
                .map_err(|e| SimError::Config(format!("[{section}] {key}: {e}")))
        };
        let mut next = self.clone();
        for (section, key, slot) in [
            ("simulation", "fixed_dt", &mut next.fixed_dt),
            ("simulation", "ppm", &mut next.ppm),
            ("simulation", "max_frame_dt", &mut next.max_frame_dt),
            ("simulation", "gravity", &mut next.gravity),
            ("culling", "cull_time", &mut next.cull_time),
            ("culling", "camera_width", &mut next.camera_width),
            ("culling", "camera_height", &mut next.camera_height),
        ] {
            if let Some(v) = float(section, key)? {
                *slot = v;
            }
        }
        next.validate()?;
        *self = next;
        Ok(())
    }

    /// Check the values the fixed-step loop depends on.
    ///
    /// `fixed_dt` and `ppm` must be finite and positive; `max_frame_dt` must be
    /// finite and at least one tick long.
    pub fn validate(&self) -> SimResult<()> {
        let positive = |key: &str, v: f32| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(SimError::Config(format!(
                    "[simulation] {key} must be a positive number, got {v}"
                )))
            }
        };
        positive("fixed_dt", self.fixed_dt)?;
        positive("ppm", self.ppm)?;
        if !self.max_frame_dt.is_finite() || self.max_frame_dt < self.fixed_dt {
            return Err(SimError::Config(format!(
                "[simulation] max_frame_dt must be at least fixed_dt ({}), got {}",
                self.fixed_dt, self.max_frame_dt
            )));
        }
        Ok(())
    }

    pub fn save_to_file(&self, path: &Path) -> SimResult<()> {
        let mut ini = Ini::new();
        ini.set("simulation", "fixed_dt", Some(self.fixed_dt.to_string()));
        ini.set("simulation", "ppm", Some(self.ppm.to_string()));
        ini.set("simulation", "max_frame_dt", Some(self.max_frame_dt.to_string()));
        ini.set("simulation", "gravity", Some(self.gravity.to_string()));
        ini.set("culling", "cull_time", Some(self.cull_time.to_string()));
        ini.set("culling", "camera_width", Some(self.camera_width.to_string()));
        ini.set("culling", "camera_height", Some(self.camera_height.to_string()));
        ini.write(path)
            .map_err(|e| SimError::Config(format!("failed to save {path:?}: {e}")))?;
        info!("Saved config to {path:?}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut cfg = SimConfig::new();
        cfg.load_from_str("[simulation]\nppm = 16\n").unwrap();
        assert_eq!(cfg.ppm, 16.0);
        assert_eq!(cfg.fixed_dt, DEFAULT_FIXED_DT);
        assert_eq!(cfg.cull_time, DEFAULT_CULL_TIME);
    }

    #[test]
    fn malformed_number_is_config_error() {
        let mut cfg = SimConfig::new();
        let err = cfg
            .load_from_str("[culling]\ncull_time = soon\n")
            .unwrap_err();
        assert!(matches!(err, SimError::Config(_)));
    }

    #[test]
    fn non_positive_dt_rejected() {
        let mut cfg = SimConfig::new();
        assert!(cfg.load_from_str("[simulation]\nfixed_dt = 0\n").is_err());
        assert!(cfg.load_from_str("[simulation]\nfixed_dt = -0.5\n").is_err());
        assert!(cfg.load_from_str("[simulation]\nfixed_dt = NaN\n").is_err());
        assert_eq!(cfg, SimConfig::new());
    }

    #[test]
    fn rejected_file_changes_nothing() {
        let mut cfg = SimConfig::new();
        let err = cfg
            .load_from_str("[simulation]\nppm = 16\nfixed_dt = 0\n")
            .unwrap_err();
        assert!(matches!(err, SimError::Config(_)));
        assert_eq!(cfg.ppm, DEFAULT_PPM);
        assert_eq!(cfg.fixed_dt, DEFAULT_FIXED_DT);
    }

    #[test]
    fn max_frame_dt_must_cover_a_tick() {
        let mut cfg = SimConfig::new();
        assert!(cfg.load_from_str("[simulation]\nmax_frame_dt = -1\n").is_err());
        assert!(cfg.load_from_str("[simulation]\nmax_frame_dt = 0.001\n").is_err());
        assert!(cfg.load_from_str("[simulation]\nmax_frame_dt = inf\n").is_err());
        assert_eq!(cfg.max_frame_dt, DEFAULT_MAX_FRAME_DT);

        cfg.load_from_str("[simulation]\nfixed_dt = 0.5\nmax_frame_dt = 0.5\n")
            .unwrap();
        assert_eq!(cfg.max_frame_dt, 0.5);
    }

    #[test]
    fn missing_file_is_error() {
        let mut cfg = SimConfig::with_path("/definitely/not/here.ini");
        assert!(matches!(cfg.load_from_file(), Err(SimError::Config(_))));
    }
}
