//! Scene tunables.
//!
//! [`SceneConfig::for_tier`] yields the built-in table for a device tier.
//! [`SceneConfig::load`] layers `static/scene.toml` (embedded at compile time)
//! on top: top-level keys apply to every tier, and the `[small_mobile]`,
//! `[mobile]` and `[desktop]` tables apply to one tier only. Missing keys keep
//! their defaults, so the file only needs the values being tuned.

use serde::Deserialize;

use crate::error::SceneError;
use crate::tier::DeviceTier;

/// Override document shipped with the site.
pub const EMBEDDED_CONFIG: &str = include_str!("../static/scene.toml");

#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub tier: DeviceTier,

    // ── Particles ─────────────────────────────────────────────────────────
    pub particle_count: usize,
    pub shell_min_radius: f32,
    pub shell_max_radius: f32,
    pub shell_depth_offset: f32,

    // ── Proximity graph ───────────────────────────────────────────────────
    pub max_connections: usize,
    pub connection_distance: f32,
    pub connection_interval: u64,

    // ── Solids ────────────────────────────────────────────────────────────
    pub torus_knot_segments: Option<u32>,

    // ── Timing / input ────────────────────────────────────────────────────
    pub time_step: f32,
    pub pointer_smoothing: f32,

    // ── Camera / output ───────────────────────────────────────────────────
    pub fov_deg: f32,
    pub camera_z: f32,
    pub antialias: bool,

    // ── Scroll parallax ───────────────────────────────────────────────────
    pub scroll_limit_viewports: f64,
    pub camera_scroll_factor: f32,
    pub cloud_scroll_factor: f32,
}

impl SceneConfig {
    pub fn for_tier(tier: DeviceTier) -> Self {
        Self {
            tier,
            particle_count: tier.particle_count(),
            shell_min_radius: 20.0,
            shell_max_radius: 50.0,
            shell_depth_offset: -15.0,
            max_connections: tier.max_connections(),
            connection_distance: tier.connection_distance(),
            connection_interval: tier.connection_interval(),
            torus_knot_segments: tier.torus_knot_segments(),
            time_step: 0.01,
            pointer_smoothing: crate::pointer::SCENE_SMOOTHING,
            fov_deg: 75.0,
            camera_z: 30.0,
            antialias: tier.antialias(),
            scroll_limit_viewports: 1.5,
            camera_scroll_factor: 0.005,
            cloud_scroll_factor: 0.01,
        }
    }

    /// Tier defaults with `source` layered on top.
    pub fn from_toml(tier: DeviceTier, source: &str) -> Result<Self, SceneError> {
        let file: ConfigFile =
            toml::from_str(source).map_err(|e| SceneError::Config(e.to_string()))?;
        let mut config = Self::for_tier(tier);
        file.shared.apply(&mut config);
        let per_tier = match tier {
            DeviceTier::SmallMobile => &file.small_mobile,
            DeviceTier::Mobile => &file.mobile,
            DeviceTier::Desktop => &file.desktop,
        };
        per_tier.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Tier defaults with the embedded document applied. A broken document
    /// is logged and ignored.
    pub fn load(tier: DeviceTier) -> Self {
        match Self::from_toml(tier, EMBEDDED_CONFIG) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{e}; using built-in defaults");
                Self::for_tier(tier)
            }
        }
    }

    /// Rejects values the frame update cannot run with.
    pub fn validate(&self) -> Result<(), SceneError> {
        if !(self.shell_min_radius >= 0.0 && self.shell_min_radius <= self.shell_max_radius) {
            return Err(SceneError::Config(format!(
                "shell radius band {}..{} is empty",
                self.shell_min_radius, self.shell_max_radius
            )));
        }
        if self.connection_distance.is_nan() || self.connection_distance <= 0.0 {
            return Err(SceneError::Config(format!(
                "connection_distance must be > 0, got {}",
                self.connection_distance
            )));
        }
        if self.connection_interval == 0 {
            return Err(SceneError::Config("connection_interval must be > 0".into()));
        }
        if !(0.0..=1.0).contains(&self.pointer_smoothing) {
            return Err(SceneError::Config("pointer_smoothing must be in 0..=1".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    small_mobile: Overrides,
    mobile: Overrides,
    desktop: Overrides,
    #[serde(flatten)]
    shared: Overrides,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Overrides {
    particle_count: Option<usize>,
    shell_min_radius: Option<f32>,
    shell_max_radius: Option<f32>,
    shell_depth_offset: Option<f32>,
    max_connections: Option<usize>,
    connection_distance: Option<f32>,
    connection_interval: Option<u64>,
    torus_knot: Option<bool>,
    time_step: Option<f32>,
    pointer_smoothing: Option<f32>,
    fov_deg: Option<f32>,
    camera_z: Option<f32>,
    antialias: Option<bool>,
    scroll_limit_viewports: Option<f64>,
    camera_scroll_factor: Option<f32>,
    cloud_scroll_factor: Option<f32>,
}

impl Overrides {
    fn apply(&self, c: &mut SceneConfig) {
        macro_rules! set {
            ($($field:ident),* $(,)?) => {
                $(if let Some(v) = self.$field { c.$field = v; })*
            };
        }
        set!(
            particle_count,
            shell_min_radius,
            shell_max_radius,
            shell_depth_offset,
            max_connections,
            connection_distance,
            connection_interval,
            time_step,
            pointer_smoothing,
            fov_deg,
            camera_z,
            antialias,
            scroll_limit_viewports,
            camera_scroll_factor,
            cloud_scroll_factor,
        );
        match self.torus_knot {
            Some(false) => c.torus_knot_segments = None,
            Some(true) if c.torus_knot_segments.is_none() => c.torus_knot_segments = Some(32),
            _ => {}
        }
    }
}
