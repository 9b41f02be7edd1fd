//! Device tier classification.
//!
//! The tier is derived once from the viewport width and scales everything that
//! costs frame time: particle count, connection cap, recompute interval and the
//! pixel-ratio ceiling handed to the WebGL context.

/// Viewport widths below this are treated as small phones.
pub const SMALL_MOBILE_MAX_WIDTH: f64 = 480.0;
/// Viewport widths below this are treated as phones / small tablets.
pub const MOBILE_MAX_WIDTH: f64 = 768.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeviceTier {
    SmallMobile,
    Mobile,
    Desktop,
}

impl DeviceTier {
    pub fn classify(viewport_width: f64) -> Self {
        if viewport_width < SMALL_MOBILE_MAX_WIDTH {
            DeviceTier::SmallMobile
        } else if viewport_width < MOBILE_MAX_WIDTH {
            DeviceTier::Mobile
        } else {
            DeviceTier::Desktop
        }
    }

    /// True for both phone tiers.
    pub fn is_mobile(self) -> bool {
        !matches!(self, DeviceTier::Desktop)
    }

    pub fn particle_count(self) -> usize {
        match self {
            DeviceTier::SmallMobile => 150,
            DeviceTier::Mobile => 300,
            DeviceTier::Desktop => 800,
        }
    }

    pub fn max_connections(self) -> usize {
        match self {
            DeviceTier::SmallMobile => 20,
            DeviceTier::Mobile => 50,
            DeviceTier::Desktop => 150,
        }
    }

    /// Pairs closer than this are joined by a line.
    pub fn connection_distance(self) -> f32 {
        match self {
            DeviceTier::SmallMobile => 10.0,
            _ => 8.0,
        }
    }

    /// Frames between two proximity-graph rebuilds.
    pub fn connection_interval(self) -> u64 {
        if self.is_mobile() {
            90
        } else {
            30
        }
    }

    pub fn max_pixel_ratio(self) -> f64 {
        if self.is_mobile() {
            1.5
        } else {
            2.0
        }
    }

    pub fn antialias(self) -> bool {
        !self.is_mobile()
    }

    /// Value for the `powerPreference` context attribute.
    pub fn power_preference(self) -> &'static str {
        if self.is_mobile() {
            "low-power"
        } else {
            "high-performance"
        }
    }

    /// Tubular segment count of the torus knot, or `None` when the tier
    /// skips it entirely.
    pub fn torus_knot_segments(self) -> Option<u32> {
        match self {
            DeviceTier::SmallMobile => None,
            DeviceTier::Mobile => Some(32),
            DeviceTier::Desktop => Some(64),
        }
    }

    /// Device pixel ratio clamped to this tier's ceiling.
    pub fn clamp_pixel_ratio(self, device_pixel_ratio: f64) -> f64 {
        device_pixel_ratio.min(self.max_pixel_ratio())
    }
}
