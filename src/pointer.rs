//! Pointer state in normalised device coordinates.

/// Per-frame smoothing factor applied to the scene pointer.
pub const SCENE_SMOOTHING: f32 = 0.05;
/// Smoothing factor of the decorative cursor ring.
pub const CURSOR_RING_SMOOTHING: f32 = 0.15;

/// Degrees of tilt mapped to a full NDC unit.
const ORIENTATION_RANGE_DEG: f64 = 30.0;
/// Resting forward tilt of a hand-held phone.
const ORIENTATION_BETA_REST_DEG: f64 = 45.0;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerState {
    pub x: f32,
    pub y: f32,
    pub target_x: f32,
    pub target_y: f32,
}

impl PointerState {
    pub fn set_target(&mut self, x: f32, y: f32) {
        self.target_x = x;
        self.target_y = y;
    }

    /// Targets the pointer at a client-space position inside a viewport of
    /// `width` x `height` CSS pixels. Y is flipped so up is positive.
    pub fn set_target_from_client(&mut self, client_x: f64, client_y: f64, width: f64, height: f64) {
        let (x, y) = client_to_ndc(client_x, client_y, width, height);
        self.set_target(x, y);
    }

    /// Targets the pointer from device tilt. Ignored unless both angles are
    /// reported.
    pub fn set_target_from_orientation(&mut self, gamma: Option<f64>, beta: Option<f64>) {
        if let (Some(gamma), Some(beta)) = (gamma, beta) {
            let x = (gamma / ORIENTATION_RANGE_DEG).clamp(-1.0, 1.0);
            let y = ((beta - ORIENTATION_BETA_REST_DEG) / ORIENTATION_RANGE_DEG).clamp(-1.0, 1.0);
            self.set_target(x as f32, y as f32);
        }
    }

    /// One exponential smoothing step toward the current target.
    pub fn smooth(&mut self, factor: f32) {
        self.x += (self.target_x - self.x) * factor;
        self.y += (self.target_y - self.y) * factor;
    }

    pub fn distance_to_target(&self) -> f32 {
        ((self.target_x - self.x).powi(2) + (self.target_y - self.y).powi(2)).sqrt()
    }
}

pub fn client_to_ndc(client_x: f64, client_y: f64, width: f64, height: f64) -> (f32, f32) {
    let w = width.max(1.0);
    let h = height.max(1.0);
    ((client_x / w * 2.0 - 1.0) as f32, (-(client_y / h) * 2.0 + 1.0) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_corners_map_to_ndc() {
        assert_eq!(client_to_ndc(0.0, 0.0, 800.0, 600.0), (-1.0, 1.0));
        assert_eq!(client_to_ndc(800.0, 600.0, 800.0, 600.0), (1.0, -1.0));
        assert_eq!(client_to_ndc(400.0, 300.0, 800.0, 600.0), (0.0, 0.0));
    }

    #[test]
    fn orientation_needs_both_angles() {
        let mut p = PointerState::default();
        p.set_target_from_orientation(Some(15.0), None);
        assert_eq!((p.target_x, p.target_y), (0.0, 0.0));
        p.set_target_from_orientation(Some(90.0), Some(60.0));
        assert_eq!(p.target_x, 1.0);
        assert!((p.target_y - 0.5).abs() < 1e-6);
    }
}
