use glam::{Mat4, Vec3};

use crate::tier::DeviceTier;

const NEAR: f32 = 0.1;
const FAR: f32 = 1000.0;

/// CSS size of the viewport plus the device pixel ratio it reports.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub device_pixel_ratio: f64,
}

impl Viewport {
    /// Zero or negative dimensions (minimised windows, detached iframes) are
    /// clamped to one pixel so the projection stays finite.
    pub fn new(width: f64, height: f64, device_pixel_ratio: f64) -> Self {
        Self {
            width: sanitize(width),
            height: sanitize(height),
            device_pixel_ratio: if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
                device_pixel_ratio
            } else {
                1.0
            },
        }
    }

    pub fn tier(&self) -> DeviceTier {
        DeviceTier::classify(self.width)
    }

    pub fn aspect(&self) -> f32 {
        (self.width / self.height) as f32
    }

    /// Pixel ratio after the tier's ceiling.
    pub fn pixel_ratio(&self) -> f64 {
        self.tier().clamp_pixel_ratio(self.device_pixel_ratio)
    }

    /// Backing-store size of the canvas in device pixels.
    pub fn drawing_buffer_size(&self) -> (u32, u32) {
        let ratio = self.pixel_ratio();
        (
            (self.width * ratio).round().max(1.0) as u32,
            (self.height * ratio).round().max(1.0) as u32,
        )
    }
}

fn sanitize(v: f64) -> f64 {
    if v.is_finite() {
        v.max(1.0)
    } else {
        1.0
    }
}

#[derive(Clone, Debug)]
pub struct PerspectiveCamera {
    pub fov_deg: f32,
    pub aspect: f32,
    pub position: Vec3,
    projection: Mat4,
}

impl PerspectiveCamera {
    pub fn new(fov_deg: f32, aspect: f32, z: f32) -> Self {
        let mut camera = Self {
            fov_deg,
            aspect,
            position: Vec3::new(0.0, 0.0, z),
            projection: Mat4::IDENTITY,
        };
        camera.update_projection();
        camera
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.update_projection();
    }

    fn update_projection(&mut self) {
        self.projection = Mat4::perspective_rh_gl(self.fov_deg.to_radians(), self.aspect, NEAR, FAR);
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// The camera never rotates, so the view is a plain translation.
    pub fn view(&self) -> Mat4 {
        Mat4::from_translation(-self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_viewport_is_clamped() {
        let vp = Viewport::new(0.0, -20.0, f64::NAN);
        assert_eq!((vp.width, vp.height, vp.device_pixel_ratio), (1.0, 1.0, 1.0));
        assert!(vp.aspect().is_finite());
        let cam = PerspectiveCamera::new(75.0, vp.aspect(), 30.0);
        assert!(cam.projection().is_finite());
    }

    #[test]
    fn buffer_size_uses_clamped_ratio() {
        assert_eq!(Viewport::new(1024.0, 768.0, 3.0).drawing_buffer_size(), (2048, 1536));
        assert_eq!(Viewport::new(400.0, 800.0, 3.0).drawing_buffer_size(), (600, 1200));
    }
}
