//! The particle cloud.
//!
//! Positions and colours live in flat `f32` buffers laid out exactly as the
//! GPU consumes them (`xyz` / `rgb` per particle), so the renderer can upload
//! them without repacking.

use std::f32::consts::PI;

use glam::Vec3;
use rand::Rng;

use crate::theme::Palette;

const SIZE_MIN: f32 = 0.5;
const SIZE_SPREAD: f32 = 3.0;
const DRIFT_SPREAD: f32 = 0.01;

const WOBBLE_XY: f32 = 0.3;
const WOBBLE_Z: f32 = 0.2;
/// Pointer offset applied to every particle, in world units per NDC unit.
const POINTER_PUSH: f32 = 2.0;

/// Spherical shell the cloud is sampled from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shell {
    pub min_radius: f32,
    pub max_radius: f32,
    pub depth_offset: f32,
}

impl Shell {
    /// Uniform direction on the sphere (inverse-cosine polar angle) at a
    /// uniform radius within the band, pushed back by `depth_offset`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        let radius = self.min_radius + rng.gen::<f32>() * (self.max_radius - self.min_radius);
        let theta = rng.gen::<f32>() * PI * 2.0;
        let phi = (2.0 * rng.gen::<f32>() - 1.0).acos();
        Vec3::new(
            radius * phi.sin() * theta.cos(),
            radius * phi.sin() * theta.sin(),
            radius * phi.cos() + self.depth_offset,
        )
    }
}

pub struct ParticleField {
    anchors: Vec<Vec3>,
    /// Sampled per particle but not integrated; motion is anchor-relative.
    drift: Vec<Vec3>,
    positions: Vec<f32>,
    colors: Vec<f32>,
    sizes: Vec<f32>,
    colors_dirty: bool,
}

impl ParticleField {
    pub fn new<R: Rng + ?Sized>(count: usize, shell: Shell, palette: &Palette, rng: &mut R) -> Self {
        let mut anchors = Vec::with_capacity(count);
        let mut drift = Vec::with_capacity(count);
        let mut positions = Vec::with_capacity(count * 3);
        let mut colors = Vec::with_capacity(count * 3);
        let mut sizes = Vec::with_capacity(count);

        for _ in 0..count {
            let p = shell.sample(rng);
            positions.extend_from_slice(&p.to_array());
            anchors.push(p);

            let c = palette.weighted_particle_color(rng.gen());
            colors.extend_from_slice(&c.to_array());

            sizes.push(rng.gen::<f32>() * SIZE_SPREAD + SIZE_MIN);
            drift.push(Vec3::new(
                (rng.gen::<f32>() - 0.5) * DRIFT_SPREAD,
                (rng.gen::<f32>() - 0.5) * DRIFT_SPREAD,
                (rng.gen::<f32>() - 0.5) * DRIFT_SPREAD,
            ));
        }

        Self {
            anchors,
            drift,
            positions,
            colors,
            sizes,
            colors_dirty: true,
        }
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    pub fn anchors(&self) -> &[Vec3] {
        &self.anchors
    }

    pub fn drift(&self) -> &[Vec3] {
        &self.drift
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }

    /// Rewrites every position from its anchor. Stateless in `time` and
    /// `pointer`: calling twice with the same inputs gives the same buffer.
    pub fn animate(&mut self, time: f32, pointer: (f32, f32)) {
        let push_x = pointer.0 * POINTER_PUSH;
        let push_y = pointer.1 * POINTER_PUSH;
        for (i, (anchor, out)) in self
            .anchors
            .iter()
            .zip(self.positions.chunks_exact_mut(3))
            .enumerate()
        {
            let k = i as f32;
            out[0] = anchor.x + (time + k * 0.01).sin() * WOBBLE_XY + push_x;
            out[1] = anchor.y + (time + k * 0.015).cos() * WOBBLE_XY + push_y;
            out[2] = anchor.z + (time * 0.5 + k * 0.02).sin() * WOBBLE_Z;
        }
    }

    /// Redraws every particle's colour from `palette` with fresh weighted
    /// samples. Previous slot choices are not kept.
    pub fn recolor<R: Rng + ?Sized>(&mut self, palette: &Palette, rng: &mut R) {
        for out in self.colors.chunks_exact_mut(3) {
            out.copy_from_slice(&palette.weighted_particle_color(rng.gen()).to_array());
        }
        self.colors_dirty = true;
    }

    /// Returns whether the colour buffer changed since the last call.
    pub fn take_colors_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.colors_dirty, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Theme;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn field(n: usize) -> ParticleField {
        let shell = Shell { min_radius: 20.0, max_radius: 50.0, depth_offset: -15.0 };
        ParticleField::new(n, shell, &Theme::Dark.palette(), &mut StdRng::seed_from_u64(3))
    }

    #[test]
    fn sizes_and_drift_ranges() {
        let f = field(500);
        assert!(f.sizes().iter().all(|s| (0.5..3.5).contains(s)));
        assert!(f.drift().iter().all(|d| d.abs().max_element() <= 0.005));
    }

    #[test]
    fn animate_is_stateless() {
        let mut f = field(50);
        f.animate(1.23, (0.4, -0.2));
        let first = f.positions().to_vec();
        f.animate(7.0, (0.0, 0.0));
        f.animate(1.23, (0.4, -0.2));
        assert_eq!(first, f.positions());
    }

    #[test]
    fn pointer_offsets_every_particle_alike() {
        let mut f = field(50);
        let (t, px, py) = (2.5_f32, 0.6_f32, -0.3_f32);
        f.animate(t, (px, py));
        for i in [0usize, 7, 49] {
            let a = f.anchors()[i];
            let k = i as f32;
            let expected = [
                a.x + (t + k * 0.01).sin() * 0.3 + px * 2.0,
                a.y + (t + k * 0.015).cos() * 0.3 + py * 2.0,
                a.z + (t * 0.5 + k * 0.02).sin() * 0.2,
            ];
            for (got, want) in f.positions()[i * 3..i * 3 + 3].iter().zip(expected) {
                assert!((got - want).abs() < 1e-5);
            }
        }

        let pushed = f.positions().to_vec();
        f.animate(t, (0.0, 0.0));
        for (p, c) in pushed.chunks_exact(3).zip(f.positions().chunks_exact(3)) {
            assert!((p[0] - c[0] - px * 2.0).abs() < 1e-5);
            assert!((p[1] - c[1] - py * 2.0).abs() < 1e-5);
            assert_eq!(p[2], c[2]);
        }
    }

    #[test]
    fn dirty_flag_is_consumed() {
        let mut f = field(4);
        assert!(f.take_colors_dirty());
        assert!(!f.take_colors_dirty());
        f.recolor(&Theme::Light.palette(), &mut StdRng::seed_from_u64(1));
        assert!(f.take_colors_dirty());
    }
}
