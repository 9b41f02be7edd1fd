//! Scene context: owns every piece of mutable state and advances it one
//! display frame at a time.

use glam::{EulerRot, Mat4, Vec3};
use rand::rngs::StdRng;

use crate::camera::{PerspectiveCamera, Viewport};
use crate::config::SceneConfig;
use crate::connections::ConnectionLines;
use crate::error::SceneError;
use crate::particles::{ParticleField, Shell};
use crate::pointer::PointerState;
use crate::solids::{standard_solids, FloatingSolid};
use crate::theme::{Palette, Rgb, Theme, ThemeObserver};

/// Pointer-driven rotation of the whole cloud, radians per NDC unit.
const CLOUD_YAW: f32 = 0.3;
const CLOUD_PITCH: f32 = 0.2;

pub struct SceneContext {
    config: SceneConfig,
    viewport: Viewport,
    theme: Theme,
    palette: Palette,
    camera: PerspectiveCamera,
    particles: ParticleField,
    /// Euler angles of the cloud (x = pitch, y = yaw).
    cloud_rotation: Vec3,
    cloud_offset_y: f32,
    solids: Vec<FloatingSolid>,
    connections: ConnectionLines,
    pointer: PointerState,
    scroll_y: f64,
    time: f32,
    frame: u64,
    rng: StdRng,
}

impl SceneContext {
    /// Builds the scene and runs the first connection pass. Fails when
    /// `config` does not validate.
    pub fn new(
        config: SceneConfig,
        viewport: Viewport,
        theme: Theme,
        mut rng: StdRng,
    ) -> Result<Self, SceneError> {
        config.validate()?;
        let palette = theme.palette();
        let shell = Shell {
            min_radius: config.shell_min_radius,
            max_radius: config.shell_max_radius,
            depth_offset: config.shell_depth_offset,
        };
        let particles = ParticleField::new(config.particle_count, shell, &palette, &mut rng);
        let solids = standard_solids(config.torus_knot_segments, &palette);
        let camera = PerspectiveCamera::new(config.fov_deg, viewport.aspect(), config.camera_z);

        let mut scene = Self {
            config,
            viewport,
            theme,
            palette,
            camera,
            particles,
            cloud_rotation: Vec3::ZERO,
            cloud_offset_y: 0.0,
            solids,
            connections: ConnectionLines::new(),
            pointer: PointerState::default(),
            scroll_y: 0.0,
            time: 0.0,
            frame: 0,
            rng,
        };
        scene.recompute_connections();
        log::debug!(
            "scene ready: {:?}, {} particles, {} solids, {} initial connections",
            scene.config.tier,
            scene.particles.len(),
            scene.solids.len(),
            scene.connections.len()
        );
        Ok(scene)
    }

    /// Advances the scene by exactly one frame.
    pub fn update(&mut self) {
        self.time += self.config.time_step;
        self.frame += 1;

        self.pointer.smooth(self.config.pointer_smoothing);
        let pointer = (self.pointer.x, self.pointer.y);

        self.cloud_rotation.y = pointer.0 * CLOUD_YAW;
        self.cloud_rotation.x = pointer.1 * CLOUD_PITCH;

        self.particles.animate(self.time, pointer);

        for solid in &mut self.solids {
            solid.update(self.time, pointer);
        }

        if self.frame % self.config.connection_interval == 0 {
            self.recompute_connections();
        }

        self.apply_scroll_parallax();
    }

    fn recompute_connections(&mut self) {
        self.connections.recompute(
            self.particles.positions(),
            self.config.connection_distance,
            self.config.max_connections,
        );
    }

    /// Past the limit the last applied offsets are kept.
    fn apply_scroll_parallax(&mut self) {
        if self.scroll_y < self.viewport.height * self.config.scroll_limit_viewports {
            let scroll = self.scroll_y as f32;
            self.camera.position.y = -scroll * self.config.camera_scroll_factor;
            self.cloud_offset_y = scroll * self.config.cloud_scroll_factor;
        }
    }

    pub fn pointer_mut(&mut self) -> &mut PointerState {
        &mut self.pointer
    }

    pub fn set_scroll(&mut self, scroll_y: f64) {
        self.scroll_y = scroll_y;
    }

    /// Applies a new viewport: aspect, projection and pixel-ratio ceiling.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.camera.set_aspect(viewport.aspect());
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.palette = theme.palette();
        for solid in &mut self.solids {
            solid.apply_palette(&self.palette);
        }
        self.particles.recolor(&self.palette, &mut self.rng);
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.viewport.pixel_ratio()
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Colour of the connection lines.
    pub fn line_color(&self) -> Rgb {
        self.palette.particle[0]
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn particles(&self) -> &ParticleField {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut ParticleField {
        &mut self.particles
    }

    pub fn solids(&self) -> &[FloatingSolid] {
        &self.solids
    }

    pub fn connections(&self) -> &ConnectionLines {
        &self.connections
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    pub fn cloud_rotation(&self) -> Vec3 {
        self.cloud_rotation
    }

    pub fn cloud_offset_y(&self) -> f32 {
        self.cloud_offset_y
    }

    /// Model matrix of the point cloud.
    pub fn cloud_matrix(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(0.0, self.cloud_offset_y, 0.0))
            * Mat4::from_euler(EulerRot::XYZ, self.cloud_rotation.x, self.cloud_rotation.y, 0.0)
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }
}

impl ThemeObserver for SceneContext {
    fn theme_changed(&mut self, theme: Theme) {
        self.set_theme(theme);
    }
}
