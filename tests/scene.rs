use glam::Vec3;
use portfolio_scene::camera::Viewport;
use portfolio_scene::clock::{ElapsedClock, FixedStepClock, FrameLoop, FrameSink, DISPLAY_FRAME_MS};
use portfolio_scene::particles::{ParticleField, Shell};
use portfolio_scene::pointer::{PointerState, SCENE_SMOOTHING};
use portfolio_scene::solids::SolidKind;
use portfolio_scene::theme::{ColorSlot, Palette, Theme};
use portfolio_scene::{DeviceTier, SceneConfig, SceneContext, SceneError};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn scene_for(width: f64, height: f64, theme: Theme, seed: u64) -> SceneContext {
    let viewport = Viewport::new(width, height, 1.0);
    let config = SceneConfig::for_tier(viewport.tier());
    SceneContext::new(config, viewport, theme, StdRng::seed_from_u64(seed)).unwrap()
}

fn distance(a: &[f32], b: &[f32]) -> f32 {
    Vec3::from_slice(a).distance(Vec3::from_slice(b))
}

fn assert_connections_valid(scene: &SceneContext) {
    let cfg = scene.config();
    let lines = scene.connections();
    assert!(lines.len() <= cfg.max_connections);
    if let Some(segments) = lines.segments() {
        for seg in segments.chunks_exact(6) {
            assert!(distance(&seg[0..3], &seg[3..6]) < cfg.connection_distance);
        }
    }
}

#[test]
fn tier_table() {
    let table = [
        (DeviceTier::SmallMobile, 150, 20),
        (DeviceTier::Mobile, 300, 50),
        (DeviceTier::Desktop, 800, 150),
    ];
    for (tier, particles, cap) in table {
        assert_eq!(tier.particle_count(), particles);
        assert_eq!(tier.max_connections(), cap);
        let cfg = SceneConfig::for_tier(tier);
        assert_eq!((cfg.particle_count, cfg.max_connections), (particles, cap));
    }
    assert_eq!(DeviceTier::SmallMobile.connection_distance(), 10.0);
    assert_eq!(DeviceTier::Mobile.connection_interval(), 90);
    assert_eq!(DeviceTier::Desktop.connection_interval(), 30);
}

#[test]
fn particles_start_inside_shell() {
    let scene = scene_for(1024.0, 768.0, Theme::Dark, 11);
    let centre = Vec3::new(0.0, 0.0, -15.0);
    for anchor in scene.particles().anchors() {
        let r = anchor.distance(centre);
        assert!((20.0 - 1e-3..50.0 + 1e-3).contains(&r), "radius {r}");
    }
}

#[test]
fn color_weights_follow_40_35_25() {
    let palette = Theme::Dark.palette();
    let shell = Shell { min_radius: 20.0, max_radius: 50.0, depth_offset: -15.0 };
    let n = 60_000;
    let field = ParticleField::new(n, shell, &palette, &mut StdRng::seed_from_u64(5));

    let mut counts = [0usize; 3];
    for rgb in field.colors().chunks_exact(3) {
        let slot = palette
            .particle
            .iter()
            .position(|c| c.to_array() == [rgb[0], rgb[1], rgb[2]])
            .expect("colour outside palette");
        counts[slot] += 1;
    }
    for (count, expected) in counts.iter().zip([0.40, 0.35, 0.25]) {
        let share = *count as f64 / n as f64;
        assert!((share - expected).abs() < 0.015, "share {share} vs {expected}");
    }
}

#[test]
fn connections_respect_cap_and_threshold_every_pass() {
    for (w, h) in [(1024.0, 768.0), (600.0, 900.0), (320.0, 480.0)] {
        let mut frames = FrameLoop::new(scene_for(w, h, Theme::Dark, 42), FixedStepClock, ());
        assert_connections_valid(frames.scene());
        for _ in 0..200 {
            frames.scene_mut().pointer_mut().set_target(0.7, -0.4);
            frames.run_frames(1);
            assert_connections_valid(frames.scene());
        }
    }
}

#[test]
fn connections_rebuild_on_interval() {
    let mut frames = FrameLoop::new(scene_for(1024.0, 768.0, Theme::Dark, 1), FixedStepClock, ());
    let initial = frames.scene().connections().generation();
    frames.run_frames(29);
    assert_eq!(frames.scene().connections().generation(), initial);
    frames.run_frames(1);
    assert_eq!(frames.scene().connections().generation(), initial + 1);

    let mut mobile = FrameLoop::new(scene_for(600.0, 900.0, Theme::Dark, 1), FixedStepClock, ());
    mobile.run_frames(89);
    assert_eq!(mobile.scene().connections().generation(), initial);
    mobile.run_frames(1);
    assert_eq!(mobile.scene().connections().generation(), initial + 1);
}

#[test]
fn pointer_smoothing_converges_monotonically() {
    let mut p = PointerState::default();
    p.set_target(0.8, -0.6);
    let mut last = p.distance_to_target();
    for _ in 0..100 {
        p.smooth(SCENE_SMOOTHING);
        let d = p.distance_to_target();
        assert!(d < last);
        last = d;
    }
}

#[test]
fn scene_pointer_drives_cloud_rotation() {
    let mut scene = scene_for(1024.0, 768.0, Theme::Dark, 2);
    scene.pointer_mut().set_target(1.0, 1.0);
    scene.update();
    let rot = scene.cloud_rotation();
    assert!((rot.y - 0.05 * 0.3).abs() < 1e-6);
    assert!((rot.x - 0.05 * 0.2).abs() < 1e-6);
}

#[test]
fn theme_switch_recolours_solids_and_keeps_particles() {
    let mut scene = scene_for(1024.0, 768.0, Theme::Dark, 8);
    scene.update();
    let positions = scene.particles().positions().to_vec();
    let count = scene.particles().len();

    scene.set_theme(Theme::Light);
    let palette = Theme::Light.palette();
    let expected = [
        ColorSlot::Wireframe,
        ColorSlot::Particle2,
        ColorSlot::Particle3,
        ColorSlot::Particle1,
        ColorSlot::Particle2,
    ];
    assert_eq!(scene.solids().len(), 5);
    for (solid, slot) in scene.solids().iter().zip(expected) {
        assert_eq!(solid.color_slot, slot);
        assert_eq!(solid.color, palette.color(slot));
    }
    assert_eq!(scene.particles().len(), count);
    assert_eq!(scene.particles().positions(), positions.as_slice());
    assert_eq!(scene.line_color(), palette.particle[0]);
    for rgb in scene.particles().colors().chunks_exact(3) {
        assert!(palette.particle.iter().any(|c| c.to_array() == [rgb[0], rgb[1], rgb[2]]));
    }
}

#[test]
fn theme_observer_is_the_scene_hook() {
    use portfolio_scene::ThemeObserver;
    let mut scene = scene_for(1024.0, 768.0, Theme::Light, 8);
    scene.theme_changed(Theme::Dark);
    assert_eq!(scene.theme(), Theme::Dark);
    assert_eq!(scene.solids()[0].color, Theme::Dark.palette().wireframe);
}

#[test]
fn scroll_parallax_freezes_past_limit() {
    let mut scene = scene_for(1024.0, 768.0, Theme::Dark, 4);
    scene.set_scroll(1000.0);
    scene.update();
    let cam_y = scene.camera().position.y;
    let cloud_y = scene.cloud_offset_y();
    assert!((cam_y + 5.0).abs() < 1e-4);
    assert!((cloud_y - 10.0).abs() < 1e-4);

    // 1.5 * 768 = 1152
    for y in [1152.0, 2000.0, 5000.0] {
        scene.set_scroll(y);
        scene.update();
        assert_eq!(scene.camera().position.y, cam_y);
        assert_eq!(scene.cloud_offset_y(), cloud_y);
    }

    scene.set_scroll(0.0);
    scene.update();
    assert_eq!(scene.camera().position.y, 0.0);
}

#[test]
fn resize_reclassifies_pixel_ratio_and_aspect() {
    let mut scene = scene_for(1024.0, 768.0, Theme::Dark, 4);
    scene.resize(Viewport::new(400.0, 800.0, 3.0));
    assert_eq!(scene.pixel_ratio(), 1.5);
    assert!((scene.camera().aspect - 0.5).abs() < 1e-6);
    // Counts are fixed at construction.
    assert_eq!(scene.particles().len(), 800);

    scene.resize(Viewport::new(0.0, 0.0, 2.0));
    assert!(scene.camera().projection().is_finite());
}

#[derive(Default)]
struct Recorder {
    frames: Vec<u64>,
    dirty: usize,
}

impl FrameSink for Recorder {
    fn present(&mut self, scene: &mut SceneContext) {
        self.frames.push(scene.frame());
        if scene.particles_mut().take_colors_dirty() {
            self.dirty += 1;
        }
    }
}

#[test]
fn frame_loop_steps_deterministically() {
    let run = || {
        let mut frames = FrameLoop::new(scene_for(1024.0, 768.0, Theme::Dark, 99), FixedStepClock, Recorder::default());
        frames.scene_mut().pointer_mut().set_target(-0.3, 0.5);
        frames.run_frames(45);
        frames.scene_mut().set_theme(Theme::Light);
        frames.run_frames(5);
        (frames.scene().particles().positions().to_vec(), frames.scene().time(), frames)
    };
    let (a, time, frames) = run();
    let (b, _, _) = run();
    assert_eq!(a, b);
    assert!((time - 0.5).abs() < 1e-4);
    assert_eq!(frames.sink().frames, (1..=50).collect::<Vec<u64>>());
    // Initial upload plus the theme switch.
    assert_eq!(frames.sink().dirty, 2);
}

#[test]
fn desktop_end_to_end() {
    let mut frames = FrameLoop::new(scene_for(1024.0, 768.0, Theme::Dark, 7), FixedStepClock, ());
    let scene = frames.scene();
    assert_eq!(scene.config().tier, DeviceTier::Desktop);
    assert_eq!(scene.particles().len(), 800);
    assert!(scene.connections().len() <= 150);
    assert_eq!(scene.solids().len(), 5);
    assert!(matches!(
        scene.solids()[4].kind,
        SolidKind::TorusKnot { tubular_segments: 64, .. }
    ));
    frames.run_frames(60);
    assert_connections_valid(frames.scene());
}

#[test]
fn small_mobile_end_to_end() {
    let scene = scene_for(320.0, 480.0, Theme::Light, 7);
    assert_eq!(scene.config().tier, DeviceTier::SmallMobile);
    assert_eq!(scene.particles().len(), 150);
    assert!(scene.connections().len() <= 20);
    assert_eq!(scene.solids().len(), 4);
    assert!(scene
        .solids()
        .iter()
        .all(|s| !matches!(s.kind, SolidKind::TorusKnot { .. })));
    assert_eq!(Palette::weighted_slot(0.5), 1);
}

#[test]
fn scene_rejects_unusable_config() {
    let viewport = Viewport::new(1024.0, 768.0, 1.0);
    let mut zero_interval = SceneConfig::for_tier(viewport.tier());
    zero_interval.connection_interval = 0;
    let mut negative_distance = SceneConfig::for_tier(viewport.tier());
    negative_distance.connection_distance = -8.0;
    for config in [zero_interval, negative_distance] {
        let result = SceneContext::new(config, viewport, Theme::Dark, StdRng::seed_from_u64(1));
        assert!(matches!(result, Err(SceneError::Config(_))));
    }
}

#[test]
fn elapsed_clock_keeps_pace_on_fast_displays() {
    let mut fixed = FrameLoop::new(scene_for(1024.0, 768.0, Theme::Dark, 5), FixedStepClock, ());
    let mut elapsed = FrameLoop::new(scene_for(1024.0, 768.0, Theme::Dark, 5), ElapsedClock::default(), ());
    fixed.run_frames(60);
    // Just under one second of 120 Hz callbacks.
    for i in 0..119 {
        elapsed.tick(f64::from(i) * DISPLAY_FRAME_MS / 2.0 + DISPLAY_FRAME_MS / 4.0);
    }
    assert_eq!(fixed.scene().frame(), elapsed.scene().frame());
    assert_eq!(fixed.scene().particles().positions(), elapsed.scene().particles().positions());
}
