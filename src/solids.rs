//! Floating wireframe solids and their edge geometry.

use std::collections::{HashMap, HashSet};
use std::f32::consts::PI;

use glam::{EulerRot, Mat4, Vec3};

use crate::theme::{ColorSlot, Palette, Rgb};

/// Share of the smoothed pointer added to each solid per frame.
const POINTER_PARALLAX: f32 = 0.02;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SolidKind {
    Icosahedron { radius: f32, detail: u32 },
    Torus { radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32 },
    Octahedron { radius: f32 },
    Dodecahedron { radius: f32 },
    TorusKnot { radius: f32, tube: f32, tubular_segments: u32, radial_segments: u32, p: u32, q: u32 },
}

impl SolidKind {
    pub fn wireframe(&self) -> Wireframe {
        match *self {
            SolidKind::Icosahedron { radius, detail } => icosahedron(radius, detail),
            SolidKind::Torus { radius, tube, radial_segments, tubular_segments } => {
                torus(radius, tube, radial_segments, tubular_segments)
            }
            SolidKind::Octahedron { radius } => octahedron(radius),
            SolidKind::Dodecahedron { radius } => dodecahedron(radius),
            SolidKind::TorusKnot { radius, tube, tubular_segments, radial_segments, p, q } => {
                torus_knot(radius, tube, tubular_segments, radial_segments, p, q)
            }
        }
    }
}

/// Line-list geometry: `vertices` is flat `xyz`, `indices` holds vertex
/// pairs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Wireframe {
    pub vertices: Vec<f32>,
    pub indices: Vec<u16>,
}

impl Wireframe {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn edge_count(&self) -> usize {
        self.indices.len() / 2
    }

    fn from_triangles(points: &[Vec3], triangles: &[[usize; 3]]) -> Self {
        let mut seen = HashSet::new();
        let mut indices = Vec::new();
        for tri in triangles {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                let key = (a.min(b), a.max(b));
                if a != b && seen.insert(key) {
                    indices.push(key.0 as u16);
                    indices.push(key.1 as u16);
                }
            }
        }
        Self {
            vertices: points.iter().flat_map(|p| p.to_array()).collect(),
            indices,
        }
    }
}

fn icosahedron_base() -> (Vec<Vec3>, Vec<[usize; 3]>) {
    let t = (1.0 + 5f32.sqrt()) / 2.0;
    let points = [
        (-1.0, t, 0.0), (1.0, t, 0.0), (-1.0, -t, 0.0), (1.0, -t, 0.0),
        (0.0, -1.0, t), (0.0, 1.0, t), (0.0, -1.0, -t), (0.0, 1.0, -t),
        (t, 0.0, -1.0), (t, 0.0, 1.0), (-t, 0.0, -1.0), (-t, 0.0, 1.0),
    ]
    .iter()
    .map(|&(x, y, z)| Vec3::new(x, y, z).normalize())
    .collect();
    let faces = vec![
        [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
        [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
        [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
        [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
    ];
    (points, faces)
}

/// Icosahedron whose faces are split four ways `detail` times, with every
/// vertex projected back onto the sphere.
fn icosahedron(radius: f32, detail: u32) -> Wireframe {
    let (mut points, mut faces) = icosahedron_base();
    for _ in 0..detail {
        let mut midpoints: HashMap<(usize, usize), usize> = HashMap::new();
        let mut midpoint = |a: usize, b: usize, points: &mut Vec<Vec3>| -> usize {
            *midpoints.entry((a.min(b), a.max(b))).or_insert_with(|| {
                let mid = ((points[a] + points[b]) * 0.5).normalize();
                points.push(mid);
                points.len() - 1
            })
        };
        let mut next = Vec::with_capacity(faces.len() * 4);
        for [a, b, c] in faces {
            let ab = midpoint(a, b, &mut points);
            let bc = midpoint(b, c, &mut points);
            let ca = midpoint(c, a, &mut points);
            next.extend([[a, ab, ca], [b, bc, ab], [c, ca, bc], [ab, bc, ca]]);
        }
        faces = next;
    }
    let scaled: Vec<Vec3> = points.iter().map(|p| *p * radius).collect();
    Wireframe::from_triangles(&scaled, &faces)
}

fn octahedron(radius: f32) -> Wireframe {
    let points = [Vec3::X, -Vec3::X, Vec3::Y, -Vec3::Y, Vec3::Z, -Vec3::Z].map(|p| p * radius);
    let faces = [
        [0, 2, 4], [0, 4, 3], [0, 3, 5], [0, 5, 2],
        [1, 2, 5], [1, 5, 3], [1, 3, 4], [1, 4, 2],
    ];
    Wireframe::from_triangles(&points, &faces)
}

/// Dual of the icosahedron: one vertex per icosahedron face, joined where
/// two faces share an edge.
fn dodecahedron(radius: f32) -> Wireframe {
    let (ico_points, ico_faces) = icosahedron_base();
    let vertices: Vec<f32> = ico_faces
        .iter()
        .flat_map(|f| {
            let c = (ico_points[f[0]] + ico_points[f[1]] + ico_points[f[2]]).normalize() * radius;
            c.to_array()
        })
        .collect();

    let mut indices = Vec::with_capacity(60);
    for i in 0..ico_faces.len() {
        for j in (i + 1)..ico_faces.len() {
            let shared = ico_faces[i].iter().filter(|v| ico_faces[j].contains(v)).count();
            if shared == 2 {
                indices.push(i as u16);
                indices.push(j as u16);
            }
        }
    }
    Wireframe { vertices, indices }
}

/// Grid triangles over a `(rows + 1) x (cols + 1)` vertex lattice.
fn lattice_faces(rows: u32, cols: u32) -> Vec<[usize; 3]> {
    let stride = cols as usize + 1;
    let mut faces = Vec::with_capacity(rows as usize * cols as usize * 2);
    for j in 1..=rows as usize {
        for i in 1..=cols as usize {
            let a = stride * j + i - 1;
            let b = stride * (j - 1) + i - 1;
            let c = stride * (j - 1) + i;
            let d = stride * j + i;
            faces.push([a, b, d]);
            faces.push([b, c, d]);
        }
    }
    faces
}

fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> Wireframe {
    let mut points = Vec::new();
    for j in 0..=radial_segments {
        let v = j as f32 / radial_segments as f32 * PI * 2.0;
        for i in 0..=tubular_segments {
            let u = i as f32 / tubular_segments as f32 * PI * 2.0;
            let ring = radius + tube * v.cos();
            points.push(Vec3::new(ring * u.cos(), ring * u.sin(), tube * v.sin()));
        }
    }
    Wireframe::from_triangles(&points, &lattice_faces(radial_segments, tubular_segments))
}

fn knot_curve(u: f32, p: f32, q: f32, radius: f32) -> Vec3 {
    let quo = q / p * u;
    let cs = quo.cos();
    Vec3::new(
        radius * (2.0 + cs) * 0.5 * u.cos(),
        radius * (2.0 + cs) * 0.5 * u.sin(),
        radius * quo.sin() * 0.5,
    )
}

fn torus_knot(radius: f32, tube: f32, tubular_segments: u32, radial_segments: u32, p: u32, q: u32) -> Wireframe {
    let (pf, qf) = (p as f32, q as f32);
    let mut points = Vec::new();
    for i in 0..=tubular_segments {
        let u = i as f32 / tubular_segments as f32 * pf * PI * 2.0;
        let p1 = knot_curve(u, pf, qf, radius);
        let p2 = knot_curve(u + 0.01, pf, qf, radius);
        let tangent = p2 - p1;
        let binormal = tangent.cross(p2 + p1);
        let normal = binormal.cross(tangent).normalize();
        let binormal = binormal.normalize();
        for j in 0..=radial_segments {
            let v = j as f32 / radial_segments as f32 * PI * 2.0;
            points.push(p1 + normal * (-tube * v.cos()) + binormal * (tube * v.sin()));
        }
    }
    Wireframe::from_triangles(&points, &lattice_faces(tubular_segments, radial_segments))
}

#[derive(Clone, Debug)]
pub struct FloatingSolid {
    pub kind: SolidKind,
    pub position: Vec3,
    /// Euler angles, radians, XYZ order.
    pub rotation: Vec3,
    pub rot_speed: Vec3,
    pub anchor_y: f32,
    pub float_speed: f32,
    pub float_amplitude: f32,
    pub color_slot: ColorSlot,
    pub color: Rgb,
    pub opacity: f32,
    pub wireframe: Wireframe,
}

impl FloatingSolid {
    #[allow(clippy::too_many_arguments)]
    fn new(
        kind: SolidKind,
        position: Vec3,
        rot_speed: Vec3,
        float_speed: f32,
        float_amplitude: f32,
        color_slot: ColorSlot,
        opacity: f32,
        palette: &Palette,
    ) -> Self {
        Self {
            kind,
            position,
            rotation: Vec3::ZERO,
            rot_speed,
            anchor_y: position.y,
            float_speed,
            float_amplitude,
            color_slot,
            color: palette.color(color_slot),
            opacity,
            wireframe: kind.wireframe(),
        }
    }

    pub fn update(&mut self, time: f32, pointer: (f32, f32)) {
        self.rotation += self.rot_speed;
        self.position.y = self.anchor_y + (time * self.float_speed * 100.0).sin() * self.float_amplitude;
        self.position.x += pointer.0 * POINTER_PARALLAX;
        self.position.y += pointer.1 * POINTER_PARALLAX;
    }

    pub fn apply_palette(&mut self, palette: &Palette) {
        self.color = palette.color(self.color_slot);
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position)
            * Mat4::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }
}

/// The fixed set of solids for a scene. The torus knot is appended only when
/// `torus_knot_segments` is set.
pub fn standard_solids(torus_knot_segments: Option<u32>, palette: &Palette) -> Vec<FloatingSolid> {
    let mut solids = vec![
        FloatingSolid::new(
            SolidKind::Icosahedron { radius: 3.0, detail: 1 },
            Vec3::new(-12.0, 5.0, -5.0),
            Vec3::new(0.003, 0.005, 0.002),
            0.0008,
            2.0,
            ColorSlot::Wireframe,
            0.15,
            palette,
        ),
        FloatingSolid::new(
            SolidKind::Torus { radius: 2.5, tube: 0.8, radial_segments: 16, tubular_segments: 32 },
            Vec3::new(14.0, -3.0, -8.0),
            Vec3::new(0.004, 0.002, 0.006),
            0.0012,
            1.5,
            ColorSlot::Particle2,
            0.12,
            palette,
        ),
        FloatingSolid::new(
            SolidKind::Octahedron { radius: 2.0 },
            Vec3::new(8.0, 8.0, -12.0),
            Vec3::new(0.005, 0.003, 0.004),
            0.001,
            2.5,
            ColorSlot::Particle3,
            0.12,
            palette,
        ),
        FloatingSolid::new(
            SolidKind::Dodecahedron { radius: 2.0 },
            Vec3::new(-10.0, -7.0, -10.0),
            Vec3::new(0.002, 0.006, 0.003),
            0.0009,
            1.8,
            ColorSlot::Particle1,
            0.1,
            palette,
        ),
    ];
    if let Some(tubular_segments) = torus_knot_segments {
        solids.push(FloatingSolid::new(
            SolidKind::TorusKnot { radius: 1.8, tube: 0.5, tubular_segments, radial_segments: 8, p: 2, q: 3 },
            Vec3::new(-5.0, -12.0, -6.0),
            Vec3::new(0.001, 0.004, 0.002),
            0.0007,
            1.2,
            ColorSlot::Particle2,
            0.08,
            palette,
        ));
    }
    solids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platonic_edge_counts() {
        assert_eq!(octahedron(2.0).edge_count(), 12);
        assert_eq!(dodecahedron(2.0).edge_count(), 30);
        assert_eq!(dodecahedron(2.0).vertex_count(), 20);
        let ico = icosahedron(3.0, 0);
        assert_eq!((ico.vertex_count(), ico.edge_count()), (12, 30));
        // One split: V = 12 + 30, E = 2 * 30 + 3 * 20.
        let ico1 = icosahedron(3.0, 1);
        assert_eq!((ico1.vertex_count(), ico1.edge_count()), (42, 120));
    }

    #[test]
    fn polyhedra_vertices_lie_on_radius() {
        for wf in [icosahedron(3.0, 1), dodecahedron(2.0), octahedron(2.0)] {
            let r = Vec3::from_slice(&wf.vertices[0..3]).length();
            for v in wf.vertices.chunks_exact(3) {
                assert!((Vec3::from_slice(v).length() - r).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn indices_stay_in_range() {
        for wf in [torus(2.5, 0.8, 16, 32), torus_knot(1.8, 0.5, 64, 8, 2, 3)] {
            let n = wf.vertex_count() as u16;
            assert!(wf.indices.iter().all(|&i| i < n));
            assert!(wf.edge_count() > 0);
        }
    }

    #[test]
    fn float_is_anchor_relative() {
        let palette = crate::theme::Theme::Dark.palette();
        let mut solid = standard_solids(None, &palette).remove(0);
        solid.update(0.0, (0.0, 0.0));
        assert_eq!(solid.position.y, 5.0);
        assert_eq!(solid.rotation, Vec3::new(0.003, 0.005, 0.002));
    }

    #[test]
    fn pointer_nudge_accumulates_in_x_only() {
        let palette = crate::theme::Theme::Dark.palette();
        let mut solid = standard_solids(None, &palette).remove(0);
        let pointer = (0.5, -0.4);
        solid.update(0.01, pointer);
        solid.update(0.02, pointer);
        assert!((solid.position.x - (-12.0 + 2.0 * 0.02 * 0.5)).abs() < 1e-5);
        let float = (0.02 * solid.float_speed * 100.0).sin() * solid.float_amplitude;
        assert!((solid.position.y - (5.0 + float - 0.4 * 0.02)).abs() < 1e-5);
    }
}
