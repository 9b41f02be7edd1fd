//! Proximity graph between particles.
//!
//! The graph is rebuilt from scratch on every pass. Pairs are scanned in index
//! order (`i < j`) and the scan stops at the cap, so the kept segments are the
//! first close pairs encountered rather than the closest ones. Keep that
//! ordering; the rendered web depends on it.

/// Flat `xyz xyz` segment list from the latest pass.
#[derive(Debug, Default)]
pub struct ConnectionLines {
    segments: Option<Vec<f32>>,
    generation: u64,
}

impl ConnectionLines {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops the previous geometry and scans `positions` (flat `xyz`) for
    /// pairs closer than `max_distance`, stopping after `cap` segments.
    pub fn recompute(&mut self, positions: &[f32], max_distance: f32, cap: usize) -> usize {
        self.segments = None;
        self.generation += 1;

        let count = positions.len() / 3;
        let max_sq = max_distance * max_distance;
        let mut lines = Vec::new();
        let mut found = 0;

        'scan: for i in 0..count {
            let a = &positions[i * 3..i * 3 + 3];
            for j in (i + 1)..count {
                if found >= cap {
                    break 'scan;
                }
                let b = &positions[j * 3..j * 3 + 3];
                let dx = a[0] - b[0];
                let dy = a[1] - b[1];
                let dz = a[2] - b[2];
                if dx * dx + dy * dy + dz * dz < max_sq {
                    lines.extend_from_slice(a);
                    lines.extend_from_slice(b);
                    found += 1;
                }
            }
        }

        if !lines.is_empty() {
            self.segments = Some(lines);
        }
        found
    }

    /// Segment vertices, or `None` when the last pass found nothing.
    pub fn segments(&self) -> Option<&[f32]> {
        self.segments.as_deref()
    }

    pub fn len(&self) -> usize {
        self.segments.as_ref().map_or(0, |s| s.len() / 6)
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_none()
    }

    /// Bumped on every pass, including empty ones, so a renderer can tell
    /// when to replace its buffer.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
