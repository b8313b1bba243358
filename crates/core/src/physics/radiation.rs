//! Segment-to-segment radiative exchange via view factors.
//!
//! Part boundaries are discretized into oriented segments; every mutually
//! visible, mutually facing pair gets a geometric view-factor weight
//!
//! ```text
//! w_ij = cosθ_i · cosθ_j · L_i · L_j / (2·r)
//! ```
//!
//! (the 2D differential form, satisfying reciprocity `L_i·F_ij = L_j·F_ji`).
//! Each tick, the pair exchanges power `σ·e_i·e_j·w_ij·(T_j⁴ − T_i⁴)` using
//! the full Stefan-Boltzmann difference, deposited into the grid cells at
//! the two segment centers as part of source assembly.
//!
//! Construction is O(n²) in segment count and is strictly opt-in: the
//! network is only built when radiative exchange is enabled, is invalidated
//! by any geometry change, and warns the caller before crossing the segment
//! count threshold.

use crate::core_types::part::Part;
use crate::core_types::vec2::Vec2;
use crate::grid::simulation_grid::SimulationGrid;
use rustc_hash::FxHashMap;
use tracing::{info, warn};

/// Stefan-Boltzmann constant (W/(m²·K⁴)).
pub const STEFAN_BOLTZMANN: f32 = 5.67e-8;

/// Above this many segments the O(n²) build gets expensive enough that the
/// caller should be asked before committing.
pub const SEGMENT_WARN_THRESHOLD: usize = 500;

/// Sample points along the sight line when testing pair visibility.
const VISIBILITY_SAMPLES: usize = 8;

/// An oriented boundary segment of a part's discretized perimeter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Index of the owning part.
    pub part: usize,
    /// Segment midpoint (m).
    pub center: Vec2,
    /// Outward unit normal.
    pub normal: Vec2,
    /// Segment length (m).
    pub length: f32,
    /// Emissivity inherited from the owning part.
    pub emissivity: f32,
}

/// Sparse symmetric view-factor graph over part boundary segments.
#[derive(Debug, Clone, Default)]
pub struct ViewFactorNetwork {
    segments: Vec<Segment>,
    /// Geometric weights for visible pairs, keyed by (i, j) with i < j.
    factors: FxHashMap<(u32, u32), f32>,
}

/// Number of segments a build over `parts` would produce, for callers that
/// want to decline an expensive construction up front.
pub fn estimated_segment_count(parts: &[Part], patch_size: f32) -> usize {
    parts
        .iter()
        .map(|p| outline_samples(p, patch_size))
        .sum()
}

/// Samples needed to discretize one part's perimeter at `patch_size`.
fn outline_samples(part: &Part, patch_size: f32) -> usize {
    let bb = part.shape().bounding_box();
    let perimeter_estimate = 2.0 * (bb.width() + bb.height());
    ((perimeter_estimate / patch_size).ceil() as usize).max(4)
}

impl ViewFactorNetwork {
    /// Discretize part boundaries and compute the visibility-weighted
    /// view-factor graph.
    ///
    /// Warns when the segment count crosses [`SEGMENT_WARN_THRESHOLD`];
    /// callers that care should check [`estimated_segment_count`] first and
    /// decline the build.
    pub fn build(parts: &[Part], patch_size: f32) -> Self {
        let segments = discretize(parts, patch_size);
        if segments.len() > SEGMENT_WARN_THRESHOLD {
            warn!(
                "view-factor network has {} segments (threshold {}); pair count grows quadratically",
                segments.len(),
                SEGMENT_WARN_THRESHOLD
            );
        }

        let mut factors = FxHashMap::default();
        for i in 0..segments.len() {
            for j in (i + 1)..segments.len() {
                let (si, sj) = (&segments[i], &segments[j]);
                let d = sj.center - si.center;
                let r = d.norm();
                if r <= 0.0 {
                    continue;
                }
                let dir = d / r;
                let cos_i = si.normal.dot(&dir);
                let cos_j = -sj.normal.dot(&dir);
                // Pairs must face each other
                if cos_i <= 0.0 || cos_j <= 0.0 {
                    continue;
                }
                if !line_of_sight(si.center, sj.center, parts) {
                    continue;
                }
                let w = cos_i * cos_j * si.length * sj.length / (2.0 * r);
                factors.insert((i as u32, j as u32), w);
            }
        }

        info!(
            "built view-factor network: {} segments, {} visible pairs",
            segments.len(),
            factors.len()
        );
        ViewFactorNetwork { segments, factors }
    }

    /// Boundary segments of the network.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of visible pairs.
    pub fn pair_count(&self) -> usize {
        self.factors.len()
    }

    /// View factor for a segment pair, if the pair is mutually visible.
    pub fn view_factor(&self, i: usize, j: usize) -> Option<f32> {
        let key = if i < j {
            (i as u32, j as u32)
        } else {
            (j as u32, i as u32)
        };
        self.factors.get(&key).copied()
    }

    /// Add the tick's radiative exchange into the grid's source term.
    ///
    /// Exchange between a pair is proportional to `T_j⁴ − T_i⁴` in Kelvin
    /// and symmetric: what segment i gains, segment j loses.
    pub fn apply_exchange(&self, grid: &mut SimulationGrid) {
        let cell_volume = grid.cell_size() * grid.cell_size();
        for (&(i, j), &w) in &self.factors {
            let si = &self.segments[i as usize];
            let sj = &self.segments[j as usize];
            let ti = grid.sample_temperature(si.center) + 273.15;
            let tj = grid.sample_temperature(sj.center) + 273.15;
            let power = STEFAN_BOLTZMANN * si.emissivity * sj.emissivity * w
                * (tj.powi(4) - ti.powi(4));

            let (xi, yi) = grid.cell_containing(si.center);
            let (xj, yj) = grid.cell_containing(sj.center);
            let qi = grid.power.get(xi, yi);
            grid.power.set(xi, yi, qi + power / cell_volume);
            let qj = grid.power.get(xj, yj);
            grid.power.set(xj, yj, qj - power / cell_volume);
        }
    }
}

/// Split every part outline into oriented segments.
fn discretize(parts: &[Part], patch_size: f32) -> Vec<Segment> {
    let mut segments = Vec::new();
    for (idx, part) in parts.iter().enumerate() {
        let samples = outline_samples(part, patch_size);
        let outline = part.shape().outline(samples);
        if outline.len() < 2 {
            continue;
        }
        let emissivity = part.optics().emissivity();
        for k in 0..outline.len() {
            let p1 = outline[k];
            let p2 = outline[(k + 1) % outline.len()];
            let edge = p2 - p1;
            let length = edge.norm();
            // Annular outlines jump between rings; skip the stitch edges
            if length <= 0.0 || length > 4.0 * patch_size {
                continue;
            }
            let center = (p1 + p2) * 0.5;
            let mut normal = Vec2::new(edge.y, -edge.x) / length;
            // Orient outward: probe just off the midpoint
            let probe = center + normal * (0.25 * patch_size);
            if part.contains(probe.x, probe.y) {
                normal = -normal;
            }
            segments.push(Segment {
                part: idx,
                center,
                normal,
                length,
                emissivity,
            });
        }
    }
    segments
}

/// True when the open line between two segment centers is not blocked by
/// any part interior.
fn line_of_sight(a: Vec2, b: Vec2, parts: &[Part]) -> bool {
    for s in 1..=VISIBILITY_SAMPLES {
        let t = s as f32 / (VISIBILITY_SAMPLES + 1) as f32;
        let p = a + (b - a) * t;
        if parts.iter().any(|part| part.contains(p.x, p.y)) {
            return false;
        }
    }
    true
}
