//! Photon-based solar radiative transport.
//!
//! Sunlight is modeled as discrete photons: ray samples emitted periodically
//! from the sun-facing edges, travelling at a fixed speed. Crossing into a
//! part samples one outcome from the part's normalized
//! (absorptivity, reflectivity, transmissivity) triple:
//!
//! - absorption deposits the photon's energy into the grid cell at the
//!   crossing point and destroys the photon,
//! - reflection mirrors the velocity about the local surface normal (or
//!   scatters it into a random hemisphere direction for scattering parts),
//! - transmission lets the photon continue unchanged.
//!
//! Photons leaving the domain are destroyed. The bookkeeping counters
//! guarantee no photon silently vanishes:
//! `emitted == absorbed + exited + alive`.

use crate::core_types::part::Part;
use crate::core_types::photon::Photon;
use crate::core_types::vec2::Vec2;
use crate::grid::simulation_grid::SimulationGrid;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Solar emission settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolarConfig {
    /// Master switch: no emission when overcast.
    pub sunny: bool,
    /// Sun angle in radians over [0, π]: 0 at dawn (rays travel in −x),
    /// π/2 at noon (straight down), π at dusk (rays travel in +x).
    pub sun_angle: f32,
    /// Solar power density at the aperture (W/m²).
    pub solar_power: f32,
    /// Photons emitted per emission event.
    pub ray_count: usize,
    /// Photon speed (m/s).
    pub ray_speed: f32,
    /// Seconds between emission events.
    pub emission_interval: f32,
}

impl Default for SolarConfig {
    fn default() -> Self {
        SolarConfig {
            sunny: false,
            sun_angle: std::f32::consts::FRAC_PI_2,
            solar_power: 2000.0,
            ray_count: 24,
            ray_speed: 0.1,
            emission_interval: 20.0,
        }
    }
}

impl SolarConfig {
    /// Unit ray direction for the configured sun angle (y points down).
    pub fn ray_direction(&self) -> Vec2 {
        Vec2::new(-self.sun_angle.cos(), self.sun_angle.sin())
    }
}

/// Lifetime counters for photon accounting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotonStats {
    pub emitted: u64,
    pub absorbed: u64,
    pub exited: u64,
}

/// Photon population and emission state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhotonTransport {
    photons: Vec<Photon>,
    /// Simulation time of the last emission event, or `None` before the
    /// first one.
    last_emission: Option<f32>,
    stats: PhotonStats,
}

impl PhotonTransport {
    /// Create an empty photon population.
    pub fn new() -> Self {
        Self::default()
    }

    /// Live photons, for rendering.
    pub fn photons(&self) -> &[Photon] {
        &self.photons
    }

    /// Lifetime emission/absorption/exit counters.
    pub fn stats(&self) -> PhotonStats {
        self.stats
    }

    /// Number of live photons.
    pub fn alive(&self) -> usize {
        self.photons.len()
    }

    /// Clear photons and counters (simulation reset).
    pub fn reset(&mut self) {
        self.photons.clear();
        self.last_emission = None;
        self.stats = PhotonStats::default();
    }

    /// Advance all photons by `dt`, emitting a new batch if the emission
    /// interval elapsed, and resolve part interactions.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        grid: &mut SimulationGrid,
        parts: &[Part],
        config: &SolarConfig,
        time: f32,
        dt: f32,
        rng: &mut R,
    ) {
        if config.sunny {
            let due = match self.last_emission {
                None => true,
                Some(last) => time - last >= config.emission_interval,
            };
            if due {
                self.emit(grid, config);
                self.last_emission = Some(time);
            }
        }

        let width = grid.width();
        let height = grid.height();
        let probe = grid.cell_size() * 0.5;

        let mut i = 0;
        while i < self.photons.len() {
            let old_pos = self.photons[i].position;
            self.photons[i].advance(dt);
            let new_pos = self.photons[i].position;

            // Out of the domain: destroyed
            if new_pos.x < 0.0 || new_pos.x >= width || new_pos.y < 0.0 || new_pos.y >= height {
                self.photons.swap_remove(i);
                self.stats.exited += 1;
                continue;
            }

            // Entering a part samples one interaction outcome
            let entered = parts.iter().enumerate().rev().find(|(_, p)| {
                p.contains(new_pos.x, new_pos.y) && !p.contains(old_pos.x, old_pos.y)
            });
            if let Some((_, part)) = entered {
                let optics = part.optics();
                let roll: f32 = rng.random();
                if roll < optics.absorptivity() {
                    let energy = self.photons[i].energy;
                    grid.deposit_heat(new_pos, energy);
                    self.photons.swap_remove(i);
                    self.stats.absorbed += 1;
                    continue;
                } else if roll < optics.absorptivity() + optics.reflectivity() {
                    let normal = surface_normal(part, new_pos, probe);
                    let speed = self.photons[i].velocity.norm();
                    let v = self.photons[i].velocity;
                    self.photons[i].velocity = if part.scattering() {
                        scatter_direction(normal, rng) * speed
                    } else {
                        v - normal * (2.0 * v.dot(&normal))
                    };
                    // Step back outside so the photon doesn't re-enter
                    self.photons[i].position = old_pos;
                }
                // Transmission: continue unchanged
            }
            i += 1;
        }
    }

    /// Emit one batch of photons from the sun-facing edges.
    ///
    /// Rays enter through the top edge and, away from noon, through the side
    /// edge facing the sun; the count is split in proportion to each edge's
    /// projected aperture. Per-photon energy is the aperture power times the
    /// emission interval divided by the ray count, so the average deposited
    /// power does not depend on how many rays sample it.
    fn emit(&mut self, grid: &SimulationGrid, config: &SolarConfig) {
        if config.ray_count == 0 {
            return;
        }
        let dir = config.ray_direction();
        let width = grid.width();
        let height = grid.height();

        let top_aperture = dir.y.abs() * width;
        let side_aperture = dir.x.abs() * height;
        let total_aperture = top_aperture + side_aperture;
        if total_aperture <= 0.0 {
            return;
        }

        let energy = config.solar_power * total_aperture * config.emission_interval
            / config.ray_count as f32;
        let velocity = dir * config.ray_speed;

        let top_rays = ((top_aperture / total_aperture) * config.ray_count as f32).round() as usize;
        let side_rays = config.ray_count - top_rays;
        let eps = 1e-4 * grid.cell_size();

        for k in 0..top_rays {
            let x = (k as f32 + 0.5) * width / top_rays as f32;
            self.photons
                .push(Photon::new(Vec2::new(x, eps), velocity, energy));
        }
        // Side rays come from the right edge before noon, the left after
        let side_x = if dir.x < 0.0 { width - eps } else { eps };
        for k in 0..side_rays {
            let y = (k as f32 + 0.5) * height / side_rays.max(1) as f32;
            self.photons
                .push(Photon::new(Vec2::new(side_x, y), velocity, energy));
        }
        self.stats.emitted += (top_rays + side_rays) as u64;
        debug!(
            "emitted {top_rays} top + {side_rays} side photons, {} alive",
            self.photons.len()
        );
    }
}

/// Estimate the outward surface normal at a boundary point by central
/// differences of the shape's inside-indicator. One code path covers every
/// shape variant; accuracy is bounded by the probe step.
fn surface_normal(part: &Part, p: Vec2, h: f32) -> Vec2 {
    let ind = |x: f32, y: f32| -> f32 {
        if part.contains(x, y) {
            1.0
        } else {
            0.0
        }
    };
    let gx = ind(p.x + h, p.y) - ind(p.x - h, p.y);
    let gy = ind(p.x, p.y + h) - ind(p.x, p.y - h);
    let g = Vec2::new(-gx, -gy);
    let norm = g.norm();
    if norm > 0.0 {
        g / norm
    } else {
        // Probe landed fully inside; fall back to reversing the ray
        Vec2::new(0.0, -1.0)
    }
}

/// Random unit direction in the hemisphere around `normal`.
fn scatter_direction<R: Rng + ?Sized>(normal: Vec2, rng: &mut R) -> Vec2 {
    let base = normal.y.atan2(normal.x);
    let angle = base + rng.random_range(-std::f32::consts::FRAC_PI_2..std::f32::consts::FRAC_PI_2);
    Vec2::new(angle.cos(), angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::material::Material;
    use crate::core_types::optics::OpticalProps;
    use crate::core_types::shape::Shape;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sunny_config() -> SolarConfig {
        SolarConfig {
            sunny: true,
            sun_angle: std::f32::consts::FRAC_PI_2,
            solar_power: 1000.0,
            ray_count: 10,
            ray_speed: 1.0,
            emission_interval: 1.0,
        }
    }

    fn absorber(a: f32, r: f32, t: f32) -> Part {
        let mut p = Part::new(
            Shape::Rectangle {
                x: 0.0,
                y: 5.0,
                w: 10.0,
                h: 2.0,
            },
            Material::new(1.0, 1000.0, 1000.0).unwrap(),
            OpticalProps::new(a, r, t, 0.0).unwrap(),
        )
        .unwrap();
        p.set_scattering(false);
        p
    }

    #[test]
    fn test_noon_rays_point_down() {
        let c = sunny_config();
        let d = c.ray_direction();
        assert!(d.x.abs() < 1e-6);
        assert!((d.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_emission_happens_on_interval() {
        let mut grid = SimulationGrid::new(10, 10, 1.0, 0.0);
        let mut transport = PhotonTransport::new();
        let config = sunny_config();
        let mut rng = StdRng::seed_from_u64(1);

        transport.step(&mut grid, &[], &config, 0.0, 0.1, &mut rng);
        assert_eq!(transport.stats().emitted, 10);

        // Within the interval: no new batch
        transport.step(&mut grid, &[], &config, 0.5, 0.1, &mut rng);
        assert_eq!(transport.stats().emitted, 10);

        transport.step(&mut grid, &[], &config, 1.0, 0.1, &mut rng);
        assert_eq!(transport.stats().emitted, 20);
    }

    #[test]
    fn test_full_absorber_heats_grid() {
        let mut grid = SimulationGrid::new(10, 10, 1.0, 0.0);
        let mut transport = PhotonTransport::new();
        let config = sunny_config();
        let parts = vec![absorber(1.0, 0.0, 0.0)];
        let mut rng = StdRng::seed_from_u64(2);

        let energy_before = grid.total_thermal_energy();
        for step in 0..200 {
            let time = step as f32 * 0.1;
            transport.step(&mut grid, &parts, &config, time, 0.1, &mut rng);
        }
        let energy_after = grid.total_thermal_energy();

        let stats = transport.stats();
        assert!(stats.absorbed > 0, "photons must be absorbed");
        assert!(energy_after > energy_before, "absorption must deposit heat");
    }

    #[test]
    fn test_mirror_reflects_upward() {
        let mut grid = SimulationGrid::new(10, 10, 1.0, 0.0);
        let mut transport = PhotonTransport::new();
        let config = SolarConfig {
            sunny: false,
            ..sunny_config()
        };
        let parts = vec![absorber(0.0, 1.0, 0.0)];
        let mut rng = StdRng::seed_from_u64(3);

        transport.photons.push(Photon::new(
            Vec2::new(5.0, 4.9),
            Vec2::new(0.0, 1.0),
            1.0,
        ));
        transport.step(&mut grid, &parts, &config, 0.0, 0.2, &mut rng);

        assert_eq!(transport.alive(), 1);
        assert!(
            transport.photons()[0].velocity.y < 0.0,
            "reflected photon should travel back up"
        );
    }

    #[test]
    fn test_no_photon_silently_vanishes() {
        let mut grid = SimulationGrid::new(10, 10, 1.0, 0.0);
        let mut transport = PhotonTransport::new();
        let config = sunny_config();
        let parts = vec![absorber(0.4, 0.3, 0.3)];
        let mut rng = StdRng::seed_from_u64(4);

        for step in 0..500 {
            let time = step as f32 * 0.1;
            transport.step(&mut grid, &parts, &config, time, 0.1, &mut rng);
        }

        let stats = transport.stats();
        assert_eq!(
            stats.emitted,
            stats.absorbed + stats.exited + transport.alive() as u64,
            "photon accounting must close"
        );
    }

    #[test]
    fn test_interaction_frequencies_match_optics() {
        let mut grid = SimulationGrid::new(10, 10, 1.0, 0.0);
        let config = SolarConfig {
            sunny: false,
            ..sunny_config()
        };
        // Thick slab spanning the bottom half; photons fired straight down
        let parts = vec![absorber(0.6, 0.4, 0.0)];
        let mut rng = StdRng::seed_from_u64(5);

        let trials = 4000;
        let mut absorbed = 0u32;
        let mut reflected = 0u32;
        for _ in 0..trials {
            let mut transport = PhotonTransport::new();
            transport.photons.push(Photon::new(
                Vec2::new(5.0, 4.9),
                Vec2::new(0.0, 1.0),
                1.0,
            ));
            let before = transport.photons()[0].velocity.y;
            transport.step(&mut grid, &parts, &config, 0.0, 0.2, &mut rng);
            if transport.alive() == 0 {
                absorbed += 1;
            } else if transport.photons()[0].velocity.y != before {
                reflected += 1;
            }
        }

        let fa = f64::from(absorbed) / f64::from(trials);
        let fr = f64::from(reflected) / f64::from(trials);
        assert!((fa - 0.6).abs() < 0.05, "absorption frequency {fa}");
        assert!((fr - 0.4).abs() < 0.05, "reflection frequency {fr}");
    }
}
