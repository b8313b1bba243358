//! Lagrangian particle dynamics.
//!
//! Per particle, per tick:
//!
//! ```text
//! a = g + drag·(u_fluid − v)/m + c_th·(−∇T)/m
//! ```
//!
//! integrated with semi-implicit Euler (velocity first, then position).
//! Fluid velocity and the temperature gradient are sampled from the grid by
//! bilinear interpolation at the particle position. Domain-edge collisions
//! follow the per-edge mass boundary rule; particle-particle overlap is
//! resolved with a hardness penalty plus an impulse scaled by the combined
//! elasticity of the pair.

use crate::core_types::particle::Particle;
use crate::core_types::vec2::Vec2;
use crate::grid::boundary::{BoundaryConditions, MassBoundary};
use crate::grid::simulation_grid::SimulationGrid;
use crate::solver::convection::GravityType;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Parameters for particle integration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleParams {
    /// Fluid drag coefficient (kg/s).
    pub drag: f32,
    /// Thermophoretic coefficient (kg·m²/(s²·K)); drives particles down the
    /// temperature gradient.
    pub thermophoresis: f32,
    /// Contact stiffness for particle-particle overlap resolution (1/s²
    /// scaling of overlap depth).
    pub hardness: f32,
    /// Gravitational acceleration (m/s²).
    pub gravity: f32,
    pub gravity_type: GravityType,
}

impl Default for ParticleParams {
    fn default() -> Self {
        ParticleParams {
            drag: 0.01,
            thermophoresis: 0.0,
            hardness: 100.0,
            gravity: 9.81,
            gravity_type: GravityType::Uniform,
        }
    }
}

/// Periodic particle source.
///
/// Emits one particle every `period` seconds until `maximum` particles are
/// alive; emission resumes only after existing particles are removed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleFeeder {
    /// Emission point (m).
    pub position: Vec2,
    /// Initial velocity of emitted particles (m/s).
    pub velocity: Vec2,
    /// Seconds between emissions.
    pub period: f32,
    /// Cap on live particles.
    pub maximum: usize,
    /// Mass of emitted particles (kg).
    pub mass: f32,
    /// Radius of emitted particles (m).
    pub radius: f32,
    last_emit: Option<f32>,
}

impl ParticleFeeder {
    /// Create a feeder.
    pub fn new(position: Vec2, period: f32, maximum: usize, mass: f32, radius: f32) -> Self {
        ParticleFeeder {
            position,
            velocity: Vec2::zeros(),
            period,
            maximum,
            mass,
            radius,
            last_emit: None,
        }
    }
}

/// Particle population, feeders, and the integrator over both.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    feeders: Vec<ParticleFeeder>,
}

impl ParticleSystem {
    /// Create an empty system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Live particles, for rendering.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Mutable access for UI dragging of draggable particles.
    pub fn particles_mut(&mut self) -> &mut Vec<Particle> {
        &mut self.particles
    }

    /// Insert a particle.
    pub fn insert(&mut self, particle: Particle) {
        self.particles.push(particle);
    }

    /// Add a feeder.
    pub fn add_feeder(&mut self, feeder: ParticleFeeder) {
        self.feeders.push(feeder);
    }

    /// Number of live particles.
    pub fn count(&self) -> usize {
        self.particles.len()
    }

    /// Remove all particles and reset feeder timers (simulation reset).
    pub fn reset(&mut self) {
        self.particles.clear();
        for feeder in &mut self.feeders {
            feeder.last_emit = None;
        }
    }

    /// Advance feeders, integrate particles, and resolve collisions.
    pub fn step(
        &mut self,
        grid: &SimulationGrid,
        bc: &BoundaryConditions,
        params: &ParticleParams,
        time: f32,
        dt: f32,
    ) {
        self.run_feeders(time);
        self.integrate(grid, params, dt);
        self.resolve_particle_collisions(params, dt);
        self.resolve_boundary_collisions(grid, bc);
    }

    fn run_feeders(&mut self, time: f32) {
        let alive = self.particles.len();
        let mut emitted = 0usize;
        for feeder in &mut self.feeders {
            if alive + emitted >= feeder.maximum {
                continue;
            }
            let due = match feeder.last_emit {
                None => true,
                Some(last) => time - last >= feeder.period,
            };
            if !due {
                continue;
            }
            // Feeder templates are validated at configuration time
            if let Ok(mut p) = Particle::new(feeder.position, feeder.mass, feeder.radius) {
                p.velocity = feeder.velocity;
                self.particles.push(p);
                feeder.last_emit = Some(time);
                emitted += 1;
            }
        }
        if emitted > 0 {
            debug!("feeders emitted {emitted} particles, {} alive", self.particles.len());
        }
    }

    fn integrate(&mut self, grid: &SimulationGrid, params: &ParticleParams, dt: f32) {
        let center = Vec2::new(grid.width() * 0.5, grid.height() * 0.5);
        for p in &mut self.particles {
            if !p.movable {
                continue;
            }
            let fluid_v = grid.sample_velocity(p.position);
            let grad_t = grid.temperature_gradient(p.position);

            let gravity = match params.gravity_type {
                GravityType::Uniform => Vec2::new(0.0, params.gravity),
                GravityType::Centric => {
                    let d = center - p.position;
                    let r = d.norm().max(1e-6);
                    d * (params.gravity / r)
                }
            };
            let drag = (fluid_v - p.velocity) * (params.drag / p.mass);
            let thermo = -grad_t * (params.thermophoresis / p.mass);

            let accel = gravity + drag + thermo;
            p.velocity += accel * dt;
            p.position += p.velocity * dt;
            p.theta += p.omega * dt;

            // Particle temperature tracks the local fluid
            p.temperature = grid.sample_temperature(p.position);
        }
    }

    /// Pairwise overlap resolution with hardness penalty and an impulse
    /// scaled by the pair's combined elasticity.
    fn resolve_particle_collisions(&mut self, params: &ParticleParams, dt: f32) {
        let n = self.particles.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let (a, b) = {
                    let (head, tail) = self.particles.split_at_mut(j);
                    (&mut head[i], &mut tail[0])
                };
                let delta = b.position - a.position;
                let dist = delta.norm();
                let overlap = a.radius + b.radius - dist;
                if overlap <= 0.0 || dist <= 0.0 {
                    continue;
                }
                let normal = delta / dist;

                // Penalty push-apart proportional to hardness
                let push = normal * (params.hardness * overlap * dt * dt);
                let inv_a = if a.movable { 1.0 / a.mass } else { 0.0 };
                let inv_b = if b.movable { 1.0 / b.mass } else { 0.0 };
                let inv_sum = inv_a + inv_b;
                if inv_sum <= 0.0 {
                    continue;
                }
                a.position -= push * (inv_a / inv_sum);
                b.position += push * (inv_b / inv_sum);

                // Impulse exchange along the contact normal
                let rel = (b.velocity - a.velocity).dot(&normal);
                if rel < 0.0 {
                    let restitution = f32::midpoint(a.elasticity, b.elasticity);
                    let impulse = -(1.0 + restitution) * rel / inv_sum;
                    a.velocity -= normal * (impulse * inv_a);
                    b.velocity += normal * (impulse * inv_b);
                }
            }
        }
    }

    /// Apply the per-edge mass boundary rule; returns particles crossing a
    /// "through" edge to the void.
    fn resolve_boundary_collisions(&mut self, grid: &SimulationGrid, bc: &BoundaryConditions) {
        let width = grid.width();
        let height = grid.height();

        let mut i = 0;
        while i < self.particles.len() {
            let mut remove = false;
            {
                let p = &mut self.particles[i];
                let r = p.radius;

                if p.position.x - r < 0.0 {
                    match bc.left.mass {
                        MassBoundary::Reflective => {
                            p.position.x = r;
                            p.velocity.x = -p.velocity.x * p.elasticity;
                        }
                        MassBoundary::Stop => {
                            p.position.x = r;
                            p.velocity = Vec2::zeros();
                        }
                        MassBoundary::Through => remove = p.position.x + r < 0.0,
                    }
                }
                if p.position.x + r > width {
                    match bc.right.mass {
                        MassBoundary::Reflective => {
                            p.position.x = width - r;
                            p.velocity.x = -p.velocity.x * p.elasticity;
                        }
                        MassBoundary::Stop => {
                            p.position.x = width - r;
                            p.velocity = Vec2::zeros();
                        }
                        MassBoundary::Through => remove = remove || p.position.x - r > width,
                    }
                }
                if p.position.y - r < 0.0 {
                    match bc.top.mass {
                        MassBoundary::Reflective => {
                            p.position.y = r;
                            p.velocity.y = -p.velocity.y * p.elasticity;
                        }
                        MassBoundary::Stop => {
                            p.position.y = r;
                            p.velocity = Vec2::zeros();
                        }
                        MassBoundary::Through => remove = remove || p.position.y + r < 0.0,
                    }
                }
                if p.position.y + r > height {
                    match bc.bottom.mass {
                        MassBoundary::Reflective => {
                            p.position.y = height - r;
                            p.velocity.y = -p.velocity.y * p.elasticity;
                        }
                        MassBoundary::Stop => {
                            p.position.y = height - r;
                            p.velocity = Vec2::zeros();
                        }
                        MassBoundary::Through => remove = remove || p.position.y - r > height,
                    }
                }
            }
            if remove {
                self.particles.swap_remove(i);
            } else {
                i += 1;
            }
        }
    }
}
