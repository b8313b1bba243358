//! The simulation engine: owns all state and runs the tick pipeline.
//!
//! Per tick, in order: drain queued point-heat pulses; re-rasterize if
//! geometry changed (rebuilding the view-factor network when radiative
//! exchange is on); assemble sources (part power + radiative exchange);
//! implicit diffusion; convection (if enabled); z-direction heat loss;
//! photon transport; particle dynamics; sensor sampling; thermostat
//! evaluation.
//!
//! A single thread drives `tick()`; all grid, photon, and particle mutation
//! happens there. The heat queue is the only cross-thread input, and sensor
//! series hand out snapshot copies, so no consumer ever observes a torn
//! tick. A non-finite field is fatal: the engine stops stepping and exposes
//! the error until `reset()`.

use crate::core_types::part::{Part, PartId};
use crate::grid::boundary::BoundaryConditions;
use crate::grid::rasterize::rasterize;
use crate::grid::simulation_grid::SimulationGrid;
use crate::physics::particles::{ParticleFeeder, ParticleSystem};
use crate::physics::photons::PhotonTransport;
use crate::physics::radiation::ViewFactorNetwork;
use crate::simulation::config::SimulationConfig;
use crate::simulation::heat_queue::HeatQueue;
use crate::simulation::sensors::Sensor;
use crate::simulation::thermostat::{Thermostat, ThermostatBank};
use crate::solver::convection::step_convection;
use crate::solver::thermal::{apply_z_heat_loss, assemble_sources, step_diffusion, SolverError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

/// The coupled 2D heat-transfer simulation.
pub struct Simulation {
    config: SimulationConfig,
    boundaries: BoundaryConditions,
    grid: SimulationGrid,
    parts: Vec<Part>,
    photons: PhotonTransport,
    particles: ParticleSystem,
    radiation: Option<ViewFactorNetwork>,
    radiative_exchange: bool,
    sensors: Vec<Sensor>,
    thermostats: ThermostatBank,
    heat_queue: HeatQueue,
    rng: StdRng,
    time: f32,
    geometry_dirty: bool,
    fatal: Option<SolverError>,
}

impl Simulation {
    /// Create a simulation over an `nx × ny` grid of `cell_size`-meter
    /// cells, initialized to `background_temperature`.
    pub fn new(
        nx: usize,
        ny: usize,
        cell_size: f32,
        background_temperature: f32,
        config: SimulationConfig,
    ) -> Self {
        info!("creating simulation: {nx}x{ny} grid, cell size {cell_size} m");
        Simulation {
            config,
            boundaries: BoundaryConditions::default(),
            grid: SimulationGrid::new(nx, ny, cell_size, background_temperature),
            parts: Vec::new(),
            photons: PhotonTransport::new(),
            particles: ParticleSystem::new(),
            radiation: None,
            radiative_exchange: false,
            sensors: Vec::new(),
            thermostats: ThermostatBank::new(),
            heat_queue: HeatQueue::new(),
            rng: StdRng::from_os_rng(),
            time: 0.0,
            geometry_dirty: false,
            fatal: None,
        }
    }

    /// Seed the photon-interaction RNG, for reproducible runs.
    pub fn seed_rng(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Advance the simulation by one time step.
    ///
    /// # Errors
    ///
    /// Returns the stored [`SolverError`] once any field has diverged; the
    /// state is no longer meaningful and only [`Self::reset`] clears the
    /// condition.
    pub fn tick(&mut self) -> Result<(), SolverError> {
        if let Some(err) = &self.fatal {
            return Err(err.clone());
        }
        let dt = self.config.time_step();

        // Queued manual heating is the only cross-thread input
        for pulse in self.heat_queue.drain() {
            if self.grid.in_domain(pulse.position) {
                self.grid.deposit_heat(pulse.position, pulse.energy);
            }
        }

        if self.geometry_dirty {
            rasterize(&self.parts, &mut self.grid);
            if self.radiative_exchange {
                self.radiation = Some(ViewFactorNetwork::build(
                    &self.parts,
                    self.config.radiation_patch_size,
                ));
            }
            self.geometry_dirty = false;
        }

        // Source assembly: part power, then radiative exchange on top
        assemble_sources(&self.parts, &mut self.grid);
        if let Some(network) = &self.radiation {
            network.apply_exchange(&mut self.grid);
        }

        if let Err(err) = step_diffusion(&mut self.grid, &self.boundaries, dt) {
            self.fatal = Some(err.clone());
            return Err(err);
        }

        if self.config.convective {
            if let Err(err) =
                step_convection(&mut self.grid, &self.boundaries, &self.config.convection, dt)
            {
                self.fatal = Some(err.clone());
                return Err(err);
            }
        }

        if self.config.z_heat_diffusivity > 0.0 {
            apply_z_heat_loss(
                &mut self.grid,
                dt,
                self.config.z_heat_diffusivity,
                self.config.z_heat_fluid_only,
            );
        }

        self.photons.step(
            &mut self.grid,
            &self.parts,
            &self.config.solar,
            self.time,
            dt,
            &mut self.rng,
        );

        self.particles.step(
            &self.grid,
            &self.boundaries,
            &self.config.particles,
            self.time,
            dt,
        );

        self.time += dt;

        for sensor in &self.sensors {
            sensor.sample(&self.grid, self.time);
        }
        self.thermostats.update(&self.sensors, &mut self.parts);

        debug!(
            "tick complete: t={:.3}s, {} photons, {} particles",
            self.time,
            self.photons.alive(),
            self.particles.count()
        );
        Ok(())
    }

    /// Full state reinitialization: zero time, clear photon/particle
    /// populations and sensor series, restore the background temperature
    /// field, and re-rasterize. Safe only between ticks.
    pub fn reset(&mut self) {
        info!("simulation reset");
        self.time = 0.0;
        self.fatal = None;
        self.grid.reset();
        self.photons.reset();
        self.particles.reset();
        for sensor in &self.sensors {
            sensor.clear();
        }
        let _ = self.heat_queue.drain();
        rasterize(&self.parts, &mut self.grid);
        if self.radiative_exchange {
            self.radiation = Some(ViewFactorNetwork::build(
                &self.parts,
                self.config.radiation_patch_size,
            ));
        }
        self.geometry_dirty = false;
    }

    // ====== Configuration and geometry ======

    /// Global configuration.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Mutable configuration.
    pub fn config_mut(&mut self) -> &mut SimulationConfig {
        &mut self.config
    }

    /// Per-edge boundary conditions.
    pub fn boundaries(&self) -> &BoundaryConditions {
        &self.boundaries
    }

    /// Mutable boundary conditions.
    pub fn boundaries_mut(&mut self) -> &mut BoundaryConditions {
        &mut self.boundaries
    }

    /// Add a part; returns its id. Triggers re-rasterization next tick.
    pub fn add_part(&mut self, part: Part) -> PartId {
        self.parts.push(part);
        self.geometry_dirty = true;
        self.parts.len() - 1
    }

    /// Remove a part. Thermostats bound to it are dropped and bindings to
    /// later parts are shifted down.
    pub fn remove_part(&mut self, id: PartId) {
        if id >= self.parts.len() {
            return;
        }
        self.parts.remove(id);
        self.geometry_dirty = true;

        let old = std::mem::take(&mut self.thermostats);
        for mut t in old.controllers().iter().copied() {
            match t.part.cmp(&id) {
                std::cmp::Ordering::Less => self.thermostats.bind(t),
                std::cmp::Ordering::Equal => {}
                std::cmp::Ordering::Greater => {
                    t.part -= 1;
                    self.thermostats.bind(t);
                }
            }
        }
    }

    /// The current parts.
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Mutable access to a part. Marks geometry dirty, since any property
    /// change may affect rasterization.
    pub fn part_mut(&mut self, id: PartId) -> Option<&mut Part> {
        self.geometry_dirty = true;
        self.parts.get_mut(id)
    }

    /// Enable segment-to-segment radiative exchange. The O(n²) network is
    /// built on the next tick (and after every geometry change while
    /// enabled); check
    /// [`estimated_segment_count`](crate::physics::radiation::estimated_segment_count)
    /// first when the scene is complex.
    pub fn enable_radiative_exchange(&mut self) {
        self.radiative_exchange = true;
        self.geometry_dirty = true;
    }

    /// Disable radiative exchange and drop the network immediately; it must
    /// not be kept live when unused.
    pub fn disable_radiative_exchange(&mut self) {
        self.radiative_exchange = false;
        self.radiation = None;
    }

    // ====== Sensors, thermostats, particles ======

    /// Add a sensor; returns its index.
    pub fn add_sensor(&mut self, sensor: Sensor) -> usize {
        self.sensors.push(sensor);
        self.sensors.len() - 1
    }

    /// The placed sensors.
    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    /// Bind a thermostat (replacing any controller on the same part).
    pub fn bind_thermostat(&mut self, thermostat: Thermostat) {
        self.thermostats.bind(thermostat);
    }

    /// Active thermostats, for status display.
    pub fn thermostats(&self) -> &[Thermostat] {
        self.thermostats.controllers()
    }

    /// The particle system.
    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    /// Mutable particle system (insertion, dragging, feeders).
    pub fn particles_mut(&mut self) -> &mut ParticleSystem {
        &mut self.particles
    }

    /// Add a particle feeder.
    pub fn add_feeder(&mut self, feeder: ParticleFeeder) {
        self.particles.add_feeder(feeder);
    }

    // ====== Views for the render/export layer ======

    /// The grid, for rendering the T/u/v/k fields.
    pub fn grid(&self) -> &SimulationGrid {
        &self.grid
    }

    /// Live photons.
    pub fn photons(&self) -> &PhotonTransport {
        &self.photons
    }

    /// Cloneable handle for enqueueing point-heat pulses from other threads.
    pub fn heat_queue(&self) -> HeatQueue {
        self.heat_queue.clone()
    }

    /// Simulation time (s).
    pub fn time(&self) -> f32 {
        self.time
    }

    /// The fatal error, if the solver has diverged.
    pub fn error(&self) -> Option<&SolverError> {
        self.fatal.as_ref()
    }

    /// True once a tick has failed; `tick()` refuses to run until `reset()`.
    pub fn has_fatal_error(&self) -> bool {
        self.fatal.is_some()
    }
}
