//! Geometry rasterization: vector parts to per-cell grid arrays.
//!
//! Runs every time geometry or part properties change. Each cell takes the
//! properties of the topmost part containing its center (parts later in the
//! list are drawn on top); uncovered cells revert to background air. Fan
//! parts stay fluid so air can move through them; every other part is solid.

use crate::core_types::material::Material;
use crate::core_types::part::Part;
use crate::grid::simulation_grid::{SimulationGrid, NO_PART};
use tracing::{debug, warn};

/// Rasterize `parts` into the grid's material, mask, and source arrays.
///
/// Cells pinned by constant-temperature parts also get their temperature set
/// immediately, so a newly placed hot plate shows up in the same tick.
pub fn rasterize(parts: &[Part], grid: &mut SimulationGrid) {
    let air = Material::air();
    let nx = grid.nx();
    let ny = grid.ny();

    let mut solid_cells = 0usize;
    let mut fan_cells = 0usize;

    for y in 0..ny {
        for x in 0..nx {
            let center = grid.cell_center(x, y);
            let i = grid.index(x, y);

            // Background defaults
            grid.conductivity.set(x, y, air.conductivity());
            grid.density.set(x, y, air.density());
            grid.specific_heat.set(x, y, air.specific_heat());
            grid.fluid[i] = true;
            grid.fixed_mask[i] = false;
            grid.fixed_t[i] = 0.0;
            grid.fan_mask[i] = false;
            grid.fan_u[i] = 0.0;
            grid.fan_v[i] = 0.0;
            grid.source_part[i] = NO_PART;

            // Topmost part wins
            for (idx, part) in parts.iter().enumerate().rev() {
                let area = part.shape().area();
                if !area.is_finite() || area <= 0.0 {
                    // Parts validate their shape at construction, but the
                    // rasterizer must not trust upstream geometry
                    warn!("skipping zero-area part {idx} during rasterization");
                    continue;
                }
                let bb = part.shape().bounding_box();
                if !bb.contains(center) || !part.contains(center.x, center.y) {
                    continue;
                }

                let m = part.material();
                grid.conductivity.set(x, y, m.conductivity());
                grid.density.set(x, y, m.density());
                grid.specific_heat.set(x, y, m.specific_heat());
                grid.source_part[i] = idx as i32;

                if let Some(fan) = part.fan() {
                    let vel = fan.velocity();
                    grid.fan_mask[i] = true;
                    grid.fan_u[i] = vel.x;
                    grid.fan_v[i] = vel.y;
                    fan_cells += 1;
                } else {
                    grid.fluid[i] = false;
                    solid_cells += 1;
                }

                if let Some(fixed) = part.constant_temperature() {
                    grid.fixed_mask[i] = true;
                    grid.fixed_t[i] = fixed;
                    grid.t.set(x, y, fixed);
                }
                break;
            }
        }
    }

    debug_assert!(grid.materials_valid());
    debug!(
        "rasterized {} parts: {solid_cells} solid cells, {fan_cells} fan cells of {}",
        parts.len(),
        nx * ny
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::optics::OpticalProps;
    use crate::core_types::part::FanSpec;
    use crate::core_types::shape::Shape;

    fn block(x: f32, y: f32, w: f32, h: f32) -> Part {
        Part::new(
            Shape::Rectangle { x, y, w, h },
            Material::new(50.0, 7800.0, 450.0).unwrap(),
            OpticalProps::opaque(),
        )
        .unwrap()
    }

    #[test]
    fn test_solid_part_marks_cells() {
        let mut grid = SimulationGrid::new(10, 10, 1.0, 0.0);
        let parts = vec![block(2.0, 2.0, 3.0, 3.0)];
        rasterize(&parts, &mut grid);

        let inside = grid.index(3, 3);
        let outside = grid.index(8, 8);
        assert!(!grid.fluid[inside]);
        assert!(grid.fluid[outside]);
        assert_eq!(grid.conductivity.get(3, 3), 50.0);
        assert_eq!(grid.source_part[inside], 0);
        assert_eq!(grid.source_part[outside], NO_PART);
    }

    #[test]
    fn test_later_part_overrides_earlier() {
        let mut grid = SimulationGrid::new(10, 10, 1.0, 0.0);
        let mut top = block(2.0, 2.0, 3.0, 3.0);
        top.set_material(Material::new(0.2, 500.0, 2000.0).unwrap());
        let parts = vec![block(0.0, 0.0, 8.0, 8.0), top];
        rasterize(&parts, &mut grid);

        // Covered by both: topmost (last) wins
        assert_eq!(grid.conductivity.get(3, 3), 0.2);
        assert_eq!(grid.source_part[grid.index(3, 3)], 1);
        // Covered only by the base part
        assert_eq!(grid.conductivity.get(6, 6), 50.0);
    }

    #[test]
    fn test_constant_temperature_pins_cells() {
        let mut grid = SimulationGrid::new(10, 10, 1.0, 0.0);
        let mut p = block(4.0, 4.0, 2.0, 2.0);
        p.set_constant_temperature(Some(120.0));
        rasterize(&[p], &mut grid);

        let i = grid.index(4, 4);
        assert!(grid.fixed_mask[i]);
        assert_eq!(grid.fixed_t[i], 120.0);
        assert_eq!(grid.t.get(4, 4), 120.0);
    }

    #[test]
    fn test_fan_part_stays_fluid() {
        let mut grid = SimulationGrid::new(10, 10, 1.0, 0.0);
        let mut p = block(2.0, 2.0, 2.0, 2.0);
        p.set_fan(Some(FanSpec {
            speed: 1.5,
            angle: 0.0,
        }));
        rasterize(&[p], &mut grid);

        let i = grid.index(2, 2);
        assert!(grid.fluid[i]);
        assert!(grid.fan_mask[i]);
        assert!((grid.fan_u[i] - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_removing_part_restores_air() {
        let mut grid = SimulationGrid::new(10, 10, 1.0, 0.0);
        rasterize(&[block(2.0, 2.0, 3.0, 3.0)], &mut grid);
        assert!(!grid.fluid[grid.index(3, 3)]);

        rasterize(&[], &mut grid);
        assert!(grid.fluid[grid.index(3, 3)]);
        assert_eq!(grid.conductivity.get(3, 3), Material::air().conductivity());
    }
}
