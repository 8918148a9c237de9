//! Duct driver: builds the depth-averaged solver for a Hele-Shaw duct,
//! runs it and turns the converged fields into a velocity profile and a
//! permeability.

use crate::boundary::Handler;
use crate::config::SimConfig;
use crate::depth::DepthMap;
use crate::distribution::D2Q9;
use crate::error::{LbmError, Result};
use crate::grid::StructuredRectangular;
use crate::physics::{NavierStokes, SingleRelaxationTime};
use crate::solver::{Fields, RunControls, Solver, SolverReport};
use crate::traits::Physics;
use crate::FloatNum;
use log::info;
use ndarray::{Array2, Axis};

/// Square micrometres in one millidarcy.
pub const SQUARE_MICRONS_PER_MILLIDARCY: FloatNum = 0.0009869233;

pub type DuctPhysics = NavierStokes<D2Q9, SingleRelaxationTime>;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Permeability {
    /// In units of `dx^2`; square micrometres when `dx` is given in micrometres.
    pub value: FloatNum,
    pub millidarcy: FloatNum,
}

/// Darcy back-calculation `k = dx^2 * nu / g_x * mean(u)`.
pub fn permeability_from_mean_velocity(
    mean_u: FloatNum,
    nu: FloatNum,
    g_x: FloatNum,
    dx: FloatNum,
) -> Result<Permeability> {
    if g_x == 0.0 || !g_x.is_finite() {
        return Err(LbmError::invalid(
            "force[0]",
            g_x,
            "permeability needs a finite, non-zero driving force along x",
        ));
    }
    let value = dx * dx * nu / g_x * mean_u;
    Ok(Permeability {
        value,
        millidarcy: value / SQUARE_MICRONS_PER_MILLIDARCY,
    })
}

pub struct Sim {
    config: SimConfig,
    solver: Solver<DuctPhysics>,
    report: Option<SolverReport>,
}

impl<'a> Sim {
    pub fn to_ptr(self) -> *mut Sim {
        let sim_boxed = Box::new(self);
        Box::into_raw(sim_boxed)
    }

    /// # Safety
    ///
    /// `ptr` must come from [`Sim::to_ptr`] and must not have been freed.
    pub unsafe fn from_ptr(ptr: *mut Sim) -> &'a mut Sim {
        &mut *ptr
    }

    /// Duct with uniform aperture `config.depth`.
    pub fn init_sim_duct(config: SimConfig) -> Result<Sim> {
        config.validate()?;
        let grid = StructuredRectangular::new(config.nx, config.ny)?;
        let depth = DepthMap::uniform(&grid, config.depth)?;
        Sim::build(config, grid, depth)
    }

    /// Duct with a per-node aperture of shape `(nx, ny)`. `config.depth` is ignored.
    pub fn with_depth(config: SimConfig, depth: Array2<FloatNum>) -> Result<Sim> {
        config.validate()?;
        let grid = StructuredRectangular::new(config.nx, config.ny)?;
        let depth = DepthMap::from_array(&grid, depth)?;
        Sim::build(config, grid, depth)
    }

    fn build(config: SimConfig, grid: StructuredRectangular, depth: DepthMap) -> Result<Sim> {
        let physics = NavierStokes::new(config.force, SingleRelaxationTime::new(config.tau)?)?;
        let solver = Solver::new(grid, Handler::duct(&grid), physics, depth)?;
        Ok(Sim {
            config,
            solver,
            report: None,
        })
    }

    /// Runs from the rest state until convergence or the iteration cap.
    /// Every call starts over, so repeated calls give identical results.
    pub fn simulate(&mut self) -> Result<&SolverReport> {
        self.report = None;
        self.solver.initialize();
        let report = self.solver.run(&self.config.run)?;
        Ok(self.report.insert(report))
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn solver(&self) -> &Solver<DuctPhysics> {
        &self.solver
    }

    pub fn report(&self) -> Option<&SolverReport> {
        self.report.as_ref()
    }

    pub fn fields(&self) -> Result<&Fields> {
        self.report
            .as_ref()
            .map(|r| &r.fields)
            .ok_or(LbmError::NotRun)
    }

    /// `u * dx` across the duct at column `i`.
    pub fn velocity_profile(&self, i: usize) -> Result<Vec<FloatNum>> {
        let fields = self.fields()?;
        if i >= self.config.nx {
            return Err(LbmError::invalid(
                "column",
                i,
                format!("must be below nx = {}", self.config.nx),
            ));
        }
        let dx = self.config.dx;
        Ok(fields.ux.index_axis(Axis(0), i).iter().map(|u| u * dx).collect())
    }

    /// Profile at the middle column `nx / 2`.
    pub fn centre_profile(&self) -> Result<Vec<FloatNum>> {
        self.velocity_profile(self.config.nx / 2)
    }

    /// `u * dx` across the duct, averaged along the periodic axis.
    pub fn mean_velocity_profile(&self) -> Result<Vec<FloatNum>> {
        let fields = self.fields()?;
        let dx = self.config.dx;
        let mean = fields.ux.mean_axis(Axis(0)).ok_or(LbmError::NotRun)?;
        Ok(mean.iter().map(|u| u * dx).collect())
    }

    pub fn permeability(&self) -> Result<Permeability> {
        let fields = self.fields()?;
        let k = permeability_from_mean_velocity(
            fields.mean_ux(),
            self.solver.physics().viscosity(),
            self.config.force[0],
            self.config.dx,
        )?;
        info!(
            "absperm = {:.6} um^2 = {:.6} mD",
            k.value, k.millidarcy
        );
        Ok(k)
    }
}

/// Depth-averaged duct flow with halfway bounce-back walls at `j = 0` and
/// `j = ny - 1`, periodic along `i`, uniform aperture `depth`.
/// Fails with [`LbmError::NotConverged`] if the default iteration cap is hit.
pub fn halfway(
    tau: FloatNum,
    nx: usize,
    ny: usize,
    g: [FloatNum; 2],
    depth: FloatNum,
) -> Result<Fields> {
    let config = SimConfig {
        tau,
        nx,
        ny,
        force: g,
        depth,
        run: RunControls::default(),
        ..SimConfig::default()
    };
    let mut sim = Sim::init_sim_duct(config)?;
    sim.simulate()?;
    sim.report.take().ok_or(LbmError::NotRun)?.into_converged()
}

/// [`halfway`] with a per-node aperture of shape `(nx, ny)`.
pub fn halfway_with_depth(
    tau: FloatNum,
    g: [FloatNum; 2],
    depth: Array2<FloatNum>,
) -> Result<Fields> {
    let (nx, ny) = depth.dim();
    let config = SimConfig {
        tau,
        nx,
        ny,
        force: g,
        ..SimConfig::default()
    };
    let mut sim = Sim::with_depth(config, depth)?;
    sim.simulate()?;
    sim.report.take().ok_or(LbmError::NotRun)?.into_converged()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn small() -> SimConfig {
        SimConfig {
            ny: 8,
            depth: 8.0,
            ..SimConfig::default()
        }
    }

    #[test]
    fn consumers_need_a_finished_run() {
        let sim = Sim::init_sim_duct(small()).unwrap();
        assert!(matches!(sim.fields(), Err(LbmError::NotRun)));
        assert!(matches!(sim.permeability(), Err(LbmError::NotRun)));
        assert!(sim.report().is_none());
    }

    #[test]
    fn invalid_configuration_fails_fast() {
        let bad_tau = SimConfig {
            tau: 0.5,
            ..small()
        };
        assert!(Sim::init_sim_duct(bad_tau).is_err());
        let bad_depth = SimConfig {
            depth: 0.0,
            ..small()
        };
        assert!(Sim::init_sim_duct(bad_depth).is_err());
        assert!(halfway(1.1, 0, 8, [1e-8, 0.], 8.).is_err());
    }

    #[test]
    fn permeability_needs_x_force() {
        assert!(permeability_from_mean_velocity(1e-6, 0.2, 0.0, 1.0).is_err());
        let k = permeability_from_mean_velocity(1e-6, 0.2, 1e-8, 2.0).unwrap();
        assert_relative_eq!(k.value, 80.0, max_relative = 1e-12);
        assert_relative_eq!(k.millidarcy, 80.0 / SQUARE_MICRONS_PER_MILLIDARCY, max_relative = 1e-12);

        let mut sim = Sim::init_sim_duct(SimConfig {
            force: [0.0, 0.0],
            ..small()
        })
        .unwrap();
        sim.simulate().unwrap();
        assert!(sim.permeability().is_err());
    }

    #[test]
    fn profiles_have_one_value_per_row() {
        let mut sim = Sim::init_sim_duct(small()).unwrap();
        assert!(sim.simulate().unwrap().converged);

        let centre = sim.centre_profile().unwrap();
        let mean = sim.mean_velocity_profile().unwrap();
        assert_eq!(centre.len(), 8);
        assert_eq!(mean.len(), 8);
        for (c, m) in centre.iter().zip(mean.iter()) {
            assert_relative_eq!(*c, *m, max_relative = 1e-9);
        }
        assert!(sim.velocity_profile(3).is_err());
    }

    #[test]
    fn profile_is_symmetric_and_peaks_in_the_middle() {
        let mut sim = Sim::init_sim_duct(small()).unwrap();
        sim.simulate().unwrap();
        let u = sim.centre_profile().unwrap();
        let ny = u.len();
        for j in 0..ny / 2 {
            assert_relative_eq!(u[j], u[ny - 1 - j], max_relative = 1e-8);
            assert!(u[j] < u[j + 1] || j + 1 >= ny / 2);
        }
        assert!(u.iter().all(|&x| x > 0.0));
    }

    #[test]
    fn dx_scales_profile_and_permeability() {
        let mut unit = Sim::init_sim_duct(small()).unwrap();
        unit.simulate().unwrap();
        let mut scaled = Sim::init_sim_duct(SimConfig { dx: 2.0, ..small() }).unwrap();
        scaled.simulate().unwrap();

        let a = unit.centre_profile().unwrap();
        let b = scaled.centre_profile().unwrap();
        assert_relative_eq!(b[3], 2.0 * a[3], max_relative = 1e-12);
        assert_relative_eq!(
            scaled.permeability().unwrap().value,
            4.0 * unit.permeability().unwrap().value,
            max_relative = 1e-12
        );
    }

    #[test]
    fn uniform_depth_map_matches_scalar_depth() {
        let scalar = halfway(1.1, 3, 8, [1e-8, 0.], 8.).unwrap();
        let map = halfway_with_depth(1.1, [1e-8, 0.], Array2::from_elem((3, 8), 8.)).unwrap();
        assert_eq!(scalar, map);
    }

    #[test]
    fn deeper_rows_flow_faster() {
        let mut depth = Array2::from_elem((3, 8), 4.0);
        for j in 2..6 {
            depth.index_axis_mut(Axis(1), j).fill(8.0);
        }
        let varying = halfway_with_depth(1.1, [1e-8, 0.], depth).unwrap();
        let shallow = halfway(1.1, 3, 8, [1e-8, 0.], 4.).unwrap();

        assert_relative_eq!(varying.total_mass(), 24.0, max_relative = 1e-9);
        assert!(varying.ux[[1, 3]] > shallow.ux[[1, 3]]);
        assert_relative_eq!(varying.ux[[1, 2]], varying.ux[[1, 5]], max_relative = 1e-8);
    }
}
