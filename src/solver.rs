use crate::boundary;
use crate::depth::DepthMap;
use crate::error::{LbmError, Result};
use crate::grid;
use crate::streaming::stream_2d;
use crate::traits::{Distribution, DistributionStorage, Physics};
use crate::FloatNum;
use log::{debug, info, warn};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use time::Duration;

/// Macroscopic fields, indexed `[i, j]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Fields {
    pub density: Array2<FloatNum>,
    pub ux: Array2<FloatNum>,
    pub uy: Array2<FloatNum>,
    /// Depth-integrated velocity.
    pub uh: Array2<FloatNum>,
    pub vh: Array2<FloatNum>,
}

impl Fields {
    fn at_rest(dims: (usize, usize)) -> Fields {
        Fields {
            density: Array2::ones(dims),
            ux: Array2::zeros(dims),
            uy: Array2::zeros(dims),
            uh: Array2::zeros(dims),
            vh: Array2::zeros(dims),
        }
    }

    pub fn dim(&self) -> (usize, usize) {
        self.density.dim()
    }

    pub fn total_mass(&self) -> FloatNum {
        self.density.sum()
    }

    /// Sum of `sqrt(u^2 + v^2)` over all nodes.
    pub fn total_speed(&self) -> FloatNum {
        self.ux
            .iter()
            .zip(self.uy.iter())
            .map(|(u, v)| u.hypot(*v))
            .sum()
    }

    pub fn mean_ux(&self) -> FloatNum {
        self.ux.mean().unwrap_or(0.0)
    }
}

/// Stopping rules of [`Solver::run`].
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunControls {
    /// Relative change of the summed speed below which the run stops.
    pub tolerance: FloatNum,
    pub max_iterations: usize,
    /// Progress is logged every `log_every` iterations; 0 disables it.
    pub log_every: usize,
}

impl Default for RunControls {
    fn default() -> Self {
        RunControls {
            tolerance: 1e-10,
            max_iterations: 2_000_000,
            log_every: 1000,
        }
    }
}

impl RunControls {
    pub fn validate(&self) -> Result<()> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(LbmError::invalid(
                "tolerance",
                self.tolerance,
                "must be finite and positive",
            ));
        }
        if self.max_iterations == 0 {
            return Err(LbmError::invalid(
                "max_iterations",
                self.max_iterations,
                "at least one iteration is required",
            ));
        }
        Ok(())
    }
}

/// `|current - previous| / current`.
///
/// Two zero sums count as no change; a zero sum after a non-zero one as
/// an infinite change.
pub fn relative_change(previous: FloatNum, current: FloatNum) -> FloatNum {
    if current == previous {
        0.0
    } else if current == 0.0 {
        FloatNum::INFINITY
    } else {
        (current - previous).abs() / current.abs()
    }
}

/// Tracks the summed speed between iterations.
#[derive(Clone, Debug, Default)]
pub struct Convergence {
    previous: Option<FloatNum>,
}

impl Convergence {
    /// Records `current` and returns the relative change to the previous
    /// value. The first call has nothing to compare with and returns infinity.
    pub fn update(&mut self, current: FloatNum) -> FloatNum {
        let change = match self.previous {
            Some(previous) => relative_change(previous, current),
            None => FloatNum::INFINITY,
        };
        self.previous = Some(current);
        change
    }
}

/// Outcome of [`Solver::run`]. When `converged` is false the fields are
/// the last ones computed before the iteration cap was hit.
#[derive(Clone, Debug)]
pub struct SolverReport {
    pub fields: Fields,
    pub iterations: usize,
    pub residual: FloatNum,
    pub converged: bool,
    /// Relative change after every iteration.
    pub history: Vec<FloatNum>,
}

impl SolverReport {
    pub fn into_converged(self) -> Result<Fields> {
        if self.converged {
            Ok(self.fields)
        } else {
            Err(LbmError::NotConverged {
                iterations: self.iterations,
                residual: self.residual,
            })
        }
    }
}

/// Lattice-Boltzmann Solver state
pub struct Solver<P: Physics> {
    grid: grid::StructuredRectangular,
    pub bcs: boundary::Handler,
    physics: P,
    depth: DepthMap,
    f: Array2<DistributionStorage<P::Distribution>>, // Distribution functions
    f_hlp: Array2<DistributionStorage<P::Distribution>>, // Post-collision distributions
    fields: Fields,
    iteration: usize,
}

impl<P: Physics> Solver<P> {
    /// Create a new solver from a `grid`, its boundary conditions, `physics`
    /// and the aperture of every node. Populations start at rest.
    pub fn new(
        grid: grid::StructuredRectangular,
        bcs: boundary::Handler,
        physics: P,
        depth: DepthMap,
    ) -> Result<Solver<P>> {
        if depth.dim() != grid.dimensions() {
            return Err(LbmError::invalid(
                "depth",
                format!("{:?}", depth.dim()),
                format!("shape must match the grid {:?}", grid.dimensions()),
            ));
        }
        let dims = grid.dimensions();
        let mut solver = Solver {
            grid,
            bcs,
            physics,
            depth,
            f: Array2::from_elem(dims, Default::default()),
            f_hlp: Array2::from_elem(dims, Default::default()),
            fields: Fields::at_rest(dims),
            iteration: 0,
        };
        solver.initialize();
        Ok(solver)
    }

    /// Initialize distributions to the equilibrium at rest with unit density
    pub fn initialize(&mut self) {
        let mut rest: DistributionStorage<P::Distribution> = Default::default();
        for n in P::Distribution::all() {
            rest.as_mut()[n.value()] = n.constant();
        }
        self.f.fill(rest);
        self.f_hlp.fill(rest);
        self.fields = Fields::at_rest(self.grid.dimensions());
        self.iteration = 0;
    }

    pub fn grid(&self) -> &grid::StructuredRectangular {
        &self.grid
    }

    pub fn physics(&self) -> &P {
        &self.physics
    }

    pub fn depth(&self) -> &DepthMap {
        &self.depth
    }

    /// Macroscopic fields of the last collision step.
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn populations(&self, i: usize, j: usize) -> &DistributionStorage<P::Distribution> {
        &self.f[[i, j]]
    }

    pub fn set_populations(&mut self, i: usize, j: usize, f: DistributionStorage<P::Distribution>) {
        self.f[[i, j]] = f;
    }

    /// Collision step. Reads `f`, writes `f_hlp` and the macroscopic fields.
    fn collision(&mut self) -> Result<()> {
        for (i, j) in self.grid.nodes() {
            let depth = self.depth.get(i, j);
            let (post, m) = self.physics.collision(&self.f[[i, j]], depth);
            if !m.is_finite() {
                return Err(LbmError::Diverged {
                    iteration: self.iteration + 1,
                    node: Some((i, j)),
                });
            }
            self.f_hlp[[i, j]] = post;
            self.fields.density[[i, j]] = m.density;
            self.fields.uh[[i, j]] = m.flux[0];
            self.fields.vh[[i, j]] = m.flux[1];
            self.fields.ux[[i, j]] = m.velocity[0];
            self.fields.uy[[i, j]] = m.velocity[1];
        }
        Ok(())
    }

    /// Streaming step
    fn streaming(&mut self) {
        stream_2d::<P::Distribution>(&self.grid, &self.bcs, &self.f_hlp, &mut self.f);
    }

    /// One collision followed by one streaming step.
    pub fn step(&mut self) -> Result<()> {
        self.collision()?;
        self.streaming();
        self.iteration += 1;
        Ok(())
    }

    /// Iterates until the relative change of the summed speed drops below
    /// `controls.tolerance` or `controls.max_iterations` is reached.
    pub fn run(&mut self, controls: &RunControls) -> Result<SolverReport> {
        controls.validate()?;
        info!(
            "Simulation started: {}x{} nodes, nu = {:.6}, force = {:?}",
            self.grid.x,
            self.grid.y,
            self.physics.viscosity(),
            self.physics.force()
        );

        let mut convergence = Convergence::default();
        let mut history = Vec::new();
        let mut residual = FloatNum::INFINITY;
        let mut converged = false;
        let mut iter = 0;

        while iter < controls.max_iterations {
            let write_output = controls.log_every > 0 && iter % controls.log_every == 0;
            let mut collided = Ok(());
            let d = Duration::span(|| {
                let d = Duration::span(|| collided = self.collision());
                if write_output {
                    self.substep("collision", d);
                }
                if collided.is_ok() {
                    let d = Duration::span(|| self.streaming());
                    if write_output {
                        self.substep("streaming", d);
                    }
                }
            });
            collided?;
            self.iteration += 1;
            iter += 1;

            let current = self.fields.total_speed();
            if !current.is_finite() {
                return Err(LbmError::Diverged {
                    iteration: self.iteration,
                    node: None,
                });
            }
            residual = convergence.update(current);
            history.push(residual);

            if write_output {
                self.step_info(iter, residual, d);
            }
            if residual < controls.tolerance {
                converged = true;
                break;
            }
        }

        if converged {
            info!(
                "Converged after {} iterations (relative change {:.3e})",
                iter, residual
            );
        } else {
            warn!(
                "Stopped after {} iterations without convergence (relative change {:.3e} > {:.1e})",
                iter, residual, controls.tolerance
            );
        }

        Ok(SolverReport {
            fields: self.fields.clone(),
            iterations: iter,
            residual,
            converged,
            history,
        })
    }

    /// Logs line info of a whole iteration step
    fn step_info(&self, n_it: usize, residual: FloatNum, duration: Duration) {
        info!(
            "#{} | mass: {:.12} | relative change: {:.3e} | duration: {} ms",
            n_it,
            self.fields.total_mass(),
            residual,
            duration.num_milliseconds()
        );
    }

    /// Logs line info of an iteration sub-step
    fn substep(&self, name: &str, duration: Duration) {
        debug!(
            "# [{}] | mass: {:.12} | duration: {} \u{03BC}s",
            name,
            self.fields.total_mass(),
            duration.num_microseconds().unwrap_or(i64::MAX)
        );
    }
}
