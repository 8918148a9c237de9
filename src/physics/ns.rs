//! Depth-averaged (Hele-Shaw) Navier-Stokes on a 2D lattice.
//!
//! The out-of-plane aperture enters twice: the momentum carried by the
//! populations is the depth-integrated flux `(uh, vh)`, and the wall
//! friction of the third dimension shows up as a Brinkman-type drag
//! `-12 nu / depth^2 * (uh, vh)` added to the body force. Both enter the
//! collision through Guo's forcing scheme, which makes the velocity an
//! implicit function of the force. It is solved in closed form per node.

use crate::error::{LbmError, Result};
use crate::traits::{Collision, Distribution, DistributionStorage, Physics};
use crate::FloatNum;
use std::marker::PhantomData;

/// Macroscopic quantities of a single node.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Moments {
    pub density: FloatNum,
    /// Depth-integrated velocity `(uh, vh)`.
    pub flux: [FloatNum; 2],
    /// Depth-averaged velocity `(u, v) = flux / depth`.
    pub velocity: [FloatNum; 2],
}

impl Moments {
    #[inline(always)]
    pub fn is_finite(&self) -> bool {
        self.density.is_finite()
            && self.flux.iter().all(|x| x.is_finite())
            && self.velocity.iter().all(|x| x.is_finite())
    }

    #[inline(always)]
    pub fn speed(&self) -> FloatNum {
        self.velocity[0].hypot(self.velocity[1])
    }
}

/// Single relaxation time (SRT/BGK) algorithm with Guo forcing
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SingleRelaxationTime {
    tau: FloatNum,
}

impl SingleRelaxationTime {
    pub fn new(tau: FloatNum) -> Result<Self> {
        if !tau.is_finite() || tau <= 0.5 {
            return Err(LbmError::invalid(
                "tau",
                tau,
                "relaxation time must be greater than 0.5 for a positive viscosity",
            ));
        }
        Ok(SingleRelaxationTime { tau })
    }

    pub fn tau(&self) -> FloatNum {
        self.tau
    }
}

impl<D: Distribution> Collision<D> for SingleRelaxationTime {
    #[inline(always)]
    fn tau(&self) -> FloatNum {
        self.tau
    }

    /// Kinematic viscosity for `dt = 1`.
    #[inline(always)]
    fn viscosity(&self) -> FloatNum {
        (self.tau - 0.5) * D::c_squ()
    }

    #[inline(always)]
    fn collision(
        &self,
        f: &D::Storage,
        density: FloatNum,
        velocity: [FloatNum; 2],
        force: [FloatNum; 2],
    ) -> D::Storage {
        let [u_x, u_y] = velocity;
        let c_squ = D::c_squ();

        // equilibrium constants
        let f0 = 2. * c_squ * c_squ;
        let f1 = 2. * c_squ;
        let u_squ = u_x * u_x + u_y * u_y;
        let f2 = u_squ / f1;

        let u_f = u_x * force[0] + u_y * force[1];
        let guo = 1. - 0.5 / self.tau;
        let omega = 1. / self.tau;

        let mut out = D::Storage::default();
        {
            let f = f.as_ref();
            let out = out.as_mut();
            for n in D::all() {
                let [ex, ey] = n.velocity();
                let (ex, ey) = (ex as FloatNum, ey as FloatNum);
                let k = n.value();

                let u_n = ex * u_x + ey * u_y;
                let e_f = ex * force[0] + ey * force[1];

                // incompressible equilibrium: flux is not divided by density
                let n_equ = n.constant() * (density + u_n / c_squ + u_n * u_n / f0 - f2);
                let source =
                    n.constant() * guo * ((e_f - u_f) / c_squ + u_n * e_f / (c_squ * c_squ));

                out[k] = f[k] - omega * (f[k] - n_equ) + source;
            }
        }
        out
    }
}

/// Depth-averaged Navier-Stokes driven by a uniform body force.
#[derive(Copy, Clone, Debug)]
pub struct NavierStokes<D: Distribution, C: Collision<D>> {
    pub accel: [FloatNum; 2],
    collision: C,
    __dist: PhantomData<D>,
}

impl<D: Distribution, C: Collision<D>> NavierStokes<D, C> {
    pub fn new(accel: [FloatNum; 2], col: C) -> Result<Self> {
        if accel.iter().any(|g| !g.is_finite()) {
            return Err(LbmError::invalid(
                "force",
                format!("{:?}", accel),
                "body force must be finite",
            ));
        }
        Ok(Self {
            accel,
            collision: col,
            __dist: PhantomData,
        })
    }

    pub fn relaxation(&self) -> &C {
        &self.collision
    }

    /// Density and raw momentum `sum f_k e_k` of one node.
    #[inline(always)]
    pub fn raw_moments(f: &DistributionStorage<D>) -> (FloatNum, [FloatNum; 2]) {
        let f = f.as_ref();
        let mut density = 0.;
        let mut momentum = [0., 0.];
        for n in D::all() {
            let [ex, ey] = n.velocity();
            let f_n = f[n.value()];
            density += f_n;
            momentum[0] += f_n * ex as FloatNum;
            momentum[1] += f_n * ey as FloatNum;
        }
        (density, momentum)
    }
}

impl<D: Distribution, C: Collision<D>> Physics for NavierStokes<D, C> {
    type Distribution = D;

    #[inline(always)]
    fn viscosity(&self) -> FloatNum {
        self.collision.viscosity()
    }

    #[inline(always)]
    fn force(&self) -> [FloatNum; 2] {
        self.accel
    }

    #[inline(always)]
    fn collision(
        &self,
        f: &DistributionStorage<D>,
        depth: FloatNum,
    ) -> (DistributionStorage<D>, Moments) {
        let (density, momentum) = Self::raw_moments(f);

        let nu = self.viscosity();
        let depth_squ = depth * depth;
        let drag = 12. * nu / depth_squ;
        let denominator = 1. + 0.5 * drag;

        let flux = [
            (momentum[0] + 0.5 * depth * self.accel[0]) / denominator,
            (momentum[1] + 0.5 * depth * self.accel[1]) / denominator,
        ];
        let force = [
            depth * self.accel[0] - drag * flux[0],
            depth * self.accel[1] - drag * flux[1],
        ];

        let moments = Moments {
            density,
            flux,
            velocity: [flux[0] / depth, flux[1] / depth],
        };
        (self.collision.collision(f, density, flux, force), moments)
    }
}
