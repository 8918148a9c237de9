pub mod boundary;
pub mod config;
pub mod depth;
pub mod distribution;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod lbm;
pub mod physics;
pub mod solver;
pub mod streaming;
pub mod traits;

pub use error::{LbmError, Result};
pub use lbm::{halfway, halfway_with_depth, Sim};

use config::SimConfig;
use libc::{c_double, c_int, size_t};
use log::error;
use std::ptr;

pub type FloatNum = f64;

/// Builds a duct simulation and stores an owning pointer in `*ptr`.
///
/// # Safety
///
/// `ptr` must be valid for writes. The stored pointer must be released
/// with [`free_sim`].
#[no_mangle]
pub unsafe extern "C" fn init_sim(
    ptr: *mut *mut Sim,
    tau: c_double,
    nx: size_t,
    ny: size_t,
    gx: c_double,
    gy: c_double,
    depth: c_double,
) -> bool {
    if ptr.is_null() {
        return false;
    }
    let config = SimConfig {
        tau,
        nx,
        ny,
        force: [gx, gy],
        depth,
        ..SimConfig::default()
    };
    match Sim::init_sim_duct(config) {
        Ok(sim) => {
            *ptr = sim.to_ptr();
            true
        }
        Err(message) => {
            *ptr = ptr::null_mut();
            error!("Error when initializing LBM simulation: {}", message);
            false
        }
    }
}

/// Runs the simulation. Returns 0 when converged, 1 when the iteration cap
/// was reached and -1 on error.
///
/// # Safety
///
/// `ptr` must be null or come from [`init_sim`].
#[no_mangle]
pub unsafe extern "C" fn simulate(ptr: *mut Sim) -> c_int {
    if ptr.is_null() {
        return -1;
    }
    match Sim::from_ptr(ptr).simulate() {
        Ok(report) if report.converged => 0,
        Ok(_) => 1,
        Err(message) => {
            error!("LBM simulation failed: {}", message);
            -1
        }
    }
}

/// Copies density and velocity into caller buffers of at least `nx * ny`
/// values, node `(i, j)` at offset `i + nx * j`.
///
/// # Safety
///
/// `ptr` must be null or come from [`init_sim`]; each buffer must be null
/// or valid for `len` writes.
#[no_mangle]
pub unsafe extern "C" fn get_sim_data(
    ptr: *mut Sim,
    rho: *mut c_double,
    ux: *mut c_double,
    uy: *mut c_double,
    len: size_t,
) -> bool {
    if ptr.is_null() || rho.is_null() || ux.is_null() || uy.is_null() {
        return false;
    }
    let sim = Sim::from_ptr(ptr);
    let fields = match sim.fields() {
        Ok(fields) => fields,
        Err(message) => {
            error!("No simulation data: {}", message);
            return false;
        }
    };
    let (nx, ny) = fields.dim();
    if len < nx * ny {
        return false;
    }
    let rho = std::slice::from_raw_parts_mut(rho, len);
    let ux = std::slice::from_raw_parts_mut(ux, len);
    let uy = std::slice::from_raw_parts_mut(uy, len);
    for j in 0..ny {
        for i in 0..nx {
            let idx = i + nx * j;
            rho[idx] = fields.density[[i, j]];
            ux[idx] = fields.ux[[i, j]];
            uy[idx] = fields.uy[[i, j]];
        }
    }
    true
}

/// # Safety
///
/// `ptr` must be null or come from [`init_sim`], and must not be used afterwards.
#[no_mangle]
pub unsafe extern "C" fn free_sim(ptr: *mut Sim) {
    if !ptr.is_null() {
        drop(Box::from_raw(ptr));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn c_api_round_trip() {
        let mut sim: *mut Sim = ptr::null_mut();
        unsafe {
            assert!(init_sim(&mut sim, 1.1, 3, 6, 1e-8, 0.0, 6.0));
            assert!(!sim.is_null());

            let mut rho = vec![0.0; 18];
            let mut ux = vec![0.0; 18];
            let mut uy = vec![0.0; 18];
            assert!(!get_sim_data(sim, rho.as_mut_ptr(), ux.as_mut_ptr(), uy.as_mut_ptr(), 18));

            assert_eq!(simulate(sim), 0);
            assert!(!get_sim_data(sim, rho.as_mut_ptr(), ux.as_mut_ptr(), uy.as_mut_ptr(), 17));
            assert!(get_sim_data(sim, rho.as_mut_ptr(), ux.as_mut_ptr(), uy.as_mut_ptr(), 18));

            let fields = Sim::from_ptr(sim).fields().unwrap().clone();
            assert_eq!(ux[2 + 3 * 4], fields.ux[[2, 4]]);
            assert!(rho.iter().all(|r| (r - 1.0).abs() < 1e-6));
            assert!(ux.iter().all(|&u| u > 0.0));

            free_sim(sim);
        }
    }

    #[test]
    fn c_api_rejects_bad_input() {
        let mut sim: *mut Sim = ptr::null_mut();
        unsafe {
            assert!(!init_sim(&mut sim, 0.4, 3, 6, 1e-8, 0.0, 6.0));
            assert!(sim.is_null());
            assert!(!init_sim(ptr::null_mut(), 1.1, 3, 6, 1e-8, 0.0, 6.0));
            assert_eq!(simulate(ptr::null_mut()), -1);
            free_sim(ptr::null_mut());
        }
    }
}
