//! Error type shared by the solver, the duct driver and the configuration layer.

use crate::FloatNum;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LbmError>;

#[derive(Error, Debug)]
pub enum LbmError {
    /// Rejected before any iteration takes place.
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// Moments or the convergence metric became NaN or infinite.
    #[error("simulation diverged at iteration {iteration} (first bad node: {node:?})")]
    Diverged {
        iteration: usize,
        node: Option<(usize, usize)>,
    },

    #[error("no convergence after {iterations} iterations (last relative change {residual:e})")]
    NotConverged {
        iterations: usize,
        residual: FloatNum,
    },

    #[error("simulation has not been run yet")]
    NotRun,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LbmError {
    pub fn invalid<V: ToString, R: Into<String>>(name: &'static str, value: V, reason: R) -> Self {
        LbmError::InvalidParameter {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}
