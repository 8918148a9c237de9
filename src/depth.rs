//! Local aperture of the duct, one value per lattice node.

use crate::error::{LbmError, Result};
use crate::grid::StructuredRectangular;
use crate::FloatNum;
use ndarray::Array2;

#[derive(Clone, Debug, PartialEq)]
pub struct DepthMap {
    values: Array2<FloatNum>,
}

impl DepthMap {
    pub fn uniform(grid: &StructuredRectangular, depth: FloatNum) -> Result<Self> {
        check_depth(depth)?;
        Ok(DepthMap {
            values: Array2::from_elem(grid.dimensions(), depth),
        })
    }

    /// Arbitrary per-node depth. The array must have shape `(nx, ny)`.
    pub fn from_array(grid: &StructuredRectangular, values: Array2<FloatNum>) -> Result<Self> {
        if values.dim() != grid.dimensions() {
            return Err(LbmError::invalid(
                "depth",
                format!("{:?}", values.dim()),
                format!("shape must be {:?}", grid.dimensions()),
            ));
        }
        for &depth in values.iter() {
            check_depth(depth)?;
        }
        Ok(DepthMap { values })
    }

    #[inline(always)]
    pub fn get(&self, i: usize, j: usize) -> FloatNum {
        self.values[[i, j]]
    }

    pub fn values(&self) -> &Array2<FloatNum> {
        &self.values
    }

    pub fn dim(&self) -> (usize, usize) {
        self.values.dim()
    }
}

fn check_depth(depth: FloatNum) -> Result<()> {
    if !depth.is_finite() || depth <= 0.0 {
        return Err(LbmError::invalid("depth", depth, "must be finite and positive"));
    }
    Ok(())
}
