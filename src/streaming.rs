use crate::boundary::Handler;
use crate::grid::StructuredRectangular;
use crate::traits::{Distribution, DistributionStorage};
use ndarray::Array2;

/// Push-streaming of the post-collision populations `f_hlp` into `f`.
///
/// A population whose path is blocked by a wall is bounced back into the
/// opposite direction of its own node (halfway bounce-back); every other
/// population moves to the periodic neighbour. `f_hlp` is only read, so
/// the result does not depend on the visiting order. Each slot of `f` is
/// written exactly once.
pub fn stream_2d<D: Distribution>(
    grid: &StructuredRectangular,
    bcs: &Handler,
    f_hlp: &Array2<DistributionStorage<D>>,
    f: &mut Array2<DistributionStorage<D>>,
) {
    for (i, j) in grid.nodes() {
        let src = f_hlp[[i, j]];
        let src = src.as_ref();
        for n in D::all() {
            let e = n.velocity();
            let value = src[n.value()];
            if bcs.reflects(i, j, e) {
                f[[i, j]].as_mut()[n.opposite().value()] = value;
            } else {
                let (ni, nj) = grid.neighbor(i, j, e);
                f[[ni, nj]].as_mut()[n.value()] = value;
            }
        }
    }
}
