use crate::error::{LbmError, Result};

/// Rectangular 2D lattice. `x` (index `i`) is periodic, `y` (index `j`)
/// is the wall-bounded axis.
#[derive(Eq, Ord, PartialEq, PartialOrd, Copy, Clone, Debug, Hash)]
pub struct StructuredRectangular {
    pub x: usize,
    pub y: usize,
}

impl StructuredRectangular {
    pub fn new(x: usize, y: usize) -> Result<Self> {
        if x == 0 {
            return Err(LbmError::invalid("nx", x, "grid needs at least one column"));
        }
        if y == 0 {
            return Err(LbmError::invalid("ny", y, "grid needs at least one row"));
        }
        Ok(StructuredRectangular { x, y })
    }

    #[inline(always)]
    pub fn size(&self) -> usize {
        self.x * self.y
    }

    /// Shape used for every field on this grid, indexed `[i, j]`.
    #[inline(always)]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.x, self.y)
    }

    /// Node reached from `(i, j)` by lattice velocity `e`, wrapping on both axes.
    #[inline(always)]
    pub fn neighbor(&self, i: usize, j: usize, e: [i32; 2]) -> (usize, usize) {
        let ni = (i as i64 + e[0] as i64).rem_euclid(self.x as i64) as usize;
        let nj = (j as i64 + e[1] as i64).rem_euclid(self.y as i64) as usize;
        (ni, nj)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (usize, usize)> {
        let (nx, ny) = (self.x, self.y);
        (0..ny).flat_map(move |j| (0..nx).map(move |i| (i, j)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_dimensions() {
        assert!(StructuredRectangular::new(0, 4).is_err());
        assert!(StructuredRectangular::new(4, 0).is_err());
    }

    #[test]
    fn neighbor_wraps_both_axes() {
        let grid = StructuredRectangular::new(3, 5).unwrap();
        assert_eq!(grid.neighbor(2, 4, [1, 1]), (0, 0));
        assert_eq!(grid.neighbor(0, 0, [-1, -1]), (2, 4));
        assert_eq!(grid.neighbor(1, 2, [0, 0]), (1, 2));
    }

    #[test]
    fn nodes_visits_every_index_once() {
        let grid = StructuredRectangular::new(3, 4).unwrap();
        let nodes: Vec<_> = grid.nodes().collect();
        assert_eq!(nodes.len(), grid.size());
        assert_eq!(nodes[0], (0, 0));
        assert_eq!(nodes[1], (1, 0));
        assert_eq!(nodes[3], (0, 1));
    }
}
