use crate::traits::Geometry;

/// Axis-aligned wall one lattice row (or column) thick.
///
/// `n` is the unit normal pointing into the fluid and `x` any node on the
/// plane. A lattice velocity with a negative component along `n` would
/// leave the fluid through the wall.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Plane {
    n: (isize, isize),
    x: (usize, usize),
}

impl Plane {
    pub fn new(n: (isize, isize), x: (usize, usize)) -> Plane {
        assert!(
            matches!(n, (1, 0) | (-1, 0) | (0, 1) | (0, -1)),
            "plane normal must be axis-aligned, got {:?}",
            n
        );
        Plane { n, x }
    }

    /// Wall below row `j = 0`.
    pub fn bottom() -> Plane {
        Plane::new((0, 1), (0, 0))
    }

    /// Wall above row `j = ny - 1`.
    pub fn top(ny: usize) -> Plane {
        Plane::new((0, -1), (0, ny - 1))
    }
}

impl Geometry for Plane {
    #[inline(always)]
    fn contains(&self, i: usize, j: usize) -> bool {
        match self.n {
            (_, 0) => i == self.x.0,
            _ => j == self.x.1,
        }
    }

    #[inline(always)]
    fn blocks(&self, e: [i32; 2]) -> bool {
        (e[0] as isize) * self.n.0 + (e[1] as isize) * self.n.1 < 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bottom_wall_blocks_downward_velocities() {
        let wall = Plane::bottom();
        assert!(wall.contains(7, 0));
        assert!(!wall.contains(0, 1));
        assert!(wall.blocks([0, -1]));
        assert!(wall.blocks([1, -1]));
        assert!(!wall.blocks([1, 0]));
        assert!(!wall.blocks([-1, 1]));
    }

    #[test]
    fn top_wall_blocks_upward_velocities() {
        let wall = Plane::top(10);
        assert!(wall.contains(3, 9));
        assert!(!wall.contains(3, 8));
        assert!(wall.blocks([-1, 1]));
        assert!(!wall.blocks([0, 0]));
        assert!(!wall.blocks([0, -1]));
    }

    #[test]
    fn vertical_plane_matches_column() {
        let wall = Plane::new((1, 0), (0, 0));
        assert!(wall.contains(0, 5));
        assert!(!wall.contains(1, 5));
        assert!(wall.blocks([-1, 1]));
    }

    #[test]
    #[should_panic]
    fn diagonal_normal_is_rejected() {
        Plane::new((1, 1), (0, 0));
    }
}
