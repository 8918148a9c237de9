use crate::geometry::Plane;
use crate::grid::StructuredRectangular;
use crate::traits::Geometry;
use std::collections::HashMap;

pub trait AnyCondition: Send + Sync {
    fn contains(&self, i: usize, j: usize) -> bool;
    /// Does a population at `(i, j)` moving along `e` hit this wall?
    fn reflects(&self, i: usize, j: usize, e: [i32; 2]) -> bool;
}

/// Halfway bounce-back wall: populations leaving the fluid through the
/// geometry are returned, reversed, to the node they came from. The
/// effective no-slip surface lies half a lattice spacing outside the node.
pub struct Condition<T: Geometry> {
    geometry: T,
}

impl<T: Geometry> Condition<T> {
    pub fn new(g: T) -> Condition<T> {
        Condition { geometry: g }
    }
}

impl<T: Geometry> AnyCondition for Condition<T> {
    #[inline(always)]
    fn contains(&self, i: usize, j: usize) -> bool {
        self.geometry.contains(i, j)
    }
    #[inline(always)]
    fn reflects(&self, i: usize, j: usize, e: [i32; 2]) -> bool {
        self.geometry.contains(i, j) && self.geometry.blocks(e)
    }
}

/// Boundary conditions of a simulation. Everything not covered by a
/// condition streams periodically.
#[derive(Default)]
pub struct Handler {
    boundary_conditions: HashMap<&'static str, Box<dyn AnyCondition>>,
}

impl Handler {
    pub fn new() -> Handler {
        Handler::default()
    }

    /// Walls at `j = 0` and `j = ny - 1`, periodic along `i`.
    pub fn duct(grid: &StructuredRectangular) -> Handler {
        let mut handler = Handler::new();
        handler.add("bottom", Box::new(Condition::new(Plane::bottom())));
        handler.add("top", Box::new(Condition::new(Plane::top(grid.y))));
        handler
    }

    pub fn add(&mut self, label: &'static str, bc: Box<dyn AnyCondition>) {
        self.boundary_conditions.insert(label, bc);
    }

    pub fn len(&self) -> usize {
        self.boundary_conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boundary_conditions.is_empty()
    }

    pub fn labels(&self) -> Vec<&'static str> {
        let mut labels: Vec<_> = self.boundary_conditions.keys().copied().collect();
        labels.sort_unstable();
        labels
    }

    #[inline(always)]
    pub fn solid_boundary(&self, i: usize, j: usize) -> bool {
        self.boundary_conditions.values().any(|bc| bc.contains(i, j))
    }

    #[inline(always)]
    pub fn reflects(&self, i: usize, j: usize, e: [i32; 2]) -> bool {
        self.boundary_conditions
            .values()
            .any(|bc| bc.reflects(i, j, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::D2Q9;
    use crate::traits::Distribution;

    fn reflected_at(handler: &Handler, j: usize) -> Vec<D2Q9> {
        D2Q9::all()
            .filter(|n| handler.reflects(1, j, n.velocity()))
            .collect()
    }

    #[test]
    fn duct_reflects_into_wall_directions_only() {
        let grid = StructuredRectangular::new(3, 6).unwrap();
        let handler = Handler::duct(&grid);
        assert_eq!(handler.labels(), vec!["bottom", "top"]);

        assert_eq!(
            reflected_at(&handler, 0),
            vec![D2Q9::S, D2Q9::SW, D2Q9::SE]
        );
        assert_eq!(
            reflected_at(&handler, 5),
            vec![D2Q9::N, D2Q9::NE, D2Q9::NW]
        );
        assert!(reflected_at(&handler, 3).is_empty());
        assert!(handler.solid_boundary(0, 5));
        assert!(!handler.solid_boundary(0, 2));
    }

    #[test]
    fn single_row_duct_reflects_both_ways() {
        let grid = StructuredRectangular::new(4, 1).unwrap();
        let handler = Handler::duct(&grid);
        let reflected = reflected_at(&handler, 0);
        assert_eq!(reflected.len(), 6);
        assert!(!reflected.contains(&D2Q9::E));
        assert!(!reflected.contains(&D2Q9::C));
    }

    #[test]
    fn empty_handler_is_fully_periodic() {
        let handler = Handler::new();
        assert!(handler.is_empty());
        assert!(!handler.reflects(0, 0, [0, -1]));
    }
}
