use crate::traits;
use crate::FloatNum;

//  NW(8)  N(3)  NE(5)
//      \   |   /
//  W(2) - C(0) - E(1)
//      /   |   \
//  SW(6)  S(4)  SE(7)
#[derive(Eq, Ord, PartialEq, PartialOrd, Copy, Clone, Debug, Hash)]
#[repr(usize)]
pub enum D2Q9 {
    C = 0,
    E = 1,
    W = 2,
    N = 3,
    S = 4,
    NE = 5,
    SW = 6,
    SE = 7,
    NW = 8,
}

// Discrete velocities
pub const EX: [i32; 9] = [0, 1, -1, 0, 0, 1, -1, 1, -1];
pub const EY: [i32; 9] = [0, 0, 0, 1, -1, 1, -1, -1, 1];

const T1: FloatNum = 4. / 9.;
const T2: FloatNum = 1. / 9.;
const T3: FloatNum = 1. / 36.;

// weights
pub const WEIGHTS: [FloatNum; 9] = [T1, T2, T2, T2, T2, T3, T3, T3, T3];

pub const OPPOSITE: [usize; 9] = [0, 2, 1, 4, 3, 6, 5, 8, 7];

const ALL: [D2Q9; 9] = [
    D2Q9::C,
    D2Q9::E,
    D2Q9::W,
    D2Q9::N,
    D2Q9::S,
    D2Q9::NE,
    D2Q9::SW,
    D2Q9::SE,
    D2Q9::NW,
];

impl D2Q9 {
    #[inline(always)]
    pub fn new(v: usize) -> D2Q9 {
        assert!(v < 9);
        ALL[v]
    }
}

type Iter = std::iter::Map<std::ops::Range<usize>, fn(usize) -> D2Q9>;

impl traits::Distribution for D2Q9 {
    type Storage = [FloatNum; 9];
    type AllIterator = Iter;

    #[inline(always)]
    fn all() -> Self::AllIterator {
        (0..Self::size()).map(D2Q9::new as fn(usize) -> D2Q9)
    }
    #[inline(always)]
    fn c_squ() -> FloatNum {
        1. / 3.
    }
    #[inline(always)]
    fn size() -> usize {
        9
    }
    #[inline(always)]
    fn value(&self) -> usize {
        *self as usize
    }
    #[inline(always)]
    fn velocity(&self) -> [i32; 2] {
        let k = self.value();
        [EX[k], EY[k]]
    }
    #[inline(always)]
    fn constant(&self) -> FloatNum {
        WEIGHTS[self.value()]
    }
    #[inline(always)]
    fn opposite(&self) -> Self {
        ALL[OPPOSITE[self.value()]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Distribution;
    use approx::assert_relative_eq;

    #[test]
    fn weights_sum_to_one() {
        let total: FloatNum = D2Q9::all().map(|n| n.constant()).sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-15);
    }

    #[test]
    fn opposite_reverses_velocity() {
        for n in D2Q9::all() {
            let [ex, ey] = n.velocity();
            let [ox, oy] = n.opposite().velocity();
            assert_eq!((ox, oy), (-ex, -ey), "{:?}", n);
            assert_eq!(n.opposite().opposite(), n);
        }
    }

    #[test]
    fn second_moment_is_isotropic() {
        let mut xx = 0.0;
        let mut yy = 0.0;
        let mut xy = 0.0;
        for n in D2Q9::all() {
            let [ex, ey] = n.velocity();
            let w = n.constant();
            xx += w * (ex * ex) as FloatNum;
            yy += w * (ey * ey) as FloatNum;
            xy += w * (ex * ey) as FloatNum;
        }
        assert_relative_eq!(xx, D2Q9::c_squ(), epsilon = 1e-15);
        assert_relative_eq!(yy, D2Q9::c_squ(), epsilon = 1e-15);
        assert_relative_eq!(xy, 0.0, epsilon = 1e-15);
    }

    #[test]
    fn directions_round_trip_through_index() {
        for (k, n) in D2Q9::all().enumerate() {
            assert_eq!(n.value(), k);
            assert_eq!(D2Q9::new(k), n);
        }
    }
}
