use crate::physics::Moments;
use crate::FloatNum;

/// Region of the lattice occupied by a wall, together with the lattice
/// velocities that would leave the fluid through it.
pub trait Geometry: Send + Sync {
    fn contains(&self, i: usize, j: usize) -> bool;
    fn blocks(&self, e: [i32; 2]) -> bool;
}

pub trait Distribution: Sized + Copy + Sync + Send + 'static {
    type Storage: Copy + Default + AsRef<[FloatNum]> + AsMut<[FloatNum]> + Send + Sync;
    type AllIterator: Iterator<Item = Self>;

    fn all() -> Self::AllIterator;
    fn c_squ() -> FloatNum;
    fn size() -> usize;
    /// Index of the direction inside `Storage`.
    fn value(&self) -> usize;
    fn velocity(&self) -> [i32; 2];
    /// Lattice weight.
    fn constant(&self) -> FloatNum;
    fn opposite(&self) -> Self;
}

pub type DistributionStorage<D> = <D as Distribution>::Storage;

pub trait Collision<D: Distribution>: Copy + Sync + Send {
    fn tau(&self) -> FloatNum;
    fn viscosity(&self) -> FloatNum;
    /// Relaxes `f` towards equilibrium at (`density`, `velocity`) and adds
    /// the discrete contribution of `force`.
    fn collision(
        &self,
        f: &D::Storage,
        density: FloatNum,
        velocity: [FloatNum; 2],
        force: [FloatNum; 2],
    ) -> D::Storage;
}

pub trait Physics: Copy + Sync + Send {
    type Distribution: Distribution;

    fn viscosity(&self) -> FloatNum;
    fn force(&self) -> [FloatNum; 2];
    /// Post-collision populations of one node plus the moments computed on the way.
    fn collision(
        &self,
        f: &DistributionStorage<Self::Distribution>,
        depth: FloatNum,
    ) -> (DistributionStorage<Self::Distribution>, Moments);
}
