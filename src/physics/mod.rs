pub mod ns;

pub use ns::{Moments, NavierStokes, SingleRelaxationTime};
