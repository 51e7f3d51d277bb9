//! Signal primitives shared by the detectors.

pub mod coeff;
pub mod smoother;
pub mod window;

pub use coeff::{ms_to_samples, time_coefficient};
pub use smoother::one_pole;
pub use window::{sliding_max, sliding_mean_square, Window};
