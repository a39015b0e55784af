pub mod detection;
pub mod params;
pub mod sweep;

pub use detection::{detect, DetectionResult};
pub use params::GaParams;
pub use sweep::{run_sweep, SweepOutcome, SweepReport};
