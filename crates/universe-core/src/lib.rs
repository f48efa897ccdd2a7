pub mod chebyshev;
pub mod constants;
pub mod elements;
pub mod orbit;
pub mod rotation;
pub mod time;

pub use chebyshev::{ChebyshevOrbit, ChebyshevSegment};
pub use elements::EllipticalOrbit;
pub use orbit::{FixedPosition, Orbit};
pub use rotation::{ConstantOrientation, RotationModel, UniformRotation};
pub use time::{epoch_to_jd, format_jd, jd_to_epoch, parse_epoch};
