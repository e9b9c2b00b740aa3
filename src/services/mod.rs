pub mod orientation;

pub use orientation::{orientation_rotation, OrientationNormalizer};
