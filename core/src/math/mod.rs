pub mod geodesy;

pub use geodesy::{CoarseBound, GeoPoint};
