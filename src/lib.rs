pub mod array;
pub mod config;
pub mod detector;
pub mod error;
pub mod material;
pub mod math;
pub mod operations;
pub mod params;
pub mod placement;
pub mod report;
pub mod solid;

pub use error::{GeoError, Result};
