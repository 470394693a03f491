mod bounding_box;
mod volume;

pub use bounding_box::BoundingBox;
pub use volume::{Volume, DEFAULT_RESOLUTION};
