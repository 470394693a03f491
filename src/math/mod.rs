pub mod aabb;
pub mod transform;

pub use aabb::Aabb;
pub use transform::Transform;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// 3x3 rotation matrix.
pub type Rotation3 = nalgebra::Rotation3<f64>;

/// 4x4 transformation matrix.
pub type Matrix4 = nalgebra::Matrix4<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-9;

/// Internal length unit.
pub const MM: f64 = 1.0;

/// Centimetre in internal units.
pub const CM: f64 = 10.0 * MM;

/// Metre in internal units.
pub const M: f64 = 1000.0 * MM;

/// Degree in radians.
pub const DEG: f64 = std::f64::consts::PI / 180.0;

/// Full turn in radians.
pub const TWO_PI: f64 = 2.0 * std::f64::consts::PI;
