//! Solid descriptors.
//!
//! A [`Solid`] is an immutable expression tree: primitives at the leaves and
//! boolean combinations above them. Children are held behind [`Arc`] so a
//! sub-tree (a drilled plate, a pillar, a vessel) can be reused in several
//! combinations without copying. Trees never contain cycles because a node
//! can only reference solids that existed before it.
//!
//! Primitives are centred on their local origin, with `z` as the symmetry
//! axis, following the usual detector-simulation conventions.

use std::sync::Arc;

use crate::math::{Point2, Transform, TWO_PI};

/// Azimuthal extent of a rotationally symmetric solid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhiSegment {
    /// Start angle in radians.
    pub start: f64,
    /// Angular span in radians, `(0, 2π]`.
    pub delta: f64,
}

impl PhiSegment {
    /// The full turn.
    pub const FULL: PhiSegment = PhiSegment {
        start: 0.0,
        delta: TWO_PI,
    };

    /// Creates a segment.
    #[must_use]
    pub fn new(start: f64, delta: f64) -> Self {
        Self { start, delta }
    }

    /// Returns `true` for a full turn.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.delta >= TWO_PI - 1e-12
    }

    /// Fraction of a full turn covered.
    #[must_use]
    pub fn fraction(&self) -> f64 {
        self.delta.min(TWO_PI) / TWO_PI
    }
}

impl Default for PhiSegment {
    fn default() -> Self {
        Self::FULL
    }
}

/// Polar extent of a spherical solid, measured from `+z`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThetaSegment {
    /// Start angle in radians.
    pub start: f64,
    /// Angular span in radians.
    pub delta: f64,
}

impl ThetaSegment {
    /// The whole sphere.
    pub const FULL: ThetaSegment = ThetaSegment {
        start: 0.0,
        delta: std::f64::consts::PI,
    };

    /// Creates a segment.
    #[must_use]
    pub fn new(start: f64, delta: f64) -> Self {
        Self { start, delta }
    }

    /// End angle.
    #[must_use]
    pub fn end(&self) -> f64 {
        (self.start + self.delta).min(std::f64::consts::PI)
    }

    /// Returns `true` when the segment covers every polar angle.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.start <= 1e-12 && self.end() >= std::f64::consts::PI - 1e-12
    }
}

impl Default for ThetaSegment {
    fn default() -> Self {
        Self::FULL
    }
}

/// One `(z, rmin, rmax)` plane of a polycone or polyhedra profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZPlane {
    /// Axial position.
    pub z: f64,
    /// Inner radius (apothem for polyhedra).
    pub rmin: f64,
    /// Outer radius (apothem for polyhedra).
    pub rmax: f64,
}

impl ZPlane {
    /// Creates a plane.
    #[must_use]
    pub fn new(z: f64, rmin: f64, rmax: f64) -> Self {
        Self { z, rmin, rmax }
    }
}

/// Boolean operator of a composite solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BooleanOp {
    /// `a ∪ b`
    Union,
    /// `a − b`
    Subtraction,
    /// `a ∩ b`
    Intersection,
}

/// Two operands and an operator; `transform` places `b` in the frame of `a`.
#[derive(Debug, Clone, PartialEq)]
pub struct BooleanSolid {
    /// Operator.
    pub op: BooleanOp,
    /// First operand; defines the local frame.
    pub a: Arc<Solid>,
    /// Second operand.
    pub b: Arc<Solid>,
    /// Placement of `b` inside the frame of `a`.
    pub transform: Transform,
}

/// A solid descriptor.
///
/// Construct primitives through the validated builders in
/// [`operations::creation`](crate::operations::creation) and composites
/// through [`operations::boolean`](crate::operations::boolean).
#[derive(Debug, Clone, PartialEq)]
pub enum Solid {
    /// Rectangular box with half-lengths.
    Box { hx: f64, hy: f64, hz: f64 },
    /// Cylindrical shell section.
    Tube {
        rmin: f64,
        rmax: f64,
        hz: f64,
        phi: PhiSegment,
    },
    /// Conical shell section; index 1 at `-hz`, 2 at `+hz`.
    Cone {
        rmin1: f64,
        rmax1: f64,
        rmin2: f64,
        rmax2: f64,
        hz: f64,
        phi: PhiSegment,
    },
    /// Spherical shell section.
    Sphere {
        rmin: f64,
        rmax: f64,
        phi: PhiSegment,
        theta: ThetaSegment,
    },
    /// Torus with tube radii `rmin..rmax` swept at radius `rtor`.
    Torus {
        rmin: f64,
        rmax: f64,
        rtor: f64,
        phi: PhiSegment,
    },
    /// Solid of revolution from an ordered list of planes.
    Polycone { planes: Vec<ZPlane>, phi: PhiSegment },
    /// Polycone with a regular polygonal cross-section.
    Polyhedra {
        sides: u32,
        planes: Vec<ZPlane>,
        phi: PhiSegment,
    },
    /// Planar outline extruded along `z` between `-hz` and `+hz`.
    ExtrudedPolygon { outline: Vec<Point2>, hz: f64 },
    /// Generic trapezoid: half-widths `dx1, dy1` at `-dz`, `dx2, dy2` at `+dz`.
    Trd {
        dx1: f64,
        dx2: f64,
        dy1: f64,
        dy2: f64,
        dz: f64,
    },
    /// Boolean combination.
    Boolean(BooleanSolid),
}

impl Solid {
    /// Short name of the variant.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Solid::Box { .. } => "box",
            Solid::Tube { .. } => "tube",
            Solid::Cone { .. } => "cone",
            Solid::Sphere { .. } => "sphere",
            Solid::Torus { .. } => "torus",
            Solid::Polycone { .. } => "polycone",
            Solid::Polyhedra { .. } => "polyhedra",
            Solid::ExtrudedPolygon { .. } => "extruded polygon",
            Solid::Trd { .. } => "trd",
            Solid::Boolean(b) => match b.op {
                BooleanOp::Union => "union",
                BooleanOp::Subtraction => "subtraction",
                BooleanOp::Intersection => "intersection",
            },
        }
    }

    /// Returns `true` for boolean combinations.
    #[must_use]
    pub fn is_boolean(&self) -> bool {
        matches!(self, Solid::Boolean(_))
    }

    /// Number of primitive leaves.
    #[must_use]
    pub fn primitive_count(&self) -> usize {
        match self {
            Solid::Boolean(b) => b.a.primitive_count() + b.b.primitive_count(),
            _ => 1,
        }
    }

    /// Height of the expression tree; a primitive has depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Solid::Boolean(b) => 1 + b.a.depth().max(b.b.depth()),
            _ => 1,
        }
    }
}
