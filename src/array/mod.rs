//! Positions of repeated members.
//!
//! Each layout maps a zero-based member index to the transform that places
//! the member in its parent. The numbering of every layout is fixed: readout
//! channels are derived from the index, not from geometric order.

mod pmt;
mod ring;
mod veto;

pub use pmt::{HexRows, RadialRings};
pub use ring::{AngularArray, RingStack};
pub use veto::{BoxPanels, CylinderPanels, OctagonPanels, PanelGrid};

use tracing::debug;

use crate::error::{ArrayError, Result};
use crate::math::Transform;

/// An indexed arrangement of identical members.
pub trait ArrayLayout {
    /// Number of members.
    fn count(&self) -> usize;

    /// Transform of member `index`, or `None` past the end.
    fn locate(&self, index: usize) -> Option<Transform>;

    /// Transform of member `index`.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::IndexOutOfRange`] if `index >= count()`.
    fn member(&self, index: usize) -> Result<Transform> {
        let count = self.count();
        if index >= count {
            return Err(ArrayError::IndexOutOfRange { index, count }.into());
        }
        self.locate(index)
            .ok_or_else(|| ArrayError::IndexOutOfRange { index, count }.into())
    }

    /// Transforms of all members in index order.
    ///
    /// # Errors
    ///
    /// Returns an error if the layout cannot produce one of its members.
    fn members(&self) -> Result<Vec<Transform>> {
        (0..self.count())
            .map(|i| {
                let t = self.member(i)?;
                debug!(
                    index = i,
                    x = t.translation.x,
                    y = t.translation.y,
                    z = t.translation.z,
                    "array member"
                );
                Ok(t)
            })
            .collect()
    }
}

/// The closed set of layouts used by the detector.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayShape {
    Hexagonal(HexRows),
    Radial(RadialRings),
    Cylinder(CylinderPanels),
    Box(BoxPanels),
    Octagon(OctagonPanels),
    Stack(RingStack),
    Angular(AngularArray),
}

impl ArrayShape {
    /// Short name of the layout.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Hexagonal(_) => "hexagonal",
            Self::Radial(_) => "radial",
            Self::Cylinder(_) => "cylinder",
            Self::Box(_) => "box",
            Self::Octagon(_) => "octagon",
            Self::Stack(_) => "ring stack",
            Self::Angular(_) => "angular",
        }
    }

    fn layout(&self) -> &dyn ArrayLayout {
        match self {
            Self::Hexagonal(l) => l,
            Self::Radial(l) => l,
            Self::Cylinder(l) => l,
            Self::Box(l) => l,
            Self::Octagon(l) => l,
            Self::Stack(l) => l,
            Self::Angular(l) => l,
        }
    }
}

impl ArrayLayout for ArrayShape {
    fn count(&self) -> usize {
        self.layout().count()
    }

    fn locate(&self, index: usize) -> Option<Transform> {
        self.layout().locate(index)
    }
}

macro_rules! impl_into_shape {
    ($($ty:ident => $variant:ident),+ $(,)?) => {
        $(impl From<$ty> for ArrayShape {
            fn from(layout: $ty) -> Self {
                Self::$variant(layout)
            }
        })+
    };
}

impl_into_shape! {
    HexRows => Hexagonal,
    RadialRings => Radial,
    CylinderPanels => Cylinder,
    BoxPanels => Box,
    OctagonPanels => Octagon,
    RingStack => Stack,
    AngularArray => Angular,
}
