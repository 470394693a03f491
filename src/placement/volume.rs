use std::sync::Arc;

use serde::Serialize;

use crate::solid::Solid;

slotmap::new_key_type! {
    /// Unique identifier for a volume descriptor in the placement tree.
    pub struct VolumeId;
}

/// Display colour with opacity, each channel in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    /// Creates a colour.
    #[must_use]
    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub const COPPER: Rgba = Rgba::new(1.0, 0.757, 0.24, 0.1);
    pub const STEEL: Rgba = Rgba::new(0.6, 0.6, 0.6, 0.1);
    pub const TEFLON: Rgba = Rgba::new(0.5, 0.3, 0.2, 0.01);
    pub const GXE_TEFLON: Rgba = Rgba::new(0.6, 0.4, 0.3, 0.02);
    pub const CIRLEX: Rgba = Rgba::new(0.2, 0.5, 0.8, 0.1);
    pub const GRID: Rgba = Rgba::new(0.4, 0.5, 0.7, 0.01);
    pub const LXE: Rgba = Rgba::new(0.094, 0.718, 0.812, 0.05);
    pub const GXE: Rgba = Rgba::new(0.539, 0.318, 0.378, 0.01);
    pub const WATER: Rgba = Rgba::new(0.0, 0.0, 1.0, 0.05);
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);
}

/// How a volume is drawn by a viewer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VisAttributes {
    pub color: Rgba,
    pub visible: bool,
}

impl VisAttributes {
    /// A visible volume of the given colour.
    #[must_use]
    pub fn visible(color: Rgba) -> Self {
        Self { color, visible: true }
    }

    /// A hidden volume of the given colour.
    #[must_use]
    pub fn hidden(color: Rgba) -> Self {
        Self { color, visible: false }
    }
}

impl Default for VisAttributes {
    fn default() -> Self {
        Self::visible(Rgba::WHITE)
    }
}

/// A named solid made of one material.
///
/// A descriptor holds no position; the same descriptor is placed as many
/// times as needed.
#[derive(Debug, Clone)]
pub struct VolumeDescriptor {
    /// Volume name, e.g. `TPCWallLogicalVolume`.
    pub name: String,
    /// Shape in the volume's local frame.
    pub solid: Arc<Solid>,
    /// Material name, resolved against a material table.
    pub material: String,
    /// Sensitive-detector tag, if hits are recorded in this volume.
    pub sensitive: Option<String>,
    /// Display attributes.
    pub vis: VisAttributes,
}

impl VolumeDescriptor {
    /// Creates a descriptor with default display attributes.
    #[must_use]
    pub fn new(name: impl Into<String>, solid: impl Into<Arc<Solid>>, material: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            solid: solid.into(),
            material: material.into(),
            sensitive: None,
            vis: VisAttributes::default(),
        }
    }

    /// Marks the volume as sensitive.
    #[must_use]
    pub fn with_sensitive(mut self, tag: impl Into<String>) -> Self {
        self.sensitive = Some(tag.into());
        self
    }

    /// Sets the display attributes.
    #[must_use]
    pub fn with_vis(mut self, vis: VisAttributes) -> Self {
        self.vis = vis;
        self
    }
}
