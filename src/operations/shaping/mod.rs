mod beam;
mod support;
mod vessel;

pub use beam::MakeBeam;
pub use support::{LatticeMember, SupportLattice};
pub use vessel::{Flange, HeadGeometry, HeadSpec, MakeVessel, StiffeningRing, PROFILE_EPSILON};
