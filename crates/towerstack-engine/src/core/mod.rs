pub use self::{align::*, block::*, geometry::*};

pub(crate) mod align;
pub(crate) mod block;
pub(crate) mod geometry;
