//! Data types for the table model.

mod cell;
mod model;
mod style;

pub use cell::*;
pub use model::*;
pub use style::*;
