pub mod actions;
pub mod assertions;
pub mod setup;

pub use assertions::*;
pub use setup::*;
