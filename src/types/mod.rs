pub mod universe;
pub mod selection;
pub mod strategy;

pub use universe::*;
pub use selection::*;
pub use strategy::*;
