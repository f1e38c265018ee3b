pub mod gate;
pub mod panel;
pub mod run;

pub use gate::*;
pub use panel::*;
pub use run::*;
