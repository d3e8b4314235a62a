pub mod analysis;
pub mod build;
pub mod chart;
pub mod launch;
pub mod project;
pub mod runs;
pub mod util;

pub use analysis::*;
pub use build::*;
pub use chart::*;
pub use launch::*;
pub use project::*;
pub use runs::*;
pub use util::*;
