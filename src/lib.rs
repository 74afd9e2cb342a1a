//! Photovoltaic stringing optimiser.
//!
//! Given a roof layout, a panel datasheet, an inverter datasheet and site
//! temperature extremes, [`optimize`] wires panels into series strings,
//! packs strings onto MPPT inputs and MPPTs onto inverter instances, and
//! reports sizing advice.

pub mod assignment;
pub mod config;
pub mod decision;
pub mod electrical;
pub mod error;
pub mod io;
pub mod model;
pub mod optimizer;
pub mod report;
pub mod sizing;
/// Temperature correction, string limits, and the stringing passes.
pub mod stringing;
pub mod suggestions;
pub mod wiring;

pub use config::OptimizerConfig;
pub use error::{Result, StringingError};
pub use model::Project;
pub use optimizer::{RunOptions, StringingResult, optimize};
