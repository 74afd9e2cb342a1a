//! Parallel and inverter assignment of finished strings.

pub mod inverter;
pub mod mppt;

pub use inverter::{InverterPlan, InverterRules, assign_mppts};
pub use mppt::{MpptSlot, StringKey, assign_strings};
