//! System-level DC/AC sizing check.

use serde::Serialize;
use tracing::info;

use crate::config::RatioConfig;
use crate::electrical::{SizingStatus, classify_ratio};

/// What to do about inverter capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    Optimal,
    Acceptable,
    /// Too little inverter capacity for the array.
    LowInvCapacity,
    /// More inverter capacity than the array can use.
    HighInvCapacity,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SizingCheck {
    pub status: SizingStatus,
    pub recommendation: Recommendation,
    /// AC capacity that would put the array at the target ratio (kW).
    pub optimal_inverter_capacity_kw: Option<f64>,
    pub total_dc_power_w: f64,
    pub total_ac_power_w: f64,
    pub system_dc_ac_ratio: f64,
    pub inverter_count: usize,
    pub unassigned_mppts: usize,
}

/// Compares the array's DC power with the AC capacity of the fleet.
///
/// Any unassigned MPPT overrides the ratio and marks the fleet undersized.
pub fn check_sizing(
    total_dc_power_w: f64,
    rated_ac_power_w: f64,
    inverter_count: usize,
    unassigned_mppts: usize,
    bands: &RatioConfig,
) -> SizingCheck {
    let fleet = inverter_count.max(1);
    let total_ac_power_w = rated_ac_power_w * fleet as f64;
    let system_dc_ac_ratio = total_dc_power_w / total_ac_power_w;
    let optimal_kw = (total_dc_power_w / bands.target / 1000.0 * 10.0).round() / 10.0;

    let (status, recommendation) = if unassigned_mppts > 0 {
        (SizingStatus::Undersized, Recommendation::LowInvCapacity)
    } else {
        match classify_ratio(system_dc_ac_ratio, bands) {
            SizingStatus::Optimal => (SizingStatus::Optimal, Recommendation::Optimal),
            SizingStatus::Acceptable => (SizingStatus::Acceptable, Recommendation::Acceptable),
            SizingStatus::Oversized => (SizingStatus::Oversized, Recommendation::LowInvCapacity),
            SizingStatus::Undersized => (SizingStatus::Undersized, Recommendation::HighInvCapacity),
        }
    };
    let optimal_inverter_capacity_kw = match recommendation {
        Recommendation::LowInvCapacity | Recommendation::HighInvCapacity => Some(optimal_kw),
        _ => None,
    };

    info!(
        ratio = system_dc_ac_ratio,
        status = ?status,
        recommendation = ?recommendation,
        "sizing check"
    );
    SizingCheck {
        status,
        recommendation,
        optimal_inverter_capacity_kw,
        total_dc_power_w,
        total_ac_power_w,
        system_dc_ac_ratio,
        inverter_count: fleet,
        unassigned_mppts,
    }
}
