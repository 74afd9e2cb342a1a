//! Human-readable follow-up advice for a finished plan.

use crate::electrical::SizingStatus;

/// Facts about a run that drive the suggestions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuggestionInputs {
    pub straggler_panels: usize,
    pub unassigned_mppts: usize,
    pub inverter_quantity: Option<u32>,
    pub any_inverter_undersized: bool,
    pub power_capped: bool,
    pub min_panels: usize,
    pub ideal_panels: usize,
    pub voltage_ideal_panels: usize,
    pub power_per_panel: f64,
    pub target_ratio: f64,
}

impl SuggestionInputs {
    /// AC rating that runs a voltage-ideal string at the target ratio (kW).
    fn recommended_ac_kw(&self) -> f64 {
        self.voltage_ideal_panels as f64 * self.power_per_panel / self.target_ratio / 1000.0
    }
}

/// Returns `true` when any status in `statuses` is undersized.
pub fn any_undersized<'a>(statuses: impl IntoIterator<Item = &'a SizingStatus>) -> bool {
    statuses.into_iter().any(|s| *s == SizingStatus::Undersized)
}

/// Builds the suggestion list, sizing advice before layout advice.
pub fn suggest(inputs: &SuggestionInputs) -> Vec<String> {
    let mut out = Vec::new();

    if inputs.unassigned_mppts > 0 {
        let quantity = inputs
            .inverter_quantity
            .map(|q| format!(" beyond the requested {q}"))
            .unwrap_or_default();
        out.push(format!(
            "{} MPPT input(s) have no inverter{quantity}: raise the inverter quantity or allow overriding it.",
            inputs.unassigned_mppts
        ));
    }

    let undersized_with_stragglers = inputs.straggler_panels > 0 && inputs.any_inverter_undersized;
    if undersized_with_stragglers {
        out.push(format!(
            "{} panel(s) are unstringed and some inverters run below a 1.0 DC/AC ratio: \
             use a larger inverter of about {:.1} kW AC so {}-panel strings sit at ratio {:.2}.",
            inputs.straggler_panels,
            inputs.recommended_ac_kw(),
            inputs.voltage_ideal_panels,
            inputs.target_ratio
        ));
    }

    if inputs.power_capped {
        out.push(format!(
            "Strings were shortened from {} to {} panels to respect the inverter's AC rating: \
             a larger inverter of about {:.1} kW AC would avoid cropping them.",
            inputs.voltage_ideal_panels,
            inputs.ideal_panels,
            inputs.recommended_ac_kw()
        ));
    }

    if inputs.straggler_panels > 0 && !undersized_with_stragglers {
        out.push(format!(
            "{} panel(s) could not be stringed: regroup the layout so isolated panels \
             sit in groups of at least {} on the same roof plane.",
            inputs.straggler_panels, inputs.min_panels
        ));
    }

    out
}
