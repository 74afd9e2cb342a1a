//! Serialisable report shapes.
//!
//! The flat shape lists strings, MPPTs and inverters side by side. The
//! nested shape groups them inverter → roof plane → MPPT → string for UI
//! clients. Both borrow the result; nothing is recomputed.

use serde::Serialize;

use crate::electrical::{InverterProperties, MpptProperties};
use crate::optimizer::StringingResult;
use crate::report::Summary;
use crate::sizing::SizingCheck;
use crate::stringing::stragglers::StragglerWarning;
use crate::wiring::{Mppt, PvString};

#[derive(Debug, Serialize)]
pub struct NestedMppt<'a> {
    pub id: &'a str,
    pub properties: &'a MpptProperties,
    pub strings: Vec<&'a PvString>,
}

#[derive(Debug, Serialize)]
pub struct NestedRoof<'a> {
    pub roof_plane_id: &'a str,
    pub mppts: Vec<NestedMppt<'a>>,
}

#[derive(Debug, Serialize)]
pub struct NestedInverter<'a> {
    pub id: &'a str,
    pub properties: &'a InverterProperties,
    pub roof_planes: Vec<NestedRoof<'a>>,
}

/// Inverter-centric view of a result.
#[derive(Debug, Serialize)]
pub struct NestedReport<'a> {
    pub inverters: Vec<NestedInverter<'a>>,
    pub unassigned_mppts: Vec<NestedMppt<'a>>,
    pub straggler_warnings: &'a [StragglerWarning],
    pub sizing_check: &'a SizingCheck,
    pub suggestions: &'a [String],
    pub summary: &'a Summary,
}

impl<'a> NestedReport<'a> {
    pub fn new(result: &'a StringingResult) -> Self {
        let nest_mppt = |m: &'a Mppt| NestedMppt {
            id: &m.id,
            properties: &m.properties,
            strings: m
                .string_ids
                .iter()
                .filter_map(|id| result.strings.iter().find(|s| &s.id == id))
                .collect(),
        };

        let inverters = result
            .inverters
            .iter()
            .map(|inv| {
                let mut roofs: Vec<NestedRoof<'a>> = Vec::new();
                for mppt_id in &inv.mppt_ids {
                    let Some(mppt) = result.mppts.iter().find(|m| &m.id == mppt_id) else {
                        continue;
                    };
                    let nested = nest_mppt(mppt);
                    let roof = mppt
                        .string_ids
                        .first()
                        .and_then(|id| result.strings.iter().find(|s| &s.id == id))
                        .map_or("", |s| s.roof_plane_id.as_str());
                    match roofs.iter_mut().find(|r| r.roof_plane_id == roof) {
                        Some(r) => r.mppts.push(nested),
                        None => roofs.push(NestedRoof {
                            roof_plane_id: roof,
                            mppts: vec![nested],
                        }),
                    }
                }
                NestedInverter {
                    id: &inv.id,
                    properties: &inv.properties,
                    roof_planes: roofs,
                }
            })
            .collect();

        let unassigned_mppts = result
            .mppts
            .iter()
            .filter(|m| m.inverter_id.is_none())
            .map(nest_mppt)
            .collect();

        Self {
            inverters,
            unassigned_mppts,
            straggler_warnings: &result.straggler_warnings,
            sizing_check: &result.sizing_check,
            suggestions: &result.suggestions,
            summary: &result.summary,
        }
    }
}

/// Renders a result as pretty JSON in the requested shape.
///
/// # Errors
///
/// Returns a serialisation error; none is expected for well-formed results.
pub fn to_json(result: &StringingResult, frontend: bool) -> serde_json::Result<String> {
    if frontend {
        serde_json::to_string_pretty(&NestedReport::new(result))
    } else {
        serde_json::to_string_pretty(result)
    }
}
