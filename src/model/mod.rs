//! Project inputs: panel layout, datasheets and site temperatures.

pub mod layout;
pub mod specs;

pub use layout::{Layout, Panel, Point, RoofPlane, RoofSlot};
pub use specs::{InverterSpecs, PanelSpecs, TemperatureData};

use crate::error::Result;

/// Everything one optimisation run needs to know about the site.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub layout: Layout,
    pub panel: PanelSpecs,
    pub inverter: InverterSpecs,
    pub temperature: TemperatureData,
}

impl Project {
    /// Assembles a project, validating the layout arena.
    ///
    /// # Errors
    ///
    /// Propagates layout validation failures from [`Layout::new`].
    pub fn new(
        panels: Vec<Panel>,
        roof_planes: Vec<RoofPlane>,
        panel: PanelSpecs,
        inverter: InverterSpecs,
        temperature: TemperatureData,
    ) -> Result<Self> {
        Ok(Self {
            layout: Layout::new(panels, roof_planes)?,
            panel,
            inverter,
            temperature,
        })
    }

    /// Validates the datasheets and temperatures.
    ///
    /// # Errors
    ///
    /// Returns the first configuration error found.
    pub fn validate(&self) -> Result<()> {
        self.panel.validate()?;
        self.inverter.validate()?;
        self.temperature.validate()
    }
}
