//! Device-tier gate for the pointer trail.
//!
//! Evaluated once when an engine is built.  A constrained device gets no
//! trail at all: no sampling, no frames, no drawing.  Skipping the trail
//! only costs polish, never correctness.

use std::fmt;
use std::str::FromStr;

/// Logical width below which a viewport counts as mobile.
pub const DEFAULT_MOBILE_CUTOFF: f64 = 768.0;

/// Coarse platform classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceClass {
    #[default]
    Desktop,
    Tablet,
    Mobile,
}

impl DeviceClass {
    /// Best guess for the machine we are running on.
    pub fn detect() -> Self {
        if matches!(std::env::consts::OS, "android" | "ios") {
            return DeviceClass::Mobile;
        }
        // Termux reports plain linux, but always runs on a phone or tablet.
        if std::env::var_os("TERMUX_VERSION").is_some() {
            return DeviceClass::Mobile;
        }
        DeviceClass::Desktop
    }

    pub fn label(self) -> &'static str {
        match self {
            DeviceClass::Desktop => "desktop",
            DeviceClass::Tablet => "tablet",
            DeviceClass::Mobile => "mobile",
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DeviceClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "desktop" => Ok(DeviceClass::Desktop),
            "tablet" => Ok(DeviceClass::Tablet),
            "mobile" | "phone" => Ok(DeviceClass::Mobile),
            other => Err(format!("unknown device class {other:?}")),
        }
    }
}

/// Everything the gate needs, captured once per session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceProfile {
    pub class: DeviceClass,
    /// Viewport width in logical pixels.
    pub viewport_width: f64,
}

impl DeviceProfile {
    /// `true` when the trail should stay inert on this device.
    pub fn is_constrained(&self, mobile_cutoff: f64) -> bool {
        matches!(self.class, DeviceClass::Mobile | DeviceClass::Tablet)
            || self.viewport_width < mobile_cutoff
    }
}
