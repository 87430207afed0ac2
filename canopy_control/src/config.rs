// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Runtime configuration of a [`ControlSystem`](crate::ControlSystem).

use canopy_visual::GeometricData;

/// Input thresholds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InputConfig {
    /// Longest gap, in seconds, between two presses counted as one multi-tap.
    pub double_tap_time: f64,
    /// Farthest distance, in inches, between two presses counted as one multi-tap.
    pub double_tap_inch: f64,
    /// Display density used to turn `double_tap_inch` into units.
    pub dpi: f64,
    /// The platform has no hovering pointer; presses never set the hover bit.
    pub touch_only: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            double_tap_time: 0.5,
            double_tap_inch: 0.25,
            dpi: 160.0,
            touch_only: false,
        }
    }
}

impl InputConfig {
    /// Square of the multi-tap distance in units. Negative settings clamp to zero.
    pub fn double_tap_distance_squared(&self) -> f64 {
        let inch = self.double_tap_inch.max(0.0);
        let dpi = self.dpi.max(0.0);
        inch * inch * dpi * dpi
    }
}

/// Configuration of a control system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SystemConfig {
    /// Input thresholds.
    pub input: InputConfig,
    /// Geometric data root controls are composed with.
    pub base_geometric_data: GeometricData,
    /// Whether the update pass also reaches controls that are active but not visible.
    pub update_invisible: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            input: InputConfig::default(),
            base_geometric_data: GeometricData::default(),
            update_invisible: true,
        }
    }
}
