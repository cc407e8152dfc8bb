//! Vaccination rate to map fill colour

use serde::Serialize;

/// An RGB fill colour, serialized as `[r, g, b]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Fill for countries with no matching coverage row
pub const NO_DATA: Rgb = Rgb(200, 200, 200);

/// Linear red (0%) to green (100%) scale; `None` is the no-data grey
pub fn color_for(rate_percent: Option<f64>) -> Rgb {
    match rate_percent {
        Some(rate) if !rate.is_nan() => {
            let green = (rate.clamp(0.0, 100.0) * 2.55).round() as u8;
            Rgb(255 - green, green, 0)
        }
        _ => NO_DATA,
    }
}
