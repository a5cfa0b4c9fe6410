//! Heart-rate zone calculator

#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // zone math stays within u32 range

use serde::Serialize;

use crate::error::{Error, Result};

const MIN_AGE: u32 = 5;
const MAX_AGE: u32 = 120;

/// Training zone, ordered from lightest to hardest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneKind {
    WarmUp,
    FatBurn,
    Aerobic,
    Anaerobic,
    Vo2Max,
}

impl ZoneKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::WarmUp => "Warm up",
            Self::FatBurn => "Fat burn",
            Self::Aerobic => "Aerobic",
            Self::Anaerobic => "Anaerobic",
            Self::Vo2Max => "VO2 max",
        }
    }
}

/// One training zone as a BPM range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeartRateZone {
    pub kind: ZoneKind,
    pub min_hr: u32,
    pub max_hr: u32,
}

/// Full zone breakdown for one person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeartRateZones {
    pub max_heart_rate: u32,
    pub zones: [HeartRateZone; 5],
}

const ZONE_BOUNDS: [(ZoneKind, f64, f64); 5] = [
    (ZoneKind::WarmUp, 0.5, 0.6),
    (ZoneKind::FatBurn, 0.6, 0.7),
    (ZoneKind::Aerobic, 0.7, 0.8),
    (ZoneKind::Anaerobic, 0.8, 0.9),
    (ZoneKind::Vo2Max, 0.9, 1.0),
];

/// Calculate heart-rate training zones from age (`max_hr = 220 - age`).
pub fn calculate_zones(age: u32) -> Result<HeartRateZones> {
    if !(MIN_AGE..=MAX_AGE).contains(&age) {
        return Err(Error::InvalidInput(format!(
            "age must be between {MIN_AGE} and {MAX_AGE}, got {age}"
        )));
    }

    let max_heart_rate = 220 - age;
    let zones = ZONE_BOUNDS.map(|(kind, lower, upper)| HeartRateZone {
        kind,
        min_hr: fraction_of(max_heart_rate, lower),
        max_hr: fraction_of(max_heart_rate, upper),
    });

    Ok(HeartRateZones {
        max_heart_rate,
        zones,
    })
}

fn fraction_of(max_heart_rate: u32, fraction: f64) -> u32 {
    (f64::from(max_heart_rate) * fraction).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_zones_for_twenty_year_old() {
        let result = calculate_zones(20).unwrap();
        assert_eq!(result.max_heart_rate, 200);

        let warm_up = result.zones[0];
        assert_eq!(warm_up.kind, ZoneKind::WarmUp);
        assert_eq!(warm_up.min_hr, 100);
        assert_eq!(warm_up.max_hr, 120);

        let vo2_max = result.zones[4];
        assert_eq!(vo2_max.kind, ZoneKind::Vo2Max);
        assert_eq!(vo2_max.min_hr, 180);
        assert_eq!(vo2_max.max_hr, 200);
    }

    #[test]
    fn test_zones_are_contiguous() {
        let result = calculate_zones(37).unwrap();
        for pair in result.zones.windows(2) {
            assert_eq!(pair[0].max_hr, pair[1].min_hr);
        }
    }

    #[test]
    fn test_rejects_out_of_range_age() {
        assert!(calculate_zones(0).is_err());
        assert!(calculate_zones(4).is_err());
        assert!(calculate_zones(121).is_err());
    }

    #[test]
    fn test_zone_kind_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&ZoneKind::Vo2Max).unwrap(),
            "\"vo2_max\""
        );
    }
}
