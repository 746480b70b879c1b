use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Preset lookback windows offered by the selectors, shortest first.
pub const LOOKBACK_PRESETS: [u32; 6] = [3, 5, 10, 15, 20, 25];

/// Longest explicit window accepted from text, config or navigation.
pub const MAX_LOOKBACK_YEARS: u32 = 200;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid lookback '{0}': expected 1..=200 years or 'max'")]
pub struct LookbackParseError(pub String);

/// How many trailing calendar years of history to aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lookback {
    Years(u32),
    /// All history the backend has.
    Max,
}

impl Lookback {
    /// Clamps to `1..=MAX_LOOKBACK_YEARS`.
    pub fn years(n: u32) -> Self {
        Lookback::Years(n.clamp(1, MAX_LOOKBACK_YEARS))
    }

    fn checked_years(n: u32) -> Option<Self> {
        (1..=MAX_LOOKBACK_YEARS).contains(&n).then_some(Lookback::Years(n))
    }

    /// Latest year that falls outside the window, or `None` for `Max`.
    ///
    /// A year is inside the window when it is strictly greater than the
    /// cutoff: with reference 2025 and 10 years the cutoff is 2015, so
    /// 2016..=2025 are kept.
    pub fn cutoff_year(&self, reference_year: i32) -> Option<i32> {
        match self {
            Lookback::Years(n) => {
                let n = i32::try_from(*n).unwrap_or(i32::MAX);
                Some(reference_year.saturating_sub(n))
            }
            Lookback::Max => None,
        }
    }

    pub fn includes(&self, year: i32, reference_year: i32) -> bool {
        match self.cutoff_year(reference_year) {
            Some(cutoff) => year > cutoff,
            None => true,
        }
    }

    /// Next longer preset, ending at `Max`.
    pub fn longer(self) -> Self {
        match self {
            Lookback::Years(n) => LOOKBACK_PRESETS
                .iter()
                .copied()
                .find(|&p| p > n)
                .map(Lookback::Years)
                .unwrap_or(Lookback::Max),
            Lookback::Max => Lookback::Max,
        }
    }

    /// Next shorter preset, stopping at the shortest one.
    pub fn shorter(self) -> Self {
        let shortest = LOOKBACK_PRESETS[0];
        match self {
            Lookback::Max => Lookback::Years(LOOKBACK_PRESETS[LOOKBACK_PRESETS.len() - 1]),
            Lookback::Years(n) => Lookback::Years(
                LOOKBACK_PRESETS
                    .iter()
                    .rev()
                    .copied()
                    .find(|&p| p < n)
                    .unwrap_or(shortest),
            ),
        }
    }
}

impl Default for Lookback {
    fn default() -> Self {
        Lookback::Years(10)
    }
}

impl fmt::Display for Lookback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookback::Years(n) => write!(f, "{n}"),
            Lookback::Max => f.write_str("max"),
        }
    }
}

impl FromStr for Lookback {
    type Err = LookbackParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("max") {
            return Ok(Lookback::Max);
        }
        trimmed
            .parse::<u32>()
            .ok()
            .and_then(Lookback::checked_years)
            .ok_or_else(|| LookbackParseError(s.to_string()))
    }
}

impl Serialize for Lookback {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Accepts `"max"`, a numeric string, or a bare integer.
impl<'de> Deserialize<'de> for Lookback {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LookbackVisitor;

        impl<'de> Visitor<'de> for LookbackVisitor {
            type Value = Lookback;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a positive number of years or \"max\"")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Lookback, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Lookback, E> {
                u32::try_from(v)
                    .ok()
                    .and_then(Lookback::checked_years)
                    .ok_or_else(|| E::custom(LookbackParseError(v.to_string())))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Lookback, E> {
                match u64::try_from(v) {
                    Ok(n) => self.visit_u64(n),
                    Err(_) => Err(E::custom(LookbackParseError(v.to_string()))),
                }
            }
        }

        deserializer.deserialize_any(LookbackVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_excludes_exact_cutoff_year() {
        let lb = Lookback::years(10);
        assert_eq!(lb.cutoff_year(2025), Some(2015));
        assert!(!lb.includes(2015, 2025));
        assert!(lb.includes(2016, 2025));
        assert!(lb.includes(2025, 2025));
        assert!(Lookback::Max.includes(1950, 2025));
    }

    #[test]
    fn parse_and_display() {
        assert_eq!("15".parse::<Lookback>().unwrap(), Lookback::Years(15));
        assert_eq!("MAX".parse::<Lookback>().unwrap(), Lookback::Max);
        assert!("0".parse::<Lookback>().is_err());
        assert!("-3".parse::<Lookback>().is_err());
        assert_eq!(Lookback::Max.to_string(), "max");
        assert_eq!(Lookback::Years(5).to_string(), "5");
        assert_eq!(serde_json::to_string(&Lookback::Max).unwrap(), r#""max""#);
        assert_eq!(serde_json::from_str::<Lookback>(r#""20""#).unwrap(), Lookback::Years(20));
        assert_eq!(serde_json::from_str::<Lookback>("7").unwrap(), Lookback::Years(7));
        assert!(serde_json::from_str::<Lookback>("0").is_err());
        assert!(serde_json::from_str::<Lookback>("-2").is_err());
    }

    #[test]
    fn preset_stepping() {
        assert_eq!(Lookback::Years(10).longer(), Lookback::Years(15));
        assert_eq!(Lookback::Years(25).longer(), Lookback::Max);
        assert_eq!(Lookback::Max.shorter(), Lookback::Years(25));
        assert_eq!(Lookback::Years(3).shorter(), Lookback::Years(3));
        assert_eq!(Lookback::Years(12).shorter(), Lookback::Years(10));
        assert_eq!(Lookback::years(0), Lookback::Years(1));
        assert_eq!(Lookback::years(5000), Lookback::Years(MAX_LOOKBACK_YEARS));
    }

    #[test]
    fn oversized_windows_are_rejected() {
        assert!("4294967295".parse::<Lookback>().is_err());
        assert!("2147483648".parse::<Lookback>().is_err());
        assert!("201".parse::<Lookback>().is_err());
        assert_eq!("200".parse::<Lookback>().unwrap(), Lookback::Years(200));
        assert!(serde_json::from_str::<Lookback>("4294967295").is_err());
        assert!(serde_json::from_str::<Lookback>(r#""2147483648""#).is_err());
    }

    #[test]
    fn cutoff_saturates_instead_of_wrapping() {
        let huge = Lookback::Years(u32::MAX);
        assert_eq!(huge.cutoff_year(2025), Some(2025 - i32::MAX));
        assert_eq!(huge.cutoff_year(i32::MIN + 5), Some(i32::MIN));
        assert!(huge.includes(1900, 2025));
        assert!(huge.includes(2025, 2025));

        let past_i32 = Lookback::Years(2_147_483_648);
        assert!(past_i32.includes(2020, 2025));
    }
}
