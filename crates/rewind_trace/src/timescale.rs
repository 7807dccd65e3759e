//! `$timescale` parsing and unit conversion.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TraceError;

/// A time unit accepted in a `$timescale` block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeUnit {
    /// Femtoseconds.
    Fs,
    /// Picoseconds.
    Ps,
    /// Nanoseconds.
    Ns,
    /// Microseconds.
    Us,
    /// Milliseconds.
    Ms,
    /// Seconds.
    S,
}

impl TimeUnit {
    /// Parses a unit suffix (`"fs"`, `"ps"`, ...).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "fs" => Some(TimeUnit::Fs),
            "ps" => Some(TimeUnit::Ps),
            "ns" => Some(TimeUnit::Ns),
            "us" => Some(TimeUnit::Us),
            "ms" => Some(TimeUnit::Ms),
            "s" => Some(TimeUnit::S),
            _ => None,
        }
    }

    /// The unit expressed in seconds.
    pub fn scale(self) -> f64 {
        match self {
            TimeUnit::Fs => 1e-15,
            TimeUnit::Ps => 1e-12,
            TimeUnit::Ns => 1e-9,
            TimeUnit::Us => 1e-6,
            TimeUnit::Ms => 1e-3,
            TimeUnit::S => 1.0,
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TimeUnit::Fs => "fs",
            TimeUnit::Ps => "ps",
            TimeUnit::Ns => "ns",
            TimeUnit::Us => "us",
            TimeUnit::Ms => "ms",
            TimeUnit::S => "s",
        };
        write!(f, "{s}")
    }
}

/// A parsed `$timescale` declaration, e.g. `10ns`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Timescale {
    /// The numeric factor (1, 10, or 100 in well-formed files).
    pub value: u64,
    /// The unit the factor applies to.
    pub unit: TimeUnit,
}

impl Timescale {
    /// Parses the body of a `$timescale` block, e.g. `"10 ns"` or `"1ps"`.
    pub fn parse(body: &str, line: usize) -> Result<Self, TraceError> {
        let s: String = body.split_whitespace().collect();
        let digit_end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        let value: u64 = if digit_end == 0 {
            1
        } else {
            s[..digit_end].parse().map_err(|_| TraceError::ParseError {
                line,
                message: format!("invalid timescale factor: {body}"),
            })?
        };
        let unit_str = &s[digit_end..];
        let unit = TimeUnit::parse(unit_str).ok_or_else(|| TraceError::UnknownTimescale {
            unit: unit_str.to_string(),
        })?;
        Ok(Self { value, unit })
    }

    /// The factor that converts raw trace timestamps to the requested unit.
    ///
    /// With no requested unit, timestamps stay in the file's native units
    /// and the multiplier is 1.
    pub fn multiplier(&self, requested: Option<TimeUnit>) -> f64 {
        match requested {
            None => 1.0,
            Some(req) => self.value as f64 * self.unit.scale() / req.scale(),
        }
    }
}

impl fmt::Display for Timescale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple() {
        let ts = Timescale::parse("1ns", 1).unwrap();
        assert_eq!(ts.value, 1);
        assert_eq!(ts.unit, TimeUnit::Ns);
    }

    #[test]
    fn parse_with_whitespace() {
        let ts = Timescale::parse("  10 ps ", 1).unwrap();
        assert_eq!(ts.value, 10);
        assert_eq!(ts.unit, TimeUnit::Ps);
    }

    #[test]
    fn parse_all_units() {
        for (text, unit) in [
            ("1fs", TimeUnit::Fs),
            ("1ps", TimeUnit::Ps),
            ("1ns", TimeUnit::Ns),
            ("1us", TimeUnit::Us),
            ("1ms", TimeUnit::Ms),
            ("1s", TimeUnit::S),
        ] {
            assert_eq!(Timescale::parse(text, 1).unwrap().unit, unit);
        }
    }

    #[test]
    fn parse_unknown_unit() {
        let err = Timescale::parse("1ks", 7).unwrap_err();
        assert!(matches!(err, TraceError::UnknownTimescale { unit } if unit == "ks"));
    }

    #[test]
    fn multiplier_native_is_one() {
        let ts = Timescale::parse("10ns", 1).unwrap();
        assert_eq!(ts.multiplier(None), 1.0);
    }

    #[test]
    fn multiplier_rescales() {
        let ts = Timescale::parse("10ns", 1).unwrap();
        assert_eq!(ts.multiplier(Some(TimeUnit::Ps)), 10_000.0);
        let ts = Timescale::parse("100ps", 1).unwrap();
        assert_eq!(ts.multiplier(Some(TimeUnit::Ns)), 0.1);
    }

    #[test]
    fn display() {
        assert_eq!(Timescale::parse("10ns", 1).unwrap().to_string(), "10ns");
    }
}
