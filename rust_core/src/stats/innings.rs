//! Innings-pitched in baseball's thirds notation.
//!
//! The upstream reports innings as `W.F` where `F` counts extra outs (0, 1 or
//! 2), not tenths: "6.1" is 6⅓ innings and "6.2" is 6⅔. Innings are held as
//! a whole number of outs so that sums are exact and order-independent.

use std::fmt;
use std::iter::Sum;
use std::ops::Add;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Innings {
    outs: u32,
}

impl Innings {
    pub const ZERO: Innings = Innings { outs: 0 };

    pub fn from_outs(outs: u32) -> Self {
        Self { outs }
    }

    /// Parse "6", "6.0", "6.1" or "6.2". Any other fractional digit is rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        let (whole, fraction) = match raw.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (raw, "0"),
        };

        let whole: u32 = if whole.is_empty() && !fraction.is_empty() {
            0
        } else {
            whole.parse().ok()?
        };
        let extra_outs = match fraction {
            "0" | "" => 0,
            "1" => 1,
            "2" => 2,
            _ => return None,
        };

        whole.checked_mul(3)?.checked_add(extra_outs).map(Self::from_outs)
    }

    pub fn outs(&self) -> u32 {
        self.outs
    }

    pub fn is_zero(&self) -> bool {
        self.outs == 0
    }

    /// Real-valued innings: 6.1 -> 6.333...
    pub fn as_f64(&self) -> f64 {
        self.outs as f64 / 3.0
    }

    /// Decimal rendering to one place, as shown in stat lines ("9.0", "6.3").
    pub fn to_decimal_string(&self) -> String {
        format!("{:.1}", self.as_f64())
    }
}

/// Renders back in thirds notation.
impl fmt::Display for Innings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.outs / 3, self.outs % 3)
    }
}

impl Add for Innings {
    type Output = Innings;

    fn add(self, rhs: Innings) -> Innings {
        Innings::from_outs(self.outs.saturating_add(rhs.outs))
    }
}

impl Sum for Innings {
    fn sum<I: Iterator<Item = Innings>>(iter: I) -> Innings {
        iter.fold(Innings::ZERO, Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thirds_conversion() {
        let third = 1.0 / 3.0;
        assert!((Innings::parse("6.1").unwrap().as_f64() - (6.0 + third)).abs() < 1e-12);
        assert!((Innings::parse("6.2").unwrap().as_f64() - (6.0 + 2.0 * third)).abs() < 1e-12);
        assert_eq!(Innings::parse("6.0").unwrap().as_f64(), 6.0);
        assert_eq!(Innings::parse("6").unwrap().as_f64(), 6.0);
    }

    #[test]
    fn test_sum_is_exact() {
        let total: Innings = ["5.2", "3.1"]
            .iter()
            .filter_map(|s| Innings::parse(s))
            .sum();
        assert_eq!(total.outs(), 27);
        assert_eq!(total.as_f64(), 9.0);
        assert_eq!(total.to_decimal_string(), "9.0");
        assert_eq!(total.to_string(), "9.0");
    }

    #[test]
    fn test_rejects_invalid_fraction() {
        assert_eq!(Innings::parse("6.3"), None);
        assert_eq!(Innings::parse("6.5"), None);
        assert_eq!(Innings::parse("6.33"), None);
        assert_eq!(Innings::parse("-1.0"), None);
        assert_eq!(Innings::parse("abc"), None);
        assert_eq!(Innings::parse(""), None);
    }

    #[test]
    fn test_leading_dot_and_whitespace() {
        assert_eq!(Innings::parse(".2").unwrap().outs(), 2);
        assert_eq!(Innings::parse(" 7.1 ").unwrap().outs(), 22);
        assert_eq!(Innings::parse("0.0"), Some(Innings::ZERO));
    }

    #[test]
    fn test_display_round_trip() {
        assert_eq!(Innings::from_outs(19).to_string(), "6.1");
        assert_eq!(Innings::from_outs(20).to_decimal_string(), "6.7");
    }
}
