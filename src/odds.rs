use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DevigMethod {
    #[default]
    WorstCase,
    Multiplicative,
    Additive,
    Power,
}

impl DevigMethod {
    pub fn all() -> &'static [(Self, &'static str)] {
        &[
            (Self::WorstCase, "Worst Case"),
            (Self::Multiplicative, "Multiplicative"),
            (Self::Additive, "Additive"),
            (Self::Power, "Power"),
        ]
    }

    /// Query-string value the service expects.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WorstCase => "worst_case",
            Self::Multiplicative => "multiplicative",
            Self::Additive => "additive",
            Self::Power => "power",
        }
    }

    pub fn from_index(idx: i32) -> Self {
        match idx { 1 => Self::Multiplicative, 2 => Self::Additive, 3 => Self::Power, _ => Self::WorstCase }
    }
}

impl fmt::Display for DevigMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One two-way market, both sides quoted in American odds.
#[derive(Clone, Debug, PartialEq)]
pub struct OddsPair {
    pub side: i64,
    pub opposite: i64,
}

impl OddsPair {
    /// Implied probabilities of both sides, vig included.
    pub fn implied(&self) -> (f64, f64) {
        (implied_probability(self.side), implied_probability(self.opposite))
    }

    /// Book margin: how far the implied probabilities sum past 1.
    pub fn overround(&self) -> f64 {
        let (a, b) = self.implied();
        a + b - 1.0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum OddsError {
    Empty,
    NotAPair(String),
    BadOdds(String),
}

impl fmt::Display for OddsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "no odds entered"),
            Self::NotAPair(s) => write!(f, "'{}' is not a side/opposite pair", s),
            Self::BadOdds(s) => write!(f, "'{}' is not valid American odds", s),
        }
    }
}

/// Parse `"-113/-113, -113/-113"` into pairs. Used for the input preview only;
/// the raw string is what goes to the service.
pub fn parse_odds_input(s: &str) -> Result<Vec<OddsPair>, OddsError> {
    let s = s.trim();
    if s.is_empty() { return Err(OddsError::Empty); }
    s.split(',').map(|chunk| {
        let chunk = chunk.trim();
        let parts: Vec<&str> = chunk.split('/').collect();
        if parts.len() != 2 { return Err(OddsError::NotAPair(chunk.to_string())); }
        let side = parse_american_int(parts[0]).ok_or_else(|| OddsError::BadOdds(parts[0].trim().to_string()))?;
        let opposite = parse_american_int(parts[1]).ok_or_else(|| OddsError::BadOdds(parts[1].trim().to_string()))?;
        Ok(OddsPair { side, opposite })
    }).collect()
}

/// American odds as an integer. `|n| < 100` is not a real American quote.
pub fn parse_american_int(s: &str) -> Option<i64> {
    let s = s.trim().replace(',', "");
    let s = s.strip_prefix('+').unwrap_or(&s);
    let n = s.parse::<i64>().ok()?;
    if n.abs() < 100 { return None; }
    Some(n)
}

pub fn american_to_decimal(n: i64) -> f64 {
    if n > 0 { 1.0 + (n as f64)/100.0 } else { 1.0 + 100.0/(-(n as f64)) }
}

pub fn implied_probability(n: i64) -> f64 {
    1.0 / american_to_decimal(n)
}

pub fn format_decimal(d: f64) -> String { format!("{:.3}", d) }

/// Decimal price back to an American quote, e.g. `4.24` -> `+324`.
pub fn format_american(d: f64) -> String {
    if d <= 1.0 {
        return "—".into();
    }
    let profit = d - 1.0;
    if profit >= 1.0 {
        format!("+{}", (profit * 100.0).round() as i64)
    } else {
        format!("-{}", (100.0 / profit).round() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_default_input() {
        let pairs = parse_odds_input("-113/-113, -113/-113").unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0], OddsPair { side: -113, opposite: -113 });
    }

    #[test]
    fn rejects_bad_chunks() {
        assert_eq!(parse_odds_input("  "), Err(OddsError::Empty));
        assert_eq!(parse_odds_input("-110"), Err(OddsError::NotAPair("-110".into())));
        assert_eq!(parse_odds_input("-110/abc"), Err(OddsError::BadOdds("abc".into())));
        assert_eq!(parse_odds_input("-110/50"), Err(OddsError::BadOdds("50".into())));
    }

    #[test]
    fn american_conversions() {
        assert!((american_to_decimal(150) - 2.5).abs() < 1e-12);
        assert!((american_to_decimal(-200) - 1.5).abs() < 1e-12);
        assert_eq!(parse_american_int("+324"), Some(324));
        assert_eq!(format_american(american_to_decimal(324)), "+324");
        assert_eq!(format_american(american_to_decimal(-113)), "-113");
        assert_eq!(format_decimal(american_to_decimal(324)), "4.240");
    }

    #[test]
    fn overround_of_standard_line() {
        let pair = OddsPair { side: -110, opposite: -110 };
        let (a, b) = pair.implied();
        assert!((a - 110.0 / 210.0).abs() < 1e-12);
        assert_eq!(a, b);
        assert!((pair.overround() - (220.0 / 210.0 - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn devig_wire_names() {
        let names: Vec<&str> = DevigMethod::all().iter().map(|(m, _)| m.as_str()).collect();
        assert_eq!(names, ["worst_case", "multiplicative", "additive", "power"]);
        assert_eq!(DevigMethod::from_index(3), DevigMethod::Power);
        assert_eq!(DevigMethod::from_index(-1), DevigMethod::WorstCase);
        assert_eq!(serde_json::to_string(&DevigMethod::WorstCase).unwrap(), "\"worst_case\"");
    }
}
