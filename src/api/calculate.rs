use serde::Deserialize;

use super::ApiClient;
use crate::error::ApiError;
use crate::odds::DevigMethod;
use crate::sanitize::strip_tags_all;

/// Query for `GET /calculate-bet`, already validated.
#[derive(Clone, Debug, PartialEq)]
pub struct BetRequest {
    /// Comma-separated slash pairs, sent verbatim.
    pub input_str: String,
    pub final_odds: i64,
    pub bankroll: f64,
    pub kelly_fraction: f64,
    pub devig_method: DevigMethod,
}

impl BetRequest {
    /// Build from raw form text. Numbers are checked here; the odds string is
    /// left for the service to judge.
    pub fn from_form(
        input_str: &str,
        final_odds: &str,
        bankroll: &str,
        kelly_fraction: &str,
        devig_method: DevigMethod,
    ) -> Result<Self, ApiError> {
        let final_odds = final_odds
            .trim()
            .trim_start_matches('+')
            .parse::<i64>()
            .map_err(|_| ApiError::invalid("final odds", final_odds))?;
        let bankroll = parse_number("bankroll", bankroll)?;
        let kelly_fraction = parse_number("kelly fraction", kelly_fraction)?;
        Ok(Self { input_str: input_str.to_string(), final_odds, bankroll, kelly_fraction, devig_method })
    }

    pub fn query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("input_str", self.input_str.clone()),
            ("final_odds", self.final_odds.to_string()),
            ("bankroll", self.bankroll.to_string()),
            ("kelly_fraction", self.kelly_fraction.to_string()),
            ("devig_method", self.devig_method.as_str().to_string()),
        ]
    }
}

pub(crate) fn parse_number(field: &'static str, raw: &str) -> Result<f64, ApiError> {
    raw.trim()
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ApiError::invalid(field, raw))
}

#[derive(Debug, Default, Deserialize)]
pub struct CalculateBetResponse {
    #[serde(default)]
    pub output: Option<Vec<String>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl CalculateBetResponse {
    pub fn into_lines(self) -> Result<Vec<String>, ApiError> {
        match (self.output, self.error) {
            (Some(lines), _) => Ok(strip_tags_all(&lines)),
            (None, Some(err)) if !err.is_empty() => Err(ApiError::Service(err)),
            _ => Err(ApiError::Empty),
        }
    }
}

/// Interpret a `/calculate-bet` body. Text that is not JSON counts as a
/// connection failure; JSON that is not an object has no output.
pub fn parse_calculate_body(body: &str) -> Result<Vec<String>, ApiError> {
    super::parse_envelope::<CalculateBetResponse>(body)?
        .unwrap_or_default()
        .into_lines()
}

pub async fn calculate_bet(client: &ApiClient, request: &BetRequest) -> Result<Vec<String>, ApiError> {
    let body = client.get_text("/calculate-bet", &request.query()).await?;
    let lines = parse_calculate_body(&body)?;
    log::info!("calculate-bet returned {} lines", lines.len());
    Ok(lines)
}
