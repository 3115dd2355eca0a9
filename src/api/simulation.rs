use serde::{Deserialize, Serialize};

use super::ApiClient;
use crate::error::ApiError;
use crate::legs::{Leg, Mode};

/// Body of `POST /monte-carlo-simulation`. Built fresh for every run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScenarioConfig {
    pub starting_bankroll: f64,
    pub kelly_fraction: f64,
    pub sample_size: u32,
    pub legs: Vec<Leg>,
    pub mode: Mode,
    /// Mode A scalars. Null when mode B is active and the field is unusable.
    pub fair_prob_one_leg: Option<f64>,
    pub total_payout: Option<f64>,
    pub number_of_legs: Option<u32>,
    /// Mode B scalars, likewise.
    pub estimated_edge: Option<f64>,
    pub payout_per_bet: Option<f64>,
    pub num_simulations: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct PercentileBand {
    pub value: f64,
    pub roi: f64,
}

impl PercentileBand {
    pub fn display(&self) -> String {
        format!("${:.2} ({:.1}% ROI)", self.value, self.roi)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ConfidenceIntervals {
    pub bottom1: PercentileBand,
    pub bottom5: PercentileBand,
    pub bottom10: PercentileBand,
    pub top10: PercentileBand,
    pub top5: PercentileBand,
    pub top1: PercentileBand,
}

impl ConfidenceIntervals {
    pub fn bands(&self) -> [(&'static str, &PercentileBand); 6] {
        [
            ("Bottom 1%", &self.bottom1),
            ("Bottom 5%", &self.bottom5),
            ("Bottom 10%", &self.bottom10),
            ("Top 10%", &self.top10),
            ("Top 5%", &self.top5),
            ("Top 1%", &self.top1),
        ]
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ParlayRecords {
    pub total_wins: u64,
    pub total_bets: u64,
    pub win_rate: f64,
}

/// One completed batch. `simulation_progressions[i]` ends on `simulations[i]`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResultBundle {
    pub probability_of_profit: f64,
    pub mean_final_bankroll: f64,
    pub median_final_bankroll: f64,
    pub risk_of_ruin: f64,
    pub confidence_intervals: ConfidenceIntervals,
    pub simulations: Vec<f64>,
    pub simulation_progressions: Vec<Vec<f64>>,
    #[serde(default)]
    pub individual_leg_records: Option<serde_json::Value>,
    #[serde(default)]
    pub parlay_records: Option<ParlayRecords>,
}

impl SimulationResultBundle {
    /// Runs and trajectories line up one to one.
    pub fn is_aligned(&self) -> bool {
        self.simulations.len() == self.simulation_progressions.len()
    }

    /// Number of points in the longest trajectory.
    pub fn bet_count(&self) -> usize {
        self.simulation_progressions.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn summary_lines(&self) -> Vec<String> {
        vec![
            format!("Probability of Profit: {:.1}%", self.probability_of_profit * 100.0),
            format!("Mean Final Bankroll: ${:.2}", self.mean_final_bankroll),
            format!("Median Final Bankroll: ${:.2}", self.median_final_bankroll),
            format!("Risk of Ruin: {:.1}%", self.risk_of_ruin * 100.0),
        ]
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SimulationResponse {
    #[serde(default)]
    pub results: Option<SimulationResultBundle>,
    #[serde(default)]
    pub error: Option<String>,
}

impl SimulationResponse {
    pub fn into_bundle(self) -> Result<SimulationResultBundle, ApiError> {
        match (self.results, self.error) {
            (Some(bundle), _) => Ok(bundle),
            (None, Some(err)) if !err.is_empty() => Err(ApiError::Service(err)),
            _ => Err(ApiError::Empty),
        }
    }
}

pub fn parse_simulation_body(body: &str) -> Result<SimulationResultBundle, ApiError> {
    let bundle = super::parse_envelope::<SimulationResponse>(body)?
        .unwrap_or_default()
        .into_bundle()?;
    if !bundle.is_aligned() {
        log::warn!(
            "{} final values but {} progressions",
            bundle.simulations.len(),
            bundle.simulation_progressions.len()
        );
    }
    Ok(bundle)
}

pub async fn run_simulation(client: &ApiClient, config: &ScenarioConfig) -> Result<SimulationResultBundle, ApiError> {
    let body = client.post_text("/monte-carlo-simulation", config).await?;
    let bundle = parse_simulation_body(&body)?;
    log::info!("simulation returned {} runs of {} points", bundle.simulations.len(), bundle.bet_count());
    Ok(bundle)
}

#[cfg(test)]
pub(crate) fn test_bundle(simulations: Vec<f64>, simulation_progressions: Vec<Vec<f64>>) -> SimulationResultBundle {
    let band = PercentileBand { value: 0.0, roi: 0.0 };
    SimulationResultBundle {
        probability_of_profit: 0.0,
        mean_final_bankroll: 0.0,
        median_final_bankroll: 0.0,
        risk_of_ruin: 0.0,
        confidence_intervals: ConfidenceIntervals {
            bottom1: band,
            bottom5: band,
            bottom10: band,
            top10: band,
            top5: band,
            top1: band,
        },
        simulations,
        simulation_progressions,
        individual_leg_records: None,
        parlay_records: None,
    }
}
