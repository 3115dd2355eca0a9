//! State owned by the scenario simulator screen.
//!
//! All changes go through [`ScenarioAction`]; the page holds a
//! `use_reducer` handle and never mutates fields directly.

use std::rc::Rc;

use yew::Reducible;

use crate::api::calculate::parse_number;
use crate::api::simulation::{ScenarioConfig, SimulationResultBundle};
use crate::config::NUM_SIMULATIONS;
use crate::error::ApiError;
use crate::legs::{LegField, LegList, Mode};
use crate::selection::SelectionKind;

/// Issued per outgoing request; only the newest one may write results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: u64,
}

impl RequestSequencer {
    pub fn issue(&mut self) -> RequestToken {
        self.latest += 1;
        RequestToken(self.latest)
    }

    pub fn is_latest(&self, token: RequestToken) -> bool {
        token.0 == self.latest
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScalarField {
    StartingBankroll,
    KellyFraction,
    SampleSize,
    FairProbOneLeg,
    TotalPayout,
    NumberOfLegs,
    EstimatedEdge,
    PayoutPerBet,
}

impl ScalarField {
    pub fn label(&self) -> &'static str {
        match self {
            Self::StartingBankroll => "Starting Bankroll ($)",
            Self::KellyFraction => "Kelly Fraction",
            Self::SampleSize => "Sample Size (Number of Bets)",
            Self::FairProbOneLeg => "Fair Prob of One Leg (%)",
            Self::TotalPayout => "Total Payout",
            Self::NumberOfLegs => "Number of Legs",
            Self::EstimatedEdge => "Estimated Edge (%)",
            Self::PayoutPerBet => "Payout Per Bet",
        }
    }

    /// Name used in validation messages.
    fn name(&self) -> &'static str {
        match self {
            Self::StartingBankroll => "starting bankroll",
            Self::KellyFraction => "kelly fraction",
            Self::SampleSize => "sample size",
            Self::FairProbOneLeg => "fair probability of one leg",
            Self::TotalPayout => "total payout",
            Self::NumberOfLegs => "number of legs",
            Self::EstimatedEdge => "estimated edge",
            Self::PayoutPerBet => "payout per bet",
        }
    }

    pub fn shared() -> &'static [Self] {
        &[Self::StartingBankroll, Self::KellyFraction, Self::SampleSize]
    }

    pub fn for_mode(mode: Mode) -> &'static [Self] {
        match mode {
            Mode::A => &[Self::FairProbOneLeg, Self::TotalPayout, Self::NumberOfLegs],
            Mode::B => &[Self::EstimatedEdge, Self::PayoutPerBet],
        }
    }
}

/// Raw text of the scalar inputs, as typed.
#[derive(Clone, Debug, PartialEq)]
pub struct ScenarioForm {
    pub starting_bankroll: String,
    pub kelly_fraction: String,
    pub sample_size: String,
    pub fair_prob_one_leg: String,
    pub total_payout: String,
    pub number_of_legs: String,
    pub estimated_edge: String,
    pub payout_per_bet: String,
}

impl Default for ScenarioForm {
    fn default() -> Self {
        Self {
            starting_bankroll: "1000".into(),
            kelly_fraction: "0.25".into(),
            sample_size: "100".into(),
            fair_prob_one_leg: "50".into(),
            total_payout: "120".into(),
            number_of_legs: "1".into(),
            estimated_edge: "5".into(),
            payout_per_bet: "100".into(),
        }
    }
}

impl ScenarioForm {
    pub fn get(&self, field: ScalarField) -> &str {
        match field {
            ScalarField::StartingBankroll => &self.starting_bankroll,
            ScalarField::KellyFraction => &self.kelly_fraction,
            ScalarField::SampleSize => &self.sample_size,
            ScalarField::FairProbOneLeg => &self.fair_prob_one_leg,
            ScalarField::TotalPayout => &self.total_payout,
            ScalarField::NumberOfLegs => &self.number_of_legs,
            ScalarField::EstimatedEdge => &self.estimated_edge,
            ScalarField::PayoutPerBet => &self.payout_per_bet,
        }
    }

    pub fn set(&mut self, field: ScalarField, value: String) {
        let slot = match field {
            ScalarField::StartingBankroll => &mut self.starting_bankroll,
            ScalarField::KellyFraction => &mut self.kelly_fraction,
            ScalarField::SampleSize => &mut self.sample_size,
            ScalarField::FairProbOneLeg => &mut self.fair_prob_one_leg,
            ScalarField::TotalPayout => &mut self.total_payout,
            ScalarField::NumberOfLegs => &mut self.number_of_legs,
            ScalarField::EstimatedEdge => &mut self.estimated_edge,
            ScalarField::PayoutPerBet => &mut self.payout_per_bet,
        };
        *slot = value;
    }

    fn float(&self, field: ScalarField) -> Result<f64, ApiError> {
        parse_number(field.name(), self.get(field))
    }

    fn count(&self, field: ScalarField) -> Result<u32, ApiError> {
        let raw = self.get(field);
        raw.trim().parse::<u32>().map_err(|_| ApiError::invalid(field.name(), raw))
    }

    /// Fields of the active mode must parse. The other mode's fields are sent
    /// when they parse and as null otherwise.
    pub fn build_config(&self, legs: &LegList) -> Result<ScenarioConfig, ApiError> {
        let mode = legs.mode();
        let active = |field: ScalarField| ScalarField::for_mode(mode).contains(&field);
        let float = |field: ScalarField| match self.float(field) {
            Ok(v) => Ok(Some(v)),
            Err(e) if active(field) => Err(e),
            Err(_) => Ok(None),
        };
        let count = |field: ScalarField| match self.count(field) {
            Ok(v) => Ok(Some(v)),
            Err(e) if active(field) => Err(e),
            Err(_) => Ok(None),
        };

        Ok(ScenarioConfig {
            starting_bankroll: self.float(ScalarField::StartingBankroll)?,
            kelly_fraction: self.float(ScalarField::KellyFraction)?,
            sample_size: self.count(ScalarField::SampleSize)?,
            legs: legs.legs().to_vec(),
            mode,
            fair_prob_one_leg: float(ScalarField::FairProbOneLeg)?,
            total_payout: float(ScalarField::TotalPayout)?,
            number_of_legs: count(ScalarField::NumberOfLegs)?,
            estimated_edge: float(ScalarField::EstimatedEdge)?,
            payout_per_bet: float(ScalarField::PayoutPerBet)?,
            num_simulations: NUM_SIMULATIONS,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RunPhase {
    #[default]
    Idle,
    Running(RequestToken),
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct ScenarioState {
    pub form: ScenarioForm,
    pub legs: LegList,
    pub selection: SelectionKind,
    pub phase: RunPhase,
    /// Latest successful batch; replaced whole by the next success.
    pub results: Option<Rc<SimulationResultBundle>>,
    pub error: Option<String>,
}

impl ScenarioState {
    pub fn is_running(&self) -> bool {
        matches!(self.phase, RunPhase::Running(_))
    }

    pub fn mode(&self) -> Mode {
        self.legs.mode()
    }
}

pub enum ScenarioAction {
    AddLeg,
    RemoveLeg(u32),
    UpdateLeg { id: u32, field: LegField, value: f64 },
    SetMode(Mode),
    SetScalar(ScalarField, String),
    Select(SelectionKind),
    /// The form did not validate; nothing was sent.
    Rejected(ApiError),
    Started(RequestToken),
    Settled(RequestToken, Result<Rc<SimulationResultBundle>, ApiError>),
}

impl Reducible for ScenarioState {
    type Action = ScenarioAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        match action {
            ScenarioAction::AddLeg => {
                next.legs.add_leg();
            }
            ScenarioAction::RemoveLeg(id) => {
                if !next.legs.remove_leg(id) {
                    return self;
                }
            }
            ScenarioAction::UpdateLeg { id, field, value } => {
                if !next.legs.update_leg(id, field, value) {
                    return self;
                }
            }
            ScenarioAction::SetMode(mode) => next.legs.set_mode(mode),
            ScenarioAction::SetScalar(field, value) => next.form.set(field, value),
            ScenarioAction::Select(kind) => next.selection = kind,
            ScenarioAction::Rejected(err) => {
                if self.is_running() {
                    return self;
                }
                next.error = Some(err.display_line());
            }
            ScenarioAction::Started(token) => {
                next.phase = RunPhase::Running(token);
                next.error = None;
            }
            ScenarioAction::Settled(token, outcome) => {
                if self.phase != RunPhase::Running(token) {
                    log::debug!("discarding stale simulation response {:?}", token);
                    return self;
                }
                next.phase = RunPhase::Idle;
                match outcome {
                    Ok(bundle) => {
                        next.results = Some(bundle);
                        next.error = None;
                    }
                    Err(err) => {
                        log::warn!("simulation failed: {}", err);
                        next.error = Some(err.display_line());
                    }
                }
            }
        }
        Rc::new(next)
    }
}
