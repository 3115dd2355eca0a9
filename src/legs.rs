use serde::{Deserialize, Serialize};

/// Which leg fields the simulation reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Mode {
    /// Fair probability per leg.
    #[default]
    A,
    /// Estimated edge per bet.
    B,
}

impl Mode {
    pub fn label(&self) -> &'static str {
        match self {
            Mode::A => "Mode A: Fair Probability",
            Mode::B => "Mode B: Edge %",
        }
    }
}

/// One component wager. Fields for the inactive mode may still be set; they
/// are kept as-is when the mode flips.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leg {
    pub id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fair_probability: Option<f64>,
    pub payout_odds: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_percent: Option<f64>,
}

impl Leg {
    pub fn with_defaults(id: u32, mode: Mode) -> Self {
        match mode {
            Mode::A => Leg { id, fair_probability: Some(0.5), payout_odds: 100.0, edge_percent: None },
            Mode::B => Leg { id, fair_probability: None, payout_odds: 100.0, edge_percent: Some(0.0) },
        }
    }

    pub fn get(&self, field: LegField) -> Option<f64> {
        match field {
            LegField::FairProbability => self.fair_probability,
            LegField::PayoutOdds => Some(self.payout_odds),
            LegField::EdgePercent => self.edge_percent,
        }
    }

    fn set(&mut self, field: LegField, value: f64) {
        match field {
            LegField::FairProbability => self.fair_probability = Some(value),
            LegField::PayoutOdds => self.payout_odds = value,
            LegField::EdgePercent => self.edge_percent = Some(value),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LegField {
    FairProbability,
    PayoutOdds,
    EdgePercent,
}

impl LegField {
    /// Fields edited in the given mode, in display order.
    pub fn for_mode(mode: Mode) -> &'static [(Self, &'static str)] {
        match mode {
            Mode::A => &[(Self::FairProbability, "Fair Probability"), (Self::PayoutOdds, "Payout Odds")],
            Mode::B => &[(Self::EdgePercent, "Edge %"), (Self::PayoutOdds, "Payout Odds")],
        }
    }
}

/// Ordered legs with stable ids. Never empty.
#[derive(Clone, Debug, PartialEq)]
pub struct LegList {
    legs: Vec<Leg>,
    mode: Mode,
    next_id: u32,
}

impl Default for LegList {
    fn default() -> Self {
        Self::new(Mode::A)
    }
}

impl LegList {
    /// Two default legs, ids 1 and 2.
    pub fn new(mode: Mode) -> Self {
        let legs = vec![Leg::with_defaults(1, mode), Leg::with_defaults(2, mode)];
        Self { legs, mode, next_id: 3 }
    }

    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    pub fn len(&self) -> usize {
        self.legs.len()
    }

    /// Always false: removal refuses to take the last leg.
    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Append a leg with defaults for the current mode and return its id.
    /// Ids are above every id ever handed out, so removed ids are not reused.
    pub fn add_leg(&mut self) -> u32 {
        let max_live = self.legs.iter().map(|l| l.id).max().unwrap_or(0);
        let id = self.next_id.max(max_live + 1);
        self.next_id = id + 1;
        self.legs.push(Leg::with_defaults(id, self.mode));
        id
    }

    /// Returns false when nothing was removed: unknown id, or the last leg.
    pub fn remove_leg(&mut self, id: u32) -> bool {
        if self.legs.len() <= 1 {
            log::debug!("refusing to remove leg {}: at least one leg is required", id);
            return false;
        }
        let before = self.legs.len();
        self.legs.retain(|l| l.id != id);
        self.legs.len() != before
    }

    /// Returns false for an unknown id.
    pub fn update_leg(&mut self, id: u32, field: LegField, value: f64) -> bool {
        match self.legs.iter_mut().find(|l| l.id == id) {
            Some(leg) => {
                leg.set(field, value);
                true
            }
            None => {
                log::debug!("update for unknown leg {} ignored", id);
                false
            }
        }
    }

    /// Reinterpret the existing legs. Nothing is cleared or converted.
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_two_default_legs() {
        let list = LegList::default();
        assert_eq!(list.len(), 2);
        assert_eq!(list.legs()[0], Leg { id: 1, fair_probability: Some(0.5), payout_odds: 100.0, edge_percent: None });
        assert_eq!(list.legs()[1].id, 2);
    }

    #[test]
    fn add_then_remove_restores_count() {
        let mut list = LegList::default();
        let before = list.len();
        let id = list.add_leg();
        assert_eq!(id, 3);
        assert_eq!(list.len(), before + 1);
        assert!(list.remove_leg(id));
        assert_eq!(list.len(), before);
    }

    #[test]
    fn removing_the_last_leg_is_refused() {
        let mut list = LegList::default();
        assert!(list.remove_leg(1));
        let snapshot = list.clone();
        assert!(!list.remove_leg(2));
        assert_eq!(list, snapshot);
        assert_eq!(list.len(), 1);
        assert!(!list.is_empty());
    }

    #[test]
    fn removed_ids_are_not_reused() {
        let mut list = LegList::default();
        let id = list.add_leg();
        list.remove_leg(id);
        let next = list.add_leg();
        assert!(next > id);
        assert!(list.legs().iter().all(|l| l.id != id));
    }

    #[test]
    fn new_id_exceeds_every_existing_id() {
        let mut list = LegList::default();
        list.remove_leg(1);
        let id = list.add_leg();
        assert!(list.legs().iter().filter(|l| l.id != id).all(|l| l.id < id));
    }

    #[test]
    fn update_unknown_id_is_noop() {
        let mut list = LegList::default();
        let snapshot = list.clone();
        assert!(!list.update_leg(99, LegField::PayoutOdds, 250.0));
        assert_eq!(list, snapshot);
    }

    #[test]
    fn update_replaces_field_in_place() {
        let mut list = LegList::default();
        assert!(list.update_leg(2, LegField::FairProbability, 0.6));
        assert_eq!(list.legs()[1].fair_probability, Some(0.6));
        assert_eq!(list.legs()[1].payout_odds, 100.0);
        assert_eq!(list.legs()[0].fair_probability, Some(0.5));
    }

    #[test]
    fn mode_switch_keeps_stale_fields() {
        let mut list = LegList::default();
        list.set_mode(Mode::B);
        assert_eq!(list.legs()[0].fair_probability, Some(0.5));
        assert_eq!(list.legs()[0].edge_percent, None);

        let id = list.add_leg();
        let leg = list.legs().iter().find(|l| l.id == id).unwrap();
        assert_eq!(leg.edge_percent, Some(0.0));
        assert_eq!(leg.fair_probability, None);
        assert_eq!(leg.payout_odds, 100.0);
    }

    #[test]
    fn legs_serialize_camel_case_and_skip_unset() {
        let leg = Leg::with_defaults(7, Mode::B);
        let json = serde_json::to_value(&leg).unwrap();
        assert_eq!(json, serde_json::json!({ "id": 7, "payoutOdds": 100.0, "edgePercent": 0.0 }));
    }
}
