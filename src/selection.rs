//! Picking one representative run out of a simulation batch and shaping it
//! into something the chart can draw.
//!
//! Runs are ranked by final bankroll. The ranking sorts `(value, index)` pairs,
//! so the chosen trajectory is always the one that sits at the target rank,
//! even when several runs end on the same value.

use crate::api::simulation::SimulationResultBundle;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SelectionKind {
    #[default]
    Median,
    Top5,
    Bottom5,
}

impl SelectionKind {
    pub fn all() -> &'static [Self] {
        &[Self::Median, Self::Top5, Self::Bottom5]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Median => "Median Run",
            Self::Top5 => "Top 5% Run",
            Self::Bottom5 => "Bottom 5% Run",
        }
    }

    /// Short name used in the chart title.
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Median => "Median",
            Self::Top5 => "Top 5%",
            Self::Bottom5 => "Bottom 5%",
        }
    }

    pub fn border_color(&self) -> &'static str {
        match self {
            Self::Median => "#3b82f6",
            Self::Top5 => "#10b981",
            Self::Bottom5 => "#ef4444",
        }
    }

    pub fn fill_color(&self) -> &'static str {
        match self {
            Self::Median => "rgba(59, 130, 246, 0.1)",
            Self::Top5 => "rgba(16, 185, 129, 0.1)",
            Self::Bottom5 => "rgba(239, 68, 68, 0.1)",
        }
    }

    fn descending(&self) -> bool {
        matches!(self, Self::Top5)
    }

    /// Position in the sorted batch: `floor(n/2)` for the median,
    /// `floor(n * 0.05)` from the relevant end for the tails.
    pub fn rank_index(&self, n: usize) -> usize {
        match self {
            Self::Median => n / 2,
            Self::Top5 | Self::Bottom5 => n * 5 / 100,
        }
    }
}

/// Index into `simulations` of the run at the requested rank.
pub fn select_run_index(simulations: &[f64], kind: SelectionKind) -> Option<usize> {
    if simulations.is_empty() {
        return None;
    }
    let mut ranked: Vec<(f64, usize)> = simulations.iter().copied().zip(0..).collect();
    ranked.sort_by(|a, b| {
        let by_value = if kind.descending() { b.0.total_cmp(&a.0) } else { a.0.total_cmp(&b.0) };
        by_value.then(a.1.cmp(&b.1))
    });
    ranked.get(kind.rank_index(ranked.len())).map(|&(_, idx)| idx)
}

/// The full bankroll trajectory of the selected run.
pub fn select_run(bundle: &SimulationResultBundle, kind: SelectionKind) -> Option<&[f64]> {
    if bundle.simulation_progressions.is_empty() {
        return None;
    }
    let idx = select_run_index(&bundle.simulations, kind)?;
    bundle.simulation_progressions.get(idx).map(Vec::as_slice)
}

/// A labelled, styled line ready for the chart.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartSeries {
    pub kind: SelectionKind,
    pub label: &'static str,
    /// Bet number for each point: `0..len`.
    pub labels: Vec<usize>,
    pub data: Vec<f64>,
    pub border_color: &'static str,
    pub background_color: &'static str,
    pub fill: bool,
    pub tension: f64,
    pub point_radius: f64,
    pub point_hover_radius: f64,
}

impl ChartSeries {
    pub fn title(&self) -> String {
        format!("Bankroll Progression - {} Run", self.kind.short_name())
    }
}

pub fn chart_series(bundle: Option<&SimulationResultBundle>, kind: SelectionKind) -> Option<ChartSeries> {
    let run = select_run(bundle?, kind)?;
    Some(ChartSeries {
        kind,
        label: kind.label(),
        labels: (0..run.len()).collect(),
        data: run.to_vec(),
        border_color: kind.border_color(),
        background_color: kind.fill_color(),
        fill: true,
        tension: 0.1,
        point_radius: 2.0,
        point_hover_radius: 6.0,
    })
}

#[derive(Clone, Debug, PartialEq)]
pub struct Axis {
    pub title: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Axis {
    /// Tick positions inside `min..=max` on multiples of the step, at most
    /// `max_ticks` of them.
    pub fn ticks(&self, max_ticks: usize) -> Vec<f64> {
        let span = self.max - self.min;
        if span <= 0.0 || max_ticks < 2 {
            return vec![self.min];
        }
        let mut step = self.step.max(f64::EPSILON);
        while span / step > (max_ticks - 1) as f64 {
            step *= 2.0;
        }
        let first = (self.min / step).ceil() * step;
        if first > self.max + 1e-9 {
            return Vec::new();
        }
        let count = ((self.max - first) / step + 1e-9).floor().max(0.0) as usize;
        (0..=count).map(|i| first + step * i as f64).collect()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AxisConfig {
    pub x: Axis,
    pub y: Axis,
}

impl AxisConfig {
    /// x spans the bet numbers; y spans the data with a little headroom and
    /// lands on whole dollars.
    pub fn for_series(series: &ChartSeries) -> Self {
        let x_max = series.labels.len().saturating_sub(1) as f64;
        let (lo, hi) = series
            .data
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
        let (lo, hi) = if lo > hi { (0.0, 1.0) } else { (lo, hi) };
        let pad = ((hi - lo) * 0.05).max(1.0);
        let y_min = (lo - pad).floor();
        let y_max = (hi + pad).ceil();
        let y_step = nice_step((y_max - y_min) / 5.0);
        Self {
            x: Axis { title: "Number of Bets", min: 0.0, max: x_max, step: 1.0 },
            y: Axis { title: "Bankroll Value ($)", min: y_min, max: y_max, step: y_step },
        }
    }
}

/// Round a raw step up to 1, 2 or 5 times a power of ten, never below 1.
pub(crate) fn nice_step(raw: f64) -> f64 {
    if raw.is_nan() || raw <= 1.0 {
        return 1.0;
    }
    let magnitude = 10f64.powi(raw.log10().floor() as i32);
    let norm = raw / magnitude;
    let nice = [1.0, 2.0, 5.0, 10.0].into_iter().find(|&c| norm <= c).unwrap_or(10.0);
    nice * magnitude
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::simulation::test_bundle;

    #[test]
    fn median_of_five() {
        let sims = [120.0, 80.0, 100.0, 110.0, 90.0];
        assert_eq!(select_run_index(&sims, SelectionKind::Median), Some(2));
    }

    #[test]
    fn median_of_even_batch_uses_floor_half() {
        // floor(4/2) = 2 in the ascending copy: [1, 2, 3, 4] -> 3
        let sims = [4.0, 1.0, 3.0, 2.0];
        assert_eq!(select_run_index(&sims, SelectionKind::Median), Some(2));
    }

    #[test]
    fn tails_of_one_to_hundred() {
        let sims: Vec<f64> = (1..=100).map(f64::from).collect();
        let bottom = select_run_index(&sims, SelectionKind::Bottom5).unwrap();
        assert_eq!(sims[bottom], 6.0);
        let top = select_run_index(&sims, SelectionKind::Top5).unwrap();
        assert_eq!(sims[top], 95.0);
    }

    #[test]
    fn small_batches_use_the_extremes() {
        let sims = [3.0, 1.0, 2.0];
        assert_eq!(select_run_index(&sims, SelectionKind::Bottom5), Some(1));
        assert_eq!(select_run_index(&sims, SelectionKind::Top5), Some(0));
        assert_eq!(select_run_index(&[42.0], SelectionKind::Median), Some(0));
    }

    #[test]
    fn duplicates_resolve_to_the_ranked_run() {
        // Three runs end on 100; ascending rank 2 is the second of them.
        let sims = [100.0, 50.0, 100.0, 100.0, 200.0];
        assert_eq!(select_run_index(&sims, SelectionKind::Median), Some(2));
    }

    #[test]
    fn nan_does_not_panic() {
        let sims = [f64::NAN, 1.0, 2.0];
        assert!(select_run_index(&sims, SelectionKind::Median).is_some());
    }

    #[test]
    fn empty_batch_has_no_run() {
        assert_eq!(select_run_index(&[], SelectionKind::Median), None);
        assert!(chart_series(None, SelectionKind::Median).is_none());

        let empty = test_bundle(vec![], vec![]);
        assert!(chart_series(Some(&empty), SelectionKind::Top5).is_none());
    }

    #[test]
    fn missing_progressions_have_no_series() {
        let bundle = test_bundle(vec![1.0, 2.0], vec![]);
        assert!(select_run(&bundle, SelectionKind::Median).is_none());
    }

    #[test]
    fn series_is_styled_per_kind() {
        let bundle = test_bundle(vec![90.0, 110.0], vec![vec![100.0, 90.0], vec![100.0, 110.0]]);
        let s = chart_series(Some(&bundle), SelectionKind::Bottom5).unwrap();
        assert_eq!(s.label, "Bottom 5% Run");
        assert_eq!(s.border_color, "#ef4444");
        assert_eq!(s.background_color, "rgba(239, 68, 68, 0.1)");
        assert!(s.fill);
        assert_eq!(s.labels, vec![0, 1]);
        assert_eq!(s.data, vec![100.0, 90.0]);
        assert_eq!(s.title(), "Bankroll Progression - Bottom 5% Run");

        let top = chart_series(Some(&bundle), SelectionKind::Top5).unwrap();
        assert_eq!(top.border_color, "#10b981");
        assert_eq!(top.data, vec![100.0, 110.0]);
    }

    #[test]
    fn axes_cover_the_series() {
        let bundle = test_bundle(vec![1500.0], vec![vec![1000.0, 1200.0, 900.0, 1500.0]]);
        let s = chart_series(Some(&bundle), SelectionKind::Median).unwrap();
        let axes = AxisConfig::for_series(&s);
        assert_eq!(axes.x.min, 0.0);
        assert_eq!(axes.x.max, 3.0);
        assert!(axes.y.min <= 900.0 && axes.y.max >= 1500.0);
        assert_eq!(axes.y.min, axes.y.min.floor());
        assert_eq!(axes.x.ticks(10), vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn ticks_are_thinned() {
        let axis = Axis { title: "x", min: 0.0, max: 100.0, step: 1.0 };
        let ticks = axis.ticks(11);
        assert!(ticks.len() <= 11);
        assert_eq!(ticks.first(), Some(&0.0));
        assert!(ticks.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn ticks_land_on_step_multiples_inside_a_zoomed_window() {
        let axis = Axis { title: "x", min: 2.4, max: 7.6, step: 1.0 };
        assert_eq!(axis.ticks(11), vec![3.0, 4.0, 5.0, 6.0, 7.0]);
        let narrow = Axis { title: "x", min: 2.2, max: 2.8, step: 1.0 };
        assert!(narrow.ticks(11).is_empty());
    }

    #[test]
    fn nice_steps() {
        assert_eq!(nice_step(0.3), 1.0);
        assert_eq!(nice_step(3.0), 5.0);
        assert_eq!(nice_step(120.0), 200.0);
        assert_eq!(nice_step(1500.0), 2000.0);
    }
}
