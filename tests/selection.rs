use qk_sims::api::simulation::{parse_simulation_body, SimulationResultBundle};
use qk_sims::selection::{chart_series, select_run, SelectionKind};
use serde_json::json;

fn bundle(simulations: Vec<f64>, progressions: Vec<Vec<f64>>) -> SimulationResultBundle {
    let band = json!({ "value": 0.0, "roi": 0.0 });
    let body = json!({
        "results": {
            "probabilityOfProfit": 0.4,
            "meanFinalBankroll": 100.0,
            "medianFinalBankroll": 100.0,
            "riskOfRuin": 0.0,
            "confidenceIntervals": {
                "bottom1": band, "bottom5": band, "bottom10": band,
                "top10": band, "top5": band, "top1": band
            },
            "simulations": simulations,
            "simulationProgressions": progressions
        }
    });
    parse_simulation_body(&body.to_string()).expect("valid bundle")
}

#[test]
fn median_of_five_one_step_runs() {
    let b = bundle(
        vec![80.0, 90.0, 100.0, 110.0, 120.0],
        vec![vec![80.0], vec![90.0], vec![100.0], vec![110.0], vec![120.0]],
    );
    assert_eq!(select_run(&b, SelectionKind::Median), Some(&[100.0][..]));

    let series = chart_series(Some(&b), SelectionKind::Median).unwrap();
    assert_eq!(series.data, vec![100.0]);
    assert_eq!(series.labels, vec![0]);
    assert_eq!(series.border_color, "#3b82f6");
}

#[test]
fn median_ignores_input_order() {
    let b = bundle(
        vec![120.0, 80.0, 110.0, 90.0, 100.0],
        vec![vec![1000.0, 120.0], vec![1000.0, 80.0], vec![1000.0, 110.0], vec![1000.0, 90.0], vec![1000.0, 100.0]],
    );
    assert_eq!(select_run(&b, SelectionKind::Median), Some(&[1000.0, 100.0][..]));
}

#[test]
fn tails_of_a_hundred_runs() {
    // Shuffle-free but reversed, so original order differs from rank order.
    let finals: Vec<f64> = (1..=100).rev().map(f64::from).collect();
    let progressions: Vec<Vec<f64>> = finals.iter().map(|&v| vec![50.0, v]).collect();
    let b = bundle(finals, progressions);

    let bottom = chart_series(Some(&b), SelectionKind::Bottom5).unwrap();
    assert_eq!(bottom.data.last(), Some(&6.0));
    assert_eq!(bottom.label, "Bottom 5% Run");

    let top = chart_series(Some(&b), SelectionKind::Top5).unwrap();
    assert_eq!(top.data.last(), Some(&95.0));
    assert_eq!(top.label, "Top 5% Run");
}

#[test]
fn duplicate_finals_pick_a_run_with_that_final() {
    let b = bundle(
        vec![100.0, 100.0, 100.0],
        vec![vec![90.0, 100.0], vec![120.0, 100.0], vec![80.0, 100.0]],
    );
    for kind in SelectionKind::all() {
        let run = select_run(&b, *kind).unwrap();
        assert_eq!(run.last(), Some(&100.0));
    }
    // Rank 1 of three ties ordered by index is the second run.
    assert_eq!(select_run(&b, SelectionKind::Median), Some(&[120.0, 100.0][..]));
}

#[test]
fn nothing_to_plot() {
    assert!(chart_series(None, SelectionKind::Median).is_none());
    let b = bundle(vec![], vec![]);
    assert!(chart_series(Some(&b), SelectionKind::Bottom5).is_none());
}
