use std::rc::Rc;

use web_sys::HtmlInputElement;
use yew::prelude::*;
use yew::TargetCast;

use crate::api::{run_simulation, ApiClient, SimulationResultBundle};
use crate::chart::{ChartGate, LineChart};
use crate::legs::{LegField, Mode};
use crate::scenario::{RequestSequencer, ScalarField, ScenarioAction, ScenarioState};
use crate::selection::{chart_series, SelectionKind};

#[derive(Properties, PartialEq)]
pub struct SimulatorProps {
    pub client: Rc<ApiClient>,
}

#[function_component(SimulatorPage)]
pub fn simulator_page(props: &SimulatorProps) -> Html {
    let state = use_reducer(ScenarioState::default);
    let sequencer = use_mut_ref(RequestSequencer::default);
    let gate = use_state(ChartGate::browser);
    let chart_ready = use_state(|| false);

    {
        let gate = (*gate).clone();
        let chart_ready = chart_ready.clone();
        use_effect_with((), move |_| {
            wasm_bindgen_futures::spawn_local(async move {
                gate.wait().await;
                chart_ready.set(true);
            });
            || ()
        });
    }

    // Re-rank only when the batch or the selection changes.
    let series = {
        let results = state.results.clone();
        use_memo((results.as_ref().map(Rc::as_ptr), state.selection), move |(_, kind)| {
            chart_series(results.as_deref(), *kind).map(Rc::new)
        })
    };

    let on_run = {
        let state = state.clone();
        let client = props.client.clone();
        let sequencer = sequencer.clone();
        Callback::from(move |_: MouseEvent| {
            if state.is_running() {
                return;
            }
            let config = match state.form.build_config(&state.legs) {
                Ok(config) => config,
                Err(err) => {
                    state.dispatch(ScenarioAction::Rejected(err));
                    return;
                }
            };
            let token = sequencer.borrow_mut().issue();
            log::info!("monte-carlo-simulation {:?}: {} legs, mode {:?}", token, config.legs.len(), config.mode);
            state.dispatch(ScenarioAction::Started(token));
            let state = state.clone();
            let client = client.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let outcome = run_simulation(&client, &config).await.map(Rc::new);
                state.dispatch(ScenarioAction::Settled(token, outcome));
            });
        })
    };

    let scalar_input = |field: ScalarField| {
        let value = state.form.get(field).to_string();
        let state = state.clone();
        let oninput = Callback::from(move |e: InputEvent| {
            let target: HtmlInputElement = e.target_unchecked_into();
            state.dispatch(ScenarioAction::SetScalar(field, target.value()));
        });
        html! {
            <div class="input-group">
                <label>{field.label()}</label>
                <input type="number" {value} {oninput} />
            </div>
        }
    };

    let mode_radio = |mode: Mode| {
        let checked = state.mode() == mode;
        let state = state.clone();
        let onchange = Callback::from(move |_: Event| state.dispatch(ScenarioAction::SetMode(mode)));
        html! {
            <label class="radio">
                <input type="radio" name="mode" {checked} {onchange} />
                <span>{mode.label()}</span>
            </label>
        }
    };

    let selection_radio = |kind: SelectionKind| {
        let checked = state.selection == kind;
        let state = state.clone();
        let onchange = Callback::from(move |_: Event| state.dispatch(ScenarioAction::Select(kind)));
        html! {
            <label class="radio">
                <input type="radio" name="graphSelection" {checked} {onchange} />
                <span>{kind.label()}</span>
            </label>
        }
    };

    let on_add_leg = {
        let state = state.clone();
        Callback::from(move |_: MouseEvent| state.dispatch(ScenarioAction::AddLeg))
    };

    let mode = state.mode();
    let chart = match (*chart_ready, &*series) {
        (false, _) => html! { <div class="muted">{"Loading chart..."}</div> },
        (true, Some(series)) => html! { <LineChart series={series.clone()} /> },
        (true, None) => html! { <div class="muted">{"No run to plot"}</div> },
    };

    html! {
        <div class="grid">
            <div class="card">
                <h2><span>{"Simulation Settings"}</span></h2>
                { for ScalarField::shared().iter().map(|&f| scalar_input(f)) }

                <div class="section-divider"></div>
                <h2><span>{"Mode Selection"}</span></h2>
                <div class="row">
                    { mode_radio(Mode::A) }
                    { mode_radio(Mode::B) }
                </div>
                { for ScalarField::for_mode(mode).iter().map(|&f| scalar_input(f)) }

                <div class="section-divider"></div>
                <h2><span>{"Legs"}</span></h2>
                { for state.legs.legs().iter().map(|leg| {
                    let id = leg.id;
                    let on_remove = {
                        let state = state.clone();
                        Callback::from(move |_: MouseEvent| state.dispatch(ScenarioAction::RemoveLeg(id)))
                    };
                    html! {
                        <div class="row three" key={id}>
                            { for LegField::for_mode(mode).iter().map(|&(field, label)| {
                                let state = state.clone();
                                let oninput = Callback::from(move |e: InputEvent| {
                                    let target: HtmlInputElement = e.target_unchecked_into();
                                    if let Ok(value) = target.value().trim().parse::<f64>() {
                                        state.dispatch(ScenarioAction::UpdateLeg { id, field, value });
                                    }
                                });
                                html! {
                                    <div>
                                        <label>{format!("Leg {} {}", id, label)}</label>
                                        <input type="number" step="any"
                                            value={leg.get(field).map(|v| v.to_string()).unwrap_or_default()}
                                            {oninput} />
                                    </div>
                                }
                            }) }
                            <button onclick={on_remove} class="danger" disabled={state.legs.len() <= 1} aria-label="Remove leg">
                                {"Remove"}
                            </button>
                        </div>
                    }
                }) }
                <button onclick={on_add_leg} aria-label="Add new leg">{"Add Leg"}</button>
            </div>

            <div class="card">
                <h2><span>{"Simulation Results"}</span></h2>
                { match state.results.as_deref() {
                    Some(bundle) => html! {
                        <>
                            { results_panel(bundle) }
                            <h3>{"Interactive Simulation Graph"}</h3>
                            <div class="row">
                                { for SelectionKind::all().iter().map(|&k| selection_radio(k)) }
                            </div>
                            <div class="chart-frame">{ chart }</div>
                        </>
                    },
                    None => html! {
                        <p class="muted">{"Configure your betting strategy and run the simulation to see results here"}</p>
                    },
                }}
                { for state.error.iter().map(|e| html! { <div class="status-indicator danger">{e.clone()}</div> }) }
                <button class="runbutton" onclick={on_run} disabled={state.is_running()}>
                    { if state.is_running() { "Running Simulation..." } else { "Run Monte Carlo Simulation" } }
                </button>
            </div>
        </div>
    }
}

fn results_panel(bundle: &SimulationResultBundle) -> Html {
    html! {
        <>
            <h3>{"Summary Statistics"}</h3>
            <div class="metric-grid">
                { for bundle.summary_lines().into_iter().map(|line| html! { <div>{line}</div> }) }
            </div>
            <h3>{"Confidence Intervals"}</h3>
            <div class="metric-grid">
                { for bundle.confidence_intervals.bands().iter().map(|(label, band)| html! {
                    <div>{format!("{}: {}", label, band.display())}</div>
                }) }
            </div>
            { for bundle.parlay_records.iter().map(|r| html! {
                <div class="hint">
                    {format!("Winning bets: {} of {} (avg {:.2} wins per run)", r.total_wins, r.total_bets, r.win_rate)}
                </div>
            }) }
        </>
    }
}
