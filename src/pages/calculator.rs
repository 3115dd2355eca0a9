use std::cell::RefCell;
use std::rc::Rc;

use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;
use yew::TargetCast;

use crate::api::{calculate_bet, ApiClient, BetRequest};
use crate::odds::{american_to_decimal, format_american, format_decimal, parse_american_int, parse_odds_input, DevigMethod};
use crate::scenario::{RequestSequencer, RequestToken};

#[derive(Properties, PartialEq)]
pub struct CalculatorProps {
    pub client: Rc<ApiClient>,
}

#[function_component(CalculatorPage)]
pub fn calculator_page(props: &CalculatorProps) -> Html {
    let input_str = use_state(|| String::from("-113/-113, -113/-113"));
    let bankroll = use_state(|| String::from("100"));
    let kelly_fraction = use_state(|| String::from("0.25"));
    let final_odds = use_state(|| String::from("324"));
    let devig_method = use_state(DevigMethod::default);
    let result = use_state(Vec::<String>::new);
    let pending = use_state(|| false);
    let sequencer = use_mut_ref(RequestSequencer::default);

    // Preview only; the service parses the string itself.
    let parsed = parse_odds_input(&input_str);
    let final_decimal = parse_american_int(&final_odds).map(american_to_decimal);

    let text_input = |state: &UseStateHandle<String>| {
        let state = state.clone();
        Callback::from(move |e: InputEvent| {
            let target: HtmlInputElement = e.target_unchecked_into();
            state.set(target.value());
        })
    };
    let on_input_str = text_input(&input_str);
    let on_bankroll = text_input(&bankroll);
    let on_kelly = text_input(&kelly_fraction);
    let on_final_odds = text_input(&final_odds);

    let on_devig_change = {
        let devig_method = devig_method.clone();
        Callback::from(move |e: Event| {
            let target: HtmlSelectElement = e.target_unchecked_into();
            devig_method.set(DevigMethod::from_index(target.selected_index()));
        })
    };

    let on_calculate = {
        let client = props.client.clone();
        let result = result.clone();
        let pending = pending.clone();
        let sequencer = sequencer.clone();
        let form = (
            (*input_str).clone(),
            (*final_odds).clone(),
            (*bankroll).clone(),
            (*kelly_fraction).clone(),
            *devig_method,
        );
        Callback::from(move |_: MouseEvent| {
            let (input_str, final_odds, bankroll, kelly_fraction, devig) = &form;
            let request = match BetRequest::from_form(input_str, final_odds, bankroll, kelly_fraction, *devig) {
                Ok(req) => req,
                Err(err) => {
                    result.set(vec![err.display_line()]);
                    return;
                }
            };
            let token = sequencer.borrow_mut().issue();
            log::info!("calculate-bet {:?} ({} / {})", token, request.input_str, request.devig_method);
            pending.set(true);
            spawn_calculation(client.clone(), request, token, sequencer.clone(), result.clone(), pending.clone());
        })
    };

    html! {
        <div class="grid">
            <div class="card">
                <h2><span>{"Bet Inputs"}</span></h2>

                <div class="input-group">
                    <label for="odds-input">{"Enter odds (comma-separated):"}</label>
                    <input
                        id="odds-input"
                        type="text"
                        placeholder={"-113/-113, -113/-113"}
                        value={(*input_str).clone()}
                        oninput={on_input_str}
                        class={if parsed.is_ok() { "" } else { "error" }} />
                    <div class="hint">
                        { match &parsed {
                            Ok(pairs) => html! {
                                <>
                                    { for pairs.iter().enumerate().map(|(i, pair)| {
                                        let (a, b) = pair.implied();
                                        html! {
                                            <div>{format!("Leg {}: {:+}/{:+} → {:.1}% / {:.1}% (vig {:.2}%)",
                                                i + 1, pair.side, pair.opposite, a * 100.0, b * 100.0, pair.overround() * 100.0)}</div>
                                        }
                                    }) }
                                </>
                            },
                            Err(err) => html! { <div class="warning">{format!("Check odds: {}", err)}</div> },
                        }}
                    </div>
                </div>

                <div class="input-group">
                    <label for="final-odds">{"Final Odds:"}</label>
                    <input id="final-odds" type="text" placeholder={"324"} value={(*final_odds).clone()} oninput={on_final_odds} />
                    <div class="hint">
                        { match final_decimal {
                            Some(d) => format!("Decimal {} ({})", format_decimal(d), format_american(d)),
                            None => "American odds, e.g. 324 or -150".to_string(),
                        }}
                    </div>
                </div>

                <div class="input-group">
                    <label for="bankroll">{"Bankroll ($):"}</label>
                    <input id="bankroll" type="text" placeholder={"100"} value={(*bankroll).clone()} oninput={on_bankroll} />
                </div>

                <div class="input-group">
                    <label for="kelly-fraction">{"Kelly Fraction:"}</label>
                    <input id="kelly-fraction" type="text" placeholder={"0.25"} value={(*kelly_fraction).clone()} oninput={on_kelly} />
                </div>

                <div class="input-group">
                    <label for="devig-method">{"Devig Method:"}</label>
                    <select id="devig-method" onchange={on_devig_change} aria-label="Devig method selection">
                        { for DevigMethod::all().iter().map(|(m, name)| {
                            let selected = *m == *devig_method;
                            html!{ <option value={m.as_str()} selected={selected}>{ *name }</option> }
                        })}
                    </select>
                </div>

                <button class="runbutton" onclick={on_calculate} disabled={*pending}>
                    { if *pending { "Calculating..." } else { "Calculate Bet" } }
                </button>
            </div>

            <div class="card">
                <h2><span>{"Results"}</span></h2>
                { if result.is_empty() {
                    html! { <p class="muted">{"Click \"Calculate Bet\" to see results here"}</p> }
                } else {
                    html! {
                        <div class="result-lines">
                            { for result.iter().map(|line| html! { <div>{line.clone()}</div> }) }
                        </div>
                    }
                }}
            </div>
        </div>
    }
}

fn spawn_calculation(
    client: Rc<ApiClient>,
    request: BetRequest,
    token: RequestToken,
    sequencer: Rc<RefCell<RequestSequencer>>,
    result: UseStateHandle<Vec<String>>,
    pending: UseStateHandle<bool>,
) {
    wasm_bindgen_futures::spawn_local(async move {
        let outcome = calculate_bet(&client, &request).await;
        if !sequencer.borrow().is_latest(token) {
            log::debug!("discarding stale calculate-bet response {:?}", token);
            return;
        }
        pending.set(false);
        match outcome {
            Ok(lines) => result.set(lines),
            Err(err) => {
                log::warn!("calculate-bet failed: {}", err);
                result.set(vec![err.display_line()]);
            }
        }
    });
}
