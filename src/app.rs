use yew::prelude::*;

use crate::api::ApiClient;
use crate::pages::{CalculatorPage, SimulatorPage};

#[derive(Clone, Copy, PartialEq)]
enum Tab {
    Calculator,
    Simulator,
}

impl Tab {
    fn all() -> &'static [(Self, &'static str)] {
        &[
            (Self::Calculator, "QK Calculator"),
            (Self::Simulator, "Scenario Simulator"),
        ]
    }
}

#[function_component(App)]
pub fn app() -> Html {
    let tab = use_state(|| Tab::Calculator);
    let client = use_memo((), |_| ApiClient::default());

    {
        let base = client.base_url().to_string();
        use_effect_with((), move |_| {
            log::info!("calculation service at {}", base);
            || ()
        });
    }

    html! {
        <div class="container">
            <header>
                <h1>{"Betting Calculator"}</h1>
                <nav class="row">
                    { for Tab::all().iter().map(|&(t, name)| {
                        let tab_set = tab.clone();
                        let onclick = Callback::from(move |_: MouseEvent| tab_set.set(t));
                        html! {
                            <button class={if *tab == t { "pill active" } else { "pill" }} {onclick}>{ name }</button>
                        }
                    }) }
                </nav>
            </header>

            { match *tab {
                Tab::Calculator => html! { <CalculatorPage client={client.clone()} /> },
                Tab::Simulator => html! { <SimulatorPage client={client.clone()} /> },
            }}

            <footer>
                {"Quarter Kelly & Devig Calculator - Monte Carlo Simulations for Betting Strategies"}
            </footer>
        </div>
    }
}
