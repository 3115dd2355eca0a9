use qk_sims::App;

fn main() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    log::info!("mounting qk-sims");
    yew::Renderer::<App>::new().render();
}
