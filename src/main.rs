use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use policy_teamlab::ui;

fn main() -> eframe::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "policy_teamlab=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let options = eframe::NativeOptions::default();

    eframe::run_native(
        "Policy Teamlab",
        options,
        Box::new(|_cc| Ok(Box::new(ui::app::MyApp::new()))),
    )
}
