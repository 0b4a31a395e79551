use ais_consumer::{settings::Settings, startup::App};

#[tokio::main]
async fn main() {
    let settings = Settings::new().unwrap();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::from(&settings.log_level))
        .init();

    let app = App::build(settings).await;

    if let Err(e) = app.run().await {
        tracing::error!("ais-consumer exited with an error: {e:?}");
        std::process::exit(1);
    }
}
