#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;

    use school_calendar::{CalendarManager, Settings, http_api, open_backend};
    use tracing::warn;

    let settings = Settings::from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(settings.log_filter())
        .without_time()
        .init();

    let addr: SocketAddr = settings.http_addr.parse()?;
    let backend = open_backend(&settings)?;
    let mut manager = CalendarManager::with_shared_store(backend).with_settings(&settings);
    if let Err(err) = manager.load() {
        warn!(error = %err, "starting with an empty calendar");
    }

    http_api::serve(addr, manager).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
