use std::sync::Arc;

use anyhow::Context;
use hue_scenes::prelude::*;
use scene_server::{router, AppState};
use tokio::time::{interval, Duration};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("scene_server=debug,hue_scenes=info,tower_http=debug")
        }))
        .init();

    let config = Config::load().context("loading configuration")?;

    let bridge: Arc<dyn LightBridge> = Arc::new(HueBridge::new(&config.bridge)?);

    let store = MySqlStore::connect(&config.database)
        .await
        .context("connecting to the scene database")?;
    store.init_schema().await.context("creating tables")?;

    let scheduler = Arc::new(SceneScheduler::new(bridge.clone()));
    let manager = SceneManager::new(Arc::new(store), bridge, scheduler.clone());

    // Spawn background task to log running loops
    let scheduler_clone = scheduler.clone();
    tokio::spawn(async move {
        log_active_loops(scheduler_clone).await;
    });

    let app = router(AppState::new(manager));

    let listener = tokio::net::TcpListener::bind(&config.listen)
        .await
        .with_context(|| format!("binding {}", config.listen))?;

    info!("Scene server listening on http://{}", config.listen);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    scheduler.shutdown().await;
    info!("Scene server stopped");

    Ok(())
}

/// Background task that logs which rooms are looping every minute
async fn log_active_loops(scheduler: Arc<SceneScheduler>) {
    let mut tick = interval(Duration::from_secs(60));

    loop {
        tick.tick().await;

        let rooms = scheduler.active_rooms().await;
        if !rooms.is_empty() {
            info!("🔁 Looping rooms: {}", rooms.join(", "));
        }
    }
}
