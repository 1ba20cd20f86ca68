use std::env;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use routa_bot::transport::{ConsoleTransport, Transport};
use routa_bot::{AppState, Engine};
use routa_core::repository::{BookingStore, DirectoryStore, SessionStore, TripSlotStore};
use routa_store::app_config::Config;
use routa_store::{MemoryStore, RedisStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "routa_bot=debug,routa_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().expect("Failed to load config");
    tracing::info!("Starting routa-bot with {} store", config.store.backend);

    match config.store.backend.as_str() {
        "redis" => {
            let store = RedisStore::new(&config.redis.url)
                .await
                .expect("Failed to connect to Redis");
            run(Arc::new(store), config).await
        }
        _ => run(Arc::new(MemoryStore::new()), config).await,
    }
}

async fn run<S>(store: Arc<S>, config: Config) -> anyhow::Result<()>
where
    S: SessionStore + BookingStore + TripSlotStore + DirectoryStore + 'static,
{
    let app = AppState::build(store, config.booking_rules.clone());
    app.directory.seed_admins(&config.identity.seed_admins).await?;

    let engine = Engine::new(app);

    // Local development surface; real chat adapters plug in at the same
    // Transport seam.
    let participant = env::var("ROUTA_CONSOLE_PARTICIPANT")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(1);
    let transport = Arc::new(ConsoleTransport::new(participant));
    tracing::info!("Console transport ready, participant {}", participant);

    let (tx, mut rx) = tokio::sync::mpsc::channel(32);
    let listener = {
        let transport = transport.clone();
        tokio::spawn(async move { transport.listen(tx).await })
    };

    while let Some(event) = rx.recv().await {
        let reply = engine.handle(&event).await;
        transport.send(event.participant, &reply).await?;
    }

    listener.await??;
    Ok(())
}
