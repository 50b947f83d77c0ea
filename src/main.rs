use club_backend::db::{PgStore, get_pool_stats, init_db};
use club_backend::domain::PollPolicy;
use club_backend::{AppState, Config, build_router};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[macro_use]
extern crate tracing;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    // initialize tracing; RUST_LOG overrides the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let pool = match init_db(&config.database_url, config.db_max_connections).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("failed to initialise database: {e}");
            return ExitCode::FAILURE;
        }
    };
    let store = PgStore::new(pool);
    info!("{}", get_pool_stats(store.pool()));

    let policy = PollPolicy {
        reject_votes_after_close: config.poll_reject_after_close,
    };
    let app_state = AppState::new(Arc::new(store), &config.jwt_secret, policy);
    let app = build_router(app_state);

    let listener = match tokio::net::TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("unable to bind {}: {e}", config.bind_addr);
            return ExitCode::FAILURE;
        }
    };
    info!("listening on {}", config.bind_addr);

    if let Err(e) = axum::serve(listener, app).await {
        error!("server error: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
