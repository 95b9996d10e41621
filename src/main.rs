use tracing::warn;

mod app;
mod auth;
mod config;
mod consent;
mod error;
mod hours;
mod menu;
mod settings;
mod state;
mod users;
mod visitors;

use crate::auth::repo::AdminUser;
use crate::auth::session::spawn_expired_session_reaper;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "osteria=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = AppState::init().await?;
    error::set_debug_errors(!app_state.config.environment.is_production());

    sqlx::migrate!("./migrations").run(&app_state.db).await?;

    match &app_state.config.bootstrap_admin {
        Some((email, password)) => {
            AdminUser::ensure_bootstrap(&app_state.db, email, password).await?;
        }
        None => warn!("no bootstrap admin configured; set ADMIN_EMAIL and ADMIN_PASSWORD"),
    }

    spawn_expired_session_reaper(
        app_state.db.clone(),
        app_state.config.session.reaper_interval_secs,
    );

    let app = app::build_app(app_state);
    app::serve(app).await
}
