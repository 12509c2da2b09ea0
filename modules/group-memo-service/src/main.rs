//! Group Memo Service: shared, ordered memo lists per chat channel.
//!
//! Serves an RPC API and, when `DISCORD_BOT_TOKEN` is set, a Discord bot
//! answering `memo ...` commands.
//! Default: http://127.0.0.1:9103/

mod bot;
mod commands;
mod config;
mod confirmation;
mod db;
mod discord;
mod error;
mod lanes;
mod render;
mod routes;
mod session;
mod util;

use bot::MemoBot;
use config::Config;
use routes::AppState;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};

/// How often idle channel lanes are pruned
const LANE_PRUNE_INTERVAL: Duration = Duration::from_secs(600);
/// Lanes unused for this long are dropped
const LANE_IDLE_TIMEOUT: Duration = Duration::from_secs(3600);

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Arc::new(Config::from_env());
    log::info!(
        "Config: send_mode={}, show_list_after_update={}, debug={}, confirm_timeout={}s",
        config.send_mode,
        config.show_list_after_update,
        config.debug,
        config.confirm_timeout.as_secs()
    );

    log::info!("Opening database at: {}", config.db_path);
    let database = Arc::new(db::Db::open(&config.db_path).expect("Failed to open database"));

    let bot = Arc::new(MemoBot::new(database.clone(), config.clone()));
    let discord_connected = Arc::new(AtomicBool::new(false));

    let lanes = bot.lanes.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(LANE_PRUNE_INTERVAL);
        loop {
            interval.tick().await;
            lanes.prune_idle_lanes(LANE_IDLE_TIMEOUT);
        }
    });

    // Spawn the Discord listener if a bot token is configured
    if let Some(token) = config.discord_bot_token.clone() {
        let listener_bot = bot.clone();
        let listener_connected = discord_connected.clone();
        tokio::spawn(async move {
            if let Err(e) = discord::start_discord_listener(token, listener_bot, listener_connected).await {
                log::error!("Discord listener exited: {}", e);
            }
        });
    } else {
        log::warn!("DISCORD_BOT_TOKEN not set, Discord listener disabled");
    }

    let state = Arc::new(AppState {
        db: database,
        bot,
        start_time: Instant::now(),
        discord_connected,
    });

    let cors = tower_http::cors::CorsLayer::permissive();

    let app = axum::Router::new()
        .route("/rpc/memos/list", axum::routing::post(routes::list_memos))
        .route("/rpc/memos/add", axum::routing::post(routes::add_memo))
        .route("/rpc/memos/delete", axum::routing::post(routes::delete_memo))
        .route("/rpc/memos/extract", axum::routing::post(routes::extract_memo))
        .route("/rpc/memos/clear", axum::routing::post(routes::clear_memos))
        .route("/rpc/stats", axum::routing::get(routes::stats))
        .route("/rpc/status", axum::routing::get(routes::status))
        .route("/rpc/backup/export", axum::routing::post(routes::backup_export))
        .route("/rpc/backup/restore", axum::routing::post(routes::backup_restore))
        .with_state(state)
        .layer(cors);

    let addr = format!("127.0.0.1:{}", config.port);
    log::info!("Group Memo Service listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");

    axum::serve(listener, app).await.expect("Server error");
}
