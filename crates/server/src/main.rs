use axum::middleware;
use tower_http::trace::TraceLayer;

use server::db::AppState;
use server::events::CaseEventHub;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    server::telemetry::init_telemetry();
    server::config::load_config();
    server::health::record_start_time();

    let pool = server::db::create_pool();
    server::db::run_migrations(&pool).await;

    let state = AppState {
        pool,
        events: CaseEventHub::new(),
    };

    let rate_limit_per_minute = server::config::config().server.rate_limit_per_minute;
    let router = if rate_limit_per_minute > 0 {
        let rate_limit = server::rate_limit::RateLimitState::new(
            rate_limit_per_minute,
            std::time::Duration::from_secs(60),
        );
        server::rest::api_router_with_rate_limit(rate_limit)
    } else {
        server::rest::api_router()
    };

    let app = router
        .layer(middleware::from_fn(server::auth::middleware::auth_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = server::config::bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind {addr}: {e}"));

    tracing::info!(%addr, "lexlink server listening");
    axum::serve(listener, app).await.expect("server error");
}
