use axum::middleware::from_fn_with_state;
use pdi_payments::auth::policy::{AuthorizationPolicy, OwnershipMode};
use pdi_payments::auth::token::JwtKeys;
use pdi_payments::config::AppConfig;
use pdi_payments::gateways;
use pdi_payments::http::middleware::rate_limit::{self, RateLimitState};
use pdi_payments::http::routes::router;
use pdi_payments::repo::payments_repo::PaymentsRepo;
use pdi_payments::service::payment_service::PaymentService;
use pdi_payments::AppState;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&cfg.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let gateway = gateways::from_config(&cfg);
    if cfg.razorpay_live && cfg.razorpay_key_secret.is_empty() {
        tracing::warn!("RAZORPAY_LIVE is set but RAZORPAY_KEY_SECRET is empty");
    }
    tracing::info!(gateway = gateway.name(), currency = %cfg.currency, "payment gateway selected");

    let ownership = if cfg.legacy_email_ownership {
        tracing::warn!("legacy email-based ownership checks enabled");
        OwnershipMode::LegacyEmail
    } else {
        OwnershipMode::CustomerId
    };

    let payment_service = PaymentService {
        store: Arc::new(PaymentsRepo { pool: pool.clone() }),
        gateway,
        policy: AuthorizationPolicy::new(ownership),
        currency: cfg.currency.clone(),
        callback_url: cfg.payment_callback_url.clone(),
    };

    let state = AppState {
        payment_service,
        jwt: JwtKeys::from_secret(&cfg.jwt_secret),
        redis_client: redis::Client::open(cfg.redis_url.clone())?,
    };

    let app = router(state)
        .layer(from_fn_with_state(
            RateLimitState {
                redis_client: redis::Client::open(cfg.redis_url.clone())?,
                max_per_minute: cfg.rate_limit_per_minute,
            },
            rate_limit::enforce,
        ))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!("listening on {}", cfg.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
