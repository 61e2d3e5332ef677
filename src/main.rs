//! PulseFit billing server.

use std::sync::Arc;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pulsefit::adapters::http::middleware::AuthState;
use pulsefit::adapters::http::{app_router, PaymentsAppState};
use pulsefit::adapters::{
    JwtSessionValidator, PostgresMemberPlanRepository, PostgresPaymentRepository,
    PostgresSubscriptionRepository, RazorpayConfig, RazorpayGateway,
};
use pulsefit::application::handlers::billing::{
    ActivatePaymentHandler, CreateOrderHandler, ReconcileActivationsCommand,
    ReconcileActivationsHandler, SubscriptionGranter, VerifyPaymentHandler,
};
use pulsefit::config::{AppConfig, DatabaseConfig, PaymentConfig, ServerConfig};
use pulsefit::domain::billing::PaymentSignatureVerifier;
use pulsefit::ports::{MemberPlanRepository, PaymentRepository, SubscriptionRepository};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    tracing::info!(
        environment = ?config.server.environment,
        gateway_mode = if config.payment.is_live_mode() { "live" } else { "test" },
        "Starting pulsefit"
    );

    let pool = connect(&config.database).await?;

    let payments: Arc<dyn PaymentRepository> =
        Arc::new(PostgresPaymentRepository::new(pool.clone()));
    let subscriptions: Arc<dyn SubscriptionRepository> =
        Arc::new(PostgresSubscriptionRepository::new(pool.clone()));
    let members: Arc<dyn MemberPlanRepository> =
        Arc::new(PostgresMemberPlanRepository::new(pool));

    let catalog = Arc::new(config.payment.catalog()?);
    for offer in catalog.offers() {
        tracing::info!(
            plan = %offer.tier,
            price = offer.price,
            currency = catalog.currency(),
            "Plan offered"
        );
    }

    let gateway = Arc::new(RazorpayGateway::new(razorpay_config(&config.payment))?);
    let granter = Arc::new(SubscriptionGranter::new(
        Arc::clone(&payments),
        subscriptions,
        members,
        Arc::clone(&catalog),
    ));
    let activation = Arc::new(ActivatePaymentHandler::new(
        Arc::clone(&payments),
        Arc::clone(&granter),
    ));

    let state = PaymentsAppState {
        create_order: Arc::new(
            CreateOrderHandler::new(gateway, Arc::clone(&payments), catalog)
                .with_attempt_timeout(config.payment.request_timeout()),
        ),
        verify_payment: Arc::new(VerifyPaymentHandler::new(
            PaymentSignatureVerifier::new(config.payment.key_secret.clone()),
            activation,
        )),
    };

    let auth: AuthState = Arc::new(
        JwtSessionValidator::new(&config.auth.jwt_secret).with_leeway(config.auth.jwt_leeway_secs),
    );

    let reconciler = ReconcileActivationsHandler::new(payments, granter);
    tokio::spawn(run_reconciliation(
        reconciler,
        config.payment.reconcile_interval(),
        ReconcileActivationsCommand {
            batch_size: config.payment.reconcile_batch_size,
        },
    ));

    let app = app_router(state, auth, &config.server);
    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// JSON logs in production, human-readable otherwise.
fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if server.is_production() {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn connect(database: &DatabaseConfig) -> Result<PgPool, BoxError> {
    let pool = PgPoolOptions::new()
        .min_connections(database.min_connections)
        .max_connections(database.max_connections)
        .acquire_timeout(database.acquire_timeout())
        .idle_timeout(database.idle_timeout())
        .connect(&database.url)
        .await?;
    tracing::info!("Connected to PostgreSQL");

    if database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    Ok(pool)
}

fn razorpay_config(payment: &PaymentConfig) -> RazorpayConfig {
    RazorpayConfig::new(payment.key_id.clone(), payment.key_secret.clone())
        .with_base_url(payment.api_base_url.clone())
        .with_timeout(payment.request_timeout())
}

/// Runs one pass immediately, then one per `interval`.
async fn run_reconciliation(
    handler: ReconcileActivationsHandler,
    interval: std::time::Duration,
    cmd: ReconcileActivationsCommand,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if let Err(e) = handler.handle(cmd).await {
            tracing::error!(error = %e, "Reconciliation pass failed");
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
