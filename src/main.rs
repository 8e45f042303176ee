use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spendbase::config::Config;
use spendbase::middleware::{ApiKeyAuth, MetricsCollector, MetricsMiddleware, RateLimiter, RequestId};
use spendbase::modules;
use spendbase::modules::accounts::repositories::AccountRepository;
use spendbase::modules::accounts::services::AccountService;
use spendbase::modules::currencies::repositories::CurrencyRateRepository;
use spendbase::modules::currencies::services::CurrencyRateService;
use spendbase::modules::expenses::repositories::{CategoryRepository, ExpenseRepository};
use spendbase::modules::expenses::services::ExpenseService;
use spendbase::modules::loans::repositories::LoanRepository;
use spendbase::modules::loans::services::LoanService;
use spendbase::modules::reports::repositories::ReportRepository;
use spendbase::modules::reports::services::ReportService;
use spendbase::modules::subscriptions::repositories::SubscriptionRepository;
use spendbase::modules::subscriptions::services::SubscriptionService;
use spendbase::modules::team::repositories::TeamRepository;
use spendbase::modules::team::services::TeamService;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "spendbase=debug,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!("Starting Spendbase expense management API");
    tracing::info!("Environment: {}", config.app.env);
    tracing::info!("Base currency: {}", config.expenses.base_currency);
    tracing::info!("Server binding to: {}", config.server.bind_address());

    // Create database connection pool and apply pending migrations
    let pool = config.database.create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    tracing::info!(
        "Database pool initialized ({} connections)",
        config.database.pool_size
    );

    let settings = config.expenses.clone();

    // Services are built once and shared across workers
    let currency_service = web::Data::new(Arc::new(CurrencyRateService::new(
        CurrencyRateRepository::new(pool.clone()),
        settings.clone(),
    )));
    let account_service = web::Data::new(Arc::new(AccountService::new(
        AccountRepository::new(pool.clone()),
        CurrencyRateRepository::new(pool.clone()),
        settings.clone(),
    )));
    let expense_service = web::Data::new(Arc::new(ExpenseService::new(
        ExpenseRepository::new(pool.clone()),
        CategoryRepository::new(pool.clone()),
        AccountRepository::new(pool.clone()),
        CurrencyRateRepository::new(pool.clone()),
        settings.clone(),
    )));
    let subscription_service = web::Data::new(Arc::new(SubscriptionService::new(
        SubscriptionRepository::new(pool.clone()),
        ExpenseRepository::new(pool.clone()),
        AccountRepository::new(pool.clone()),
        CurrencyRateRepository::new(pool.clone()),
        settings.clone(),
    )));
    let loan_service = web::Data::new(Arc::new(LoanService::new(
        LoanRepository::new(pool.clone()),
        AccountRepository::new(pool.clone()),
        CurrencyRateRepository::new(pool.clone()),
        settings.clone(),
    )));
    let team_service = web::Data::new(Arc::new(TeamService::new(
        TeamRepository::new(pool.clone()),
        AccountRepository::new(pool.clone()),
        settings.clone(),
    )));
    let report_service = web::Data::new(Arc::new(ReportService::new(
        ReportRepository::new(pool.clone()),
        ExpenseRepository::new(pool.clone()),
        CategoryRepository::new(pool.clone()),
        CurrencyRateRepository::new(pool.clone()),
        AccountRepository::new(pool.clone()),
        settings,
    )));

    let metrics_collector = MetricsCollector::new();

    let bind_address = config.server.bind_address();
    let workers = config.server.workers;
    let app_env = config.app.env.clone();
    let rate_limit = config.security.rate_limit_per_minute;

    let server = HttpServer::new(move || {
        let cors = if app_env == "production" {
            Cors::default()
        } else {
            Cors::permissive()
        };

        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(metrics_collector.clone()))
            .app_data(currency_service.clone())
            .app_data(account_service.clone())
            .app_data(expense_service.clone())
            .app_data(subscription_service.clone())
            .app_data(loan_service.clone())
            .app_data(team_service.clone())
            .app_data(report_service.clone())
            // Later wraps run earlier: the request passes Cors, RequestId,
            // TracingLogger, Metrics, RateLimiter, then ApiKeyAuth.
            .wrap(ApiKeyAuth::new(pool.clone()))
            .wrap(RateLimiter::new(rate_limit))
            .wrap(MetricsMiddleware::new(metrics_collector.clone()))
            .wrap(TracingLogger::default())
            .wrap(RequestId)
            .wrap(cors)
            .route("/", web::get().to(index))
            .configure(modules::health::controllers::configure)
            .configure(modules::currencies::controllers::configure)
            .configure(modules::accounts::controllers::configure)
            .configure(modules::expenses::controllers::expense_controller::configure)
            .configure(modules::expenses::controllers::category_controller::configure)
            .configure(modules::subscriptions::controllers::configure)
            .configure(modules::loans::controllers::configure)
            .configure(modules::team::controllers::configure)
            .configure(modules::reports::controllers::configure)
    })
    .workers(workers)
    .bind(&bind_address)?
    .run();

    tracing::info!("Server started at http://{}", bind_address);

    server.await?;
    Ok(())
}

async fn index() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "service": "Spendbase expense management API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}
