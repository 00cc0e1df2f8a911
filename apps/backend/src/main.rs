use actix_web::{web, App, HttpServer};
use pawhaven_backend::config::admin_allowlist::AdminAllowlist;
use pawhaven_backend::config::db::{DbKind, RuntimeEnv};
use pawhaven_backend::config::payments::PaymentConfig;
use pawhaven_backend::infra::state::build_state;
use pawhaven_backend::middleware::{
    cors_middleware, RequestTrace, SecurityHeaders, StructuredLogger, TraceSpan,
};
use pawhaven_backend::routes;
use pawhaven_backend::state::security_config::SecurityConfig;
use tracing::{error, info};

mod telemetry;

fn exit_with(message: impl std::fmt::Display) -> ! {
    error!("{message}");
    eprintln!("❌ {message}");
    std::process::exit(1);
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Environment comes from the runtime (docker env_file, or sourced .env locally).
    let host = std::env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("BACKEND_PORT")
        .unwrap_or_else(|_| "3001".to_string())
        .parse::<u16>()
        .unwrap_or_else(|_| exit_with("BACKEND_PORT must be a valid port number"));

    let jwt = std::env::var("BACKEND_JWT_SECRET")
        .unwrap_or_else(|_| exit_with("BACKEND_JWT_SECRET must be set"));
    let security = SecurityConfig::new(jwt.as_bytes());

    let db_kind = match std::env::var("PAWHAVEN_DB_KIND") {
        Ok(raw) => raw.parse::<DbKind>().unwrap_or_else(|e| exit_with(e)),
        Err(_) => DbKind::Postgres,
    };
    let payments = PaymentConfig::from_env().unwrap_or_else(|e| exit_with(e));
    let admins = AdminAllowlist::from_env();
    info!(
        admin_patterns = admins.as_ref().map_or(0, |a| a.pattern_count()),
        commission_bps = payments.commission_bps,
        currency = %payments.currency,
        "Configuration loaded"
    );

    let app_state = build_state()
        .with_env(RuntimeEnv::Prod)
        .with_db(db_kind)
        .with_security(security)
        .with_payments(payments)
        .with_admins(admins)
        .build()
        .await
        .unwrap_or_else(|e| exit_with(format!("Failed to build application state: {e}")));

    info!(%host, port, "Starting PawHaven backend");
    let data = web::Data::new(app_state);

    HttpServer::new(move || {
        App::new()
            .wrap(TraceSpan)
            .wrap(RequestTrace)
            .wrap(SecurityHeaders)
            .wrap(StructuredLogger)
            .wrap(cors_middleware())
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
