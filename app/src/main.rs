// app/src/main.rs

use storefront::config::{AppConfig, LogFormat};
use storefront::models::Money;
use storefront::state::AppState;
use storefront::store::PgOrderStore;
use storefront::web::configure_app_routes;

use actix_web::{web as actix_data, App, HttpServer};
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_span_events(FmtSpan::CLOSE);
  match format {
    LogFormat::Json => builder.json().init(),
    LogFormat::Pretty => builder.init(),
  }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  let app_config = AppConfig::from_env().context("loading configuration")?;
  init_tracing(app_config.log_format);
  tracing::info!(
    home_delivery_fee_cents = ?app_config.shipping_fees.home_delivery.map(Money::cents),
    local_pickup_fee_cents = ?app_config.shipping_fees.local_pickup.map(Money::cents),
    "Application configuration loaded successfully."
  );
  tracing::info!("Starting storefront server...");

  let db_pool = PgPoolOptions::new()
    .max_connections(app_config.database_max_connections)
    .connect(&app_config.database_url)
    .await
    .context("connecting to the database")?;
  tracing::info!("Successfully connected to the database.");

  let server_address = app_config.server_address();
  let app_state = AppState::new(Arc::new(PgOrderStore::new(db_pool)), app_config)?;

  tracing::info!("Attempting to bind server to {}...", server_address);
  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(configure_app_routes)
  })
  .bind(&server_address)
  .with_context(|| format!("binding {}", server_address))?
  .run()
  .await?;

  Ok(())
}
