// app/src/config.rs

use crate::errors::{AppError, Result};
use crate::models::Money;
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Pretty,
  Json,
}

/// Flat shipping fee per shipping method. `None` means the method has no rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShippingFees {
  pub home_delivery: Option<Money>,
  pub local_pickup: Option<Money>,
}

impl Default for ShippingFees {
  fn default() -> Self {
    Self {
      home_delivery: Some(Money::from_cents(500)),
      local_pickup: Some(Money::ZERO),
    }
  }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,
  pub database_max_connections: u32,
  pub shipping_fees: ShippingFees,
  pub log_format: LogFormat,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = parse_or("SERVER_PORT", 8080u16)?;
    let database_url = get_env("DATABASE_URL")?;
    let database_max_connections = parse_or("DATABASE_MAX_CONNECTIONS", 10u32)?;

    let defaults = ShippingFees::default();
    let shipping_fees = ShippingFees {
      home_delivery: fee_or("HOME_DELIVERY_FEE_CENTS", defaults.home_delivery)?,
      local_pickup: fee_or("LOCAL_PICKUP_FEE_CENTS", defaults.local_pickup)?,
    };

    let log_format = match get_env("LOG_FORMAT").as_deref() {
      Ok("json") => LogFormat::Json,
      Ok("pretty") | Err(_) => LogFormat::Pretty,
      Ok(other) => return Err(AppError::Config(format!("Invalid LOG_FORMAT: {}", other))),
    };

    Ok(Self {
      server_host,
      server_port,
      database_url,
      database_max_connections,
      shipping_fees,
      log_format,
    })
  }

  pub fn server_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}

fn parse_or<T>(var_name: &str, default: T) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  match env::var(var_name) {
    Ok(raw) => raw
      .trim()
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {}: {}", var_name, e))),
    Err(_) => Ok(default),
  }
}

/// Reads a fee in cents. An empty value removes the rate for that method.
fn fee_or(var_name: &str, default: Option<Money>) -> Result<Option<Money>> {
  match env::var(var_name) {
    Ok(raw) if raw.trim().is_empty() => Ok(None),
    Ok(raw) => {
      let fee = raw
        .trim()
        .parse::<i64>()
        .map(Money::from_cents)
        .map_err(|e| AppError::Config(format!("Invalid {}: {}", var_name, e)))?;
      if fee.is_negative() {
        return Err(AppError::Config(format!("{} must not be negative", var_name)));
      }
      Ok(Some(fee))
    }
    Err(_) => Ok(default),
  }
}
