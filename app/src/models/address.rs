// app/src/models/address.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A delivery address snapshot. One row is written per order and never reused.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Address {
  pub id: Uuid,
  pub street: String,
  pub city: String,
  pub state_province: Option<String>,
  pub postal_code: String,
  pub country: String,
  pub additional_info: Option<String>,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAddress {
  pub street: String,
  pub city: String,
  #[serde(default)]
  pub state_province: Option<String>,
  pub postal_code: String,
  pub country: String,
  #[serde(default)]
  pub additional_info: Option<String>,
}

impl NewAddress {
  /// Names of required fields that are blank.
  pub fn blank_fields(&self) -> Vec<&'static str> {
    [
      ("street", &self.street),
      ("city", &self.city),
      ("postal_code", &self.postal_code),
      ("country", &self.country),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(name, _)| name)
    .collect()
  }
}
