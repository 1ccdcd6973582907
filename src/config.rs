//! Environment configuration

use crate::{BundleError, Result};

pub const DEFAULT_PORT: u16 = 8083;
pub const DEFAULT_CURRENCY: &str = "USD";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub nats_url: Option<String>,
    pub currency: String,
}

impl Default for Config {
    fn default() -> Self { Self { port: DEFAULT_PORT, nats_url: None, currency: DEFAULT_CURRENCY.to_string() } }
}

impl Config {
    /// Reads `PORT`, `NATS_URL` and `SHOP_CURRENCY` after loading `.env`.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| BundleError::Config(format!("PORT must be a port number, got {raw:?}")))?,
            None => DEFAULT_PORT,
        };
        let nats_url = lookup("NATS_URL").filter(|u| !u.trim().is_empty());
        let currency = lookup("SHOP_CURRENCY").map(|c| c.trim().to_uppercase()).filter(|c| !c.is_empty()).unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(BundleError::Config(format!("SHOP_CURRENCY must be an ISO 4217 code, got {currency:?}")));
        }
        Ok(Self { port, nats_url, currency })
    }

    pub fn bind_addr(&self) -> String { format!("0.0.0.0:{}", self.port) }
}
