use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::constants::DEFAULT_GOLD_PRICE;
use crate::errors::{Error, Result, ValidationError};
use crate::utils::decimal_serde::*;

/// A price observation for one account's buy/sell channel. The engine only
/// consumes quotes; fetching and refreshing them is the caller's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    #[serde(with = "decimal_serde")]
    pub price: Decimal,
    pub observed_at: DateTime<Utc>,
}

/// Current prices keyed by account, with a portfolio-wide manual price as
/// fallback and a built-in default under that.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBoard {
    quotes: HashMap<String, PriceQuote>,
    #[serde(default, with = "decimal_serde_option")]
    current_price: Option<Decimal>,
}

impl PriceBoard {
    pub fn new() -> Self {
        PriceBoard::default()
    }

    pub fn set_quote(
        &mut self,
        account_id: &str,
        price: Decimal,
        observed_at: DateTime<Utc>,
    ) -> Result<()> {
        if price <= Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Quote price must be positive, got {}",
                price
            ))));
        }
        self.quotes
            .insert(account_id.to_string(), PriceQuote { price, observed_at });
        Ok(())
    }

    /// Sets the portfolio-wide price used for accounts without a quote.
    pub fn set_current_price(&mut self, price: Decimal) -> Result<()> {
        if price <= Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Current price must be positive, got {}",
                price
            ))));
        }
        self.current_price = Some(price);
        Ok(())
    }

    pub fn quote(&self, account_id: &str) -> Option<&PriceQuote> {
        self.quotes.get(account_id)
    }

    /// Price to value the account at right now: its own quote if present,
    /// else the manual portfolio price, else the built-in default.
    pub fn resolve(&self, account_id: &str) -> Decimal {
        self.quotes
            .get(account_id)
            .map(|q| q.price)
            .or(self.current_price)
            .unwrap_or(*DEFAULT_GOLD_PRICE)
    }
}
