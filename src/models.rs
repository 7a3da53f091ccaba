use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// One investment event from the account sheet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub name: String,
    pub sector: String,
    pub country: String,
    pub category1: String, // Instrument type (ETF, stock, bond fund...)
    pub category2: String, // Exchange
    pub category3: String, // Asset allocation bucket
    pub shares: Decimal,
    pub loc_quantity: Decimal, // Amount invested, local currency
    pub month: u32,
    pub year: i32,
    pub accumulated: Decimal, // Running total of loc_quantity
}

impl Transaction {
    pub fn metadata(&self) -> TickerMetadata {
        TickerMetadata {
            sector: self.sector.clone(),
            country: self.country.clone(),
            category1: self.category1.clone(),
            category2: self.category2.clone(),
            category3: self.category3.clone(),
        }
    }
}

/// Latest known price for a ticker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceQuote {
    pub name: String,
    pub last: Decimal,
}

/// Descriptive tags attached to a ticker
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TickerMetadata {
    pub sector: String,
    pub country: String,
    pub category1: String,
    pub category2: String,
    pub category3: String,
}
