use lazy_static::lazy_static;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Decimal precision for valuation calculations
pub const DECIMAL_PRECISION: u32 = 6;

/// Decimal precision for display
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

lazy_static! {
    /// Fallback price per gram used when neither a per-account quote nor a
    /// manually set portfolio price is available.
    pub static ref DEFAULT_GOLD_PRICE: Decimal = dec!(520);
}
