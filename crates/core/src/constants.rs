/// Decimal precision for stored money amounts
pub const MONEY_PRECISION: u32 = 2;

/// Decimal precision for intermediate projection and rate calculations
pub const DECIMAL_PRECISION: u32 = 6;

/// Decimal precision for percentages reported to callers
pub const PERCENT_PRECISION: u32 = 2;

/// Lifetime of a cached exchange rate, in seconds
pub const FX_CACHE_TTL_SECS: i64 = 60 * 60;

/// Latest day a credit card may bill on, so every month has the day
pub const MAX_BILLING_DAY: u32 = 28;

/// Longest monthly projection horizon accepted
pub const MAX_FORECAST_MONTHS: u32 = 60;

/// Longest weekly projection horizon accepted
pub const MAX_FORECAST_WEEKS: u32 = 260;
