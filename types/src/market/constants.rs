/// Denominator for every basis-point rate.
pub const BASIS_POINTS_SCALE: u64 = 10_000;

/// Fixed-point scale of [`crate::market::Curve`] spot prices.
pub const PRICE_SCALE: u128 = 1_000_000_000_000_000_000;

/// Maximum curve name length (bytes, after trimming).
pub const MAX_NAME_LENGTH: usize = 32;

/// Maximum curve symbol length (bytes, after trimming).
pub const MAX_SYMBOL_LENGTH: usize = 10;

/// Maximum length of a raw launch label on the wire, before trimming.
pub const MAX_RAW_LABEL_LENGTH: usize = 64;

/// Upper bound on the per-trade fee (10%).
pub const MAX_FEE_RATE_BPS: u16 = 1_000;

/// Genesis launch parameters.
pub const DEFAULT_TOTAL_SUPPLY: u64 = 1_000_000_000_000_000;
pub const DEFAULT_VIRTUAL_RESERVE: u64 = 10_000_000_000;
pub const DEFAULT_FEE_RATE_BPS: u16 = 100;
pub const DEFAULT_GRADUATION_THRESHOLD: u64 = 100_000_000;
pub const DEFAULT_ISSUER_FEE_SHARE_BPS: u16 = 8_000;

/// Length of a caller-supplied payment nonce.
pub const NONCE_LENGTH: usize = 16;
