use commonware_cryptography::ed25519::PublicKey;
use curvepay_types::market::{DefaultsError, Nonce};
use thiserror::Error;

/// Coarse classification shared by every failure the engine reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Unauthorized,
    InvalidInput,
    StateConflict,
    InsufficientFunds,
    SlippageExceeded,
    Arithmetic,
    Storage,
}

/// Failures raised by the pricing engine, the balance ledger and graduation.
#[derive(Debug, Error)]
pub enum CurveError {
    #[error("curve {0} not found")]
    CurveNotFound(u64),
    #[error("issuer is not registered")]
    IssuerNotRegistered,
    #[error("caller is not the protocol admin")]
    NotAdmin,
    #[error("{field} must be 1..={max} bytes (got {len})")]
    InvalidLabel {
        field: &'static str,
        len: usize,
        max: usize,
    },
    #[error("amount must be > 0")]
    ZeroAmount,
    #[error("cannot transfer to self")]
    SelfTransfer,
    #[error("invalid defaults: {0}")]
    InvalidDefaults(#[from] DefaultsError),
    #[error("issuer already owns curve {0}")]
    IssuerHasCurve(u64),
    #[error("curve {0} has graduated")]
    Graduated(u64),
    #[error("curve {curve_id} below graduation threshold ({reserve} < {threshold})")]
    BelowGraduationThreshold {
        curve_id: u64,
        reserve: u64,
        threshold: u64,
    },
    #[error("curve {0} is sold out")]
    SoldOut(u64),
    #[error("insufficient token balance (needed={needed}, available={available})")]
    InsufficientBalance { needed: u64, available: u64 },
    #[error("insufficient native balance for {account:?} (needed={needed}, available={available})")]
    InsufficientNative {
        account: PublicKey,
        needed: u64,
        available: u64,
    },
    #[error("curve reserve cannot cover {needed} (available={available})")]
    InsufficientReserve { needed: u64, available: u64 },
    #[error("slippage exceeded (minimum={minimum}, quoted={quoted})")]
    Slippage { minimum: u64, quoted: u64 },
    #[error("trade output rounds to zero")]
    ZeroOutput,
    #[error("curve {0} would break its pricing invariant")]
    InvariantViolated(u64),
    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),
    #[error("state error: {0}")]
    State(#[source] anyhow::Error),
}

impl CurveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CurveNotFound(_) => ErrorKind::NotFound,
            Self::IssuerNotRegistered | Self::NotAdmin => ErrorKind::Unauthorized,
            Self::InvalidLabel { .. }
            | Self::ZeroAmount
            | Self::SelfTransfer
            | Self::InvalidDefaults(_) => ErrorKind::InvalidInput,
            Self::IssuerHasCurve(_)
            | Self::Graduated(_)
            | Self::BelowGraduationThreshold { .. } => ErrorKind::StateConflict,
            Self::SoldOut(_)
            | Self::InsufficientBalance { .. }
            | Self::InsufficientNative { .. }
            | Self::InsufficientReserve { .. } => ErrorKind::InsufficientFunds,
            Self::Slippage { .. } => ErrorKind::SlippageExceeded,
            Self::ZeroOutput | Self::InvariantViolated(_) | Self::Overflow(_) => {
                ErrorKind::Arithmetic
            }
            Self::State(_) => ErrorKind::Storage,
        }
    }
}

/// Failures raised by the payment router before the pricing engine is reached.
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("nonce {0} already used")]
    NonceUsed(Nonce),
    #[error("payment below issuer floor (minimum={minimum}, amount={amount})")]
    BelowFloor { minimum: u64, amount: u64 },
}

impl PaymentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NonceUsed(_) => ErrorKind::StateConflict,
            Self::BelowFloor { .. } => ErrorKind::InvalidInput,
        }
    }
}

/// Any failure of a public operation. No state is written when one is returned.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Payment(#[from] PaymentError),
    #[error(transparent)]
    Curve(#[from] CurveError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Payment(err) => err.kind(),
            Self::Curve(err) => err.kind(),
        }
    }

    /// Whether the router rejected the call (retry with a fresh nonce or larger amount) rather
    /// than the pricing engine (quote moved, curve closed, funds short).
    pub fn is_router(&self) -> bool {
        matches!(self, Self::Payment(_))
    }
}
