//! Curvepay execution layer.
//!
//! This crate prices issuer tokens on constant-product bonding curves and routes nonce-keyed
//! payments through them. Every public operation on [`Engine`] is one atomic transaction: it is
//! staged in a [`Layer`], and its writes reach the [`State`] only when every check has passed.
//!
//! ## Determinism requirements
//! - Time comes from the runtime [`commonware_runtime::Clock`], never from the host OS directly.
//! - All arithmetic is integer and checked; every division floors.
//! - Ledger writes are applied in key order.
//!
//! ## Minimal payment (example)
//! ```rust,ignore
//! # #[cfg(feature = "mocks")]
//! # {
//! use curvepay_execution::mocks::{create_account_keypair, create_engine, test_config};
//! use curvepay_types::market::Nonce;
//!
//! # async fn example<E: commonware_runtime::Clock>(context: E) -> anyhow::Result<()> {
//! let (_, issuer) = create_account_keypair(1);
//! let (_, payer) = create_account_keypair(2);
//! let mut engine = create_engine(context, test_config(), &[(issuer.clone(), None)]);
//!
//! let curve_id = engine.launch(&issuer, "Alpha", "ALP").await?;
//! engine.credit(&payer, 1_000_000).await?;
//! let receipt = engine
//!     .pay_via_curve(&payer, curve_id, 1_000_000, &Nonce::new([7; 16]), 0)
//!     .await?;
//! assert_eq!(engine.verify_payment(&Nonce::new([7; 16])).await?, Some(receipt));
//! # Ok(())
//! # }
//! # }
//! ```

pub mod amm;
pub mod engine;
pub mod error;
pub mod registry;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

#[cfg(test)]
mod engine_tests;

mod layer;

mod state;

pub use amm::{BuyQuote, SellQuote};
pub use engine::{Engine, EngineConfig};
pub use error::{CurveError, Error, ErrorKind, PaymentError};
pub use layer::{BuyOutcome, GraduationOutcome, Layer, SellOutcome};
pub use registry::{IssuerRegistry, StaticRegistry};
pub use state::{native_balance, Memory, State, Status};
