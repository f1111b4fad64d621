//! Bonding-curve market types.
//!
//! Defines curve/receipt/account state and constants shared by the execution layer and hosts.

mod codec;
mod constants;
mod curve;
mod payment;

pub use codec::{read_string, string_encode_size, write_string};
pub use constants::*;
pub use curve::*;
pub use payment::*;
