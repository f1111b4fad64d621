//! Integer bonding-curve math.
//!
//! The curve prices trades against `(virtual_reserve + real_reserve) * token_reserve = k`.
//! Every division floors: buys floor the new token reserve, sells floor the new value reserve.
//! After any trade `(V + R) * T <= k` and `k - (V + R) * T < max(V + R, T)`, and a buy followed by
//! a sell of the same tokens never returns more than the net amount that went in.

use crate::error::CurveError;
use curvepay_types::market::{Curve, BASIS_POINTS_SCALE, PRICE_SCALE};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuyQuote {
    pub tokens_out: u64,
    pub fee: u64,
    pub net_in: u64,
    pub new_real_reserve: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SellQuote {
    pub amount_out: u64,
    pub fee: u64,
    pub gross_out: u64,
    pub new_real_reserve: u64,
}

/// `floor(amount * bps / 10_000)`; never exceeds `amount` for `bps <= 10_000`.
pub fn fee_for(amount: u64, bps: u16) -> u64 {
    ((amount as u128 * bps as u128) / BASIS_POINTS_SCALE as u128) as u64
}

/// Splits an accrued fee pool into `(issuer_share, protocol_share)`. The shares always sum to
/// `accrued`; the protocol absorbs the rounding dust.
pub fn split_fees(accrued: u64, issuer_share_bps: u16) -> (u64, u64) {
    let issuer_share = fee_for(accrued, issuer_share_bps).min(accrued);
    (issuer_share, accrued - issuer_share)
}

pub fn quote_buy(curve: &Curve, amount_in: u64) -> Result<BuyQuote, CurveError> {
    if curve.graduated {
        return Err(CurveError::Graduated(curve.id));
    }
    if amount_in == 0 {
        return Err(CurveError::ZeroAmount);
    }
    let token_reserve_before = curve.token_reserve();
    if token_reserve_before == 0 {
        return Err(CurveError::SoldOut(curve.id));
    }

    let fee = fee_for(amount_in, curve.fee_rate_bps);
    let net_in = amount_in - fee;
    let new_real_reserve = curve
        .real_reserve
        .checked_add(net_in)
        .ok_or(CurveError::Overflow("real reserve"))?;

    let denominator = curve.virtual_reserve as u128 + new_real_reserve as u128;
    let new_token_reserve = curve
        .invariant_k
        .checked_div(denominator)
        .ok_or(CurveError::Overflow("token reserve"))?;

    // A buy too small to move the floored reserve yields nothing.
    let tokens_out = (token_reserve_before as u128).saturating_sub(new_token_reserve) as u64;
    if tokens_out == 0 {
        return Err(CurveError::ZeroOutput);
    }

    Ok(BuyQuote {
        tokens_out,
        fee,
        net_in,
        new_real_reserve,
    })
}

pub fn quote_sell(curve: &Curve, token_amount: u64) -> Result<SellQuote, CurveError> {
    if curve.graduated {
        return Err(CurveError::Graduated(curve.id));
    }
    if token_amount == 0 {
        return Err(CurveError::ZeroAmount);
    }
    if token_amount > curve.tokens_sold {
        return Err(CurveError::InsufficientBalance {
            needed: token_amount,
            available: curve.tokens_sold,
        });
    }

    let new_token_reserve = curve.token_reserve() as u128 + token_amount as u128;
    let new_value_reserve = curve
        .invariant_k
        .checked_div(new_token_reserve)
        .ok_or(CurveError::Overflow("value reserve"))?;
    let gross_out = curve.value_reserve().saturating_sub(new_value_reserve);
    if gross_out > curve.real_reserve as u128 {
        return Err(CurveError::InsufficientReserve {
            needed: u64::try_from(gross_out).unwrap_or(u64::MAX),
            available: curve.real_reserve,
        });
    }
    let gross_out = gross_out as u64;

    let fee = fee_for(gross_out, curve.fee_rate_bps);
    let amount_out = gross_out - fee;
    if amount_out == 0 {
        return Err(CurveError::ZeroOutput);
    }

    Ok(SellQuote {
        amount_out,
        fee,
        gross_out,
        new_real_reserve: curve.real_reserve - gross_out,
    })
}

/// Spot price `(V + R) * PRICE_SCALE / T`, or zero once the curve is sold out.
pub fn spot_price(curve: &Curve) -> Result<u128, CurveError> {
    let token_reserve = curve.token_reserve();
    if token_reserve == 0 {
        return Ok(0);
    }
    curve
        .value_reserve()
        .checked_mul(PRICE_SCALE)
        .map(|scaled| scaled / token_reserve as u128)
        .ok_or(CurveError::Overflow("price"))
}

/// `k - (V + R) * T`, or `None` if the product exceeds `k`.
pub fn invariant_slack(curve: &Curve) -> Option<u128> {
    let product = curve
        .value_reserve()
        .checked_mul(curve.token_reserve() as u128)?;
    curve.invariant_k.checked_sub(product)
}

/// Whether the curve sits within the rounding bound every trade preserves.
pub fn invariant_holds(curve: &Curve) -> bool {
    match invariant_slack(curve) {
        Some(slack) => {
            let bound = curve
                .value_reserve()
                .max(curve.token_reserve() as u128)
                .max(1);
            slack < bound
        }
        None => false,
    }
}
