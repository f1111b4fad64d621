use super::{
    read_string, string_encode_size, write_string, BASIS_POINTS_SCALE, DEFAULT_FEE_RATE_BPS,
    DEFAULT_GRADUATION_THRESHOLD, DEFAULT_ISSUER_FEE_SHARE_BPS, DEFAULT_TOTAL_SUPPLY,
    DEFAULT_VIRTUAL_RESERVE, MAX_FEE_RATE_BPS, MAX_NAME_LENGTH, MAX_SYMBOL_LENGTH,
};
use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, Write};
use commonware_cryptography::ed25519::PublicKey;
use thiserror::Error as ThisError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ThisError)]
pub enum DefaultsError {
    #[error("{field} must be > 0")]
    Zero { field: &'static str },
    #[error("fee rate too high (got={got}, max={max})")]
    FeeRateTooHigh { got: u16, max: u16 },
    #[error("issuer fee share out of range (got={got}, max={max})")]
    IssuerShareOutOfRange { got: u16, max: u64 },
}

/// Launch parameters snapshotted into every new curve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurveDefaults {
    pub total_supply: u64,
    pub virtual_reserve: u64,
    pub graduation_threshold: u64,
    pub fee_rate_bps: u16,
    pub issuer_fee_share_bps: u16,
}

impl Default for CurveDefaults {
    fn default() -> Self {
        Self {
            total_supply: DEFAULT_TOTAL_SUPPLY,
            virtual_reserve: DEFAULT_VIRTUAL_RESERVE,
            graduation_threshold: DEFAULT_GRADUATION_THRESHOLD,
            fee_rate_bps: DEFAULT_FEE_RATE_BPS,
            issuer_fee_share_bps: DEFAULT_ISSUER_FEE_SHARE_BPS,
        }
    }
}

impl CurveDefaults {
    pub fn validate(&self) -> Result<(), DefaultsError> {
        if self.total_supply == 0 {
            return Err(DefaultsError::Zero {
                field: "total_supply",
            });
        }
        if self.virtual_reserve == 0 {
            return Err(DefaultsError::Zero {
                field: "virtual_reserve",
            });
        }
        if self.graduation_threshold == 0 {
            return Err(DefaultsError::Zero {
                field: "graduation_threshold",
            });
        }
        if self.fee_rate_bps > MAX_FEE_RATE_BPS {
            return Err(DefaultsError::FeeRateTooHigh {
                got: self.fee_rate_bps,
                max: MAX_FEE_RATE_BPS,
            });
        }
        if self.issuer_fee_share_bps as u64 > BASIS_POINTS_SCALE {
            return Err(DefaultsError::IssuerShareOutOfRange {
                got: self.issuer_fee_share_bps,
                max: BASIS_POINTS_SCALE,
            });
        }
        Ok(())
    }
}

impl Write for CurveDefaults {
    fn write(&self, writer: &mut impl BufMut) {
        self.total_supply.write(writer);
        self.virtual_reserve.write(writer);
        self.graduation_threshold.write(writer);
        self.fee_rate_bps.write(writer);
        self.issuer_fee_share_bps.write(writer);
    }
}

impl Read for CurveDefaults {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            total_supply: u64::read(reader)?,
            virtual_reserve: u64::read(reader)?,
            graduation_threshold: u64::read(reader)?,
            fee_rate_bps: u16::read(reader)?,
            issuer_fee_share_bps: u16::read(reader)?,
        })
    }
}

impl FixedSize for CurveDefaults {
    const SIZE: usize = u64::SIZE * 3 + u16::SIZE * 2;
}

/// A bonding curve owned by a single issuer.
///
/// Everything except `real_reserve`, `tokens_sold`, `accrued_fees` and `graduated` is fixed at
/// launch. Once `graduated` is set the record is never written again.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Curve {
    pub id: u64,
    pub issuer: PublicKey,
    pub name: String,
    pub symbol: String,

    pub total_supply: u64,
    pub virtual_reserve: u64,
    /// `virtual_reserve * total_supply`.
    pub invariant_k: u128,

    pub real_reserve: u64,
    pub tokens_sold: u64,

    pub graduation_threshold: u64,
    pub fee_rate_bps: u16,
    pub issuer_fee_share_bps: u16,
    pub accrued_fees: u64,
    pub graduated: bool,

    pub created_at: u64,
}

impl Curve {
    pub fn new(
        id: u64,
        issuer: PublicKey,
        name: String,
        symbol: String,
        defaults: &CurveDefaults,
        created_at: u64,
    ) -> Self {
        Self {
            id,
            issuer,
            name,
            symbol,
            total_supply: defaults.total_supply,
            virtual_reserve: defaults.virtual_reserve,
            invariant_k: defaults.virtual_reserve as u128 * defaults.total_supply as u128,
            real_reserve: 0,
            tokens_sold: 0,
            graduation_threshold: defaults.graduation_threshold,
            fee_rate_bps: defaults.fee_rate_bps,
            issuer_fee_share_bps: defaults.issuer_fee_share_bps,
            accrued_fees: 0,
            graduated: false,
            created_at,
        }
    }

    /// Tokens still held by the curve.
    pub fn token_reserve(&self) -> u64 {
        self.total_supply.saturating_sub(self.tokens_sold)
    }

    /// Virtual plus real value reserve.
    pub fn value_reserve(&self) -> u128 {
        self.virtual_reserve as u128 + self.real_reserve as u128
    }

    /// Native value held on behalf of the curve.
    pub fn custody(&self) -> u128 {
        self.real_reserve as u128 + self.accrued_fees as u128
    }
}

impl Write for Curve {
    fn write(&self, writer: &mut impl BufMut) {
        self.id.write(writer);
        self.issuer.write(writer);
        write_string(&self.name, writer);
        write_string(&self.symbol, writer);
        self.total_supply.write(writer);
        self.virtual_reserve.write(writer);
        writer.put_u128(self.invariant_k);
        self.real_reserve.write(writer);
        self.tokens_sold.write(writer);
        self.graduation_threshold.write(writer);
        self.fee_rate_bps.write(writer);
        self.issuer_fee_share_bps.write(writer);
        self.accrued_fees.write(writer);
        self.graduated.write(writer);
        self.created_at.write(writer);
    }
}

impl Read for Curve {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let id = u64::read(reader)?;
        let issuer = PublicKey::read(reader)?;
        let name = read_string(reader, MAX_NAME_LENGTH)?;
        let symbol = read_string(reader, MAX_SYMBOL_LENGTH)?;
        let total_supply = u64::read(reader)?;
        let virtual_reserve = u64::read(reader)?;
        if reader.remaining() < 16 {
            return Err(Error::EndOfBuffer);
        }
        let invariant_k = reader.get_u128();
        if invariant_k != virtual_reserve as u128 * total_supply as u128 {
            return Err(Error::Invalid("Curve", "invariant mismatch"));
        }
        let real_reserve = u64::read(reader)?;
        let tokens_sold = u64::read(reader)?;
        if tokens_sold > total_supply {
            return Err(Error::Invalid("Curve", "tokens sold exceed supply"));
        }

        Ok(Self {
            id,
            issuer,
            name,
            symbol,
            total_supply,
            virtual_reserve,
            invariant_k,
            real_reserve,
            tokens_sold,
            graduation_threshold: u64::read(reader)?,
            fee_rate_bps: u16::read(reader)?,
            issuer_fee_share_bps: u16::read(reader)?,
            accrued_fees: u64::read(reader)?,
            graduated: bool::read(reader)?,
            created_at: u64::read(reader)?,
        })
    }
}

impl EncodeSize for Curve {
    fn encode_size(&self) -> usize {
        u64::SIZE
            + PublicKey::SIZE
            + string_encode_size(&self.name)
            + string_encode_size(&self.symbol)
            + u64::SIZE * 2
            + 16
            + u64::SIZE * 3
            + u16::SIZE * 2
            + u64::SIZE
            + bool::SIZE
            + u64::SIZE
    }
}
