use crate::market::{
    read_string, string_encode_size, write_string, Account, Curve, CurveDefaults, Nonce,
    PaymentStats, Receipt, MAX_RAW_LABEL_LENGTH,
};
use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, Write};
use commonware_cryptography::ed25519::PublicKey;

/// An operation submitted by a caller.
///
/// The caller identity is supplied by the host alongside the instruction (authentication happens
/// before execution).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    // Curve lifecycle (tags 0-4)
    Launch {
        name: String,
        symbol: String,
    },
    Buy {
        curve_id: u64,
        amount_in: u64,
        min_tokens_out: u64,
    },
    Sell {
        curve_id: u64,
        token_amount: u64,
        min_amount_out: u64,
    },
    Transfer {
        curve_id: u64,
        amount: u64,
        recipient: PublicKey,
    },
    Graduate {
        curve_id: u64,
    },

    // Payment router (tag 5)
    PayViaCurve {
        curve_id: u64,
        amount_in: u64,
        nonce: Nonce,
        min_tokens_out: u64,
    },

    // Administration (tag 6)
    SetDefaults {
        defaults: CurveDefaults,
    },
}

impl Write for Instruction {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Launch { name, symbol } => {
                0u8.write(writer);
                write_string(name, writer);
                write_string(symbol, writer);
            }
            Self::Buy {
                curve_id,
                amount_in,
                min_tokens_out,
            } => {
                1u8.write(writer);
                curve_id.write(writer);
                amount_in.write(writer);
                min_tokens_out.write(writer);
            }
            Self::Sell {
                curve_id,
                token_amount,
                min_amount_out,
            } => {
                2u8.write(writer);
                curve_id.write(writer);
                token_amount.write(writer);
                min_amount_out.write(writer);
            }
            Self::Transfer {
                curve_id,
                amount,
                recipient,
            } => {
                3u8.write(writer);
                curve_id.write(writer);
                amount.write(writer);
                recipient.write(writer);
            }
            Self::Graduate { curve_id } => {
                4u8.write(writer);
                curve_id.write(writer);
            }
            Self::PayViaCurve {
                curve_id,
                amount_in,
                nonce,
                min_tokens_out,
            } => {
                5u8.write(writer);
                curve_id.write(writer);
                amount_in.write(writer);
                nonce.write(writer);
                min_tokens_out.write(writer);
            }
            Self::SetDefaults { defaults } => {
                6u8.write(writer);
                defaults.write(writer);
            }
        }
    }
}

impl Read for Instruction {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let instruction = match u8::read(reader)? {
            0 => Self::Launch {
                name: read_string(reader, MAX_RAW_LABEL_LENGTH)?,
                symbol: read_string(reader, MAX_RAW_LABEL_LENGTH)?,
            },
            1 => Self::Buy {
                curve_id: u64::read(reader)?,
                amount_in: u64::read(reader)?,
                min_tokens_out: u64::read(reader)?,
            },
            2 => Self::Sell {
                curve_id: u64::read(reader)?,
                token_amount: u64::read(reader)?,
                min_amount_out: u64::read(reader)?,
            },
            3 => Self::Transfer {
                curve_id: u64::read(reader)?,
                amount: u64::read(reader)?,
                recipient: PublicKey::read(reader)?,
            },
            4 => Self::Graduate {
                curve_id: u64::read(reader)?,
            },
            5 => Self::PayViaCurve {
                curve_id: u64::read(reader)?,
                amount_in: u64::read(reader)?,
                nonce: Nonce::read(reader)?,
                min_tokens_out: u64::read(reader)?,
            },
            6 => Self::SetDefaults {
                defaults: CurveDefaults::read(reader)?,
            },
            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(instruction)
    }
}

impl EncodeSize for Instruction {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Launch { name, symbol } => {
                    string_encode_size(name) + string_encode_size(symbol)
                }
                Self::Buy { .. } | Self::Sell { .. } => u64::SIZE * 3,
                Self::Transfer { .. } => u64::SIZE * 2 + PublicKey::SIZE,
                Self::Graduate { .. } => u64::SIZE,
                Self::PayViaCurve { .. } => u64::SIZE * 3 + Nonce::SIZE,
                Self::SetDefaults { .. } => CurveDefaults::SIZE,
            }
    }
}

#[derive(Hash, Eq, PartialEq, Ord, PartialOrd, Clone, Debug)]
pub enum Key {
    /// Native settlement account (tag 0)
    Account(PublicKey),

    // Curve store (tags 10-13)
    Defaults,
    CurveCount,
    Curve(u64),
    IssuerCurve(PublicKey),

    // Balance ledger (tag 14)
    Balance(u64, PublicKey),

    // Receipt store (tags 15-16)
    Receipt(Nonce),
    PaymentStats,
}

impl Write for Key {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Account(pk) => {
                0u8.write(writer);
                pk.write(writer);
            }

            Self::Defaults => 10u8.write(writer),
            Self::CurveCount => 11u8.write(writer),
            Self::Curve(id) => {
                12u8.write(writer);
                id.write(writer);
            }
            Self::IssuerCurve(pk) => {
                13u8.write(writer);
                pk.write(writer);
            }

            Self::Balance(curve_id, holder) => {
                14u8.write(writer);
                curve_id.write(writer);
                holder.write(writer);
            }

            Self::Receipt(nonce) => {
                15u8.write(writer);
                nonce.write(writer);
            }
            Self::PaymentStats => 16u8.write(writer),
        }
    }
}

impl Read for Key {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let key = match u8::read(reader)? {
            0 => Self::Account(PublicKey::read(reader)?),

            10 => Self::Defaults,
            11 => Self::CurveCount,
            12 => Self::Curve(u64::read(reader)?),
            13 => Self::IssuerCurve(PublicKey::read(reader)?),

            14 => Self::Balance(u64::read(reader)?, PublicKey::read(reader)?),

            15 => Self::Receipt(Nonce::read(reader)?),
            16 => Self::PaymentStats,

            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(key)
    }
}

impl EncodeSize for Key {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Account(_) => PublicKey::SIZE,
                Self::Defaults | Self::CurveCount | Self::PaymentStats => 0,
                Self::Curve(_) => u64::SIZE,
                Self::IssuerCurve(_) => PublicKey::SIZE,
                Self::Balance(_, _) => u64::SIZE + PublicKey::SIZE,
                Self::Receipt(_) => Nonce::SIZE,
            }
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Value {
    /// Native settlement account (tag 0)
    Account(Account),

    // Curve store (tags 10-13)
    Defaults(CurveDefaults),
    CurveCount(u64),
    Curve(Curve),
    CurveId(u64),

    // Balance ledger (tag 14)
    Balance(u64),

    // Receipt store (tags 15-16)
    Receipt(Receipt),
    PaymentStats(PaymentStats),
}

impl Write for Value {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Account(account) => {
                0u8.write(writer);
                account.write(writer);
            }
            Self::Defaults(defaults) => {
                10u8.write(writer);
                defaults.write(writer);
            }
            Self::CurveCount(count) => {
                11u8.write(writer);
                count.write(writer);
            }
            Self::Curve(curve) => {
                12u8.write(writer);
                curve.write(writer);
            }
            Self::CurveId(id) => {
                13u8.write(writer);
                id.write(writer);
            }
            Self::Balance(amount) => {
                14u8.write(writer);
                amount.write(writer);
            }
            Self::Receipt(receipt) => {
                15u8.write(writer);
                receipt.write(writer);
            }
            Self::PaymentStats(stats) => {
                16u8.write(writer);
                stats.write(writer);
            }
        }
    }
}

impl Read for Value {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = match u8::read(reader)? {
            0 => Self::Account(Account::read(reader)?),
            10 => Self::Defaults(CurveDefaults::read(reader)?),
            11 => Self::CurveCount(u64::read(reader)?),
            12 => Self::Curve(Curve::read(reader)?),
            13 => Self::CurveId(u64::read(reader)?),
            14 => Self::Balance(u64::read(reader)?),
            15 => Self::Receipt(Receipt::read(reader)?),
            16 => Self::PaymentStats(PaymentStats::read(reader)?),
            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(value)
    }
}

impl EncodeSize for Value {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Account(_) => Account::SIZE,
                Self::Defaults(_) => CurveDefaults::SIZE,
                Self::CurveCount(_) | Self::CurveId(_) | Self::Balance(_) => u64::SIZE,
                Self::Curve(curve) => curve.encode_size(),
                Self::Receipt(_) => Receipt::SIZE,
                Self::PaymentStats(_) => PaymentStats::SIZE,
            }
    }
}

/// Observable outcome of a committed operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    CurveLaunched {
        curve_id: u64,
        issuer: PublicKey,
        name: String,
        symbol: String,
    },
    TokensBought {
        curve_id: u64,
        buyer: PublicKey,
        amount_in: u64,
        tokens_out: u64,
        fee: u64,
        real_reserve: u64,
        tokens_sold: u64,
    },
    TokensSold {
        curve_id: u64,
        seller: PublicKey,
        token_amount: u64,
        amount_out: u64,
        fee: u64,
        real_reserve: u64,
        tokens_sold: u64,
    },
    TokensTransferred {
        curve_id: u64,
        from: PublicKey,
        to: PublicKey,
        amount: u64,
    },
    CurveGraduated {
        curve_id: u64,
        issuer_share: u64,
        protocol_share: u64,
        real_reserve: u64,
    },
    PaymentRecorded {
        nonce: Nonce,
        receipt: Receipt,
    },
    DefaultsUpdated {
        defaults: CurveDefaults,
    },
    NativeCredited {
        account: PublicKey,
        amount: u64,
        balance: u64,
    },
}
