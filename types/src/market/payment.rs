use super::NONCE_LENGTH;
use bytes::{Buf, BufMut};
use commonware_codec::{Error, FixedSize, Read, ReadExt, Write};
use commonware_cryptography::ed25519::PublicKey;
use commonware_utils::hex;
use std::fmt;

/// Caller-supplied idempotency key for a payment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Nonce([u8; NONCE_LENGTH]);

impl Nonce {
    pub const fn new(bytes: [u8; NONCE_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; NONCE_LENGTH] {
        &self.0
    }

    /// Parses a nonce from exactly `NONCE_LENGTH` bytes.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let bytes: [u8; NONCE_LENGTH] = bytes.try_into().ok()?;
        Some(Self(bytes))
    }
}

impl From<[u8; NONCE_LENGTH]> for Nonce {
    fn from(bytes: [u8; NONCE_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex(&self.0))
    }
}

impl Write for Nonce {
    fn write(&self, writer: &mut impl BufMut) {
        writer.put_slice(&self.0);
    }
}

impl Read for Nonce {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        if reader.remaining() < NONCE_LENGTH {
            return Err(Error::EndOfBuffer);
        }
        let mut bytes = [0u8; NONCE_LENGTH];
        reader.copy_to_slice(&mut bytes);
        Ok(Self(bytes))
    }
}

impl FixedSize for Nonce {
    const SIZE: usize = NONCE_LENGTH;
}

/// Proof that a payment was routed through a curve. Written once, never updated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    pub payer: PublicKey,
    pub curve_id: u64,
    pub amount_in: u64,
    pub tokens_out: u64,
    pub fee: u64,
    pub timestamp: u64,
}

impl Write for Receipt {
    fn write(&self, writer: &mut impl BufMut) {
        self.payer.write(writer);
        self.curve_id.write(writer);
        self.amount_in.write(writer);
        self.tokens_out.write(writer);
        self.fee.write(writer);
        self.timestamp.write(writer);
    }
}

impl Read for Receipt {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            payer: PublicKey::read(reader)?,
            curve_id: u64::read(reader)?,
            amount_in: u64::read(reader)?,
            tokens_out: u64::read(reader)?,
            fee: u64::read(reader)?,
            timestamp: u64::read(reader)?,
        })
    }
}

impl FixedSize for Receipt {
    const SIZE: usize = PublicKey::SIZE + u64::SIZE * 5;
}

/// Router-wide counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PaymentStats {
    pub payment_count: u64,
    pub volume_total: u64,
}

impl Write for PaymentStats {
    fn write(&self, writer: &mut impl BufMut) {
        self.payment_count.write(writer);
        self.volume_total.write(writer);
    }
}

impl Read for PaymentStats {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            payment_count: u64::read(reader)?,
            volume_total: u64::read(reader)?,
        })
    }
}

impl FixedSize for PaymentStats {
    const SIZE: usize = u64::SIZE * 2;
}

/// Host-native value held by an account on the settlement rail.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Account {
    pub balance: u64,
}

impl Write for Account {
    fn write(&self, writer: &mut impl BufMut) {
        self.balance.write(writer);
    }
}

impl Read for Account {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            balance: u64::read(reader)?,
        })
    }
}

impl FixedSize for Account {
    const SIZE: usize = u64::SIZE;
}
