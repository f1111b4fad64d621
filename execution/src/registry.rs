use commonware_cryptography::ed25519::PublicKey;
use std::collections::BTreeMap;

/// Issuer registry maintained outside the engine.
pub trait IssuerRegistry {
    /// Whether `issuer` may launch a curve.
    fn is_registered(&self, issuer: &PublicKey) -> bool;

    /// Smallest `amount_in` the router accepts for payments to `issuer`.
    fn min_price(&self, _issuer: &PublicKey) -> Option<u64> {
        None
    }
}

impl<R: IssuerRegistry + ?Sized> IssuerRegistry for &R {
    fn is_registered(&self, issuer: &PublicKey) -> bool {
        (**self).is_registered(issuer)
    }

    fn min_price(&self, issuer: &PublicKey) -> Option<u64> {
        (**self).min_price(issuer)
    }
}

/// Fixed registry, for hosts that load issuers from configuration.
#[derive(Clone, Debug, Default)]
pub struct StaticRegistry {
    issuers: BTreeMap<PublicKey, Option<u64>>,
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, issuer: PublicKey, min_price: Option<u64>) -> &mut Self {
        self.issuers.insert(issuer, min_price);
        self
    }

    pub fn deregister(&mut self, issuer: &PublicKey) -> bool {
        self.issuers.remove(issuer).is_some()
    }
}

impl IssuerRegistry for StaticRegistry {
    fn is_registered(&self, issuer: &PublicKey) -> bool {
        self.issuers.contains_key(issuer)
    }

    fn min_price(&self, issuer: &PublicKey) -> Option<u64> {
        self.issuers.get(issuer).copied().flatten()
    }
}
