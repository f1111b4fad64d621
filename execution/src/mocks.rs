use crate::{
    engine::{Engine, EngineConfig},
    registry::StaticRegistry,
    state::Memory,
};
use commonware_cryptography::{
    ed25519::{PrivateKey, PublicKey},
    Signer,
};
use commonware_math::algebra::Random;
use commonware_runtime::Clock;
use rand::{rngs::StdRng, SeedableRng};

/// Seed of the admin account in [`test_config`].
pub const ADMIN_SEED: u64 = 1_000;
/// Seed of the protocol treasury account in [`test_config`].
pub const TREASURY_SEED: u64 = 1_001;

/// Creates an account keypair for Ed25519 signatures used by users
pub fn create_account_keypair(seed: u64) -> (PrivateKey, PublicKey) {
    let mut rng = StdRng::seed_from_u64(seed);
    let private = PrivateKey::random(&mut rng);
    let public = private.public_key();
    (private, public)
}

/// Registry that knows exactly `issuers`, each with an optional payment floor.
pub fn test_registry(issuers: &[(PublicKey, Option<u64>)]) -> StaticRegistry {
    let mut registry = StaticRegistry::new();
    for (issuer, min_price) in issuers {
        registry.register(issuer.clone(), *min_price);
    }
    registry
}

/// Engine config with the stock launch defaults.
pub fn test_config() -> EngineConfig {
    let (_, admin) = create_account_keypair(ADMIN_SEED);
    let (_, treasury) = create_account_keypair(TREASURY_SEED);
    EngineConfig::new(admin, treasury)
}

/// In-memory engine over `issuers`.
pub fn create_engine<E: Clock>(
    context: E,
    config: EngineConfig,
    issuers: &[(PublicKey, Option<u64>)],
) -> Engine<E, Memory, StaticRegistry> {
    match Engine::new(context, Memory::default(), test_registry(issuers), config) {
        Ok(engine) => engine,
        Err(err) => panic!("invalid test config: {err}"),
    }
}
