use commonware_cryptography::{
    ed25519::{PrivateKey, PublicKey},
    Signer,
};
use commonware_utils::from_hex;
use curvepay_execution::EngineConfig;
use curvepay_types::{
    market::{CurveDefaults, DefaultsError, Nonce, NONCE_LENGTH},
    Instruction,
};
use serde::Deserialize;
use std::{fs, path::Path};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read scenario {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid scenario yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid defaults: {0}")]
    InvalidDefaults(#[from] DefaultsError),
    #[error("step {step}: nonce must be {expected} hex bytes: {value}")]
    InvalidNonce {
        step: usize,
        expected: usize,
        value: String,
    },
    #[error("issuer seed {seed} listed twice")]
    DuplicateIssuer { seed: u64 },
    #[error("{field} must be > 0 (got {value})")]
    InvalidNonZero { field: &'static str, value: u64 },
    #[error("admin and treasury must be different accounts (seed={seed})")]
    AdminIsTreasury { seed: u64 },
}

/// Scenario file as written on disk. Accounts are referenced by key seed.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioFile {
    #[serde(default = "default_admin")]
    pub admin: u64,
    #[serde(default = "default_treasury")]
    pub treasury: u64,
    #[serde(default)]
    pub defaults: Option<DefaultsFile>,
    #[serde(default)]
    pub issuers: Vec<IssuerFile>,
    #[serde(default)]
    pub funding: Vec<FundingFile>,
    #[serde(default)]
    pub steps: Vec<StepFile>,
}

fn default_admin() -> u64 {
    1_000
}

fn default_treasury() -> u64 {
    1_001
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultsFile {
    pub total_supply: Option<u64>,
    pub virtual_reserve: Option<u64>,
    pub graduation_threshold: Option<u64>,
    pub fee_rate_bps: Option<u16>,
    pub issuer_fee_share_bps: Option<u16>,
}

impl DefaultsFile {
    fn resolve(&self) -> CurveDefaults {
        let base = CurveDefaults::default();
        CurveDefaults {
            total_supply: self.total_supply.unwrap_or(base.total_supply),
            virtual_reserve: self.virtual_reserve.unwrap_or(base.virtual_reserve),
            graduation_threshold: self
                .graduation_threshold
                .unwrap_or(base.graduation_threshold),
            fee_rate_bps: self.fee_rate_bps.unwrap_or(base.fee_rate_bps),
            issuer_fee_share_bps: self
                .issuer_fee_share_bps
                .unwrap_or(base.issuer_fee_share_bps),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IssuerFile {
    pub seed: u64,
    #[serde(default)]
    pub min_price: Option<u64>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FundingFile {
    pub account: u64,
    pub amount: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StepFile {
    pub caller: u64,
    #[serde(flatten)]
    pub action: ActionFile,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ActionFile {
    Launch {
        name: String,
        symbol: String,
    },
    Buy {
        curve_id: u64,
        amount_in: u64,
        #[serde(default)]
        min_tokens_out: u64,
    },
    Sell {
        curve_id: u64,
        token_amount: u64,
        #[serde(default)]
        min_amount_out: u64,
    },
    Transfer {
        curve_id: u64,
        amount: u64,
        to: u64,
    },
    Graduate {
        curve_id: u64,
    },
    Pay {
        curve_id: u64,
        amount_in: u64,
        nonce: String,
        #[serde(default)]
        min_tokens_out: u64,
    },
    SetDefaults {
        defaults: DefaultsFile,
    },
    Credit {
        amount: u64,
    },
}

/// One resolved scenario step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    Execute {
        caller: PublicKey,
        instruction: Instruction,
    },
    Credit {
        account: PublicKey,
        amount: u64,
    },
}

/// Scenario with every seed resolved to a key and every field checked.
#[derive(Clone, Debug)]
pub struct Scenario {
    pub engine: EngineConfig,
    pub issuers: Vec<(PublicKey, Option<u64>)>,
    pub funding: Vec<(PublicKey, u64)>,
    pub steps: Vec<Step>,
}

/// Scenario accounts are ed25519 keys derived from their seed.
fn account(seed: u64) -> PublicKey {
    PrivateKey::from_seed(seed).public_key()
}

fn parse_nonce(step: usize, value: &str) -> Result<Nonce, ConfigError> {
    from_hex(value.trim())
        .and_then(|bytes| Nonce::from_slice(&bytes))
        .ok_or_else(|| ConfigError::InvalidNonce {
            step,
            expected: NONCE_LENGTH,
            value: value.to_string(),
        })
}

impl ScenarioFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn validate(self) -> Result<Scenario, ConfigError> {
        if self.admin == self.treasury {
            return Err(ConfigError::AdminIsTreasury { seed: self.admin });
        }
        let defaults = self
            .defaults
            .map(|defaults| defaults.resolve())
            .unwrap_or_default();
        defaults.validate()?;
        let engine =
            EngineConfig::new(account(self.admin), account(self.treasury)).with_defaults(defaults);

        let mut issuers = Vec::with_capacity(self.issuers.len());
        let mut seen = std::collections::BTreeSet::new();
        for issuer in &self.issuers {
            if !seen.insert(issuer.seed) {
                return Err(ConfigError::DuplicateIssuer { seed: issuer.seed });
            }
            issuers.push((account(issuer.seed), issuer.min_price));
        }

        let mut funding = Vec::with_capacity(self.funding.len());
        for entry in &self.funding {
            if entry.amount == 0 {
                return Err(ConfigError::InvalidNonZero {
                    field: "funding.amount",
                    value: entry.amount,
                });
            }
            funding.push((account(entry.account), entry.amount));
        }

        let mut steps = Vec::with_capacity(self.steps.len());
        for (index, step) in self.steps.into_iter().enumerate() {
            let caller = account(step.caller);
            let instruction = match step.action {
                ActionFile::Credit { amount } => {
                    steps.push(Step::Credit {
                        account: caller,
                        amount,
                    });
                    continue;
                }
                ActionFile::Launch { name, symbol } => Instruction::Launch { name, symbol },
                ActionFile::Buy {
                    curve_id,
                    amount_in,
                    min_tokens_out,
                } => Instruction::Buy {
                    curve_id,
                    amount_in,
                    min_tokens_out,
                },
                ActionFile::Sell {
                    curve_id,
                    token_amount,
                    min_amount_out,
                } => Instruction::Sell {
                    curve_id,
                    token_amount,
                    min_amount_out,
                },
                ActionFile::Transfer {
                    curve_id,
                    amount,
                    to,
                } => Instruction::Transfer {
                    curve_id,
                    amount,
                    recipient: account(to),
                },
                ActionFile::Graduate { curve_id } => Instruction::Graduate { curve_id },
                ActionFile::Pay {
                    curve_id,
                    amount_in,
                    nonce,
                    min_tokens_out,
                } => Instruction::PayViaCurve {
                    curve_id,
                    amount_in,
                    nonce: parse_nonce(index, &nonce)?,
                    min_tokens_out,
                },
                // Bad defaults are left for the engine to reject, like any other step.
                ActionFile::SetDefaults { defaults } => Instruction::SetDefaults {
                    defaults: defaults.resolve(),
                },
            };
            steps.push(Step::Execute {
                caller,
                instruction,
            });
        }

        Ok(Scenario {
            engine,
            issuers,
            funding,
            steps,
        })
    }
}
