use anyhow::Result;
use commonware_cryptography::ed25519::PublicKey;
use curvepay_types::{
    execution::{Event, Instruction, Key, Value},
    market::{Account, Curve, CurveDefaults, Nonce, PaymentStats, Receipt},
};
use std::collections::BTreeMap;

use crate::engine::EngineConfig;
use crate::error::{CurveError, Error};
use crate::registry::IssuerRegistry;
use crate::state::{load_account, State, Status};

mod handlers;

pub use handlers::{BuyOutcome, GraduationOutcome, SellOutcome};

/// A staged transaction over `S`.
///
/// Reads fall through to the underlying state unless the key has been written in this layer;
/// writes and events only accumulate in memory. [`Layer::commit`] hands them back for the host to
/// apply, and dropping the layer discards them, so a failed operation never touches `S`.
pub struct Layer<'a, S: State, R: IssuerRegistry> {
    state: &'a S,
    registry: &'a R,
    config: &'a EngineConfig,
    now: u64,

    pending: BTreeMap<Key, Status>,
    events: Vec<Event>,
}

impl<'a, S: State, R: IssuerRegistry> Layer<'a, S, R> {
    pub fn new(state: &'a S, registry: &'a R, config: &'a EngineConfig, now: u64) -> Self {
        Self {
            state,
            registry,
            config,
            now,
            pending: BTreeMap::new(),
            events: Vec::new(),
        }
    }

    fn insert(&mut self, key: Key, value: Value) {
        self.pending.insert(key, Status::Update(value));
    }

    fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    async fn read(&self, key: Key) -> Result<Option<Value>, CurveError> {
        self.get(&key).await.map_err(CurveError::State)
    }

    pub async fn defaults(&self) -> Result<CurveDefaults, CurveError> {
        Ok(match self.read(Key::Defaults).await? {
            Some(Value::Defaults(defaults)) => defaults,
            _ => self.config.defaults,
        })
    }

    pub async fn curve(&self, curve_id: u64) -> Result<Curve, CurveError> {
        match self.read(Key::Curve(curve_id)).await? {
            Some(Value::Curve(curve)) => Ok(curve),
            _ => Err(CurveError::CurveNotFound(curve_id)),
        }
    }

    pub async fn curve_of(&self, issuer: &PublicKey) -> Result<Option<u64>, CurveError> {
        Ok(match self.read(Key::IssuerCurve(issuer.clone())).await? {
            Some(Value::CurveId(id)) => Some(id),
            _ => None,
        })
    }

    async fn curve_count(&self) -> Result<u64, CurveError> {
        Ok(match self.read(Key::CurveCount).await? {
            Some(Value::CurveCount(count)) => count,
            _ => 0,
        })
    }

    pub async fn balance(&self, curve_id: u64, holder: &PublicKey) -> Result<u64, CurveError> {
        Ok(match self.read(Key::Balance(curve_id, holder.clone())).await? {
            Some(Value::Balance(amount)) => amount,
            _ => 0,
        })
    }

    fn set_balance(&mut self, curve_id: u64, holder: &PublicKey, amount: u64) {
        let key = Key::Balance(curve_id, holder.clone());
        if amount == 0 {
            self.pending.insert(key, Status::Delete);
        } else {
            self.insert(key, Value::Balance(amount));
        }
    }

    async fn credit_tokens(
        &mut self,
        curve_id: u64,
        holder: &PublicKey,
        amount: u64,
    ) -> Result<u64, CurveError> {
        let balance = self
            .balance(curve_id, holder)
            .await?
            .checked_add(amount)
            .ok_or(CurveError::Overflow("token balance"))?;
        self.set_balance(curve_id, holder, balance);
        Ok(balance)
    }

    async fn debit_tokens(
        &mut self,
        curve_id: u64,
        holder: &PublicKey,
        amount: u64,
    ) -> Result<u64, CurveError> {
        let available = self.balance(curve_id, holder).await?;
        let Some(balance) = available.checked_sub(amount) else {
            return Err(CurveError::InsufficientBalance {
                needed: amount,
                available,
            });
        };
        self.set_balance(curve_id, holder, balance);
        Ok(balance)
    }

    pub async fn native_balance(&self, public: &PublicKey) -> Result<u64, CurveError> {
        Ok(load_account(self, public)
            .await
            .map_err(CurveError::State)?
            .balance)
    }

    async fn credit_native(&mut self, public: &PublicKey, amount: u64) -> Result<u64, CurveError> {
        let balance = self
            .native_balance(public)
            .await?
            .checked_add(amount)
            .ok_or(CurveError::Overflow("native balance"))?;
        self.insert(Key::Account(public.clone()), Value::Account(Account { balance }));
        Ok(balance)
    }

    async fn debit_native(&mut self, public: &PublicKey, amount: u64) -> Result<u64, CurveError> {
        let available = self.native_balance(public).await?;
        let Some(balance) = available.checked_sub(amount) else {
            return Err(CurveError::InsufficientNative {
                account: public.clone(),
                needed: amount,
                available,
            });
        };
        self.insert(Key::Account(public.clone()), Value::Account(Account { balance }));
        Ok(balance)
    }

    pub async fn receipt(&self, nonce: &Nonce) -> Result<Option<Receipt>, CurveError> {
        Ok(match self.read(Key::Receipt(*nonce)).await? {
            Some(Value::Receipt(receipt)) => Some(receipt),
            _ => None,
        })
    }

    pub async fn payment_stats(&self) -> Result<PaymentStats, CurveError> {
        Ok(match self.read(Key::PaymentStats).await? {
            Some(Value::PaymentStats(stats)) => stats,
            _ => PaymentStats::default(),
        })
    }

    /// Runs a decoded instruction on behalf of `caller`.
    pub async fn apply(
        &mut self,
        caller: &PublicKey,
        instruction: &Instruction,
    ) -> Result<(), Error> {
        match instruction {
            Instruction::Launch { name, symbol } => {
                self.launch(caller, name, symbol).await?;
            }
            Instruction::Buy {
                curve_id,
                amount_in,
                min_tokens_out,
            } => {
                self.buy(caller, *curve_id, *amount_in, *min_tokens_out)
                    .await?;
            }
            Instruction::Sell {
                curve_id,
                token_amount,
                min_amount_out,
            } => {
                self.sell(caller, *curve_id, *token_amount, *min_amount_out)
                    .await?;
            }
            Instruction::Transfer {
                curve_id,
                amount,
                recipient,
            } => {
                self.transfer(caller, *curve_id, *amount, recipient).await?;
            }
            Instruction::Graduate { curve_id } => {
                self.graduate(*curve_id).await?;
            }
            Instruction::PayViaCurve {
                curve_id,
                amount_in,
                nonce,
                min_tokens_out,
            } => {
                self.pay_via_curve(caller, *curve_id, *amount_in, nonce, *min_tokens_out)
                    .await?;
            }
            Instruction::SetDefaults { defaults } => {
                self.set_defaults(caller, *defaults).await?;
            }
        }
        Ok(())
    }

    pub fn commit(self) -> (Vec<(Key, Status)>, Vec<Event>) {
        (self.pending.into_iter().collect(), self.events)
    }
}

impl<'a, S: State, R: IssuerRegistry> State for Layer<'a, S, R> {
    async fn get(&self, key: &Key) -> Result<Option<Value>> {
        Ok(match self.pending.get(key) {
            Some(Status::Update(value)) => Some(value.clone()),
            Some(Status::Delete) => None,
            None => self.state.get(key).await?,
        })
    }

    async fn insert(&mut self, key: Key, value: Value) -> Result<()> {
        self.pending.insert(key, Status::Update(value));
        Ok(())
    }

    async fn delete(&mut self, key: &Key) -> Result<()> {
        self.pending.insert(key.clone(), Status::Delete);
        Ok(())
    }
}
