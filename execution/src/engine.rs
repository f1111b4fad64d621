use crate::{
    amm::{self, BuyQuote, SellQuote},
    error::{CurveError, Error},
    layer::{BuyOutcome, GraduationOutcome, Layer, SellOutcome},
    registry::IssuerRegistry,
    state::{State, Status},
};
use commonware_cryptography::ed25519::PublicKey;
use commonware_runtime::Clock;
use curvepay_types::{
    execution::{Event, Instruction, Key},
    market::{Curve, CurveDefaults, Nonce, PaymentStats, Receipt},
};
use std::time::SystemTime;
use tracing::{debug, warn};

/// Protocol-level settings fixed when the engine starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Only account allowed to replace the launch defaults.
    pub admin: PublicKey,
    /// Receives the protocol share of every graduation payout.
    pub protocol_treasury: PublicKey,
    /// Launch parameters used until the admin stores new ones.
    pub defaults: CurveDefaults,
}

impl EngineConfig {
    pub fn new(admin: PublicKey, protocol_treasury: PublicKey) -> Self {
        Self {
            admin,
            protocol_treasury,
            defaults: CurveDefaults::default(),
        }
    }

    pub fn with_defaults(mut self, defaults: CurveDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn validate(&self) -> Result<(), CurveError> {
        self.defaults.validate()?;
        Ok(())
    }
}

fn system_time_ms(now: SystemTime) -> u64 {
    match now.duration_since(SystemTime::UNIX_EPOCH) {
        Ok(duration) => duration.as_millis() as u64,
        Err(_) => 0,
    }
}

/// Curve exchange and payment router over a keyed state.
///
/// Every mutating call runs in its own [`Layer`]: checks and writes are staged, and only a call
/// that succeeds end to end reaches `S`. Exclusive access is `&mut self`; hosts that share an
/// engine across tasks wrap it in their own lock.
pub struct Engine<E: Clock, S: State, R: IssuerRegistry> {
    context: E,
    state: S,
    registry: R,
    config: EngineConfig,
}

impl<E: Clock, S: State, R: IssuerRegistry> Engine<E, S, R> {
    pub fn new(context: E, state: S, registry: R, config: EngineConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            context,
            state,
            registry,
            config,
        })
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn into_state(self) -> S {
        self.state
    }

    /// Milliseconds since the Unix epoch, as seen by the runtime clock.
    pub fn now(&self) -> u64 {
        system_time_ms(self.context.current())
    }

    fn layer(&self) -> Layer<'_, S, R> {
        Layer::new(&self.state, &self.registry, &self.config, self.now())
    }

    async fn finish<T>(
        &mut self,
        operation: &'static str,
        staged: Result<T, Error>,
        changes: Vec<(Key, Status)>,
        events: Vec<Event>,
    ) -> Result<(T, Vec<Event>), Error> {
        let value = match staged {
            Ok(value) => value,
            Err(err) => {
                debug!(operation, kind = ?err.kind(), %err, "operation rejected");
                return Err(err);
            }
        };
        if let Err(err) = self.state.apply(changes).await {
            warn!(operation, ?err, "failed to apply staged changes");
            return Err(CurveError::State(err).into());
        }
        Ok((value, events))
    }

    // === Curve Store / Pricing ===

    pub async fn launch(
        &mut self,
        issuer: &PublicKey,
        name: &str,
        symbol: &str,
    ) -> Result<u64, Error> {
        let mut layer = self.layer();
        let staged = layer.launch(issuer, name, symbol).await.map_err(Error::from);
        let (changes, events) = layer.commit();
        Ok(self.finish("launch", staged, changes, events).await?.0)
    }

    pub async fn buy(
        &mut self,
        buyer: &PublicKey,
        curve_id: u64,
        amount_in: u64,
        min_tokens_out: u64,
    ) -> Result<BuyOutcome, Error> {
        let mut layer = self.layer();
        let staged = layer
            .buy(buyer, curve_id, amount_in, min_tokens_out)
            .await
            .map_err(Error::from);
        let (changes, events) = layer.commit();
        Ok(self.finish("buy", staged, changes, events).await?.0)
    }

    pub async fn sell(
        &mut self,
        seller: &PublicKey,
        curve_id: u64,
        token_amount: u64,
        min_amount_out: u64,
    ) -> Result<SellOutcome, Error> {
        let mut layer = self.layer();
        let staged = layer
            .sell(seller, curve_id, token_amount, min_amount_out)
            .await
            .map_err(Error::from);
        let (changes, events) = layer.commit();
        Ok(self.finish("sell", staged, changes, events).await?.0)
    }

    pub async fn transfer(
        &mut self,
        from: &PublicKey,
        curve_id: u64,
        amount: u64,
        to: &PublicKey,
    ) -> Result<(), Error> {
        let mut layer = self.layer();
        let staged = layer
            .transfer(from, curve_id, amount, to)
            .await
            .map_err(Error::from);
        let (changes, events) = layer.commit();
        Ok(self.finish("transfer", staged, changes, events).await?.0)
    }

    // === Fee & Graduation ===

    pub async fn graduate(&mut self, curve_id: u64) -> Result<GraduationOutcome, Error> {
        let mut layer = self.layer();
        let staged = layer.graduate(curve_id).await.map_err(Error::from);
        let (changes, events) = layer.commit();
        Ok(self.finish("graduate", staged, changes, events).await?.0)
    }

    // === Payment Router ===

    pub async fn pay_via_curve(
        &mut self,
        payer: &PublicKey,
        curve_id: u64,
        amount_in: u64,
        nonce: &Nonce,
        min_tokens_out: u64,
    ) -> Result<Receipt, Error> {
        let mut layer = self.layer();
        let staged = layer
            .pay_via_curve(payer, curve_id, amount_in, nonce, min_tokens_out)
            .await;
        let (changes, events) = layer.commit();
        Ok(self.finish("pay_via_curve", staged, changes, events).await?.0)
    }

    pub async fn verify_payment(&self, nonce: &Nonce) -> Result<Option<Receipt>, Error> {
        Ok(self.layer().receipt(nonce).await?)
    }

    pub async fn is_nonce_available(&self, nonce: &Nonce) -> Result<bool, Error> {
        Ok(self.verify_payment(nonce).await?.is_none())
    }

    pub async fn payment_stats(&self) -> Result<PaymentStats, Error> {
        Ok(self.layer().payment_stats().await?)
    }

    // === Admin / Settlement ===

    pub async fn set_defaults(
        &mut self,
        caller: &PublicKey,
        defaults: CurveDefaults,
    ) -> Result<(), Error> {
        let mut layer = self.layer();
        let staged = layer
            .set_defaults(caller, defaults)
            .await
            .map_err(Error::from);
        let (changes, events) = layer.commit();
        Ok(self.finish("set_defaults", staged, changes, events).await?.0)
    }

    /// Credits value that arrived from outside the engine; returns the new native balance.
    pub async fn credit(&mut self, account: &PublicKey, amount: u64) -> Result<u64, Error> {
        let mut layer = self.layer();
        let staged = layer.credit(account, amount).await.map_err(Error::from);
        let (changes, events) = layer.commit();
        Ok(self.finish("credit", staged, changes, events).await?.0)
    }

    /// Runs a decoded instruction for `caller` and returns the events it produced.
    pub async fn execute(
        &mut self,
        caller: &PublicKey,
        instruction: &Instruction,
    ) -> Result<Vec<Event>, Error> {
        let mut layer = self.layer();
        let staged = layer.apply(caller, instruction).await;
        let (changes, events) = layer.commit();
        Ok(self.finish("execute", staged, changes, events).await?.1)
    }

    // === Queries ===

    pub async fn defaults(&self) -> Result<CurveDefaults, Error> {
        Ok(self.layer().defaults().await?)
    }

    pub async fn curve(&self, curve_id: u64) -> Result<Curve, Error> {
        Ok(self.layer().curve(curve_id).await?)
    }

    pub async fn curve_of(&self, issuer: &PublicKey) -> Result<Option<u64>, Error> {
        Ok(self.layer().curve_of(issuer).await?)
    }

    pub async fn balance(&self, curve_id: u64, holder: &PublicKey) -> Result<u64, Error> {
        Ok(self.layer().balance(curve_id, holder).await?)
    }

    pub async fn native_balance(&self, account: &PublicKey) -> Result<u64, Error> {
        Ok(self.layer().native_balance(account).await?)
    }

    /// Spot price scaled by [`curvepay_types::market::PRICE_SCALE`].
    pub async fn price(&self, curve_id: u64) -> Result<u128, Error> {
        let curve = self.curve(curve_id).await?;
        Ok(amm::spot_price(&curve)?)
    }

    pub async fn buy_quote(&self, curve_id: u64, amount_in: u64) -> Result<BuyQuote, Error> {
        let curve = self.curve(curve_id).await?;
        Ok(amm::quote_buy(&curve, amount_in)?)
    }

    pub async fn sell_quote(&self, curve_id: u64, token_amount: u64) -> Result<SellQuote, Error> {
        let curve = self.curve(curve_id).await?;
        Ok(amm::quote_sell(&curve, token_amount)?)
    }
}
