use super::*;

impl<'a, S: State, R: IssuerRegistry> Layer<'a, S, R> {
    // === Admin / Settlement Handlers ===

    pub(crate) async fn set_defaults(
        &mut self,
        caller: &PublicKey,
        defaults: CurveDefaults,
    ) -> Result<(), CurveError> {
        if *caller != self.config.admin {
            return Err(CurveError::NotAdmin);
        }
        defaults.validate()?;

        tracing::info!(
            total_supply = defaults.total_supply,
            virtual_reserve = defaults.virtual_reserve,
            graduation_threshold = defaults.graduation_threshold,
            fee_rate_bps = defaults.fee_rate_bps,
            issuer_fee_share_bps = defaults.issuer_fee_share_bps,
            "curve defaults updated"
        );
        self.insert(Key::Defaults, Value::Defaults(defaults));
        self.emit(Event::DefaultsUpdated { defaults });
        Ok(())
    }

    /// Inbound settlement leg: value arriving from outside the engine.
    pub(crate) async fn credit(
        &mut self,
        account: &PublicKey,
        amount: u64,
    ) -> Result<u64, CurveError> {
        if amount == 0 {
            return Err(CurveError::ZeroAmount);
        }
        let balance = self.credit_native(account, amount).await?;

        tracing::info!(account = ?account, amount, balance, "native account credited");
        self.emit(Event::NativeCredited {
            account: account.clone(),
            amount,
            balance,
        });
        Ok(balance)
    }
}
