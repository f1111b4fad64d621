use super::*;
use crate::amm;
use curvepay_types::market::{MAX_NAME_LENGTH, MAX_SYMBOL_LENGTH};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuyOutcome {
    pub tokens_out: u64,
    pub fee: u64,
    /// Set when this buy crossed the graduation threshold and closed the curve.
    pub graduated: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SellOutcome {
    pub amount_out: u64,
    pub fee: u64,
}

impl<'a, S: State, R: IssuerRegistry> Layer<'a, S, R> {
    // === Curve Store / Pricing Handlers ===

    pub(crate) async fn launch(
        &mut self,
        issuer: &PublicKey,
        name: &str,
        symbol: &str,
    ) -> Result<u64, CurveError> {
        if !self.registry.is_registered(issuer) {
            return Err(CurveError::IssuerNotRegistered);
        }
        if let Some(existing) = self.curve_of(issuer).await? {
            return Err(CurveError::IssuerHasCurve(existing));
        }
        let name = validate_label("name", name, MAX_NAME_LENGTH)?;
        let symbol = validate_label("symbol", symbol, MAX_SYMBOL_LENGTH)?;

        let defaults = self.defaults().await?;
        let curve_id = self
            .curve_count()
            .await?
            .checked_add(1)
            .ok_or(CurveError::Overflow("curve id"))?;
        let curve = Curve::new(
            curve_id,
            issuer.clone(),
            name.clone(),
            symbol.clone(),
            &defaults,
            self.now,
        );

        tracing::info!(
            issuer = ?issuer,
            curve_id,
            symbol = %symbol,
            total_supply = curve.total_supply,
            virtual_reserve = curve.virtual_reserve,
            "curve launched"
        );

        self.insert(Key::Curve(curve_id), Value::Curve(curve));
        self.insert(Key::IssuerCurve(issuer.clone()), Value::CurveId(curve_id));
        self.insert(Key::CurveCount, Value::CurveCount(curve_id));
        self.emit(Event::CurveLaunched {
            curve_id,
            issuer: issuer.clone(),
            name,
            symbol,
        });

        Ok(curve_id)
    }

    pub(crate) async fn buy(
        &mut self,
        buyer: &PublicKey,
        curve_id: u64,
        amount_in: u64,
        min_tokens_out: u64,
    ) -> Result<BuyOutcome, CurveError> {
        let mut curve = self.curve(curve_id).await?;
        let quote = amm::quote_buy(&curve, amount_in)?;
        if quote.tokens_out < min_tokens_out {
            return Err(CurveError::Slippage {
                minimum: min_tokens_out,
                quoted: quote.tokens_out,
            });
        }

        // Settlement leg: value moves into curve custody with the ledger update.
        self.debit_native(buyer, amount_in).await?;

        curve.real_reserve = quote.new_real_reserve;
        curve.tokens_sold = curve
            .tokens_sold
            .checked_add(quote.tokens_out)
            .ok_or(CurveError::Overflow("tokens sold"))?;
        curve.accrued_fees = curve
            .accrued_fees
            .checked_add(quote.fee)
            .ok_or(CurveError::Overflow("accrued fees"))?;
        if !amm::invariant_holds(&curve) {
            return Err(CurveError::InvariantViolated(curve_id));
        }
        self.credit_tokens(curve_id, buyer, quote.tokens_out).await?;

        tracing::info!(
            buyer = ?buyer,
            curve_id,
            amount_in,
            tokens_out = quote.tokens_out,
            fee = quote.fee,
            real_reserve = curve.real_reserve,
            "tokens bought"
        );
        self.emit(Event::TokensBought {
            curve_id,
            buyer: buyer.clone(),
            amount_in,
            tokens_out: quote.tokens_out,
            fee: quote.fee,
            real_reserve: curve.real_reserve,
            tokens_sold: curve.tokens_sold,
        });

        let graduated = curve.real_reserve >= curve.graduation_threshold;
        if graduated {
            self.settle_graduation(&mut curve).await?;
        }
        self.insert(Key::Curve(curve_id), Value::Curve(curve));

        Ok(BuyOutcome {
            tokens_out: quote.tokens_out,
            fee: quote.fee,
            graduated,
        })
    }

    pub(crate) async fn sell(
        &mut self,
        seller: &PublicKey,
        curve_id: u64,
        token_amount: u64,
        min_amount_out: u64,
    ) -> Result<SellOutcome, CurveError> {
        let mut curve = self.curve(curve_id).await?;
        if curve.graduated {
            return Err(CurveError::Graduated(curve_id));
        }
        if token_amount == 0 {
            return Err(CurveError::ZeroAmount);
        }
        self.debit_tokens(curve_id, seller, token_amount).await?;

        let quote = amm::quote_sell(&curve, token_amount)?;
        if quote.amount_out < min_amount_out {
            return Err(CurveError::Slippage {
                minimum: min_amount_out,
                quoted: quote.amount_out,
            });
        }

        curve.real_reserve = quote.new_real_reserve;
        curve.tokens_sold -= token_amount;
        curve.accrued_fees = curve
            .accrued_fees
            .checked_add(quote.fee)
            .ok_or(CurveError::Overflow("accrued fees"))?;
        if !amm::invariant_holds(&curve) {
            return Err(CurveError::InvariantViolated(curve_id));
        }

        // Settlement leg: net proceeds leave curve custody; the fee stays in the pool.
        self.credit_native(seller, quote.amount_out).await?;

        tracing::info!(
            seller = ?seller,
            curve_id,
            token_amount,
            amount_out = quote.amount_out,
            fee = quote.fee,
            real_reserve = curve.real_reserve,
            "tokens sold"
        );
        self.emit(Event::TokensSold {
            curve_id,
            seller: seller.clone(),
            token_amount,
            amount_out: quote.amount_out,
            fee: quote.fee,
            real_reserve: curve.real_reserve,
            tokens_sold: curve.tokens_sold,
        });
        self.insert(Key::Curve(curve_id), Value::Curve(curve));

        Ok(SellOutcome {
            amount_out: quote.amount_out,
            fee: quote.fee,
        })
    }

    pub(crate) async fn transfer(
        &mut self,
        from: &PublicKey,
        curve_id: u64,
        amount: u64,
        to: &PublicKey,
    ) -> Result<(), CurveError> {
        // Ledger-only move; allowed after graduation since the curve record is untouched.
        self.curve(curve_id).await?;
        if amount == 0 {
            return Err(CurveError::ZeroAmount);
        }
        if from == to {
            return Err(CurveError::SelfTransfer);
        }

        self.debit_tokens(curve_id, from, amount).await?;
        self.credit_tokens(curve_id, to, amount).await?;

        tracing::info!(from = ?from, to = ?to, curve_id, amount, "tokens transferred");
        self.emit(Event::TokensTransferred {
            curve_id,
            from: from.clone(),
            to: to.clone(),
            amount,
        });
        Ok(())
    }
}
