use super::*;
use crate::error::PaymentError;

impl<'a, S: State, R: IssuerRegistry> Layer<'a, S, R> {
    // === Payment Router Handlers ===

    pub(crate) async fn pay_via_curve(
        &mut self,
        payer: &PublicKey,
        curve_id: u64,
        amount_in: u64,
        nonce: &Nonce,
        min_tokens_out: u64,
    ) -> Result<Receipt, Error> {
        if self.receipt(nonce).await?.is_some() {
            return Err(PaymentError::NonceUsed(*nonce).into());
        }

        let curve = self.curve(curve_id).await?;
        if let Some(minimum) = self.registry.min_price(&curve.issuer) {
            if amount_in < minimum {
                return Err(PaymentError::BelowFloor {
                    minimum,
                    amount: amount_in,
                }
                .into());
            }
        }

        let outcome = self.buy(payer, curve_id, amount_in, min_tokens_out).await?;
        let receipt = Receipt {
            payer: payer.clone(),
            curve_id,
            amount_in,
            tokens_out: outcome.tokens_out,
            fee: outcome.fee,
            timestamp: self.now,
        };

        let mut stats = self.payment_stats().await?;
        stats.payment_count = stats
            .payment_count
            .checked_add(1)
            .ok_or(CurveError::Overflow("payment count"))?;
        stats.volume_total = stats
            .volume_total
            .checked_add(amount_in)
            .ok_or(CurveError::Overflow("payment volume"))?;

        self.insert(Key::Receipt(*nonce), Value::Receipt(receipt.clone()));
        self.insert(Key::PaymentStats, Value::PaymentStats(stats));

        tracing::info!(
            payer = ?payer,
            curve_id,
            nonce = %nonce,
            amount_in,
            tokens_out = outcome.tokens_out,
            payment_count = stats.payment_count,
            "payment recorded"
        );
        self.emit(Event::PaymentRecorded {
            nonce: *nonce,
            receipt: receipt.clone(),
        });

        Ok(receipt)
    }
}
