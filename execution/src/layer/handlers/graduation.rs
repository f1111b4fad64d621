use super::*;
use crate::amm;

/// Fee pool payout made when a curve graduates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GraduationOutcome {
    pub issuer_share: u64,
    pub protocol_share: u64,
}

impl<'a, S: State, R: IssuerRegistry> Layer<'a, S, R> {
    // === Fee & Graduation Handlers ===

    pub(crate) async fn graduate(
        &mut self,
        curve_id: u64,
    ) -> Result<GraduationOutcome, CurveError> {
        let mut curve = self.curve(curve_id).await?;
        if curve.graduated {
            return Err(CurveError::Graduated(curve_id));
        }
        if curve.real_reserve < curve.graduation_threshold {
            return Err(CurveError::BelowGraduationThreshold {
                curve_id,
                reserve: curve.real_reserve,
                threshold: curve.graduation_threshold,
            });
        }

        let outcome = self.settle_graduation(&mut curve).await?;
        self.insert(Key::Curve(curve_id), Value::Curve(curve));
        Ok(outcome)
    }

    /// Pays out the fee pool and closes `curve`. The caller persists the curve record.
    pub(super) async fn settle_graduation(
        &mut self,
        curve: &mut Curve,
    ) -> Result<GraduationOutcome, CurveError> {
        let (issuer_share, protocol_share) =
            amm::split_fees(curve.accrued_fees, curve.issuer_fee_share_bps);

        if issuer_share > 0 {
            self.credit_native(&curve.issuer, issuer_share).await?;
        }
        if protocol_share > 0 {
            let treasury = self.config.protocol_treasury.clone();
            self.credit_native(&treasury, protocol_share).await?;
        }
        curve.accrued_fees = 0;
        curve.graduated = true;

        tracing::info!(
            curve_id = curve.id,
            issuer = ?curve.issuer,
            issuer_share,
            protocol_share,
            real_reserve = curve.real_reserve,
            "curve graduated"
        );
        self.emit(Event::CurveGraduated {
            curve_id: curve.id,
            issuer_share,
            protocol_share,
            real_reserve: curve.real_reserve,
        });

        Ok(GraduationOutcome {
            issuer_share,
            protocol_share,
        })
    }
}
