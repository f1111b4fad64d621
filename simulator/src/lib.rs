//! Scenario replay for curvepay.
//!
//! A scenario (see [`ScenarioFile`]) lists issuers, opening balances and a sequence of steps. The
//! [`Simulator`] runs each step as one engine call against in-memory state and reports the
//! outcome as a JSON line.

mod config;
mod report;

pub use config::{ActionFile, ConfigError, DefaultsFile, Scenario, ScenarioFile, Step};
pub use report::{event_json, receipt_json};

use anyhow::{Context, Result};
use commonware_runtime::Clock;
use curvepay_execution::{Engine, Memory, StaticRegistry};
use curvepay_types::{Event, Instruction};
use serde_json::{json, Value as Json};
use std::io::Write;
use tracing::{info, warn};

/// Totals reported once a scenario finishes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub applied: usize,
    pub rejected: usize,
}

pub struct Simulator<E: Clock> {
    engine: Engine<E, Memory, StaticRegistry>,
    strict: bool,
}

impl<E: Clock> Simulator<E> {
    /// Builds the engine and credits the opening balances.
    pub async fn new(context: E, scenario: &Scenario, strict: bool) -> Result<Self> {
        let mut registry = StaticRegistry::new();
        for (issuer, min_price) in &scenario.issuers {
            registry.register(issuer.clone(), *min_price);
        }
        let mut engine = Engine::new(context, Memory::default(), registry, scenario.engine.clone())
            .context("invalid engine config")?;
        for (account, amount) in &scenario.funding {
            engine
                .credit(account, *amount)
                .await
                .context("failed to fund account")?;
        }
        info!(
            issuers = scenario.issuers.len(),
            funded = scenario.funding.len(),
            steps = scenario.steps.len(),
            "simulator ready"
        );
        Ok(Self { engine, strict })
    }

    pub fn engine(&self) -> &Engine<E, Memory, StaticRegistry> {
        &self.engine
    }

    /// Runs every step, writing one JSON line per step and a final summary line.
    pub async fn run(&mut self, steps: &[Step], out: &mut impl Write) -> Result<Summary> {
        let mut summary = Summary::default();
        for (index, step) in steps.iter().enumerate() {
            let outcome = match step {
                Step::Execute {
                    caller,
                    instruction,
                } => self
                    .engine
                    .execute(caller, instruction)
                    .await
                    .map(|events| self.record(instruction, events)),
                Step::Credit { account, amount } => {
                    self.engine.credit(account, *amount).await.map(|balance| {
                        json!({
                            "op": "credit",
                            "events": [event_json(&Event::NativeCredited {
                                account: account.clone(),
                                amount: *amount,
                                balance,
                            })],
                        })
                    })
                }
            };

            let line = match outcome {
                Ok(mut line) => {
                    summary.applied += 1;
                    line["step"] = json!(index);
                    line["status"] = json!("ok");
                    line
                }
                Err(err) => {
                    summary.rejected += 1;
                    warn!(step = index, kind = ?err.kind(), %err, "step rejected");
                    if self.strict {
                        return Err(err).with_context(|| format!("step {index} rejected"));
                    }
                    json!({
                        "step": index,
                        "status": "rejected",
                        "kind": format!("{:?}", err.kind()),
                        "router": err.is_router(),
                        "error": err.to_string(),
                    })
                }
            };
            writeln!(out, "{line}").context("failed to write step output")?;
        }

        let stats = self.engine.payment_stats().await?;
        let line = json!({
            "summary": {
                "applied": summary.applied,
                "rejected": summary.rejected,
                "payment_count": stats.payment_count,
                "volume_total": stats.volume_total,
            }
        });
        writeln!(out, "{line}").context("failed to write summary")?;
        info!(
            applied = summary.applied,
            rejected = summary.rejected,
            "scenario finished"
        );
        Ok(summary)
    }

    fn record(&self, instruction: &Instruction, events: Vec<Event>) -> Json {
        let receipt = events.iter().find_map(|event| match event {
            Event::PaymentRecorded { receipt, .. } => Some(receipt_json(receipt)),
            _ => None,
        });
        let mut line = json!({
            "op": report::op_name(instruction),
            "events": events.iter().map(event_json).collect::<Vec<_>>(),
        });
        if let Some(receipt) = receipt {
            line["receipt"] = receipt;
        }
        line
    }
}
