//! End-to-end tests for the curve lifecycle: launch, trading, transfers, graduation and defaults.
//!
//! Rejected calls are checked against a full state snapshot so partial writes would show up.

use crate::{
    amm,
    engine::Engine,
    error::{CurveError, Error, ErrorKind},
    mocks::{create_account_keypair, create_engine, test_config, ADMIN_SEED, TREASURY_SEED},
    registry::StaticRegistry,
    state::{Memory, State},
};
use commonware_codec::{DecodeExt, Encode};
use commonware_cryptography::ed25519::PublicKey;
use commonware_runtime::{deterministic, deterministic::Runner, Runner as _};
use curvepay_types::{
    execution::{Event, Instruction, Key, Value},
    market::{Curve, CurveDefaults},
};

type TestEngine = Engine<deterministic::Context, Memory, StaticRegistry>;

const ISSUER: u64 = 1;
const BUYER: u64 = 2;
const OTHER: u64 = 3;

fn account(seed: u64) -> PublicKey {
    create_account_keypair(seed).1
}

/// Engine with `ISSUER` and `OTHER` registered and `ISSUER`'s curve launched as id 1.
async fn launched(context: deterministic::Context) -> TestEngine {
    let issuers = [(account(ISSUER), None), (account(OTHER), None)];
    let mut engine = create_engine(context, test_config(), &issuers);
    let curve_id = engine.launch(&account(ISSUER), "Alpha", "ALP").await.unwrap();
    assert_eq!(curve_id, 1);
    engine
}

#[test]
fn test_launch_assigns_sequential_ids_and_snapshots_defaults() {
    let executor = Runner::default();
    executor.start(|context| async move {
        let mut engine = launched(context).await;
        let issuer = account(ISSUER);
        assert_eq!(engine.curve_of(&issuer).await.unwrap(), Some(1));

        let curve = engine.curve(1).await.unwrap();
        let defaults = CurveDefaults::default();
        assert_eq!(curve.issuer, issuer);
        assert_eq!(curve.name, "Alpha");
        assert_eq!(curve.symbol, "ALP");
        assert_eq!(curve.total_supply, defaults.total_supply);
        assert_eq!(curve.virtual_reserve, defaults.virtual_reserve);
        assert_eq!(
            curve.invariant_k,
            defaults.total_supply as u128 * defaults.virtual_reserve as u128
        );
        assert_eq!(curve.real_reserve, 0);
        assert_eq!(curve.tokens_sold, 0);
        assert_eq!(curve.accrued_fees, 0);
        assert!(!curve.graduated);
        assert_eq!(curve.created_at, engine.now());

        let second = engine.launch(&account(OTHER), " Beta ", "BET").await.unwrap();
        assert_eq!(second, 2);
        assert_eq!(engine.curve(2).await.unwrap().name, "Beta");
    });
}

#[test]
fn test_launch_rejections() {
    let executor = Runner::default();
    executor.start(|context| async move {
        let mut engine = launched(context).await;
        let before = engine.state().snapshot();

        // One curve per issuer.
        let err = engine.launch(&account(ISSUER), "Again", "AGN").await.unwrap_err();
        assert!(matches!(err, Error::Curve(CurveError::IssuerHasCurve(1))));
        assert_eq!(err.kind(), ErrorKind::StateConflict);

        // Unknown issuers cannot launch.
        let err = engine.launch(&account(BUYER), "Rogue", "RGE").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);

        // Labels are trimmed and bounded.
        let err = engine.launch(&account(OTHER), "   ", "BET").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        let err = engine
            .launch(&account(OTHER), "Beta", "ELEVENCHARS")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        let long_name = "n".repeat(33);
        let err = engine.launch(&account(OTHER), &long_name, "BET").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        assert_eq!(engine.state().snapshot(), before);
    });
}

#[test]
fn test_buy_that_crosses_threshold_graduates_and_pays_out() {
    let executor = Runner::default();
    executor.start(|context| async move {
        let mut engine = launched(context).await;
        let issuer = account(ISSUER);
        let buyer = account(BUYER);
        engine.credit(&buyer, 200_000_000).await.unwrap();

        let outcome = engine.buy(&buyer, 1, 200_000_000, 0).await.unwrap();
        assert!(outcome.graduated);
        assert_eq!(outcome.fee, 2_000_000);

        let k = 1_000_000_000_000_000u128 * 10_000_000_000u128;
        let expected_tokens = 1_000_000_000_000_000u128 - k / (10_000_000_000 + 198_000_000);
        assert_eq!(outcome.tokens_out as u128, expected_tokens);
        assert_eq!(engine.balance(1, &buyer).await.unwrap(), outcome.tokens_out);

        let curve = engine.curve(1).await.unwrap();
        assert!(curve.graduated);
        assert_eq!(curve.accrued_fees, 0);
        assert_eq!(curve.real_reserve, 198_000_000);
        assert_eq!(curve.tokens_sold, outcome.tokens_out);

        // 80% of the 1% fee to the issuer, the rest to the protocol.
        assert_eq!(engine.native_balance(&issuer).await.unwrap(), 1_600_000);
        assert_eq!(engine.native_balance(&account(TREASURY_SEED)).await.unwrap(), 400_000);
        assert_eq!(engine.native_balance(&buyer).await.unwrap(), 0);

        // Trading is closed for good.
        engine.credit(&buyer, 1_000).await.unwrap();
        let err = engine.buy(&buyer, 1, 1_000, 0).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StateConflict);
        let err = engine.sell(&buyer, 1, 1, 0).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StateConflict);
    });
}

#[test]
fn test_slippage_abort_leaves_state_unchanged() {
    let executor = Runner::default();
    executor.start(|context| async move {
        let mut engine = launched(context).await;
        let buyer = account(BUYER);
        engine.credit(&buyer, 10_000_000).await.unwrap();

        let quote = engine.buy_quote(1, 5_000_000).await.unwrap();
        let before = engine.state().snapshot();

        let err = engine
            .buy(&buyer, 1, 5_000_000, quote.tokens_out + 1)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Curve(CurveError::Slippage { .. })));
        assert_eq!(err.kind(), ErrorKind::SlippageExceeded);
        assert!(!err.is_router());
        assert_eq!(engine.state().snapshot(), before);

        // The exact quote still goes through.
        let outcome = engine.buy(&buyer, 1, 5_000_000, quote.tokens_out).await.unwrap();
        assert_eq!(outcome.tokens_out, quote.tokens_out);
    });
}

#[test]
fn test_oversell_fails_without_touching_reserve_or_supply() {
    let executor = Runner::default();
    executor.start(|context| async move {
        let mut engine = launched(context).await;
        let buyer = account(BUYER);
        engine.credit(&buyer, 10_000_000).await.unwrap();
        let bought = engine.buy(&buyer, 1, 10_000_000, 0).await.unwrap().tokens_out;

        let before = engine.state().snapshot();
        let err = engine.sell(&buyer, 1, bought + 1, 0).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientFunds);
        assert_eq!(engine.state().snapshot(), before);

        // Holding zero tokens is the same failure.
        let err = engine.sell(&account(OTHER), 1, 1, 0).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientFunds);
        let err = engine.sell(&buyer, 1, 0, 0).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    });
}

#[test]
fn test_buy_then_sell_returns_at_most_net_input() {
    let executor = Runner::default();
    executor.start(|context| async move {
        let mut engine = launched(context).await;
        let buyer = account(BUYER);
        engine.credit(&buyer, 50_000_000).await.unwrap();

        let buy = engine.buy(&buyer, 1, 50_000_000, 0).await.unwrap();
        let quote = engine.sell_quote(1, buy.tokens_out).await.unwrap();
        let sell = engine
            .sell(&buyer, 1, buy.tokens_out, quote.amount_out)
            .await
            .unwrap();
        assert_eq!(sell.amount_out, quote.amount_out);
        assert!(sell.amount_out <= 50_000_000 - buy.fee - sell.fee);
        assert_eq!(engine.native_balance(&buyer).await.unwrap(), sell.amount_out);
        assert_eq!(engine.balance(1, &buyer).await.unwrap(), 0);

        // Custody still backs the pool plus everything not yet paid out.
        let curve = engine.curve(1).await.unwrap();
        assert_eq!(curve.tokens_sold, 0);
        assert_eq!(curve.accrued_fees, buy.fee + sell.fee);
        assert_eq!(
            curve.custody(),
            50_000_000u128 - sell.amount_out as u128
        );
        assert!(amm::invariant_holds(&curve));
    });
}

#[test]
fn test_buy_requires_native_funds() {
    let executor = Runner::default();
    executor.start(|context| async move {
        let mut engine = launched(context).await;
        let buyer = account(BUYER);
        engine.credit(&buyer, 999).await.unwrap();
        let before = engine.state().snapshot();

        let err = engine.buy(&buyer, 1, 1_000, 0).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Curve(CurveError::InsufficientNative { needed: 1_000, available: 999, .. })
        ));
        let err = engine.buy(&buyer, 1, 0, 0).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        let err = engine.buy(&buyer, 9, 100, 0).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(engine.state().snapshot(), before);
    });
}

#[test]
fn test_transfer_rules() {
    let executor = Runner::default();
    executor.start(|context| async move {
        let mut engine = launched(context).await;
        let buyer = account(BUYER);
        let other = account(OTHER);
        engine.credit(&buyer, 1_000_000).await.unwrap();
        let bought = engine.buy(&buyer, 1, 1_000_000, 0).await.unwrap().tokens_out;
        let before = engine.state().snapshot();

        let err = engine.transfer(&buyer, 1, 0, &other).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        let err = engine.transfer(&buyer, 1, 1, &buyer).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        let err = engine.transfer(&buyer, 1, bought + 1, &other).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientFunds);
        let err = engine.transfer(&buyer, 2, 1, &other).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(engine.state().snapshot(), before);

        engine.transfer(&buyer, 1, bought, &other).await.unwrap();
        assert_eq!(engine.balance(1, &buyer).await.unwrap(), 0);
        assert_eq!(engine.balance(1, &other).await.unwrap(), bought);
        // Empty balances are removed from state.
        assert!(engine
            .state()
            .get(&Key::Balance(1, buyer.clone()))
            .await
            .unwrap()
            .is_none());
    });
}

#[test]
fn test_transfers_survive_graduation() {
    let executor = Runner::default();
    executor.start(|context| async move {
        let mut engine = launched(context).await;
        let buyer = account(BUYER);
        engine.credit(&buyer, 200_000_000).await.unwrap();
        let outcome = engine.buy(&buyer, 1, 200_000_000, 0).await.unwrap();
        assert!(outcome.graduated);

        engine.transfer(&buyer, 1, 10, &account(OTHER)).await.unwrap();
        assert_eq!(engine.balance(1, &account(OTHER)).await.unwrap(), 10);
    });
}

#[test]
fn test_graduate_requires_threshold() {
    let executor = Runner::default();
    executor.start(|context| async move {
        let mut engine = launched(context).await;
        let err = engine.graduate(1).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Curve(CurveError::BelowGraduationThreshold { curve_id: 1, reserve: 0, .. })
        ));
        assert_eq!(err.kind(), ErrorKind::StateConflict);
        assert_eq!(engine.graduate(5).await.unwrap_err().kind(), ErrorKind::NotFound);
    });
}

#[test]
fn test_graduate_pays_once() {
    let executor = Runner::default();
    executor.start(|context| async move {
        // Seed a curve that sits above its threshold without having graduated.
        let issuer = account(ISSUER);
        let mut curve = Curve::new(
            1,
            issuer.clone(),
            "Alpha".into(),
            "ALP".into(),
            &CurveDefaults::default(),
            0,
        );
        let quote = amm::quote_buy(&curve, 300_000_003).unwrap();
        curve.real_reserve = quote.new_real_reserve;
        curve.tokens_sold = quote.tokens_out;
        curve.accrued_fees = quote.fee;

        let mut state = Memory::default();
        state.insert(Key::Curve(1), Value::Curve(curve.clone())).await.unwrap();
        state.insert(Key::CurveCount, Value::CurveCount(1)).await.unwrap();
        state
            .insert(Key::IssuerCurve(issuer.clone()), Value::CurveId(1))
            .await
            .unwrap();
        let registry = crate::mocks::test_registry(&[(issuer.clone(), None)]);
        let mut engine = Engine::new(context, state, registry, test_config()).unwrap();

        let outcome = engine.graduate(1).await.unwrap();
        assert_eq!(outcome.issuer_share + outcome.protocol_share, quote.fee);
        assert_eq!(outcome.issuer_share, quote.fee * 8_000 / 10_000);
        assert_eq!(engine.native_balance(&issuer).await.unwrap(), outcome.issuer_share);
        assert_eq!(
            engine.native_balance(&account(TREASURY_SEED)).await.unwrap(),
            outcome.protocol_share
        );

        let graduated = engine.curve(1).await.unwrap();
        assert!(graduated.graduated);
        assert_eq!(graduated.accrued_fees, 0);
        assert_eq!(graduated.real_reserve, curve.real_reserve);

        let before = engine.state().snapshot();
        let err = engine.graduate(1).await.unwrap_err();
        assert!(matches!(err, Error::Curve(CurveError::Graduated(1))));
        assert_eq!(engine.state().snapshot(), before);
    });
}

#[test]
fn test_defaults_apply_to_future_launches_only() {
    let executor = Runner::default();
    executor.start(|context| async move {
        let mut engine = launched(context).await;
        let admin = account(ADMIN_SEED);
        let updated = CurveDefaults {
            fee_rate_bps: 50,
            graduation_threshold: 5_000_000_000,
            ..CurveDefaults::default()
        };

        let err = engine.set_defaults(&account(ISSUER), updated).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        let invalid = CurveDefaults {
            issuer_fee_share_bps: 10_001,
            ..CurveDefaults::default()
        };
        let err = engine.set_defaults(&admin, invalid).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        engine.set_defaults(&admin, updated).await.unwrap();
        assert_eq!(engine.defaults().await.unwrap(), updated);

        let second = engine.launch(&account(OTHER), "Beta", "BET").await.unwrap();
        assert_eq!(engine.curve(1).await.unwrap().fee_rate_bps, 100);
        assert_eq!(engine.curve(second).await.unwrap().fee_rate_bps, 50);
        assert_eq!(
            engine.curve(second).await.unwrap().graduation_threshold,
            5_000_000_000
        );
    });
}

#[test]
fn test_credit_rejects_zero() {
    let executor = Runner::default();
    executor.start(|context| async move {
        let mut engine = launched(context).await;
        let err = engine.credit(&account(BUYER), 0).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(engine.credit(&account(BUYER), 5).await.unwrap(), 5);
        assert_eq!(engine.credit(&account(BUYER), 7).await.unwrap(), 12);
    });
}

#[test]
fn test_price_rises_with_buys_and_falls_with_sells() {
    let executor = Runner::default();
    executor.start(|context| async move {
        let mut engine = launched(context).await;
        let buyer = account(BUYER);
        engine.credit(&buyer, 90_000_000).await.unwrap();

        let mut last = engine.price(1).await.unwrap();
        for _ in 0..3 {
            engine.buy(&buyer, 1, 30_000_000, 0).await.unwrap();
            let price = engine.price(1).await.unwrap();
            assert!(price > last);
            last = price;
        }

        let held = engine.balance(1, &buyer).await.unwrap();
        for _ in 0..3 {
            engine.sell(&buyer, 1, held / 3, 0).await.unwrap();
            let price = engine.price(1).await.unwrap();
            assert!(price < last);
            last = price;
        }
    });
}

#[test]
fn test_execute_runs_decoded_instructions() {
    let executor = Runner::default();
    executor.start(|context| async move {
        let mut engine = launched(context).await;
        let buyer = account(BUYER);
        engine.credit(&buyer, 200_000_000).await.unwrap();

        let wire = Instruction::Buy {
            curve_id: 1,
            amount_in: 200_000_000,
            min_tokens_out: 1,
        }
        .encode();
        let instruction = Instruction::decode(wire).unwrap();

        let events = engine.execute(&buyer, &instruction).await.unwrap();
        assert_eq!(events.len(), 2);
        let Event::TokensBought { buyer: who, fee, .. } = &events[0] else {
            panic!("unexpected event: {:?}", events[0]);
        };
        assert_eq!(who, &buyer);
        assert_eq!(*fee, 2_000_000);
        assert!(matches!(
            events[1],
            Event::CurveGraduated {
                curve_id: 1,
                issuer_share: 1_600_000,
                protocol_share: 400_000,
                ..
            }
        ));

        // A rejected instruction returns no events and writes nothing.
        let before = engine.state().snapshot();
        let graduate = Instruction::Graduate { curve_id: 1 };
        assert!(engine.execute(&buyer, &graduate).await.is_err());
        assert_eq!(engine.state().snapshot(), before);
    });
}

#[test]
fn test_wire_launch_trims_labels_like_direct_launch() {
    let executor = Runner::default();
    executor.start(|context| async move {
        let mut engine = launched(context).await;

        // Length limits apply to the trimmed label.
        let wire = Instruction::Launch {
            name: "n".repeat(33),
            symbol: "BET".into(),
        }
        .encode();
        let instruction = Instruction::decode(wire).unwrap();
        let err = engine.execute(&account(OTHER), &instruction).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let padded = format!("  {}  ", "n".repeat(30));
        let wire = Instruction::Launch {
            name: padded.clone(),
            symbol: " BET ".into(),
        }
        .encode();
        let instruction = Instruction::decode(wire).unwrap();
        engine.execute(&account(OTHER), &instruction).await.unwrap();

        let curve = engine.curve(2).await.unwrap();
        assert_eq!(curve.name, padded.trim());
        assert_eq!(curve.symbol, "BET");
    });
}
