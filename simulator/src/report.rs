use commonware_cryptography::ed25519::PublicKey;
use commonware_utils::hex;
use curvepay_types::{market::Receipt, Event, Instruction};
use serde_json::{json, Value as Json};

fn key(public: &PublicKey) -> String {
    hex(public.as_ref())
}

pub(crate) fn op_name(instruction: &Instruction) -> &'static str {
    match instruction {
        Instruction::Launch { .. } => "launch",
        Instruction::Buy { .. } => "buy",
        Instruction::Sell { .. } => "sell",
        Instruction::Transfer { .. } => "transfer",
        Instruction::Graduate { .. } => "graduate",
        Instruction::PayViaCurve { .. } => "pay",
        Instruction::SetDefaults { .. } => "set_defaults",
    }
}

pub fn receipt_json(receipt: &Receipt) -> Json {
    json!({
        "payer": key(&receipt.payer),
        "curve_id": receipt.curve_id,
        "amount_in": receipt.amount_in,
        "tokens_out": receipt.tokens_out,
        "fee": receipt.fee,
        "timestamp": receipt.timestamp,
    })
}

pub fn event_json(event: &Event) -> Json {
    match event {
        Event::CurveLaunched {
            curve_id,
            issuer,
            name,
            symbol,
        } => json!({
            "type": "curve_launched",
            "curve_id": curve_id,
            "issuer": key(issuer),
            "name": name,
            "symbol": symbol,
        }),
        Event::TokensBought {
            curve_id,
            buyer,
            amount_in,
            tokens_out,
            fee,
            real_reserve,
            tokens_sold,
        } => json!({
            "type": "tokens_bought",
            "curve_id": curve_id,
            "buyer": key(buyer),
            "amount_in": amount_in,
            "tokens_out": tokens_out,
            "fee": fee,
            "real_reserve": real_reserve,
            "tokens_sold": tokens_sold,
        }),
        Event::TokensSold {
            curve_id,
            seller,
            token_amount,
            amount_out,
            fee,
            real_reserve,
            tokens_sold,
        } => json!({
            "type": "tokens_sold",
            "curve_id": curve_id,
            "seller": key(seller),
            "token_amount": token_amount,
            "amount_out": amount_out,
            "fee": fee,
            "real_reserve": real_reserve,
            "tokens_sold": tokens_sold,
        }),
        Event::TokensTransferred {
            curve_id,
            from,
            to,
            amount,
        } => json!({
            "type": "tokens_transferred",
            "curve_id": curve_id,
            "from": key(from),
            "to": key(to),
            "amount": amount,
        }),
        Event::CurveGraduated {
            curve_id,
            issuer_share,
            protocol_share,
            real_reserve,
        } => json!({
            "type": "curve_graduated",
            "curve_id": curve_id,
            "issuer_share": issuer_share,
            "protocol_share": protocol_share,
            "real_reserve": real_reserve,
        }),
        Event::PaymentRecorded { nonce, receipt } => json!({
            "type": "payment_recorded",
            "nonce": nonce.to_string(),
            "receipt": receipt_json(receipt),
        }),
        Event::DefaultsUpdated { defaults } => json!({
            "type": "defaults_updated",
            "total_supply": defaults.total_supply,
            "virtual_reserve": defaults.virtual_reserve,
            "graduation_threshold": defaults.graduation_threshold,
            "fee_rate_bps": defaults.fee_rate_bps,
            "issuer_fee_share_bps": defaults.issuer_fee_share_bps,
        }),
        Event::NativeCredited {
            account,
            amount,
            balance,
        } => json!({
            "type": "native_credited",
            "account": key(account),
            "amount": amount,
            "balance": balance,
        }),
    }
}
