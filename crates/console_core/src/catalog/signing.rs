use anyhow::{ensure, Context, Result};
use serde_json::json;
use shared::{
    domain::{Address, ChainId},
    protocol::{MessagePayload, TypedData, TypedDataDomain, TypedDataField},
};

use crate::action::ActionContext;

const POEM: &str = "1915 Robert Frost
The Road Not Taken

Two roads diverged in a yellow wood,
And sorry I could not travel both
And be one traveler, long I stood
And looked down one as far as I could
To where it bent in the undergrowth

Then took the other, as just as fair,
And having perhaps the better claim,
Because it was grassy and wanted wear
Though as for that the passing there
Had worn them really about the same,

And both that morning equally lay
In leaves no step had trodden black.
Oh, I kept the first for another day!
Yet knowing how way leads on to way,
I doubted if I should ever come back.

I shall be telling this with a sigh
Somewhere ages and ages hence:
Two roads diverged in a wood, and I\u{2014}
I took the one less traveled by,
And that has made all the difference.

\u{2601} \u{2600} \u{2602}";

const GREETING: &str = "Hello, world!";

fn hex_encode(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Writes the verification verdict, then fails the action if it is negative.
fn report_validity(ctx: &ActionContext, is_valid: bool) -> Result<String> {
    ctx.log(format!("isValid?: {is_valid}"));
    ensure!(is_valid, "sig invalid");
    Ok(String::new())
}

async fn sign_and_verify(ctx: ActionContext, message: MessagePayload) -> Result<String> {
    ctx.log("signing message...");
    let chain_id = ctx.wallet.chain_id();
    let signature = ctx
        .wallet
        .sign_message(chain_id, &message)
        .await
        .context("message signing failed")?;
    ctx.log(format!("signature: {signature}"));

    let signer = ctx.wallet.address()?;
    let is_valid = ctx
        .wallet
        .is_valid_message_signature(&signer, &message, &signature, chain_id)
        .await
        .context("signature verification failed")?;
    report_validity(&ctx, is_valid)
}

pub(super) async fn sign_message(ctx: ActionContext) -> Result<String> {
    sign_and_verify(ctx, MessagePayload::Text(POEM.to_string())).await
}

pub(super) async fn sign_message_hex(ctx: ActionContext) -> Result<String> {
    sign_and_verify(ctx, MessagePayload::Hex(hex_encode(GREETING.as_bytes()))).await
}

pub(super) async fn sign_message_bytes(ctx: ActionContext) -> Result<String> {
    sign_and_verify(ctx, MessagePayload::Bytes(GREETING.as_bytes().to_vec())).await
}

pub(crate) fn ether_mail() -> TypedData {
    let person = vec![
        TypedDataField::new("name", "string"),
        TypedDataField::new("wallet", "address"),
    ];
    let mail = vec![
        TypedDataField::new("from", "Person"),
        TypedDataField::new("to", "Person"),
        TypedDataField::new("cc", "Person[]"),
        TypedDataField::new("contents", "string"),
        TypedDataField::new("attachements", "string[]"),
    ];

    TypedData {
        types: [("Person".to_string(), person), ("Mail".to_string(), mail)]
            .into_iter()
            .collect(),
        primary_type: "Mail".to_string(),
        domain: TypedDataDomain {
            name: "Ether Mail".to_string(),
            version: "1".to_string(),
            chain_id: ChainId::MAINNET,
            verifying_contract: Address::new("0xCcCCccccCCCCcCCCCCCcCcCccCcCCCcCcccccccC"),
        },
        message: json!({
            "from": { "name": "Cow", "wallet": "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826" },
            "to": { "name": "Bob", "wallet": "0xbBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB" },
            "cc": [
                { "name": "Dev Team", "wallet": "0xbBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB" },
                { "name": "Accounting", "wallet": "0xbBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB" }
            ],
            "contents": "Hello, Bob!",
            "attachements": ["cat.png", "dog.png"]
        }),
    }
}

pub(super) async fn sign_typed_data(ctx: ActionContext) -> Result<String> {
    ctx.log("signing typedData...");
    let typed_data = ether_mail();
    let chain_id = ctx.wallet.chain_id();
    let signature = ctx
        .wallet
        .sign_typed_data(chain_id, &typed_data)
        .await
        .context("typed data signing failed")?;
    ctx.log(format!("signature: {signature}"));

    let signer = ctx.wallet.address()?;
    let is_valid = ctx
        .wallet
        .is_valid_typed_data_signature(&signer, &typed_data, &signature, chain_id)
        .await
        .context("signature verification failed")?;
    report_validity(&ctx, is_valid)
}
