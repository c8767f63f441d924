use crate::execution::client::AsyncSubmitClient;
use crate::execution::effects::u64_from_str_or_num;
use crate::resolver::context::ResolutionContext;
use crate::resolver::plugin::AsyncResolvePlugin;
use crate::transaction::{Argument, CallArg, Command, InputKind, ObjectRef};
use crate::utils::constants::GET_COINS_METHOD;
use ahash::AHashSet;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoinData {
    coin_object_id: String,
    #[serde(default, deserialize_with = "u64_from_str_or_num")]
    version: Option<u64>,
    digest: String,
    #[serde(default, deserialize_with = "u64_from_str_or_num")]
    balance: Option<u64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoinPage {
    #[serde(default)]
    data: Vec<CoinData>,
    #[serde(default)]
    next_cursor: Option<String>,
    #[serde(default)]
    has_next_page: bool,
}

/// Turns `CoinWithBalance` intents into a coin split off the sender's own coins.
///
/// The intent slot becomes the first selected coin. Further coins and the amount are appended
/// as inputs, and a `MergeCoins`/`SplitCoins` pair is put in front of the existing commands.
/// Commands that consumed the intent slot are pointed at the split result instead.
pub struct CoinWithBalanceResolver<C: ?Sized> {
    client: Arc<C>,
}

impl<C: AsyncSubmitClient + ?Sized> CoinWithBalanceResolver<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    async fn fetch_page(&self, owner: &str, coin_type: &str, cursor: Option<&str>) -> eyre::Result<CoinPage> {
        let params = vec![json!(owner), json!(coin_type), json!(cursor), Value::Null];
        let response = self.client.call(GET_COINS_METHOD, params).await?;
        let body = response.get("result").unwrap_or(&response);
        if let Some(error) = body.get("error") {
            return Err(eyre::eyre!("failed to list {} coins of {}: {}", coin_type, owner, error));
        }
        Ok(serde_json::from_value(body.clone())?)
    }

    /// Walks the owner's coins until they cover `balance`, skipping coins in `used`.
    async fn select(
        &self,
        owner: &str,
        coin_type: &str,
        balance: u64,
        used: &AHashSet<String>,
    ) -> eyre::Result<Vec<ObjectRef>> {
        let mut selected = Vec::new();
        let mut total: u128 = 0;
        let mut cursor: Option<String> = None;

        loop {
            let page = self.fetch_page(owner, coin_type, cursor.as_deref()).await?;
            for coin in page.data {
                if used.contains(&coin.coin_object_id) {
                    continue;
                }
                let version = coin.version.ok_or_else(|| eyre::eyre!("coin {} has no version", coin.coin_object_id))?;
                total += coin.balance.unwrap_or_default() as u128;
                selected.push(ObjectRef::new(coin.coin_object_id, version, coin.digest));
                if total >= balance as u128 {
                    return Ok(selected);
                }
            }
            match page.next_cursor {
                Some(next) if page.has_next_page => cursor = Some(next),
                _ => break,
            }
        }

        Err(eyre::eyre!(
            "insufficient balance of {} for {}: need {}, found {}",
            coin_type,
            owner,
            balance,
            total
        ))
    }
}

#[async_trait]
impl<C: AsyncSubmitClient + ?Sized> AsyncResolvePlugin for CoinWithBalanceResolver<C> {
    fn name(&self) -> &str {
        "CoinWithBalanceResolver"
    }

    async fn resolve(&self, ctx: &mut ResolutionContext) -> eyre::Result<()> {
        let mut used = AHashSet::new();

        for index in ctx.pending_indices(InputKind::CoinWithBalance) {
            let (coin_type, balance) = match ctx.transaction.input(index) {
                Some(CallArg::CoinWithBalance { coin_type, balance }) => (coin_type.clone(), *balance),
                _ => continue,
            };
            let owner = ctx.sender.clone().ok_or_else(|| eyre::eyre!("input {} needs a sender to pick coins from", index))?;

            let mut coins = self.select(&owner, &coin_type, balance, &used).await?.into_iter();
            let primary = coins.next().ok_or_else(|| eyre::eyre!("no {} coin selected for input {}", coin_type, index))?;
            used.insert(primary.object_id.clone());

            let slot_index = u16::try_from(index)?;
            let slot = Argument::Input(slot_index);
            let mut merge_args = vec![slot];
            for coin in coins {
                used.insert(coin.object_id.clone());
                merge_args.push(ctx.transaction.object_ref(coin)?);
            }
            let amount = ctx.transaction.pure(balance.to_le_bytes())?;

            let mut commands = Vec::with_capacity(2);
            if merge_args.len() > 1 {
                commands.push(Command::new("MergeCoins", merge_args, Value::Null));
            }
            let split_at = u16::try_from(commands.len())?;
            commands.push(Command::new("SplitCoins", vec![slot, amount], Value::Null));
            let inserted = commands.len();

            ctx.transaction.prepend_commands(commands)?;
            let redirected = ctx.transaction.redirect_input(slot_index, Argument::NestedResult(split_at, 0), inserted);
            debug!(index, coin_type = %coin_type, balance, coin = %primary.object_id, redirected, "Resolved coin intent");
            ctx.resolve_input(index, CallArg::Object(primary))?;
        }
        Ok(())
    }
}
