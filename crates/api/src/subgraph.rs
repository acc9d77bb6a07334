//! GraphQL subgraph implementation of [`ProtocolDataClient`].

use std::collections::BTreeMap;
use std::time::Duration;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::client::ProtocolDataClient;
use crate::decimal::{apply_index, parse_decimal_scaled, parse_unsigned_decimal_scaled};
use crate::error::ApiError;
use crate::types::{
    AccountId, ApiAccount, ApiBalance, ApiMarket, ApiRiskParam, BlockRef, MarketId, MarketIndex,
    MarketIndexMap,
};

/// Accounts per page; the walk stops at the first page shorter than a full
/// batch only when it is empty, per the pagination contract.
const PAGE_SIZE: usize = 1000;

const ACCOUNT_FIELDS: &str = r#"
  id
  user
  accountNumber
  tokenValues {
    token {
      id
      marketId
      decimals
      symbol
    }
    valuePar
    expirationTimestamp
    expiryAddress
  }"#;

/// GraphQL client against the protocol's subgraph.
#[derive(Debug, Clone)]
pub struct SubgraphClient {
    client: reqwest::Client,
    url: String,
}

impl SubgraphClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    async fn query<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, ApiError> {
        #[derive(Deserialize)]
        struct Envelope<T> {
            data: Option<T>,
            errors: Option<Vec<GraphqlError>>,
        }

        #[derive(Deserialize)]
        struct GraphqlError {
            message: String,
        }

        let response: Envelope<T> = self
            .client
            .post(&self.url)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(errors) = response.errors {
            let message = errors
                .into_iter()
                .next()
                .map(|e| e.message)
                .unwrap_or_else(|| "unknown graphql error".to_string());
            return Err(ApiError::Provider(message));
        }

        response
            .data
            .ok_or_else(|| ApiError::Decode("response carried neither data nor errors".into()))
    }

    async fn fetch_accounts(
        &self,
        extra_filter: &str,
        indexes: &MarketIndexMap,
        block: u64,
        page: usize,
    ) -> Result<Vec<ApiAccount>, ApiError> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Data {
            margin_accounts: Vec<GraphqlAccount>,
        }

        let query = format!(
            "query accounts($blockNumber: Int, $first: Int, $skip: Int) {{
               marginAccounts(
                 where: {{ hasBorrowedValue: true{extra_filter} }},
                 block: {{ number: $blockNumber }},
                 first: $first, skip: $skip, orderBy: id
               ) {{{ACCOUNT_FIELDS}
               }}
             }}"
        );

        let data: Data = self
            .query(
                &query,
                json!({
                    "blockNumber": block,
                    "first": PAGE_SIZE,
                    "skip": page * PAGE_SIZE,
                }),
            )
            .await?;

        debug!(page, count = data.margin_accounts.len(), "fetched account page");

        data.margin_accounts
            .into_iter()
            .map(|account| decode_account(account, indexes))
            .collect()
    }
}

#[async_trait]
impl ProtocolDataClient for SubgraphClient {
    async fn fetch_reference_block(&self) -> Result<BlockRef, ApiError> {
        #[derive(Deserialize)]
        struct Data {
            _meta: Meta,
        }
        #[derive(Deserialize)]
        struct Meta {
            block: MetaBlock,
        }
        #[derive(Deserialize)]
        struct MetaBlock {
            number: u64,
            timestamp: u64,
        }

        let data: Data = self
            .query("{ _meta { block { number timestamp } } }", json!({}))
            .await?;

        Ok(BlockRef {
            number: data._meta.block.number,
            timestamp: data._meta.block.timestamp,
        })
    }

    async fn fetch_markets(&self, block: u64) -> Result<Vec<ApiMarket>, ApiError> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Data {
            market_risk_infos: Vec<GraphqlMarket>,
        }

        let data: Data = self
            .query(
                "query markets($blockNumber: Int) {
                   marketRiskInfos(orderBy: id, block: { number: $blockNumber }) {
                     id
                     token { id marketId decimals symbol }
                     oraclePrice
                     marginPremium
                     liquidationRewardPremium
                     borrowIndex
                     supplyIndex
                   }
                 }",
                json!({ "blockNumber": block }),
            )
            .await?;

        data.market_risk_infos.into_iter().map(decode_market).collect()
    }

    async fn fetch_risk_params(&self, block: u64) -> Result<ApiRiskParam, ApiError> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Data {
            margin_protocols: Vec<GraphqlRiskParams>,
        }

        let data: Data = self
            .query(
                "query riskParams($blockNumber: Int) {
                   marginProtocols(block: { number: $blockNumber }) {
                     id
                     liquidationRatio
                     liquidationReward
                   }
                 }",
                json!({ "blockNumber": block }),
            )
            .await?;

        let raw = data
            .margin_protocols
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::Decode("provider returned no risk params".into()))?;

        Ok(ApiRiskParam {
            margin_contract: parse_address(&raw.id)?,
            liquidation_ratio: decimal_wad(&raw.liquidation_ratio, "liquidationRatio")?,
            liquidation_reward: decimal_wad(&raw.liquidation_reward, "liquidationReward")?,
        })
    }

    async fn fetch_liquidatable_accounts(
        &self,
        indexes: &MarketIndexMap,
        block: u64,
        page: usize,
    ) -> Result<Vec<ApiAccount>, ApiError> {
        self.fetch_accounts("", indexes, block, page).await
    }

    async fn fetch_expirable_accounts(
        &self,
        indexes: &MarketIndexMap,
        block: u64,
        page: usize,
    ) -> Result<Vec<ApiAccount>, ApiError> {
        self.fetch_accounts(", hasExpiration: true", indexes, block, page)
            .await
    }
}

// Wire shapes.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphqlAccount {
    user: String,
    account_number: String,
    token_values: Vec<GraphqlTokenValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphqlTokenValue {
    token: GraphqlToken,
    value_par: String,
    expiration_timestamp: Option<String>,
    expiry_address: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphqlToken {
    id: String,
    market_id: String,
    decimals: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphqlMarket {
    id: String,
    token: GraphqlToken,
    oracle_price: String,
    margin_premium: String,
    liquidation_reward_premium: String,
    borrow_index: String,
    supply_index: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphqlRiskParams {
    id: String,
    liquidation_ratio: String,
    liquidation_reward: String,
}

// Decoding.

fn decode_account(raw: GraphqlAccount, indexes: &MarketIndexMap) -> Result<ApiAccount, ApiError> {
    let owner = parse_address(&raw.user)?;
    let number = U256::from_str_radix(&raw.account_number, 10)
        .map_err(|e| ApiError::Decode(format!("account number {:?}: {e}", raw.account_number)))?;

    let mut balances = BTreeMap::new();
    for value in raw.token_values {
        let market_id = parse_market_id(&value.token.market_id)?;
        let index = indexes
            .get(&market_id)
            .ok_or_else(|| ApiError::Decode(format!("no interest index for market {market_id}")))?;

        let par = parse_decimal_scaled(&value.value_par, value.token.decimals)
            .map_err(ApiError::Decode)?;
        let wei = apply_index(
            par,
            if par.is_negative() {
                index.borrow
            } else {
                index.supply
            },
        );

        let expires_at = value
            .expiration_timestamp
            .as_deref()
            .map(|ts| {
                ts.parse::<u64>()
                    .map_err(|e| ApiError::Decode(format!("expiration timestamp {ts:?}: {e}")))
            })
            .transpose()?
            // Zero means the balance never expires.
            .filter(|ts| *ts != 0);

        let expiry_ref = value
            .expiry_address
            .as_deref()
            .map(parse_address)
            .transpose()?;

        balances.insert(
            market_id,
            ApiBalance {
                market_id,
                token_address: parse_address(&value.token.id)?,
                par,
                wei,
                expires_at,
                expiry_ref,
            },
        );
    }

    Ok(ApiAccount {
        id: AccountId::new(owner, number),
        balances,
    })
}

fn decode_market(raw: GraphqlMarket) -> Result<ApiMarket, ApiError> {
    Ok(ApiMarket {
        id: parse_market_id(&raw.id)?,
        token_address: parse_address(&raw.token.id)?,
        oracle_price: U256::from_str_radix(&raw.oracle_price, 10)
            .map_err(|e| ApiError::Decode(format!("oracle price {:?}: {e}", raw.oracle_price)))?,
        margin_premium: decimal_wad(&raw.margin_premium, "marginPremium")?,
        liquidation_reward_premium: decimal_wad(
            &raw.liquidation_reward_premium,
            "liquidationRewardPremium",
        )?,
        borrow_index: decimal_wad(&raw.borrow_index, "borrowIndex")?,
        supply_index: decimal_wad(&raw.supply_index, "supplyIndex")?,
    })
}

/// Build the index context the account queries need from decoded markets.
pub fn index_map(markets: &[ApiMarket]) -> MarketIndexMap {
    markets
        .iter()
        .map(|m| {
            (
                m.id,
                MarketIndex {
                    borrow: m.borrow_index,
                    supply: m.supply_index,
                },
            )
        })
        .collect()
}

fn parse_market_id(raw: &str) -> Result<MarketId, ApiError> {
    raw.parse::<u64>()
        .map(MarketId)
        .map_err(|e| ApiError::Decode(format!("market id {raw:?}: {e}")))
}

fn parse_address(raw: &str) -> Result<Address, ApiError> {
    raw.parse::<Address>()
        .map_err(|e| ApiError::Decode(format!("address {raw:?}: {e}")))
}

fn decimal_wad(raw: &str, field: &str) -> Result<U256, ApiError> {
    parse_unsigned_decimal_scaled(raw, 18)
        .map_err(|e| ApiError::Decode(format!("{field}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::BASE;
    use alloy::primitives::I256;

    fn unit_indexes(ids: &[u64]) -> MarketIndexMap {
        ids.iter()
            .map(|id| {
                (
                    MarketId(*id),
                    MarketIndex {
                        borrow: BASE,
                        supply: BASE,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn decodes_account_with_expiring_borrow() {
        let raw: GraphqlAccount = serde_json::from_value(json!({
            "user": "0x78f4529554137a9015dc653758ab600abc2ffd48",
            "accountNumber": "22",
            "tokenValues": [
                {
                    "token": {
                        "id": "0x0000000000000000000000000000000000000001",
                        "marketId": "1",
                        "decimals": 0,
                        "symbol": "USDC"
                    },
                    "valuePar": "-31146",
                    "expirationTimestamp": "1700000000",
                    "expiryAddress": "0x0000000000000000000000000000000000000099"
                },
                {
                    "token": {
                        "id": "0x0000000000000000000000000000000000000002",
                        "marketId": "2",
                        "decimals": 0,
                        "symbol": "WETH"
                    },
                    "valuePar": "200",
                    "expirationTimestamp": "0",
                    "expiryAddress": null
                }
            ]
        }))
        .unwrap();

        let account = decode_account(raw, &unit_indexes(&[1, 2])).unwrap();
        assert_eq!(account.number(), U256::from(22u64));
        assert_eq!(account.balances.len(), 2);

        let borrow = &account.balances[&MarketId(1)];
        assert_eq!(borrow.wei, I256::try_from(-31146i64).unwrap());
        assert_eq!(borrow.expires_at, Some(1_700_000_000));
        assert!(borrow.expiry_ref.is_some());

        // Zero expiration timestamp normalizes to "never expires".
        let supply = &account.balances[&MarketId(2)];
        assert_eq!(supply.expires_at, None);
    }

    #[test]
    fn account_decode_rejects_unknown_market_index() {
        let raw: GraphqlAccount = serde_json::from_value(json!({
            "user": "0x78f4529554137a9015dc653758ab600abc2ffd48",
            "accountNumber": "0",
            "tokenValues": [{
                "token": {
                    "id": "0x0000000000000000000000000000000000000001",
                    "marketId": "7",
                    "decimals": 6,
                    "symbol": "USDC"
                },
                "valuePar": "-1",
                "expirationTimestamp": null,
                "expiryAddress": null
            }]
        }))
        .unwrap();

        assert!(decode_account(raw, &unit_indexes(&[1])).is_err());
    }

    #[test]
    fn decodes_market_risk_info() {
        let raw: GraphqlMarket = serde_json::from_value(json!({
            "id": "3",
            "token": {
                "id": "0x0000000000000000000000000000000000000003",
                "marketId": "3",
                "decimals": 18,
                "symbol": "LINK"
            },
            "oraclePrice": "985976069960621971",
            "marginPremium": "0.1",
            "liquidationRewardPremium": "0.05",
            "borrowIndex": "1.000000000000000001",
            "supplyIndex": "1"
        }))
        .unwrap();

        let market = decode_market(raw).unwrap();
        assert_eq!(market.id, MarketId(3));
        assert_eq!(
            market.oracle_price,
            U256::from(985_976_069_960_621_971u128)
        );
        assert_eq!(market.margin_premium, U256::from(100_000_000_000_000_000u128));
        assert_eq!(
            market.borrow_index,
            U256::from(1_000_000_000_000_000_001u128)
        );
        assert_eq!(market.supply_index, BASE);
    }

    #[test]
    fn index_map_carries_both_sides() {
        let market: GraphqlMarket = serde_json::from_value(json!({
            "id": "0",
            "token": {
                "id": "0x0000000000000000000000000000000000000001",
                "marketId": "0",
                "decimals": 18,
                "symbol": "WETH"
            },
            "oraclePrice": "1",
            "marginPremium": "0",
            "liquidationRewardPremium": "0",
            "borrowIndex": "1.2",
            "supplyIndex": "1.1"
        }))
        .unwrap();
        let markets = vec![decode_market(market).unwrap()];

        let map = index_map(&markets);
        assert_eq!(map[&MarketId(0)].borrow, U256::from(1_200_000_000_000_000_000u128));
        assert_eq!(map[&MarketId(0)].supply, U256::from(1_100_000_000_000_000_000u128));
    }
}
