//! Contract bindings for the protocol's settlement proxies.

use std::sync::Arc;

use alloy::primitives::{Address, Bytes, U256};
use alloy::providers::ProviderBuilder;
use alloy::sol;
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use tracing::info;

use liquidator_api::{AccountId, MarketId};

use crate::error::SettlementError;
use crate::sender::TransactionSender;
use crate::settlement::{
    ExpiryDispatch, LiquidationDispatch, SaleDispatch, SettlementClient, TxHandle,
};

sol! {
    /// Preference-order liquidation proxy: the contract chooses the
    /// specific markets to close.
    interface ILiquidatorProxy {
        function liquidate(
            address liquidatorOwner,
            uint256 liquidatorNumber,
            address liquidOwner,
            uint256 liquidNumber,
            uint256 minCollateralization,
            uint256 minOverheadValue,
            uint256[] owedPreferences,
            uint256[] collateralPreferences
        ) external;
    }

    /// AMM-backed liquidation proxy: sells seized collateral along the
    /// provided token path to repay the owed balance.
    interface IAmmLiquidatorProxy {
        function liquidate(
            address liquidatorOwner,
            uint256 liquidatorNumber,
            address liquidOwner,
            uint256 liquidNumber,
            uint256 owedMarket,
            uint256 heldMarket,
            address[] tokenPath,
            uint256 expiry,
            uint256 minOwedOutputAmount,
            bool revertOnFailToSellCollateral
        ) external;
    }

    /// Expiry proxy closing every expired balance of a position in one call.
    interface IExpiryProxy {
        function expireAccount(
            address liquidatorOwner,
            uint256 liquidatorNumber,
            address liquidOwner,
            uint256 liquidNumber,
            uint256[] expiredMarkets,
            uint256[] expiryTimestamps,
            uint256 blockTimestamp,
            int256[] weis,
            uint256[] prices,
            uint256[] rewardPremiums,
            uint256[] collateralPreferences
        ) external;
    }

    /// Margin contract getters used for the authoritative re-check.
    #[sol(rpc)]
    interface IMarginInspector {
        function isAccountLiquidatable(
            address owner,
            uint256 number
        ) external view returns (bool);
    }
}

/// Deployed proxy addresses.
#[derive(Debug, Clone, Copy)]
pub struct ProxyAddresses {
    pub margin: Address,
    pub liquidator_proxy: Address,
    pub amm_liquidator_proxy: Address,
    pub expiry_proxy: Address,
}

/// [`SettlementClient`] backed by the protocol's on-chain proxies.
pub struct MarginProtocol {
    addresses: ProxyAddresses,
    sender: Arc<TransactionSender>,
}

impl MarginProtocol {
    pub fn new(addresses: ProxyAddresses, sender: Arc<TransactionSender>) -> Self {
        Self { addresses, sender }
    }
}

fn market_ids(markets: &[MarketId]) -> Vec<U256> {
    markets.iter().map(|m| U256::from(m.0)).collect()
}

#[async_trait]
impl SettlementClient for MarginProtocol {
    async fn is_account_liquidatable(
        &self,
        account: &AccountId,
        block: u64,
    ) -> Result<bool, SettlementError> {
        let provider = ProviderBuilder::new().on_http(self.sender.parse_rpc_url()?);
        let inspector = IMarginInspector::new(self.addresses.margin, &provider);

        let answer = inspector
            .isAccountLiquidatable(account.owner, account.number)
            .block(block.into())
            .call()
            .await
            .map_err(|e| SettlementError::Transport(e.to_string()))?;

        Ok(answer._0)
    }

    async fn liquidate(&self, params: LiquidationDispatch) -> Result<TxHandle, SettlementError> {
        let calldata = ILiquidatorProxy::liquidateCall {
            liquidatorOwner: params.liquidator_owner,
            liquidatorNumber: params.liquidator_number,
            liquidOwner: params.liquid_account.owner,
            liquidNumber: params.liquid_account.number,
            minCollateralization: params.min_collateralization,
            minOverheadValue: params.min_overhead_value,
            owedPreferences: market_ids(&params.owed_preferences),
            collateralPreferences: market_ids(&params.collateral_preferences),
        }
        .abi_encode();

        let hash = self
            .sender
            .send(
                self.addresses.liquidator_proxy,
                Bytes::from(calldata),
                &params.gas,
            )
            .await?;

        info!(account = %params.liquid_account, tx_hash = %hash, "liquidation submitted");
        Ok(TxHandle(hash))
    }

    async fn liquidate_with_sale(
        &self,
        params: SaleDispatch,
    ) -> Result<TxHandle, SettlementError> {
        let calldata = IAmmLiquidatorProxy::liquidateCall {
            liquidatorOwner: params.liquidator_owner,
            liquidatorNumber: params.liquidator_number,
            liquidOwner: params.liquid_account.owner,
            liquidNumber: params.liquid_account.number,
            owedMarket: U256::from(params.owed_market.0),
            heldMarket: U256::from(params.held_market.0),
            tokenPath: params.token_path.clone(),
            // Zero tells the proxy this is a plain liquidation.
            expiry: U256::from(params.expiry.unwrap_or(0)),
            minOwedOutputAmount: params.min_owed_output,
            revertOnFailToSellCollateral: params.revert_on_fail_to_sell,
        }
        .abi_encode();

        let hash = self
            .sender
            .send(
                self.addresses.amm_liquidator_proxy,
                Bytes::from(calldata),
                &params.gas,
            )
            .await?;

        info!(account = %params.liquid_account, tx_hash = %hash, "sale liquidation submitted");
        Ok(TxHandle(hash))
    }

    async fn settle_expirations(
        &self,
        params: ExpiryDispatch,
    ) -> Result<TxHandle, SettlementError> {
        let calldata = IExpiryProxy::expireAccountCall {
            liquidatorOwner: params.liquidator_owner,
            liquidatorNumber: params.liquidator_number,
            liquidOwner: params.liquid_account.owner,
            liquidNumber: params.liquid_account.number,
            expiredMarkets: params
                .expired_markets
                .iter()
                .map(|m| U256::from(m.market_id.0))
                .collect(),
            expiryTimestamps: params
                .expired_markets
                .iter()
                .map(|m| U256::from(m.expires_at))
                .collect(),
            blockTimestamp: U256::from(params.block_timestamp),
            weis: params.weis.clone(),
            prices: params.prices.clone(),
            rewardPremiums: params.reward_premiums.clone(),
            collateralPreferences: market_ids(&params.collateral_preferences),
        }
        .abi_encode();

        let hash = self
            .sender
            .send(
                self.addresses.expiry_proxy,
                Bytes::from(calldata),
                &params.gas,
            )
            .await?;

        info!(
            account = %params.liquid_account,
            expired = params.expired_markets.len(),
            tx_hash = %hash,
            "expiry settlement submitted"
        );
        Ok(TxHandle(hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_id_vectors_preserve_order() {
        let ids = market_ids(&[MarketId(2), MarketId(0), MarketId(1)]);
        assert_eq!(
            ids,
            vec![U256::from(2u64), U256::from(0u64), U256::from(1u64)]
        );
    }

    #[test]
    fn inspector_calldata_round_trips() {
        let call = IMarginInspector::isAccountLiquidatableCall {
            owner: Address::repeat_byte(0xAB),
            number: U256::from(22u64),
        };
        let encoded = call.abi_encode();
        let decoded =
            IMarginInspector::isAccountLiquidatableCall::abi_decode(&encoded, true).unwrap();
        assert_eq!(decoded.owner, Address::repeat_byte(0xAB));
        assert_eq!(decoded.number, U256::from(22u64));
    }
}
