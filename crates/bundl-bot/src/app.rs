//! Application wiring.
//!
//! Builds the signer, provider, orderbook client and fill scheduler from
//! configuration, and implements the maker-side create/cancel flows.

use std::sync::Arc;
use std::time::Duration;

use alloy::network::EthereumWallet;
use alloy::primitives::{Address, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::transports::http::{Client, Http};
use chrono::Utc;
use rand::Rng;
use tracing::info;

use bundl_core::{
    encode_maker_asset_suffix, Extension, LimitOrder, MakerTraits, OrderFields, TransferParams,
    TransferPredicate,
};
use bundl_executor::{FillExecutor, FillScheduler, SchedulerConfig, IERC721};
use bundl_orderbook::{
    parse_amount, ActiveFilter, OrderbookClient, OrderbookStatus, SubmitRequest,
};
use bundl_signing::{KeyManager, KeySource, OrderDomain, OrderSigner};

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};

/// Main application.
pub struct Application {
    config: AppConfig,
}

impl Application {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Run the fill loop until interrupted.
    pub async fn run(&self) -> AppResult<()> {
        let scheduler = self.build_scheduler()?;
        scheduler.run().await;
        Ok(())
    }

    /// Run a single polling pass and report the outcome counts.
    pub async fn run_once(&self) -> AppResult<()> {
        let scheduler = self.build_scheduler()?;
        let summary = scheduler.run_tick().await?;
        info!(
            filled = summary.filled,
            skipped = summary.skipped,
            failed = summary.failed,
            "Single pass complete"
        );
        Ok(())
    }

    /// Build, sign and publish a scheduled folder transfer.
    ///
    /// The transfer of `token_id` to `to` becomes fillable `delay_secs`
    /// from now (config default when unset) and the order itself expires
    /// after the configured lifetime. Returns the order hash.
    pub async fn create_order(
        &self,
        to: Address,
        token_id: U256,
        delay_secs: Option<u64>,
    ) -> AppResult<String> {
        let key = self.load_key()?;
        let maker = key.address();
        let folder_token = self.config.folder_token_address()?;
        let proxy = self.config.transfer_proxy_address()?;
        let settlement = self.config.settlement_address()?;

        let now = Utc::now().timestamp() as u64;
        let not_before = now + delay_secs.unwrap_or(self.config.order.transfer_delay_secs);

        let predicate = TransferPredicate {
            token: folder_token,
            token_id,
            owner: maker,
            not_before,
        };
        let suffix = encode_maker_asset_suffix(&TransferParams {
            from: maker,
            to,
            amount: U256::ZERO,
            token_id,
            token: folder_token,
        });
        let extension = Extension::new()
            .with_maker_asset_suffix(suffix)
            .with_predicate(predicate.encode(self.config.predicate_address()?));

        let traits = MakerTraits::new()
            .with_expiration(now + self.config.order.expiration_secs)
            .with_nonce(rand::thread_rng().gen::<u64>());

        let order = LimitOrder::build(
            OrderFields {
                maker,
                receiver: to,
                maker_asset: proxy,
                taker_asset: self.config.taker_asset_address()?,
                making_amount: parse_amount(&self.config.order.making_amount, "making_amount")?,
                taking_amount: parse_amount(&self.config.order.taking_amount, "taking_amount")?,
            },
            traits,
            &extension,
        )?;

        self.ensure_approval(&key, folder_token, proxy, token_id)
            .await?;

        let domain = OrderDomain::new(self.config.network_id, settlement);
        let order_hash = domain.hash_order(&order);
        let signer = OrderSigner::new(key, domain);
        let signature = signer.sign_order(&order).await?;

        let request = SubmitRequest::new(
            order_hash,
            &signature,
            &order,
            &extension,
            self.config.network_id,
        );
        let ack = self.orderbook()?.submit(&request).await?;
        info!(
            order_hash = %request.order_hash,
            status = %ack.order.status,
            not_before,
            "Order published"
        );
        Ok(request.order_hash)
    }

    /// Ask the orderbook to stop serving an order.
    pub async fn cancel_order(&self, order_hash: &str) -> AppResult<()> {
        let ack = self.orderbook()?.cancel(order_hash).await?;
        info!(order_hash, success = ack.success, "Order cancelled");
        Ok(())
    }

    /// Print the orderbook's status view of an order, including the transfer
    /// gate timestamp when the stored record carries one.
    pub async fn order_status(&self, order_hash: &str) -> AppResult<()> {
        let orderbook = self.orderbook()?;
        let status = orderbook.fetch_status(order_hash).await?;
        info!(
            order_hash = %status.order_hash,
            status = %status.status,
            filled_amount = %status.filled_amount,
            "Order status"
        );

        if let Some(record) = orderbook.fetch_by_hash(order_hash).await? {
            if let Some(extension) = record.extension {
                let extension = extension.to_extension()?;
                if !extension.predicate.is_empty() {
                    let (_, predicate) = TransferPredicate::decode(&extension.predicate)?;
                    info!(
                        token_id = %predicate.token_id,
                        not_before = predicate.not_before,
                        "Transfer gate"
                    );
                }
            }
        }
        Ok(())
    }

    /// List orders for a maker, defaulting to the configured signing key.
    pub async fn list_orders(
        &self,
        maker: Option<Address>,
        status: Option<OrderbookStatus>,
    ) -> AppResult<()> {
        let maker = match maker {
            Some(maker) => maker,
            None => self.load_key()?.address(),
        };
        let page = self.orderbook()?.fetch_by_maker(maker, status).await?;
        info!(%maker, count = page.count, "Maker orders");
        for record in &page.results {
            println!(
                "{}  {}  filled {}",
                record.order_hash, record.status, record.filled_amount
            );
        }
        Ok(())
    }

    fn load_key(&self) -> AppResult<Arc<KeyManager>> {
        let expected = self.config.expected_signer()?;
        let source = KeySource::EnvVar {
            var_name: self.config.key_env_var.clone(),
        };
        Ok(Arc::new(KeyManager::load(&source, expected)?))
    }

    fn orderbook(&self) -> AppResult<OrderbookClient> {
        Ok(OrderbookClient::new(self.config.orderbook_url.clone())?)
    }

    fn provider_for(
        &self,
        key: &KeyManager,
    ) -> AppResult<impl Provider<Http<Client>> + Clone> {
        let url = self
            .config
            .rpc_url
            .parse::<reqwest::Url>()
            .map_err(|e| AppError::Config(format!("Invalid rpc_url: {e}")))?;
        let wallet = EthereumWallet::from(key.signer().clone());
        Ok(ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(wallet)
            .on_http(url))
    }

    fn build_scheduler(
        &self,
    ) -> AppResult<FillScheduler<Http<Client>, impl Provider<Http<Client>> + Clone>> {
        let key = self.load_key()?;
        let provider = self.provider_for(&key)?;
        let executor = FillExecutor::new(
            provider,
            self.config.settlement_address()?,
            self.config.fill.confirmations,
            Duration::from_secs(self.config.fill.tx_timeout_secs),
        );

        // Only orders routed through our transfer proxy are of interest.
        let filter = ActiveFilter {
            maker_asset: Some(self.config.transfer_proxy_address()?),
            ..ActiveFilter::default()
        };
        let scheduler_config = SchedulerConfig {
            interval: Duration::from_secs(self.config.fill.interval_secs),
            network_id: self.config.network_id,
            taker: key.address(),
            filter,
        };

        Ok(FillScheduler::new(
            self.orderbook()?,
            executor,
            scheduler_config,
        ))
    }

    async fn ensure_approval(
        &self,
        key: &Arc<KeyManager>,
        token: Address,
        proxy: Address,
        token_id: U256,
    ) -> AppResult<()> {
        let provider = self.provider_for(key)?;
        let erc721 = IERC721::new(token, provider);

        let approved = erc721
            .getApproved(token_id)
            .call()
            .await
            .map_err(|e| AppError::Rpc(e.to_string()))?
            ._0;
        if approved == proxy {
            return Ok(());
        }
        let all = erc721
            .isApprovedForAll(key.address(), proxy)
            .call()
            .await
            .map_err(|e| AppError::Rpc(e.to_string()))?
            ._0;
        if all {
            return Ok(());
        }

        info!(%token, %proxy, %token_id, "Approving transfer proxy");
        let pending = erc721
            .approve(proxy, token_id)
            .send()
            .await
            .map_err(|e| AppError::Rpc(e.to_string()))?;
        let receipt = pending
            .with_required_confirmations(self.config.fill.confirmations)
            .with_timeout(Some(Duration::from_secs(self.config.fill.tx_timeout_secs)))
            .get_receipt()
            .await
            .map_err(|e| AppError::Rpc(e.to_string()))?;
        if !receipt.status() {
            return Err(AppError::Rpc(format!(
                "approve reverted in {}",
                receipt.transaction_hash
            )));
        }
        Ok(())
    }
}
