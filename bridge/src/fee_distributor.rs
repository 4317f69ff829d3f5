// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use crate::config::FeeDistributorConfig;
use crate::error::{BridgeError, BridgeResult};
use ethers::types::{Address, U256};
use parking_lot::Mutex;
use tracing::info;

pub const ONE_HUNDRED_PERCENT_BPS: u64 = 10_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkimmedFees {
    pub treasury: Address,
    pub treasury_amount: U256,
    pub public_goods: Address,
    pub public_goods_amount: U256,
}

/// Pool of message fees paid by a spoke bridge when it commits bundles.
#[derive(Debug)]
pub struct FeeDistributor {
    config: FeeDistributorConfig,
    balance: Mutex<U256>,
}

impl FeeDistributor {
    pub fn new(config: FeeDistributorConfig) -> BridgeResult<Self> {
        if config.min_public_goods_bps > ONE_HUNDRED_PERCENT_BPS {
            return Err(BridgeError::InvalidInput(format!(
                "min public goods bps {} exceeds {}",
                config.min_public_goods_bps, ONE_HUNDRED_PERCENT_BPS
            )));
        }
        Ok(Self {
            config,
            balance: Mutex::new(U256::zero()),
        })
    }

    pub fn config(&self) -> &FeeDistributorConfig {
        &self.config
    }

    pub fn pay_fees(&self, amount: U256) {
        let mut balance = self.balance.lock();
        *balance = balance.saturating_add(amount);
    }

    pub fn balance(&self) -> U256 {
        *self.balance.lock()
    }

    pub fn excess(&self) -> U256 {
        self.balance().saturating_sub(self.config.full_pool_size)
    }

    // Pays everything above the full pool size out to public goods and treasury.
    pub fn skim_excess(&self) -> BridgeResult<SkimmedFees> {
        let mut balance = self.balance.lock();
        let excess = balance.saturating_sub(self.config.full_pool_size);
        if excess.is_zero() {
            return Err(BridgeError::InvalidInput(format!(
                "no excess fees: balance {} within full pool size {}",
                *balance, self.config.full_pool_size
            )));
        }
        let public_goods_amount = excess
            .checked_mul(U256::from(self.config.min_public_goods_bps))
            .map(|v| v / U256::from(ONE_HUNDRED_PERCENT_BPS))
            .ok_or_else(|| BridgeError::Generic("fee overflow".to_string()))?;
        let treasury_amount = excess - public_goods_amount;
        *balance -= excess;
        info!(
            ?excess,
            ?public_goods_amount,
            ?treasury_amount,
            "Skimmed excess fees"
        );
        Ok(SkimmedFees {
            treasury: self.config.treasury,
            treasury_amount,
            public_goods: self.config.public_goods,
            public_goods_amount,
        })
    }
}
