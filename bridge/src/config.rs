// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use crate::fee_distributor::ONE_HUNDRED_PERCENT_BPS;
use crate::types::{ChainId, Route};
use anyhow::anyhow;
use ethers::types::{Address, U256};
use message_bridge_config::Config;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct FeeDistributorConfig {
    // Hub bridge allowed to pay out of the distributor. Kept for deployment
    // configs; the in-process distributor does not check callers.
    pub hub_bridge: Address,
    // Receives the share of skimmed fees not sent to public goods.
    pub treasury: Address,
    pub public_goods: Address,
    // Minimum public goods share, in units of 1/ONE_HUNDRED_PERCENT_BPS.
    pub min_public_goods_bps: u64,
    // Balance kept in the pool; anything above it can be skimmed.
    pub full_pool_size: U256,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SpokeConfig {
    pub chain_id: ChainId,
    // Challenge period the hub applies to bundles coming from this spoke, in seconds.
    pub exit_time: u64,
    // Destinations reachable from this spoke.
    pub routes: Vec<Route>,
    pub fee_distributor: FeeDistributorConfig,
}

#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RelayConfig {
    // Give up waiting for a relay receipt after this long.
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(default = "default_receipt_timeout")]
    pub receipt_timeout: Duration,
}

fn default_receipt_timeout() -> Duration {
    Duration::from_secs(30)
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            receipt_timeout: default_receipt_timeout(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BridgeConfig {
    pub hub_chain_id: ChainId,
    pub spokes: Vec<SpokeConfig>,
    #[serde(default)]
    pub relay: RelayConfig,
}

impl Config for BridgeConfig {}

impl BridgeConfig {
    pub fn spoke(&self, chain_id: ChainId) -> Option<&SpokeConfig> {
        self.spokes.iter().find(|s| s.chain_id == chain_id)
    }

    pub fn is_known_chain(&self, chain_id: ChainId) -> bool {
        chain_id == self.hub_chain_id || self.spoke(chain_id).is_some()
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        info!("Starting config validation");
        if self.hub_chain_id.is_zero() {
            return Err(anyhow!("Hub chain id must be non-zero"));
        }
        let mut seen = HashSet::new();
        for spoke in &self.spokes {
            if spoke.chain_id.is_zero() || spoke.chain_id == self.hub_chain_id {
                return Err(anyhow!(
                    "Spoke chain id {} must be non-zero and differ from hub chain id {}",
                    spoke.chain_id,
                    self.hub_chain_id
                ));
            }
            if !seen.insert(spoke.chain_id) {
                return Err(anyhow!("Duplicated spoke chain id {}", spoke.chain_id));
            }
            if spoke.fee_distributor.min_public_goods_bps > ONE_HUNDRED_PERCENT_BPS {
                return Err(anyhow!(
                    "Spoke {}: min public goods bps {} exceeds {}",
                    spoke.chain_id,
                    spoke.fee_distributor.min_public_goods_bps,
                    ONE_HUNDRED_PERCENT_BPS
                ));
            }
            for route in &spoke.routes {
                if route.chain_id == spoke.chain_id || !self.is_known_chain(route.chain_id) {
                    return Err(anyhow!(
                        "Spoke {} has an invalid route to chain {}",
                        spoke.chain_id,
                        route.chain_id
                    ));
                }
                if route.max_bundle_messages == 0 {
                    return Err(anyhow!(
                        "Spoke {}: route to {} must allow at least one message per bundle",
                        spoke.chain_id,
                        route.chain_id
                    ));
                }
            }
        }
        info!(
            "Config validated: hub chain {}, {} spoke(s)",
            self.hub_chain_id,
            self.spokes.len()
        );
        Ok(())
    }
}

// Generate a bridge config template and write it to a file.
pub fn generate_bridge_config_and_write_to_file(path: &PathBuf) -> anyhow::Result<()> {
    let hub_chain_id = ChainId::from(5u64);
    let config = BridgeConfig {
        hub_chain_id,
        spokes: vec![SpokeConfig {
            chain_id: ChainId::from(420u64),
            exit_time: 604800,
            routes: vec![Route {
                chain_id: hub_chain_id,
                message_fee: U256::from(100u64),
                max_bundle_messages: 2,
            }],
            fee_distributor: FeeDistributorConfig {
                hub_bridge: Address::zero(),
                treasury: Address::zero(),
                public_goods: Address::zero(),
                min_public_goods_bps: 100_000,
                full_pool_size: U256::from(100_000u64),
            },
        }],
        relay: RelayConfig::default(),
    };
    config.save(path)
}
