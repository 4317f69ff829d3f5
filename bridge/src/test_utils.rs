// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use crate::config::{BridgeConfig, FeeDistributorConfig, RelayConfig, SpokeConfig};
use crate::types::{set_result_calldata, Message, MessageId, Route};
use ethers::types::{Address, H256, U256};
use std::str::FromStr;

pub const ONE_WEEK: u64 = 604800;
pub const HUB_CHAIN_ID: u64 = 1111;
pub const SPOKE_CHAIN_ID: u64 = 1112;
pub const RESULT: u64 = 12345;
pub const MESSAGE_FEE: u64 = 100;
pub const MAX_BUNDLE_MESSAGES: u64 = 2;
pub const TREASURY: &str = "0x1111000000000000000000000000000000001111";
pub const PUBLIC_GOODS: &str = "0x2222000000000000000000000000000000002222";
pub const MIN_PUBLIC_GOODS_BPS: u64 = 100_000;
pub const FULL_POOL_SIZE: u64 = 100_000;

pub fn random_message_ids(n: usize) -> Vec<MessageId> {
    (0..n).map(|_| H256::random()).collect()
}

pub fn sender_address() -> Address {
    Address::repeat_byte(0x5e)
}

pub fn receiver_address() -> Address {
    Address::repeat_byte(0x7e)
}

// A spoke-to-hub `setResult(RESULT)` message.
pub fn test_message(nonce: u64) -> Message {
    Message::new(
        nonce.into(),
        SPOKE_CHAIN_ID.into(),
        sender_address(),
        HUB_CHAIN_ID.into(),
        receiver_address(),
        set_result_calldata(U256::from(RESULT)),
    )
}

pub fn test_bridge_config(spoke_chain_ids: &[u64]) -> BridgeConfig {
    BridgeConfig {
        hub_chain_id: HUB_CHAIN_ID.into(),
        spokes: spoke_chain_ids
            .iter()
            .map(|chain_id| SpokeConfig {
                chain_id: (*chain_id).into(),
                exit_time: ONE_WEEK,
                routes: vec![Route {
                    chain_id: HUB_CHAIN_ID.into(),
                    message_fee: MESSAGE_FEE.into(),
                    max_bundle_messages: MAX_BUNDLE_MESSAGES,
                }],
                fee_distributor: test_fee_distributor_config(),
            })
            .collect(),
        relay: RelayConfig::default(),
    }
}

pub fn test_fee_distributor_config() -> FeeDistributorConfig {
    FeeDistributorConfig {
        hub_bridge: Address::repeat_byte(0xbb),
        treasury: Address::from_str(TREASURY).unwrap(),
        public_goods: Address::from_str(PUBLIC_GOODS).unwrap(),
        min_public_goods_bps: MIN_PUBLIC_GOODS_BPS,
        full_pool_size: FULL_POOL_SIZE.into(),
    }
}
