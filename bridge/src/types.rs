// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use crate::error::{BridgeError, BridgeResult};
use ethers::abi::{ParamType, Token};
use ethers::types::{Address, Bytes, H256, U256};
use serde::{Deserialize, Serialize};

pub type ChainId = U256;
pub type MessageId = H256;
pub type BundleRoot = H256;
pub type BundleId = H256;

/// A cross-chain message as seen by the sending spoke.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub nonce: U256,
    pub from_chain_id: ChainId,
    pub from: Address,
    pub to_chain_id: ChainId,
    pub to: Address,
    pub data: Bytes,
}

impl Message {
    pub fn new(
        nonce: U256,
        from_chain_id: ChainId,
        from: Address,
        to_chain_id: ChainId,
        to: Address,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            nonce,
            from_chain_id,
            from,
            to_chain_id,
            to,
            data: data.into(),
        }
    }

    // A message must cross chains and name real chains on both ends.
    pub fn validate(&self) -> BridgeResult<()> {
        if self.from_chain_id.is_zero() || self.to_chain_id.is_zero() {
            return Err(BridgeError::InvalidInput(format!(
                "chain ids must be non-zero, got from {} to {}",
                self.from_chain_id, self.to_chain_id
            )));
        }
        if self.from_chain_id == self.to_chain_id {
            return Err(BridgeError::InvalidInput(format!(
                "message must cross chains, got {} -> {}",
                self.from_chain_id, self.to_chain_id
            )));
        }
        Ok(())
    }
}

/// Per-destination settings a spoke uses when bundling outgoing messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Route {
    pub chain_id: ChainId,
    pub message_fee: U256,
    pub max_bundle_messages: u64,
}

/// A bundle whose root has been committed by the sending spoke.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommittedBundle {
    pub bundle_id: BundleId,
    pub bundle_root: BundleRoot,
    pub from_chain_id: ChainId,
    pub to_chain_id: ChainId,
    pub message_ids: Vec<MessageId>,
    pub fees: U256,
    pub commit_time: u64,
}

// 4-byte selector followed by the ABI encoded arguments.
pub fn encode_function_call(name: &str, params: &[ParamType], args: &[Token]) -> Bytes {
    let mut call_data = ethers::abi::short_signature(name, params).to_vec();
    call_data.extend(ethers::abi::encode(args));
    call_data.into()
}

// Calldata for `setResult(uint256)` on the demo message receiver.
pub fn set_result_calldata(result: U256) -> Bytes {
    encode_function_call("setResult", &[ParamType::Uint(256)], &[Token::Uint(result)])
}
