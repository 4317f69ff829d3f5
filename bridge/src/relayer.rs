// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use crate::bundle::{build_proof, derive_message_id, verify_proof_strict, BundleProof};
use crate::chain_client::{is_receipt_successful, ChainClient};
use crate::config::RelayConfig;
use crate::error::{BridgeError, BridgeResult};
use crate::retry_with_max_elapsed_time;
use crate::types::{ChainId, CommittedBundle, Message};
use ethers::abi::Token;
use ethers::types::{Address, TransactionReceipt};
use std::sync::Arc;
use tracing::{error, info};

pub const RELAY_MESSAGE_METHOD: &str = "relayMessage";

/// Submits proven messages of committed bundles to the destination bridge.
pub struct MessageRelayer<C> {
    client: Arc<C>,
    bridge_address: Address,
    chain_id: ChainId,
    config: RelayConfig,
}

impl<C: ChainClient> MessageRelayer<C> {
    pub fn new(
        client: Arc<C>,
        bridge_address: Address,
        chain_id: ChainId,
        config: RelayConfig,
    ) -> Self {
        Self {
            client,
            bridge_address,
            chain_id,
            config,
        }
    }

    // Arguments of `relayMessage(nonce, fromChainId, from, to, data, proof)`.
    pub fn relay_message_args(message: &Message, proof: &BundleProof) -> Vec<Token> {
        vec![
            Token::Uint(message.nonce),
            Token::Uint(message.from_chain_id),
            Token::Address(message.from),
            Token::Address(message.to),
            Token::Bytes(message.data.to_vec()),
            proof.to_token(),
        ]
    }

    /// Relays every message of `bundle`. `messages` must be given in bundle order.
    pub async fn relay_bundle(
        &self,
        bundle: &CommittedBundle,
        messages: &[Message],
    ) -> BridgeResult<Vec<TransactionReceipt>> {
        if bundle.to_chain_id != self.chain_id {
            return Err(BridgeError::UnsupportedRoute {
                from: bundle.from_chain_id,
                to: bundle.to_chain_id,
            });
        }
        if messages.len() != bundle.message_ids.len() {
            return Err(BridgeError::InvalidInput(format!(
                "bundle {:?} has {} messages, got {}",
                bundle.bundle_id,
                bundle.message_ids.len(),
                messages.len()
            )));
        }
        for (index, (message, expected)) in messages.iter().zip(&bundle.message_ids).enumerate() {
            if derive_message_id(message) != *expected {
                return Err(BridgeError::InvalidInput(format!(
                    "message at index {index} does not match bundle leaf {expected:?}"
                )));
            }
        }

        let mut receipts = Vec::with_capacity(messages.len());
        for (index, message) in messages.iter().enumerate() {
            let proof = build_proof(
                &bundle.message_ids,
                index,
                bundle.from_chain_id,
                bundle.to_chain_id,
            )?;
            verify_proof_strict(
                &bundle.message_ids[index],
                &proof,
                &bundle.bundle_id,
                bundle.from_chain_id,
                bundle.to_chain_id,
            )?;
            receipts.push(self.relay_message(message, &proof).await?);
        }
        Ok(receipts)
    }

    pub async fn relay_message(
        &self,
        message: &Message,
        proof: &BundleProof,
    ) -> BridgeResult<TransactionReceipt> {
        let tx_hash = self
            .client
            .call(
                self.bridge_address,
                RELAY_MESSAGE_METHOD,
                Self::relay_message_args(message, proof),
            )
            .await
            .map_err(Into::<BridgeError>::into)?;

        let receipt = match retry_with_max_elapsed_time!(
            self.client.wait_for_receipt(tx_hash),
            self.config.receipt_timeout
        ) {
            Ok(Ok(receipt)) => receipt,
            Ok(Err(e)) | Err(e) => {
                error!(?tx_hash, "Failed to get relay receipt: {:?}", e);
                return Err(e.into());
            }
        };
        if !is_receipt_successful(&receipt) {
            error!(?tx_hash, bundle_id = ?proof.bundle_id, "Relay transaction reverted");
            return Err(BridgeError::ChainClient(format!(
                "relay transaction {tx_hash:?} reverted"
            )));
        }
        info!(
            ?tx_hash,
            bundle_id = ?proof.bundle_id,
            tree_index = proof.tree_index,
            "Message relayed"
        );
        Ok(receipt)
    }
}
