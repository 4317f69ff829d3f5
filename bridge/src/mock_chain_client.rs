// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! A mock implementation of the chain client.

use crate::chain_client::ChainClient;
use crate::error::{BridgeError, BridgeResult};
use async_trait::async_trait;
use ethers::abi::Token;
use ethers::types::{Address, TransactionReceipt, TxHash, H256, U64};
use ethers::utils::keccak256;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDeployment {
    pub contract: String,
    pub args: Vec<Token>,
    pub address: Address,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub address: Address,
    pub method: String,
    pub args: Vec<Token>,
    pub tx_hash: TxHash,
}

// Mock client used in test environments.
#[derive(Clone, Debug, Default)]
pub struct MockChainClient {
    counter: Arc<AtomicU64>,
    deployments: Arc<Mutex<Vec<RecordedDeployment>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    receipts: Arc<Mutex<HashMap<TxHash, TransactionReceipt>>>,
    // Number of `wait_for_receipt` polls that fail before a receipt shows up.
    receipt_delay: Arc<AtomicU64>,
    pending_polls: Arc<Mutex<HashMap<TxHash, u64>>>,
    reverting_methods: Arc<Mutex<HashSet<String>>>,
    rejecting_methods: Arc<Mutex<HashSet<String>>>,
}

impl MockChainClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_digest(&self, domain: &str) -> H256 {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        H256::from(keccak256([domain.as_bytes(), &n.to_be_bytes()[..]].concat()))
    }

    // Calls to `method` are mined but revert.
    pub fn set_method_reverts(&self, method: &str) {
        self.reverting_methods.lock().insert(method.to_string());
    }

    // Calls to `method` are refused before submission.
    pub fn set_method_rejected(&self, method: &str) {
        self.rejecting_methods.lock().insert(method.to_string());
    }

    pub fn set_receipt_delay(&self, polls: u64) {
        self.receipt_delay.store(polls, Ordering::SeqCst);
    }

    pub fn deployments(&self) -> Vec<RecordedDeployment> {
        self.deployments.lock().clone()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn calls_to(&self, method: &str) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.method == method)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    type Error = BridgeError;

    async fn deploy(&self, contract: &str, args: Vec<Token>) -> BridgeResult<Address> {
        let address = Address::from(self.next_digest(contract));
        self.deployments.lock().push(RecordedDeployment {
            contract: contract.to_string(),
            args,
            address,
        });
        Ok(address)
    }

    async fn call(&self, address: Address, method: &str, args: Vec<Token>) -> BridgeResult<TxHash> {
        if self.rejecting_methods.lock().contains(method) {
            return Err(BridgeError::ChainClient(format!(
                "call to {method} on {address:?} rejected"
            )));
        }
        let tx_hash = self.next_digest(method);
        let status = if self.reverting_methods.lock().contains(method) {
            U64::zero()
        } else {
            U64::one()
        };
        self.receipts.lock().insert(
            tx_hash,
            TransactionReceipt {
                transaction_hash: tx_hash,
                to: Some(address),
                status: Some(status),
                ..Default::default()
            },
        );
        self.pending_polls
            .lock()
            .insert(tx_hash, self.receipt_delay.load(Ordering::SeqCst));
        self.calls.lock().push(RecordedCall {
            address,
            method: method.to_string(),
            args,
            tx_hash,
        });
        Ok(tx_hash)
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> BridgeResult<TransactionReceipt> {
        if let Some(remaining) = self.pending_polls.lock().get_mut(&tx_hash) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(BridgeError::ChainClient(format!(
                    "receipt for {tx_hash:?} not yet available"
                )));
            }
        }
        self.receipts
            .lock()
            .get(&tx_hash)
            .cloned()
            .ok_or_else(|| BridgeError::ChainClient(format!("unknown transaction {tx_hash:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain_client::is_receipt_successful;

    #[tokio::test]
    async fn test_deploy_and_call() {
        let client = MockChainClient::new();
        let hub = client
            .deploy("MockHubMessageBridge", vec![Token::Uint(1111.into())])
            .await
            .unwrap();
        let other = client.deploy("MockMessageReceiver", vec![]).await.unwrap();
        assert_ne!(hub, other);
        assert_eq!(client.deployments()[0].contract, "MockHubMessageBridge");

        let tx = client
            .call(hub, "setSpokeBridge", vec![Token::Uint(1112.into())])
            .await
            .unwrap();
        let receipt = client.wait_for_receipt(tx).await.unwrap();
        assert!(is_receipt_successful(&receipt));
        assert_eq!(receipt.to, Some(hub));
        assert_eq!(client.calls_to("setSpokeBridge").len(), 1);
    }

    #[tokio::test]
    async fn test_receipt_delay_and_failures() {
        let client = MockChainClient::new();
        let target = Address::repeat_byte(1);
        client.set_receipt_delay(2);
        client.set_method_reverts("relayMessage");
        let tx = client.call(target, "relayMessage", vec![]).await.unwrap();
        assert!(client.wait_for_receipt(tx).await.is_err());
        assert!(client.wait_for_receipt(tx).await.is_err());
        let receipt = client.wait_for_receipt(tx).await.unwrap();
        assert!(!is_receipt_successful(&receipt));

        assert!(client
            .wait_for_receipt(TxHash::repeat_byte(9))
            .await
            .is_err());

        client.set_method_rejected("sendMessage");
        assert!(matches!(
            client.call(target, "sendMessage", vec![]).await,
            Err(BridgeError::ChainClient(_))
        ));
        assert_eq!(client.calls().len(), 1);
    }
}
