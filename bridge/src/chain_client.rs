// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use crate::error::BridgeError;
use async_trait::async_trait;
use ethers::abi::Token;
use ethers::types::{Address, TransactionReceipt, TxHash, U64};

// Use a trait to abstract over a live chain connection and MockChainClient for testing.
#[async_trait]
pub trait ChainClient: Send + Sync {
    type Error: Into<BridgeError> + Send + Sync + std::error::Error + 'static;

    // Deploys `contract` with constructor `args`, returning its address.
    async fn deploy(&self, contract: &str, args: Vec<Token>) -> Result<Address, Self::Error>;

    // Submits a transaction calling `method` on `address`.
    async fn call(
        &self,
        address: Address,
        method: &str,
        args: Vec<Token>,
    ) -> Result<TxHash, Self::Error>;

    // Errors until the transaction has been included.
    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TransactionReceipt, Self::Error>;
}

pub fn is_receipt_successful(receipt: &TransactionReceipt) -> bool {
    receipt.status == Some(U64::one())
}
