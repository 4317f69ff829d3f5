// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use crate::types::{BundleId, ChainId, MessageId};
use ethers::types::U256;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    // Malformed message fields, empty bundles, out-of-range indices
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    // Proof shape does not fit the claimed tree
    #[error("Malformed proof: {0}")]
    MalformedProof(String),
    #[error("Proof does not match bundle {bundle_id:?}")]
    ProofMismatch { bundle_id: BundleId },
    #[error("Unknown bundle {0:?}")]
    UnknownBundle(BundleId),
    #[error("Message {0:?} has already been relayed")]
    MessageAlreadyRelayed(MessageId),
    #[error("Unsupported route from chain {from} to chain {to}")]
    UnsupportedRoute { from: ChainId, to: ChainId },
    #[error("Insufficient fee: required {required}, paid {paid}")]
    InsufficientFee { required: U256, paid: U256 },
    #[error("Chain client error: {0}")]
    ChainClient(String),
    #[error("Generic error: {0}")]
    Generic(String),
}

pub type BridgeResult<T> = Result<T, BridgeError>;
