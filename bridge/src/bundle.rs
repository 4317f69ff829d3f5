// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Message and bundle identification, and bundle inclusion proofs.
//!
//! A message id is `keccak256(abi.encode(nonce, fromChainId, from, toChainId,
//! to, data))`. Message ids of a bundle are the leaves of a Merkle tree (see
//! [`crate::merkle`]); the bundle id scopes the root to one route:
//! `keccak256(fromChainId || toChainId || bundleRoot)`.

use crate::error::{BridgeError, BridgeResult};
use crate::merkle;
use crate::types::{BundleId, BundleRoot, ChainId, Message, MessageId};
use ethers::abi::Token;
use ethers::types::H256;
use ethers::utils::keccak256;
use serde::{Deserialize, Serialize};

/// Inclusion proof of one message id in a committed bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleProof {
    pub bundle_id: BundleId,
    pub tree_index: u64,
    pub siblings: Vec<H256>,
    pub total_leaves: u64,
}

impl BundleProof {
    // ABI tuple `(bytes32 bundleId, uint256 treeIndex, bytes32[] siblings,
    // uint256 totalLeaves)`.
    pub fn to_token(&self) -> Token {
        Token::Tuple(vec![
            Token::FixedBytes(self.bundle_id.as_bytes().to_vec()),
            Token::Uint(self.tree_index.into()),
            Token::Array(
                self.siblings
                    .iter()
                    .map(|s| Token::FixedBytes(s.as_bytes().to_vec()))
                    .collect(),
            ),
            Token::Uint(self.total_leaves.into()),
        ])
    }
}

pub fn derive_message_id(message: &Message) -> MessageId {
    let encoded = ethers::abi::encode(&[
        Token::Uint(message.nonce),
        Token::Uint(message.from_chain_id),
        Token::Address(message.from),
        Token::Uint(message.to_chain_id),
        Token::Address(message.to),
        Token::Bytes(message.data.to_vec()),
    ]);
    H256::from(keccak256(encoded))
}

pub fn build_bundle_root(message_ids: &[MessageId]) -> BridgeResult<BundleRoot> {
    merkle::compute_root(message_ids)
}

pub fn derive_bundle_id(
    from_chain_id: ChainId,
    to_chain_id: ChainId,
    bundle_root: BundleRoot,
) -> BundleId {
    let mut buf = [0u8; 96];
    from_chain_id.to_big_endian(&mut buf[..32]);
    to_chain_id.to_big_endian(&mut buf[32..64]);
    buf[64..].copy_from_slice(bundle_root.as_bytes());
    H256::from(keccak256(buf))
}

pub fn build_proof(
    message_ids: &[MessageId],
    target_index: usize,
    from_chain_id: ChainId,
    to_chain_id: ChainId,
) -> BridgeResult<BundleProof> {
    let siblings = merkle::compute_siblings(message_ids, target_index)?;
    let bundle_root = build_bundle_root(message_ids)?;
    Ok(BundleProof {
        bundle_id: derive_bundle_id(from_chain_id, to_chain_id, bundle_root),
        tree_index: target_index as u64,
        siblings,
        total_leaves: message_ids.len() as u64,
    })
}

/// Returns `Ok(false)` when the proof is well formed but does not lead to
/// `expected_bundle_id` on the given route. Shape errors are `MalformedProof`.
///
/// `total_leaves` is not committed to by the bundle id and only fixes the
/// expected proof length. The padding node is never a member.
pub fn verify_proof(
    leaf: &MessageId,
    proof: &BundleProof,
    expected_bundle_id: &BundleId,
    from_chain_id: ChainId,
    to_chain_id: ChainId,
) -> BridgeResult<bool> {
    let tree_index = usize::try_from(proof.tree_index).map_err(|_| {
        BridgeError::MalformedProof(format!("tree index {} too large", proof.tree_index))
    })?;
    let total_leaves = usize::try_from(proof.total_leaves).map_err(|_| {
        BridgeError::MalformedProof(format!("total leaves {} too large", proof.total_leaves))
    })?;
    let root = merkle::root_from_proof(leaf, tree_index, &proof.siblings, total_leaves)?;
    if *leaf == merkle::default_node(0) {
        return Ok(false);
    }
    let bundle_id = derive_bundle_id(from_chain_id, to_chain_id, root);
    Ok(bundle_id == *expected_bundle_id && bundle_id == proof.bundle_id)
}

// Same as `verify_proof`, but a mismatch is reported as `ProofMismatch`.
pub fn verify_proof_strict(
    leaf: &MessageId,
    proof: &BundleProof,
    expected_bundle_id: &BundleId,
    from_chain_id: ChainId,
    to_chain_id: ChainId,
) -> BridgeResult<()> {
    if verify_proof(leaf, proof, expected_bundle_id, from_chain_id, to_chain_id)? {
        Ok(())
    } else {
        Err(BridgeError::ProofMismatch {
            bundle_id: *expected_bundle_id,
        })
    }
}
