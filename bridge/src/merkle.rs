// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Keccak256 binary Merkle tree over 32-byte leaves.
//!
//! Nodes are combined as `keccak256(left || right)`, so the root depends on
//! leaf order. A level with an odd number of nodes pads its last node with
//! the root of an all-zero subtree of the same height ("default node"):
//!
//! * `default[0] = keccak256(uint256(0))`
//! * `default[k + 1] = keccak256(default[k] || default[k])`
//!
//! A tree of `n` leaves therefore always has depth `ceil(log2(n))`, and a
//! proof for any of its leaves carries exactly that many siblings.

use crate::error::{BridgeError, BridgeResult};
use ethers::types::H256;
use ethers::utils::keccak256;
use once_cell::sync::Lazy;

// usize leaf counts never need more levels than this.
const MAX_DEPTH: usize = usize::BITS as usize;

static DEFAULT_NODES: Lazy<Vec<H256>> = Lazy::new(|| {
    let mut defaults = Vec::with_capacity(MAX_DEPTH + 1);
    let mut node = H256::from(keccak256([0u8; 32]));
    defaults.push(node);
    for _ in 0..MAX_DEPTH {
        node = hash_pair(&node, &node);
        defaults.push(node);
    }
    defaults
});

pub fn hash_pair(left: &H256, right: &H256) -> H256 {
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(left.as_bytes());
    buf[32..].copy_from_slice(right.as_bytes());
    H256::from(keccak256(buf))
}

pub fn default_node(level: usize) -> H256 {
    DEFAULT_NODES[level]
}

/// Number of levels above the leaves, `ceil(log2(total_leaves))`.
pub fn tree_depth(total_leaves: usize) -> usize {
    match total_leaves {
        0 | 1 => 0,
        n => (usize::BITS - (n - 1).leading_zeros()) as usize,
    }
}

// Combines one level into the next, padding an odd tail with the default node.
fn next_level(nodes: &[H256], level: usize) -> Vec<H256> {
    nodes
        .chunks(2)
        .map(|pair| match pair {
            [left, right] => hash_pair(left, right),
            [left] => hash_pair(left, &default_node(level)),
            _ => unreachable!("chunks(2) yields one or two nodes"),
        })
        .collect()
}

pub fn compute_root(leaves: &[H256]) -> BridgeResult<H256> {
    if leaves.is_empty() {
        return Err(BridgeError::InvalidInput(
            "cannot compute the root of an empty tree".to_string(),
        ));
    }
    let mut nodes = leaves.to_vec();
    let mut level = 0;
    while nodes.len() > 1 {
        nodes = next_level(&nodes, level);
        level += 1;
    }
    Ok(nodes[0])
}

/// Siblings of `leaves[index]`, ordered from the leaf level upwards.
pub fn compute_siblings(leaves: &[H256], index: usize) -> BridgeResult<Vec<H256>> {
    if leaves.is_empty() {
        return Err(BridgeError::InvalidInput(
            "cannot build a proof for an empty tree".to_string(),
        ));
    }
    if index >= leaves.len() {
        return Err(BridgeError::InvalidInput(format!(
            "leaf index {index} out of range for {} leaves",
            leaves.len()
        )));
    }

    let mut siblings = Vec::with_capacity(tree_depth(leaves.len()));
    let mut nodes = leaves.to_vec();
    let mut position = index;
    let mut level = 0;
    while nodes.len() > 1 {
        let sibling = nodes
            .get(position ^ 1)
            .copied()
            .unwrap_or_else(|| default_node(level));
        siblings.push(sibling);
        nodes = next_level(&nodes, level);
        position >>= 1;
        level += 1;
    }
    Ok(siblings)
}

/// Folds `leaf` up the tree. Checks only the proof shape; the caller compares
/// the returned root with the committed one.
pub fn root_from_proof(
    leaf: &H256,
    index: usize,
    siblings: &[H256],
    total_leaves: usize,
) -> BridgeResult<H256> {
    if total_leaves == 0 {
        return Err(BridgeError::MalformedProof(
            "total leaves must be positive".to_string(),
        ));
    }
    if index >= total_leaves {
        return Err(BridgeError::MalformedProof(format!(
            "tree index {index} out of range for {total_leaves} leaves"
        )));
    }
    let depth = tree_depth(total_leaves);
    if siblings.len() != depth {
        return Err(BridgeError::MalformedProof(format!(
            "expected {depth} siblings for {total_leaves} leaves, got {}",
            siblings.len()
        )));
    }

    let mut node = *leaf;
    let mut position = index;
    for sibling in siblings {
        node = if position & 1 == 1 {
            hash_pair(sibling, &node)
        } else {
            hash_pair(&node, sibling)
        };
        position >>= 1;
    }
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    fn leaves(n: usize) -> Vec<H256> {
        (0..n)
            .map(|i| H256::from(keccak256((i as u64).to_be_bytes())))
            .collect()
    }

    #[test]
    fn test_default_nodes() {
        // keccak256(uint256(0))
        assert_eq!(
            default_node(0),
            H256::from(hex!(
                "290decd9548b62a8d60345a988386fc84ba6bc95484008f6362f93160ef3e563"
            ))
        );
        assert_eq!(default_node(1), hash_pair(&default_node(0), &default_node(0)));
    }

    #[test]
    fn test_tree_depth() {
        assert_eq!(tree_depth(1), 0);
        assert_eq!(tree_depth(2), 1);
        assert_eq!(tree_depth(3), 2);
        assert_eq!(tree_depth(4), 2);
        assert_eq!(tree_depth(5), 3);
        assert_eq!(tree_depth(8), 3);
        assert_eq!(tree_depth(9), 4);
    }

    #[test]
    fn test_single_leaf_root_is_leaf() {
        let l = leaves(1);
        assert_eq!(compute_root(&l).unwrap(), l[0]);
        assert!(compute_siblings(&l, 0).unwrap().is_empty());
    }

    #[test]
    fn test_odd_level_pads_with_default_node() {
        let l = leaves(3);
        let expected = hash_pair(
            &hash_pair(&l[0], &l[1]),
            &hash_pair(&l[2], &default_node(0)),
        );
        assert_eq!(compute_root(&l).unwrap(), expected);

        let siblings = compute_siblings(&l, 2).unwrap();
        assert_eq!(siblings, vec![default_node(0), hash_pair(&l[0], &l[1])]);
    }

    #[test]
    fn test_five_leaves_pads_upper_level() {
        let l = leaves(5);
        let left = hash_pair(&hash_pair(&l[0], &l[1]), &hash_pair(&l[2], &l[3]));
        let right = hash_pair(&hash_pair(&l[4], &default_node(0)), &default_node(1));
        assert_eq!(compute_root(&l).unwrap(), hash_pair(&left, &right));
    }

    #[test]
    fn test_root_from_proof_matches_root() {
        for n in 1..=9 {
            let l = leaves(n);
            let root = compute_root(&l).unwrap();
            for (i, leaf) in l.iter().enumerate() {
                let siblings = compute_siblings(&l, i).unwrap();
                assert_eq!(root_from_proof(leaf, i, &siblings, n).unwrap(), root);
            }
        }
    }

    #[test]
    fn test_empty_tree_is_rejected() {
        assert!(matches!(
            compute_root(&[]),
            Err(BridgeError::InvalidInput(_))
        ));
        assert!(matches!(
            compute_siblings(&[], 0),
            Err(BridgeError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_malformed_proof_shapes() {
        let l = leaves(4);
        let siblings = compute_siblings(&l, 1).unwrap();
        assert!(matches!(
            root_from_proof(&l[1], 1, &siblings, 0),
            Err(BridgeError::MalformedProof(_))
        ));
        assert!(matches!(
            root_from_proof(&l[1], 4, &siblings, 4),
            Err(BridgeError::MalformedProof(_))
        ));
        assert!(matches!(
            root_from_proof(&l[1], 1, &siblings[..1], 4),
            Err(BridgeError::MalformedProof(_))
        ));
        assert!(matches!(
            root_from_proof(&l[1], 1, &siblings, 2),
            Err(BridgeError::MalformedProof(_))
        ));
    }
}
