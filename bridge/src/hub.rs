// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Receiving side on the hub: bundle commitments arriving from spokes and
//! relay of individual messages proven against them.

use crate::bundle::{derive_bundle_id, derive_message_id, verify_proof_strict, BundleProof};
use crate::error::{BridgeError, BridgeResult};
use crate::types::{BundleId, BundleRoot, ChainId, CommittedBundle, Message, MessageId};
use ethers::types::{Address, Bytes, U256};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpokeRegistration {
    pub chain_id: ChainId,
    pub exit_time: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBundle {
    pub bundle_root: BundleRoot,
    pub from_chain_id: ChainId,
    pub fees: U256,
    pub commit_time: u64,
    // `commit_time` plus the source spoke's exit time.
    pub exit_deadline: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleRoute {
    // Addressed to the hub and kept for relay.
    Stored,
    // Addressed to another spoke; the hub only passes it on.
    Forward(ChainId),
}

/// What the receiving contract observes when a message is relayed to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayedMessage {
    pub message_id: MessageId,
    pub x_domain_sender: Address,
    pub x_domain_chain_id: ChainId,
    pub to: Address,
    pub data: Bytes,
}

pub struct HubBridge {
    chain_id: ChainId,
    spokes: BTreeMap<ChainId, SpokeRegistration>,
    bundles: HashMap<BundleId, StoredBundle>,
    relayed: HashSet<MessageId>,
}

impl HubBridge {
    pub fn new(chain_id: ChainId) -> Self {
        Self {
            chain_id,
            spokes: BTreeMap::new(),
            bundles: HashMap::new(),
            relayed: HashSet::new(),
        }
    }

    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    pub fn set_spoke_bridge(&mut self, chain_id: ChainId, exit_time: u64) -> BridgeResult<()> {
        if chain_id.is_zero() || chain_id == self.chain_id {
            return Err(BridgeError::InvalidInput(format!(
                "cannot register chain {chain_id} as a spoke of hub {}",
                self.chain_id
            )));
        }
        if let Some(previous) = self.spokes.insert(
            chain_id,
            SpokeRegistration {
                chain_id,
                exit_time,
            },
        ) {
            warn!(
                chain_id = %chain_id,
                previous_exit_time = previous.exit_time,
                "Spoke bridge registration replaced"
            );
        }
        Ok(())
    }

    pub fn spoke(&self, chain_id: ChainId) -> Option<&SpokeRegistration> {
        self.spokes.get(&chain_id)
    }

    pub fn receive_or_forward_bundle(
        &mut self,
        bundle: &CommittedBundle,
    ) -> BridgeResult<BundleRoute> {
        let Some(source) = self.spokes.get(&bundle.from_chain_id) else {
            return Err(BridgeError::UnsupportedRoute {
                from: bundle.from_chain_id,
                to: bundle.to_chain_id,
            });
        };
        let exit_deadline = bundle.commit_time.saturating_add(source.exit_time);
        let bundle_id =
            derive_bundle_id(bundle.from_chain_id, bundle.to_chain_id, bundle.bundle_root);
        if bundle_id != bundle.bundle_id {
            return Err(BridgeError::InvalidInput(format!(
                "bundle id {:?} does not match its root and route (expected {:?})",
                bundle.bundle_id, bundle_id
            )));
        }

        if bundle.to_chain_id != self.chain_id {
            if self.spokes.contains_key(&bundle.to_chain_id) {
                info!(?bundle_id, to_chain_id = %bundle.to_chain_id, "Forwarding bundle");
                return Ok(BundleRoute::Forward(bundle.to_chain_id));
            }
            return Err(BridgeError::UnsupportedRoute {
                from: bundle.from_chain_id,
                to: bundle.to_chain_id,
            });
        }

        if self.bundles.contains_key(&bundle_id) {
            return Err(BridgeError::InvalidInput(format!(
                "bundle {bundle_id:?} already received"
            )));
        }
        self.bundles.insert(
            bundle_id,
            StoredBundle {
                bundle_root: bundle.bundle_root,
                from_chain_id: bundle.from_chain_id,
                fees: bundle.fees,
                commit_time: bundle.commit_time,
                exit_deadline,
            },
        );
        info!(
            ?bundle_id,
            from_chain_id = %bundle.from_chain_id,
            exit_deadline,
            "Bundle received"
        );
        Ok(BundleRoute::Stored)
    }

    pub fn bundle(&self, bundle_id: &BundleId) -> Option<&StoredBundle> {
        self.bundles.get(bundle_id)
    }

    pub fn relay_message(
        &mut self,
        nonce: U256,
        from_chain_id: ChainId,
        from: Address,
        to: Address,
        data: Bytes,
        proof: &BundleProof,
    ) -> BridgeResult<RelayedMessage> {
        let stored = self
            .bundles
            .get(&proof.bundle_id)
            .ok_or(BridgeError::UnknownBundle(proof.bundle_id))?;
        if stored.from_chain_id != from_chain_id {
            return Err(BridgeError::ProofMismatch {
                bundle_id: proof.bundle_id,
            });
        }

        let message = Message::new(nonce, from_chain_id, from, self.chain_id, to, data);
        let message_id = derive_message_id(&message);
        verify_proof_strict(
            &message_id,
            proof,
            &proof.bundle_id,
            from_chain_id,
            self.chain_id,
        )?;

        if !self.relayed.insert(message_id) {
            return Err(BridgeError::MessageAlreadyRelayed(message_id));
        }
        info!(
            ?message_id,
            bundle_id = ?proof.bundle_id,
            tree_index = proof.tree_index,
            "Message relayed"
        );
        Ok(RelayedMessage {
            message_id,
            x_domain_sender: message.from,
            x_domain_chain_id: message.from_chain_id,
            to: message.to,
            data: message.data,
        })
    }

    pub fn is_message_relayed(&self, message_id: &MessageId) -> bool {
        self.relayed.contains(message_id)
    }
}
