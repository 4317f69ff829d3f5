// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Sending side of a spoke bridge: nonce assignment, bundling of outgoing
//! message ids per destination, and bundle commitment.

use crate::bundle::{build_bundle_root, derive_bundle_id, derive_message_id};
use crate::error::{BridgeError, BridgeResult};
use crate::fee_distributor::FeeDistributor;
use crate::types::{ChainId, CommittedBundle, Message, MessageId, Route};
use ethers::types::{Address, Bytes, U256};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

// Nonce of the first message a spoke sends.
pub const FIRST_NONCE: u64 = 1;

#[derive(Debug, Default)]
struct PendingBundle {
    message_ids: Vec<MessageId>,
    fees: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub message: Message,
    pub message_id: MessageId,
    // Set when this message filled the pending bundle.
    pub committed: Option<CommittedBundle>,
}

pub struct SpokeBridge {
    chain_id: ChainId,
    hub_chain_id: ChainId,
    routes: BTreeMap<ChainId, Route>,
    fee_distributor: Arc<FeeDistributor>,
    nonce: U256,
    pending: BTreeMap<ChainId, PendingBundle>,
    committed: Vec<CommittedBundle>,
}

impl SpokeBridge {
    pub fn new(
        chain_id: ChainId,
        hub_chain_id: ChainId,
        routes: Vec<Route>,
        fee_distributor: Arc<FeeDistributor>,
    ) -> BridgeResult<Self> {
        let mut route_map = BTreeMap::new();
        for route in routes {
            if route.max_bundle_messages == 0 {
                return Err(BridgeError::InvalidInput(format!(
                    "route to chain {} must allow at least one message per bundle",
                    route.chain_id
                )));
            }
            if route.chain_id == chain_id {
                return Err(BridgeError::InvalidInput(format!(
                    "route from chain {chain_id} to itself"
                )));
            }
            let destination = route.chain_id;
            if route_map.insert(destination, route).is_some() {
                return Err(BridgeError::InvalidInput(format!(
                    "duplicated route to chain {destination}"
                )));
            }
        }
        Ok(Self {
            chain_id,
            hub_chain_id,
            routes: route_map,
            fee_distributor,
            nonce: U256::from(FIRST_NONCE),
            pending: BTreeMap::new(),
            committed: vec![],
        })
    }

    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    pub fn hub_chain_id(&self) -> ChainId {
        self.hub_chain_id
    }

    // Nonce the next sent message will get.
    pub fn nonce(&self) -> U256 {
        self.nonce
    }

    pub fn route(&self, to_chain_id: ChainId) -> Option<&Route> {
        self.routes.get(&to_chain_id)
    }

    pub fn send_message(
        &mut self,
        sender: Address,
        to_chain_id: ChainId,
        to: Address,
        data: Bytes,
        value: U256,
        now: u64,
    ) -> BridgeResult<SentMessage> {
        let route = self
            .routes
            .get(&to_chain_id)
            .cloned()
            .ok_or(BridgeError::UnsupportedRoute {
                from: self.chain_id,
                to: to_chain_id,
            })?;
        if value < route.message_fee {
            return Err(BridgeError::InsufficientFee {
                required: route.message_fee,
                paid: value,
            });
        }

        let message = Message::new(self.nonce, self.chain_id, sender, to_chain_id, to, data);
        message.validate()?;
        let message_id = derive_message_id(&message);
        self.nonce += U256::one();

        let pending = self.pending.entry(to_chain_id).or_default();
        pending.message_ids.push(message_id);
        pending.fees = pending.fees.saturating_add(value);
        debug!(
            ?message_id,
            nonce = %message.nonce,
            to_chain_id = %to_chain_id,
            pending = pending.message_ids.len(),
            "Message sent"
        );

        let committed = if pending.message_ids.len() as u64 >= route.max_bundle_messages {
            Some(self.commit_pending_bundle(to_chain_id, now)?)
        } else {
            None
        };
        Ok(SentMessage {
            message,
            message_id,
            committed,
        })
    }

    pub fn pending_message_ids(&self, to_chain_id: ChainId) -> &[MessageId] {
        self.pending
            .get(&to_chain_id)
            .map(|p| p.message_ids.as_slice())
            .unwrap_or_default()
    }

    pub fn commit_pending_bundle(
        &mut self,
        to_chain_id: ChainId,
        commit_time: u64,
    ) -> BridgeResult<CommittedBundle> {
        let pending = match self.pending.remove(&to_chain_id) {
            Some(pending) if !pending.message_ids.is_empty() => pending,
            _ => {
                return Err(BridgeError::InvalidInput(format!(
                    "no pending messages to chain {to_chain_id}"
                )))
            }
        };
        let bundle_root = build_bundle_root(&pending.message_ids)?;
        let bundle_id = derive_bundle_id(self.chain_id, to_chain_id, bundle_root);
        self.fee_distributor.pay_fees(pending.fees);

        let bundle = CommittedBundle {
            bundle_id,
            bundle_root,
            from_chain_id: self.chain_id,
            to_chain_id,
            message_ids: pending.message_ids,
            fees: pending.fees,
            commit_time,
        };
        info!(
            ?bundle_id,
            to_chain_id = %to_chain_id,
            messages = bundle.message_ids.len(),
            fees = %bundle.fees,
            "Bundle committed"
        );
        self.committed.push(bundle.clone());
        Ok(bundle)
    }

    pub fn committed_bundles(&self) -> &[CommittedBundle] {
        &self.committed
    }
}
