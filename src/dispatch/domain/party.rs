//! Read-only summaries of the CRM records a task resolves to.
//!
//! The relational store owns clients, deals and policies; the dispatch
//! subsystem only ever sees these display projections, supplied by the
//! directory port alongside claimed tasks and scope queries.

use super::{ClientId, DealId, PolicyId};
use serde::{Deserialize, Serialize};

/// Display projection of a client record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSummary {
    /// Client identifier.
    pub id: ClientId,
    /// Client display name.
    pub name: String,
    /// Soft-delete flag; deleted clients never contribute to a scope.
    pub is_deleted: bool,
}

impl ClientSummary {
    /// Creates a live client summary.
    #[must_use]
    pub fn new(id: ClientId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            is_deleted: false,
        }
    }
}

/// Display projection of a deal record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealSummary {
    /// Deal identifier.
    pub id: DealId,
    /// Owning client.
    pub client_id: ClientId,
    /// Deal display title.
    pub title: String,
    /// Soft-delete flag; deleted deals never contribute to a scope.
    pub is_deleted: bool,
}

impl DealSummary {
    /// Creates a live deal summary.
    #[must_use]
    pub fn new(id: DealId, client_id: ClientId, title: impl Into<String>) -> Self {
        Self {
            id,
            client_id,
            title: title.into(),
            is_deleted: false,
        }
    }
}

/// Display projection of a policy record.
///
/// A policy always belongs to a client and may additionally belong to a
/// deal; tasks linked only to such a policy are indirectly scoped to that
/// deal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicySummary {
    /// Policy identifier.
    pub id: PolicyId,
    /// Owning client.
    pub client_id: ClientId,
    /// Owning deal, when the policy was issued under one.
    pub deal_id: Option<DealId>,
    /// Policy number as printed on the contract.
    pub number: String,
    /// Soft-delete flag; deleted policies never contribute to a scope.
    pub is_deleted: bool,
}

impl PolicySummary {
    /// Creates a live policy summary without a deal link.
    #[must_use]
    pub fn new(id: PolicyId, client_id: ClientId, number: impl Into<String>) -> Self {
        Self {
            id,
            client_id,
            deal_id: None,
            number: number.into(),
            is_deleted: false,
        }
    }

    /// Links the policy to the deal it was issued under.
    #[must_use]
    pub const fn with_deal(mut self, deal_id: DealId) -> Self {
        self.deal_id = Some(deal_id);
        self
    }
}
