//! Order fulfillment status machine.
//!
//! Transition legality depends on the pair (status, fulfillment kind), not on
//! the status alone: a packed courier order and a packed pickup order have
//! different (and mutually exclusive) next states. The table below is the
//! single source of truth; services and the driver task view both derive
//! from it.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use utoipa::ToSchema;

/// Lifecycle status of an order.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OrderStatus {
    Paid,
    Packed,
    Transit,
    Ready,
    Delivered,
    Collected,
    PosComplete,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }

    /// Terminal statuses accept no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Delivered | OrderStatus::Collected | OrderStatus::PosComplete
        )
    }
}

/// How an order leaves the store.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FulfillmentKind {
    Pickup,
    Courier,
    WarehousePickup,
    Pos,
}

impl FulfillmentKind {
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }

    /// Point-of-sale orders are created already complete.
    pub fn initial_status(&self) -> OrderStatus {
        match self {
            FulfillmentKind::Pos => OrderStatus::PosComplete,
            _ => OrderStatus::Paid,
        }
    }
}

/// Which role class may trigger a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Actor {
    Staff,
    Driver,
}

/// One row of the transition table.
#[derive(Clone, Copy, Debug)]
pub struct Transition {
    pub from: OrderStatus,
    /// `None` means the transition applies to every fulfillment kind.
    pub kind: Option<FulfillmentKind>,
    pub to: OrderStatus,
    pub actor: Actor,
    pub action: &'static str,
}

/// The legal transitions. Warehouse pickups follow the pickup branch: the
/// customer collects at the originating warehouse, so there is no courier leg.
pub const TRANSITIONS: &[Transition] = &[
    Transition {
        from: OrderStatus::Paid,
        kind: None,
        to: OrderStatus::Packed,
        actor: Actor::Staff,
        action: "pack_order",
    },
    Transition {
        from: OrderStatus::Packed,
        kind: Some(FulfillmentKind::Courier),
        to: OrderStatus::Transit,
        actor: Actor::Staff,
        action: "dispatch_to_courier",
    },
    Transition {
        from: OrderStatus::Packed,
        kind: Some(FulfillmentKind::Pickup),
        to: OrderStatus::Ready,
        actor: Actor::Staff,
        action: "ready_for_collection",
    },
    Transition {
        from: OrderStatus::Packed,
        kind: Some(FulfillmentKind::WarehousePickup),
        to: OrderStatus::Ready,
        actor: Actor::Staff,
        action: "ready_for_collection",
    },
    Transition {
        from: OrderStatus::Transit,
        kind: Some(FulfillmentKind::Courier),
        to: OrderStatus::Delivered,
        actor: Actor::Driver,
        action: "mark_delivered",
    },
    Transition {
        from: OrderStatus::Ready,
        kind: Some(FulfillmentKind::Pickup),
        to: OrderStatus::Collected,
        actor: Actor::Staff,
        action: "mark_collected",
    },
    Transition {
        from: OrderStatus::Ready,
        kind: Some(FulfillmentKind::WarehousePickup),
        to: OrderStatus::Collected,
        actor: Actor::Staff,
        action: "mark_collected",
    },
];

/// A courier order is a driver task while in transit; a store pickup is a
/// driver task while packed (the relocation leg to the pickup point). Once a
/// pickup order is ready it is a staff/customer concern.
pub const DRIVER_TASK_STATES: &[(OrderStatus, FulfillmentKind)] = &[
    (OrderStatus::Transit, FulfillmentKind::Courier),
    (OrderStatus::Packed, FulfillmentKind::Pickup),
];

/// The single legal next transition for a composite state, if any.
pub fn next_transition(status: OrderStatus, kind: FulfillmentKind) -> Option<&'static Transition> {
    TRANSITIONS
        .iter()
        .find(|t| t.from == status && (t.kind.is_none() || t.kind == Some(kind)))
}

/// Whether `status -> to` is legal for the given fulfillment kind.
pub fn can_transition(status: OrderStatus, kind: FulfillmentKind, to: OrderStatus) -> bool {
    next_transition(status, kind).map(|t| t.to) == Some(to)
}

/// Derived driver-task membership. Re-derive on every read: it changes on
/// every status-changing write from any actor.
pub fn is_driver_task(status: OrderStatus, kind: FulfillmentKind) -> bool {
    DRIVER_TASK_STATES.contains(&(status, kind))
}
