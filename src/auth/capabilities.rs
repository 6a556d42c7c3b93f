//! Role resolution and capability flags.
//!
//! A profile's role is resolved once per session change into a closed set of
//! capability booleans; everything downstream consumes the flags as plain
//! gates and never re-derives role logic ad hoc.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::profile;
use crate::errors::ServiceError;
use crate::fulfillment::Actor;

/// The closed set of profile roles.
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
pub enum Role {
    Admin,
    Manager,
    Driver,
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }

    /// Staff roles may hold back-office accounts provisioned by an admin.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Manager | Role::Driver)
    }
}

/// Capability flags derived purely from the profile's role and assignment.
/// These are gates, never identity: `profile_id` is carried separately for
/// attribution (e.g. the cashier on a POS sale).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Capabilities {
    pub profile_id: Uuid,
    pub role: Role,
    pub is_admin: bool,
    pub is_manager: bool,
    pub is_driver: bool,
    pub assigned_location: Option<Uuid>,
}

impl Capabilities {
    /// Derive capabilities from a profile row. Re-run on every profile
    /// change: a role or location reassignment takes effect on the next
    /// resolution, never retroactively on cached state.
    pub fn resolve(profile: &profile::Model) -> Result<Self, ServiceError> {
        let role = profile.role()?;
        Ok(Self {
            profile_id: profile.id,
            role,
            is_admin: role == Role::Admin,
            is_manager: role == Role::Manager,
            is_driver: role == Role::Driver,
            assigned_location: profile.assigned_location_id,
        })
    }

    /// Whether this capability set may trigger transitions owned by the
    /// given actor class.
    pub fn acts_as(&self, actor: Actor) -> bool {
        match actor {
            Actor::Staff => self.is_admin || self.is_manager,
            Actor::Driver => self.is_driver,
        }
    }
}

/// An entry surface of the system. Login and every authenticated request
/// check the role against the portal's allowed set; a mismatch is an
/// access-denied failure, distinct from bad credentials.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Portal {
    /// The operations dashboard: admins, managers, and drivers.
    BackOffice,
    /// The courier task surface: drivers only.
    Driver,
}

impl Portal {
    pub fn admits(&self, role: Role) -> bool {
        match self {
            Portal::BackOffice => role.is_staff(),
            Portal::Driver => role == Role::Driver,
        }
    }
}
