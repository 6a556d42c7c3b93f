//! Role-scoped query composition.
//!
//! Every list/read path derives a [`Visibility`] from the session's
//! capabilities and narrows its base query through it. Derivation happens on
//! every request: a role or location reassignment changes what the next
//! fetch returns, never what a cached query returned.

use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, Select};
use uuid::Uuid;

use crate::auth::capabilities::{Capabilities, Role};
use crate::entities::{inventory_level, order};
use crate::fulfillment::DRIVER_TASK_STATES;

/// How much of a table a session may see.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    /// No filter: admins see global data.
    Global,
    /// Rows tied to one location: managers with an assignment.
    Location(Uuid),
    /// The fulfillment-relevant order subset: drivers, network-wide.
    DriverTasks,
    /// A degenerate empty result: where a manager with no assigned location
    /// lands. Served as an empty page, never as an error.
    Nothing,
}

impl Visibility {
    pub fn for_orders(caps: &Capabilities) -> Self {
        match caps.role {
            Role::Admin => Visibility::Global,
            Role::Manager => caps
                .assigned_location
                .map(Visibility::Location)
                .unwrap_or(Visibility::Nothing),
            // Drivers operate across the full delivery network; they are
            // never filtered by location.
            Role::Driver => Visibility::DriverTasks,
            Role::Customer => Visibility::Nothing,
        }
    }

    pub fn for_inventory(caps: &Capabilities) -> Self {
        match caps.role {
            Role::Admin => Visibility::Global,
            Role::Manager => caps
                .assigned_location
                .map(Visibility::Location)
                .unwrap_or(Visibility::Nothing),
            Role::Driver | Role::Customer => Visibility::Nothing,
        }
    }
}

/// A filter that matches no rows, for the degenerate scope.
fn no_rows() -> Condition {
    Condition::all().add(Expr::val(1).eq(0))
}

fn driver_task_condition() -> Condition {
    DRIVER_TASK_STATES
        .iter()
        .fold(Condition::any(), |cond, (status, kind)| {
            cond.add(
                order::Column::Status
                    .eq(status.as_str())
                    .and(order::Column::FulfillmentKind.eq(kind.as_str())),
            )
        })
}

/// Narrow an orders query by visibility.
pub fn apply_to_orders(select: Select<order::Entity>, vis: Visibility) -> Select<order::Entity> {
    match vis {
        Visibility::Global => select,
        Visibility::Location(location_id) => {
            select.filter(order::Column::PickupLocationId.eq(location_id))
        }
        Visibility::DriverTasks => select.filter(driver_task_condition()),
        Visibility::Nothing => select.filter(no_rows()),
    }
}

/// Narrow an inventory query by visibility.
pub fn apply_to_inventory(
    select: Select<inventory_level::Entity>,
    vis: Visibility,
) -> Select<inventory_level::Entity> {
    match vis {
        Visibility::Global => select,
        Visibility::Location(location_id) => {
            select.filter(inventory_level::Column::LocationId.eq(location_id))
        }
        Visibility::DriverTasks | Visibility::Nothing => select.filter(no_rows()),
    }
}

/// Scoped base query for orders.
pub fn orders(vis: Visibility) -> Select<order::Entity> {
    apply_to_orders(order::Entity::find(), vis)
}

/// Scoped base query for inventory.
pub fn inventory(vis: Visibility) -> Select<inventory_level::Entity> {
    apply_to_inventory(inventory_level::Entity::find(), vis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    fn caps(role: Role, location: Option<Uuid>) -> Capabilities {
        Capabilities {
            profile_id: Uuid::new_v4(),
            role,
            is_admin: role == Role::Admin,
            is_manager: role == Role::Manager,
            is_driver: role == Role::Driver,
            assigned_location: location,
        }
    }

    #[test]
    fn admin_sees_global_data() {
        assert_eq!(
            Visibility::for_orders(&caps(Role::Admin, None)),
            Visibility::Global
        );
        assert_eq!(
            Visibility::for_inventory(&caps(Role::Admin, None)),
            Visibility::Global
        );
    }

    #[test]
    fn manager_is_pinned_to_the_assigned_location() {
        let loc = Uuid::new_v4();
        assert_eq!(
            Visibility::for_inventory(&caps(Role::Manager, Some(loc))),
            Visibility::Location(loc)
        );
    }

    #[test]
    fn unassigned_manager_sees_nothing() {
        assert_eq!(
            Visibility::for_orders(&caps(Role::Manager, None)),
            Visibility::Nothing
        );
        assert_eq!(
            Visibility::for_inventory(&caps(Role::Manager, None)),
            Visibility::Nothing
        );
    }

    #[test]
    fn driver_orders_scope_ignores_location() {
        let loc = Uuid::new_v4();
        assert_eq!(
            Visibility::for_orders(&caps(Role::Driver, Some(loc))),
            Visibility::DriverTasks
        );
        assert_eq!(
            Visibility::for_inventory(&caps(Role::Driver, Some(loc))),
            Visibility::Nothing
        );
    }

    #[test]
    fn driver_task_filter_matches_the_machine() {
        let sql = orders(Visibility::DriverTasks)
            .build(DbBackend::Sqlite)
            .to_string();
        assert!(sql.contains("transit"));
        assert!(sql.contains("courier"));
        assert!(sql.contains("packed"));
        assert!(sql.contains("pickup"));
    }

    #[test]
    fn location_filter_lands_on_the_right_columns() {
        let loc = Uuid::new_v4();
        let orders_sql = orders(Visibility::Location(loc))
            .build(DbBackend::Sqlite)
            .to_string();
        assert!(orders_sql.contains("pickup_location_id"));

        let inventory_sql = inventory(Visibility::Location(loc))
            .build(DbBackend::Sqlite)
            .to_string();
        assert!(inventory_sql.contains("location_id"));
    }

    #[test]
    fn nothing_scope_matches_no_rows() {
        let sql = inventory(Visibility::Nothing)
            .build(DbBackend::Sqlite)
            .to_string();
        assert!(sql.contains("1 = 0"));
    }
}
