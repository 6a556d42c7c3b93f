use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::capabilities::{Capabilities, Role};
use crate::entities::profile;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::provisioning::{CredentialProvisioner, ProvisionRequest};

/// Admin-only staff management: listing, provisioning, credential resets,
/// and role/location assignment.
#[derive(Clone)]
pub struct StaffService {
    db: Arc<DatabaseConnection>,
    provisioner: Arc<dyn CredentialProvisioner>,
    event_sender: EventSender,
}

#[derive(Clone, Debug)]
pub struct CreateStaffInput {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: Role,
    pub assigned_location_id: Option<Uuid>,
}

#[derive(Clone, Debug, Default)]
pub struct UpdateStaffInput {
    pub role: Option<Role>,
    pub assigned_location_id: Option<Uuid>,
    /// Clears the assignment; wins over `assigned_location_id`.
    pub clear_location: bool,
    pub is_active: Option<bool>,
}

impl StaffService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        provisioner: Arc<dyn CredentialProvisioner>,
        event_sender: EventSender,
    ) -> Self {
        Self {
            db,
            provisioner,
            event_sender,
        }
    }

    fn require_admin(caps: &Capabilities) -> Result<(), ServiceError> {
        if caps.is_admin {
            Ok(())
        } else {
            Err(ServiceError::AccessDenied(
                "Staff management requires the admin role".into(),
            ))
        }
    }

    #[instrument(skip(self, caps))]
    pub async fn list_staff(&self, caps: &Capabilities) -> Result<Vec<profile::Model>, ServiceError> {
        Self::require_admin(caps)?;

        Ok(profile::Entity::find()
            .filter(profile::Column::Role.ne(Role::Customer.as_str()))
            .order_by_asc(profile::Column::FullName)
            .all(&*self.db)
            .await?)
    }

    /// Provisions a staff account through the credential boundary and
    /// creates the matching profile row.
    #[instrument(skip(self, caps, input), fields(email = %input.email, role = %input.role))]
    pub async fn create_staff(
        &self,
        caps: &Capabilities,
        input: CreateStaffInput,
    ) -> Result<profile::Model, ServiceError> {
        Self::require_admin(caps)?;

        if !input.role.is_staff() {
            return Err(ServiceError::ValidationError(
                "Customer accounts are not provisioned through staff management".into(),
            ));
        }
        if input.password.len() < 8 {
            return Err(ServiceError::ValidationError(
                "Passwords need at least 8 characters".into(),
            ));
        }

        let existing = profile::Entity::find()
            .filter(profile::Column::Email.eq(input.email.clone()))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "A profile already exists for {}",
                input.email
            )));
        }

        let credentials = self
            .provisioner
            .provision(&ProvisionRequest {
                email: input.email.clone(),
                password: input.password,
                full_name: input.full_name.clone(),
                role: input.role,
            })
            .await?;

        let created = profile::ActiveModel {
            id: Set(credentials.profile_id),
            email: Set(input.email),
            full_name: Set(input.full_name),
            password_hash: Set(credentials.password_hash.unwrap_or_default()),
            role: Set(input.role.as_str().to_string()),
            assigned_location_id: Set(input.assigned_location_id),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(&*self.db)
        .await?;

        info!(profile_id = %created.id, "staff profile provisioned");
        self.event_sender
            .send(Event::StaffProvisioned(created.id))
            .await
            .map_err(ServiceError::EventError)?;

        Ok(created)
    }

    /// Admin-triggered credential reset for another staff member.
    #[instrument(skip(self, caps, new_password), fields(profile_id = %profile_id))]
    pub async fn reset_password(
        &self,
        caps: &Capabilities,
        profile_id: Uuid,
        new_password: &str,
    ) -> Result<(), ServiceError> {
        Self::require_admin(caps)?;

        if new_password.len() < 8 {
            return Err(ServiceError::ValidationError(
                "Passwords need at least 8 characters".into(),
            ));
        }

        let target = self.get_staff_profile(profile_id).await?;

        let new_hash = self
            .provisioner
            .reset_password(profile_id, new_password)
            .await?;

        if let Some(hash) = new_hash {
            let mut active: profile::ActiveModel = target.into();
            active.password_hash = Set(hash);
            active.updated_at = Set(Some(Utc::now()));
            active.update(&*self.db).await?;
        }

        info!(%profile_id, "staff credentials reset");
        Ok(())
    }

    /// Role and location reassignment. Takes effect on the target's next
    /// request, when their session re-resolves the profile row.
    #[instrument(skip(self, caps, input), fields(profile_id = %profile_id))]
    pub async fn update_staff(
        &self,
        caps: &Capabilities,
        profile_id: Uuid,
        input: UpdateStaffInput,
    ) -> Result<profile::Model, ServiceError> {
        Self::require_admin(caps)?;

        let target = self.get_staff_profile(profile_id).await?;

        let mut active: profile::ActiveModel = target.into();
        if let Some(role) = input.role {
            if !role.is_staff() {
                return Err(ServiceError::ValidationError(
                    "Staff profiles cannot be demoted to customer accounts".into(),
                ));
            }
            active.role = Set(role.as_str().to_string());
        }
        if input.clear_location {
            active.assigned_location_id = Set(None);
        } else if let Some(location_id) = input.assigned_location_id {
            active.assigned_location_id = Set(Some(location_id));
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Some(Utc::now()));

        Ok(active.update(&*self.db).await?)
    }

    async fn get_staff_profile(&self, profile_id: Uuid) -> Result<profile::Model, ServiceError> {
        let profile = profile::Entity::find_by_id(profile_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Profile {profile_id} not found")))?;

        if !profile.role()?.is_staff() {
            return Err(ServiceError::NotFound(format!(
                "Profile {profile_id} not found"
            )));
        }
        Ok(profile)
    }
}
