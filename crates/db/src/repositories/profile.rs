//! Profile repository: company members and the manager hierarchy.

use chrono::Utc;
use outlay_shared::auth::Role;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use tracing::{info, instrument};
use uuid::Uuid;

use outlay_core::org::{ManagerForest, Profile};
use outlay_core::workflow::WorkflowError;

use super::mapping::{self, db_err};
use crate::entities::{profiles, sea_orm_active_enums::ProfileRole};

/// Input for creating a profile.
#[derive(Debug, Clone)]
pub struct CreateProfileInput {
    /// Display name.
    pub full_name: String,
    /// Contact email, unique within the company.
    pub email: String,
    /// Role in the company.
    pub role: Role,
    /// Direct manager.
    pub manager_id: Option<Uuid>,
}

/// Profile repository.
#[derive(Debug, Clone)]
pub struct ProfileRepository {
    db: DatabaseConnection,
}

impl ProfileRepository {
    /// Creates a new profile repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a profile in a company.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for missing fields, `NotFound` or
    /// `ScopeViolation` for a bad manager, `Storage` on database failure.
    pub async fn create_profile(
        &self,
        company_id: Uuid,
        input: CreateProfileInput,
    ) -> Result<Profile, WorkflowError> {
        let full_name = input.full_name.trim();
        let email = input.email.trim().to_lowercase();
        if full_name.is_empty() {
            return Err(WorkflowError::Validation("full name is required".into()));
        }
        if !email.contains('@') {
            return Err(WorkflowError::Validation(format!("invalid email '{email}'")));
        }
        if let Some(manager_id) = input.manager_id {
            self.company_profile(company_id, manager_id).await?;
        }

        let now = Utc::now().into();
        let model = profiles::ActiveModel {
            id: Set(Uuid::now_v7()),
            company_id: Set(company_id),
            full_name: Set(full_name.to_string()),
            email: Set(email),
            role: Set(input.role.into()),
            manager_id: Set(input.manager_id),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;

        info!(company_id = %company_id, profile_id = %model.id, role = input.role.as_str(), "Profile created");
        Ok(mapping::profile(model))
    }

    /// Lists a company's profiles by name.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the query fails.
    pub async fn list_profiles(&self, company_id: Uuid) -> Result<Vec<Profile>, WorkflowError> {
        let models = profiles::Entity::find()
            .filter(profiles::Column::CompanyId.eq(company_id))
            .order_by_asc(profiles::Column::FullName)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(mapping::profile).collect())
    }

    /// Lists the admins and managers a rule may name as approvers.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the query fails.
    pub async fn list_approver_candidates(
        &self,
        company_id: Uuid,
    ) -> Result<Vec<Profile>, WorkflowError> {
        let models = profiles::Entity::find()
            .filter(profiles::Column::CompanyId.eq(company_id))
            .filter(profiles::Column::Role.is_in([ProfileRole::Admin, ProfileRole::Manager]))
            .order_by_asc(profiles::Column::FullName)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(mapping::profile).collect())
    }

    /// Gets one profile of a company.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if it does not exist, `ScopeViolation` if it
    /// belongs to another company.
    pub async fn get_profile(
        &self,
        company_id: Uuid,
        profile_id: Uuid,
    ) -> Result<Profile, WorkflowError> {
        self.company_profile(company_id, profile_id).await
    }

    /// Sets or clears a profile's manager.
    ///
    /// The company's profile rows are locked for the duration so two
    /// concurrent assignments cannot together close a loop.
    ///
    /// # Errors
    ///
    /// Returns `ManagerCycle` if the assignment would make the hierarchy
    /// cyclic, `NotFound`/`ScopeViolation` for unknown or foreign profiles.
    #[instrument(skip(self), fields(company_id = %company_id))]
    pub async fn assign_manager(
        &self,
        company_id: Uuid,
        profile_id: Uuid,
        manager_id: Option<Uuid>,
    ) -> Result<Profile, WorkflowError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let members: Vec<profiles::Model> = profiles::Entity::find()
            .filter(profiles::Column::CompanyId.eq(company_id))
            .lock_exclusive()
            .all(&txn)
            .await
            .map_err(db_err)?;

        let in_company = |id: Uuid| members.iter().any(|m| m.id == id);
        for id in std::iter::once(profile_id).chain(manager_id) {
            if !in_company(id) {
                return Err(self.missing_or_foreign(id).await);
            }
        }

        let forest = ManagerForest::new(members.iter().map(|m| (m.id, m.manager_id)));
        forest.check_assignment(profile_id, manager_id)?;

        let Some(target) = members.into_iter().find(|m| m.id == profile_id) else {
            return Err(WorkflowError::not_found("profile", profile_id));
        };
        let mut active: profiles::ActiveModel = target.into();
        active.manager_id = Set(manager_id);
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        info!(profile_id = %profile_id, manager_id = ?manager_id, "Manager assigned");
        Ok(mapping::profile(updated))
    }

    async fn company_profile(
        &self,
        company_id: Uuid,
        profile_id: Uuid,
    ) -> Result<Profile, WorkflowError> {
        let profile = profiles::Entity::find_by_id(profile_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(mapping::profile)
            .ok_or_else(|| WorkflowError::not_found("profile", profile_id))?;
        profile.ensure_company(company_id)?;
        Ok(profile)
    }

    /// Error for an ID not in the caller's company.
    async fn missing_or_foreign(&self, profile_id: Uuid) -> WorkflowError {
        match profiles::Entity::find_by_id(profile_id).one(&self.db).await {
            Ok(Some(_)) => WorkflowError::scope("profile", profile_id),
            Ok(None) => WorkflowError::not_found("profile", profile_id),
            Err(e) => db_err(e),
        }
    }
}
