//! Companies, profiles and the manager hierarchy.

use std::collections::{HashMap, HashSet};

use outlay_shared::auth::Role;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::currency::CurrencyCode;
use crate::workflow::error::WorkflowError;

/// A tenant. Every other entity is scoped to exactly one company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    /// Company ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Currency all expenses are normalized into.
    pub base_currency: CurrencyCode,
    /// Country name, used to derive the base currency at sign-up.
    pub country: String,
}

/// A member of a company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Profile ID.
    pub id: Uuid,
    /// Owning company.
    pub company_id: Uuid,
    /// Display name.
    pub full_name: String,
    /// Contact email.
    pub email: String,
    /// Role in the company.
    pub role: Role,
    /// Direct manager, if any.
    pub manager_id: Option<Uuid>,
}

impl Profile {
    /// Fails with a scope violation unless the profile belongs to `company_id`.
    pub fn ensure_company(&self, company_id: Uuid) -> Result<(), WorkflowError> {
        if self.company_id == company_id {
            Ok(())
        } else {
            Err(WorkflowError::scope("profile", self.id))
        }
    }
}

/// A company's reporting lines, kept acyclic.
///
/// Built from `(profile, manager)` edges; assignments are checked before
/// they are written so the stored hierarchy is always a forest.
#[derive(Debug, Clone, Default)]
pub struct ManagerForest {
    managers: HashMap<Uuid, Uuid>,
}

impl ManagerForest {
    /// Builds the forest from `(profile_id, manager_id)` pairs.
    pub fn new(edges: impl IntoIterator<Item = (Uuid, Option<Uuid>)>) -> Self {
        let managers = edges
            .into_iter()
            .filter_map(|(profile, manager)| manager.map(|m| (profile, m)))
            .collect();
        Self { managers }
    }

    /// Builds the forest from a company's profiles.
    pub fn from_profiles<'a>(profiles: impl IntoIterator<Item = &'a Profile>) -> Self {
        Self::new(profiles.into_iter().map(|p| (p.id, p.manager_id)))
    }

    /// The direct manager of a profile.
    #[must_use]
    pub fn manager_of(&self, profile_id: Uuid) -> Option<Uuid> {
        self.managers.get(&profile_id).copied()
    }

    /// Checks that setting `profile_id`'s manager to `manager_id` keeps the
    /// hierarchy acyclic. Clearing a manager is always allowed.
    pub fn check_assignment(
        &self,
        profile_id: Uuid,
        manager_id: Option<Uuid>,
    ) -> Result<(), WorkflowError> {
        let Some(manager_id) = manager_id else {
            return Ok(());
        };
        let cycle = WorkflowError::ManagerCycle {
            profile_id,
            manager_id,
        };

        // Walk up from the proposed manager; reaching the profile closes a loop.
        let mut visited = HashSet::new();
        let mut cursor = Some(manager_id);
        while let Some(current) = cursor {
            if current == profile_id {
                return Err(cycle);
            }
            if !visited.insert(current) {
                // Pre-existing loop above the profile; refuse to extend it.
                return Err(cycle);
            }
            cursor = self.manager_of(current);
        }
        Ok(())
    }

    /// Applies an assignment after checking it.
    #[cfg(test)]
    fn assign(&mut self, profile_id: Uuid, manager_id: Option<Uuid>) -> Result<(), WorkflowError> {
        self.check_assignment(profile_id, manager_id)?;
        match manager_id {
            Some(m) => self.managers.insert(profile_id, m),
            None => self.managers.remove(&profile_id),
        };
        Ok(())
    }
}
