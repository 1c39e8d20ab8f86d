//! Company repository.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use tracing::info;
use uuid::Uuid;

use outlay_core::currency::{CurrencyCode, currency_for_country};
use outlay_core::org::Company;
use outlay_core::workflow::WorkflowError;

use super::mapping::{self, db_err};
use crate::entities::companies;

/// Input for creating a company.
#[derive(Debug, Clone)]
pub struct CreateCompanyInput {
    /// Display name.
    pub name: String,
    /// Country name.
    pub country: String,
    /// Base currency; derived from the country when absent.
    pub base_currency: Option<String>,
}

/// Company repository.
#[derive(Debug, Clone)]
pub struct CompanyRepository {
    db: DatabaseConnection,
}

impl CompanyRepository {
    /// Creates a new company repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a company.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an empty name or a malformed currency code,
    /// `Storage` if the insert fails.
    pub async fn create(&self, input: CreateCompanyInput) -> Result<Company, WorkflowError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(WorkflowError::Validation("company name is required".into()));
        }
        let base_currency = match input.base_currency.as_deref() {
            Some(code) => CurrencyCode::parse(code)?,
            None => CurrencyCode::parse(currency_for_country(&input.country))?,
        };

        let now = Utc::now().into();
        let model = companies::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(name.to_string()),
            base_currency: Set(base_currency.to_string()),
            country: Set(input.country.trim().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;

        info!(company_id = %model.id, base_currency = %model.base_currency, "Company created");
        mapping::company(model)
    }

    /// Finds a company by ID.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Company>, WorkflowError> {
        companies::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(mapping::company)
            .transpose()
    }
}
