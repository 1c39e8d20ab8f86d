//! Shared setup for database integration tests.
//!
//! Tests connect through `DATABASE_URL` (or `OUTLAY__DATABASE__URL`) and
//! skip when neither is set or the database is unreachable. Every test works
//! in a freshly created company so runs do not interfere.

#![allow(dead_code)]

use std::env;

use outlay_core::org::Profile;
use outlay_core::workflow::{RuleInput, RuleType};
use outlay_db::migration::{Migrator, MigratorTrait};
use outlay_db::repositories::{
    ApprovalRuleRepository, CompanyRepository, CreateCompanyInput, CreateProfileInput,
    ProfileRepository,
};
use outlay_shared::auth::{RequestContext, Role};
use outlay_shared::types::{CompanyId, ProfileId};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use uuid::Uuid;

const MIGRATION_LOCK_KEY: i64 = 0x6f75_746c_6179;

fn database_url() -> Option<String> {
    env::var("DATABASE_URL")
        .or_else(|_| env::var("OUTLAY__DATABASE__URL"))
        .ok()
}

/// Connects and migrates, or returns `None` to skip the test.
pub async fn connect() -> Option<DatabaseConnection> {
    let Some(url) = database_url() else {
        eprintln!("Skipping test - DATABASE_URL not set");
        return None;
    };

    // A single connection so the advisory lock and the migration share a session.
    let mut options = ConnectOptions::new(url.clone());
    options.max_connections(1);
    let admin = match Database::connect(options).await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Skipping test - database not available: {e}");
            return None;
        }
    };
    admin
        .execute_unprepared(&format!("SELECT pg_advisory_lock({MIGRATION_LOCK_KEY})"))
        .await
        .unwrap();
    Migrator::up(&admin, None).await.unwrap();
    admin
        .execute_unprepared(&format!("SELECT pg_advisory_unlock({MIGRATION_LOCK_KEY})"))
        .await
        .unwrap();

    Some(Database::connect(&url).await.unwrap())
}

/// A company with an admin, two finance managers, a team manager and an
/// employee who reports to the team manager.
pub struct TestOrg {
    pub company_id: Uuid,
    pub admin: Profile,
    pub cfo: Profile,
    pub director: Profile,
    pub manager: Profile,
    pub employee: Profile,
}

impl TestOrg {
    pub async fn create(db: &DatabaseConnection) -> Self {
        let company = CompanyRepository::new(db.clone())
            .create(CreateCompanyInput {
                name: format!("Acme {}", Uuid::new_v4()),
                country: "United States".to_string(),
                base_currency: None,
            })
            .await
            .unwrap();
        let company_id = company.id;

        let profiles = ProfileRepository::new(db.clone());
        let add = |name: &'static str, role: Role, manager_id: Option<Uuid>| {
            let profiles = profiles.clone();
            async move {
                profiles
                    .create_profile(
                        company_id,
                        CreateProfileInput {
                            full_name: name.to_string(),
                            email: format!("{}@acme.test", name.to_lowercase().replace(' ', ".")),
                            role,
                            manager_id,
                        },
                    )
                    .await
                    .unwrap()
            }
        };

        let admin = add("Ada Admin", Role::Admin, None).await;
        let cfo = add("Cy Cfo", Role::Manager, None).await;
        let director = add("Dee Director", Role::Manager, None).await;
        let manager = add("Mo Manager", Role::Manager, None).await;
        let employee = add("Eli Employee", Role::Employee, Some(manager.id)).await;

        Self {
            company_id,
            admin,
            cfo,
            director,
            manager,
            employee,
        }
    }

    pub fn ctx(&self, profile: &Profile) -> RequestContext {
        RequestContext::new(
            CompanyId::from_uuid(self.company_id),
            ProfileId::from_uuid(profile.id),
            profile.role,
        )
    }

    pub async fn percentage_rule(
        &self,
        db: &DatabaseConnection,
        required: i32,
        is_manager_approver: bool,
        approvers: &[Uuid],
        sequence_order: bool,
    ) -> Uuid {
        ApprovalRuleRepository::new(db.clone())
            .create_rule(
                self.company_id,
                RuleInput {
                    name: "Finance review".to_string(),
                    description: None,
                    rule_type: RuleType::Percentage,
                    is_manager_approver,
                    approver_ids: approvers.to_vec(),
                    sequence_order,
                    percentage_required: Some(required),
                    specific_approver: None,
                },
            )
            .await
            .unwrap()
            .id
    }
}
