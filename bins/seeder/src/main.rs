//! Database seeder for Outlay development and testing.
//!
//! Creates a demo company with a small reporting hierarchy, two approval
//! rules and one submitted expense, then prints a development token for
//! every profile. Each run creates a new company.
//!
//! Usage: cargo run --bin seeder

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use outlay_core::currency::{CurrencyCode, FixedRateNormalizer};
use outlay_core::expense::{ExpenseDraft, ExpenseSubmissionCoordinator};
use outlay_core::org::Profile;
use outlay_core::workflow::{RuleInput, RuleType};
use outlay_db::repositories::{
    ApprovalRuleRepository, CompanyRepository, CreateCompanyInput, CreateProfileInput,
    ProfileRepository, SeaOrmWorkflowStore,
};
use outlay_shared::auth::RequestContext;
use outlay_shared::types::{CompanyId, ProfileId};
use outlay_shared::{JwtConfig, JwtService, Role};

struct Member {
    name: &'static str,
    role: Role,
}

const MEMBERS: &[Member] = &[
    Member { name: "Avery Admin", role: Role::Admin },
    Member { name: "Casey Finance", role: Role::Manager },
    Member { name: "Drew Director", role: Role::Manager },
    Member { name: "Morgan Lead", role: Role::Manager },
    Member { name: "Emery Engineer", role: Role::Employee },
    Member { name: "Sam Sales", role: Role::Employee },
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;
    let jwt_secret =
        std::env::var("OUTLAY__JWT__SECRET").unwrap_or_else(|_| JwtConfig::default().secret);

    println!("Connecting to database...");
    let db = outlay_db::connect(&database_url).await?;

    println!("Seeding demo company...");
    let company = CompanyRepository::new(db.clone())
        .create(CreateCompanyInput {
            name: "Outlay Demo Co".to_string(),
            country: "United States".to_string(),
            base_currency: None,
        })
        .await?;
    println!("  company {} ({})", company.id, company.base_currency);

    println!("Seeding profiles...");
    let profiles_repo = ProfileRepository::new(db.clone());
    let mut profiles: Vec<Profile> = Vec::with_capacity(MEMBERS.len());
    for member in MEMBERS {
        let profile = profiles_repo
            .create_profile(
                company.id,
                CreateProfileInput {
                    full_name: member.name.to_string(),
                    email: format!(
                        "{}@outlay.dev",
                        member.name.to_lowercase().replace(' ', ".")
                    ),
                    role: member.role,
                    manager_id: None,
                },
            )
            .await?;
        profiles.push(profile);
    }
    let id_of = |name: &str| -> anyhow::Result<Uuid> {
        profiles
            .iter()
            .find(|p| p.full_name == name)
            .map(|p| p.id)
            .with_context(|| format!("seeded profile {name} missing"))
    };

    println!("Seeding reporting lines...");
    let lead = id_of("Morgan Lead")?;
    let director = id_of("Drew Director")?;
    for (report, manager) in [
        (id_of("Emery Engineer")?, lead),
        (id_of("Sam Sales")?, lead),
        (lead, director),
    ] {
        profiles_repo
            .assign_manager(company.id, report, Some(manager))
            .await?;
    }

    println!("Seeding approval rules...");
    let rules = ApprovalRuleRepository::new(db.clone());
    let finance = id_of("Casey Finance")?;
    let travel = rules
        .create_rule(
            company.id,
            RuleInput {
                name: "Travel".to_string(),
                description: Some("Manager first, then finance or a director majority".to_string()),
                rule_type: RuleType::Hybrid,
                is_manager_approver: true,
                approver_ids: vec![finance, director],
                sequence_order: true,
                percentage_required: Some(60),
                specific_approver: Some(finance),
            },
        )
        .await?;
    rules
        .create_rule(
            company.id,
            RuleInput {
                name: "Small purchases".to_string(),
                description: None,
                rule_type: RuleType::Percentage,
                is_manager_approver: true,
                approver_ids: Vec::new(),
                sequence_order: false,
                percentage_required: Some(100),
                specific_approver: None,
            },
        )
        .await?;

    println!("Seeding a submitted expense...");
    let engineer = id_of("Emery Engineer")?;
    let coordinator = ExpenseSubmissionCoordinator::new(
        Arc::new(SeaOrmWorkflowStore::new(db.clone())),
        Arc::new(FixedRateNormalizer::new().with_rate(
            CurrencyCode::parse("EUR")?,
            CurrencyCode::parse("USD")?,
            Decimal::new(108, 2),
        )),
    );
    let expense = coordinator
        .submit(
            &RequestContext::new(
                CompanyId::from_uuid(company.id),
                ProfileId::from_uuid(engineer),
                Role::Employee,
            ),
            ExpenseDraft {
                description: "Train to Berlin customer visit".to_string(),
                category: "Travel".to_string(),
                date_of_expense: Utc::now().date_naive(),
                paid_by: Some("Personal Card".to_string()),
                amount: Decimal::new(18_950, 2),
                currency: "EUR".to_string(),
                approval_rule_id: travel.id,
                receipt_path: None,
            },
        )
        .await?;
    println!(
        "  expense {} {} {} -> {} {}",
        expense.expense.id,
        expense.expense.amount,
        expense.expense.currency,
        expense.expense.amount_base,
        expense.expense.base_currency
    );

    println!("Development tokens:");
    let jwt = JwtService::new(JwtConfig {
        secret: jwt_secret,
        access_token_expires_minutes: 60 * 24,
    });
    for profile in &profiles {
        let token = jwt.generate_access_token(profile.id, company.id, profile.role)?;
        println!("  {:<16} {:<8} {token}", profile.full_name, profile.role.as_str());
    }

    println!("Seeding complete!");
    Ok(())
}
