//! Shared test fixtures: a seeded company with a small hierarchy.

use std::sync::Arc;

use chrono::NaiveDate;
use outlay_shared::auth::{RequestContext, Role};
use outlay_shared::types::{CompanyId, ProfileId};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::currency::{CurrencyCode, FixedRateNormalizer};
use crate::expense::memory::InMemoryWorkflowStore;
use crate::expense::submission::ExpenseSubmissionCoordinator;
use crate::expense::types::{ExpenseDraft, ExpenseWithSteps};
use crate::org::{Company, Profile};
use crate::workflow::rule::ApprovalRule;
use crate::workflow::types::RuleKind;

/// One company: admin, cfo and director (managers), a team manager and an
/// employee reporting to that manager. Base currency USD.
pub struct Org {
    pub store: Arc<InMemoryWorkflowStore>,
    pub company_id: Uuid,
    pub admin: Uuid,
    pub cfo: Uuid,
    pub director: Uuid,
    pub manager: Uuid,
    pub employee: Uuid,
}

impl Org {
    pub fn seed() -> Self {
        Self::seed_into(Arc::new(InMemoryWorkflowStore::new()))
    }

    pub fn seed_into(store: Arc<InMemoryWorkflowStore>) -> Self {
        let company_id = Uuid::now_v7();
        store.put_company(Company {
            id: company_id,
            name: "Acme".to_string(),
            base_currency: CurrencyCode::parse("USD").unwrap(),
            country: "United States".to_string(),
        });

        let mut org = Self {
            store,
            company_id,
            admin: Uuid::nil(),
            cfo: Uuid::nil(),
            director: Uuid::nil(),
            manager: Uuid::nil(),
            employee: Uuid::nil(),
        };
        org.admin = org.add_profile("Ada Admin", Role::Admin, None);
        org.cfo = org.add_profile("Cy Cfo", Role::Manager, None);
        org.director = org.add_profile("Dee Director", Role::Manager, None);
        org.manager = org.add_profile("Mo Manager", Role::Manager, None);
        org.employee = org.add_profile("Eli Employee", Role::Employee, Some(org.manager));
        org
    }

    pub fn add_profile(&self, name: &str, role: Role, manager_id: Option<Uuid>) -> Uuid {
        let id = Uuid::now_v7();
        self.store.put_profile(Profile {
            id,
            company_id: self.company_id,
            full_name: name.to_string(),
            email: format!("{}@acme.test", name.to_lowercase().replace(' ', ".")),
            role,
            manager_id,
        });
        id
    }

    pub fn rule(&self, is_manager_approver: bool, approvers: &[Uuid], sequential: bool) -> Uuid {
        self.rule_with(
            RuleKind::Percentage { required: 100 },
            is_manager_approver,
            approvers,
            sequential,
        )
    }

    pub fn rule_with(
        &self,
        kind: RuleKind,
        is_manager_approver: bool,
        approvers: &[Uuid],
        sequential: bool,
    ) -> Uuid {
        let id = Uuid::now_v7();
        self.store.put_rule(ApprovalRule {
            id,
            company_id: self.company_id,
            name: "Test rule".to_string(),
            description: None,
            kind,
            is_manager_approver,
            approver_ids: approvers.to_vec(),
            sequence_order: sequential,
        });
        id
    }

    pub fn ctx(&self, profile_id: Uuid) -> RequestContext {
        let role = self
            .store
            .profile(profile_id)
            .map_or(Role::Employee, |p| p.role);
        RequestContext::new(
            CompanyId::from_uuid(self.company_id),
            ProfileId::from_uuid(profile_id),
            role,
        )
    }
}

pub fn draft(rule_id: Uuid, amount: Decimal, currency: &str) -> ExpenseDraft {
    ExpenseDraft {
        description: "Taxi to airport".to_string(),
        category: "Transportation".to_string(),
        date_of_expense: NaiveDate::from_ymd_opt(2025, 5, 2).unwrap(),
        paid_by: Some("Personal Card".to_string()),
        amount,
        currency: currency.to_string(),
        approval_rule_id: rule_id,
        receipt_path: None,
    }
}

/// Submits a same-currency expense and returns it.
pub async fn submit(org: &Org, submitter: Uuid, rule_id: Uuid, amount: Decimal) -> ExpenseWithSteps {
    let coordinator =
        ExpenseSubmissionCoordinator::new(org.store.clone(), Arc::new(FixedRateNormalizer::new()));
    coordinator
        .submit(&org.ctx(submitter), draft(rule_id, amount, "USD"))
        .await
        .unwrap()
}
