//! In-process [`WorkflowStore`] for tests, demos and single-node deployments.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::expense::store::WorkflowStore;
use crate::expense::types::{ActionResult, Expense, ExpenseWithSteps};
use crate::org::{Company, Profile};
use crate::workflow::error::WorkflowError;
use crate::workflow::rule::ApprovalRule;
use crate::workflow::types::{ApprovalStep, ExpenseStatus, StepStatus, Transition};

#[derive(Debug)]
struct ExpenseRecord {
    expense: Expense,
    steps: Vec<ApprovalStep>,
}

/// Concurrent map-backed store.
///
/// Each expense sits behind its own async mutex; a decision holds it for the
/// whole read-decide-write cycle.
#[derive(Debug, Default)]
pub struct InMemoryWorkflowStore {
    companies: DashMap<Uuid, Company>,
    profiles: DashMap<Uuid, Profile>,
    rules: DashMap<Uuid, ApprovalRule>,
    expenses: DashMap<Uuid, Arc<Mutex<ExpenseRecord>>>,
}

impl InMemoryWorkflowStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a company.
    pub fn put_company(&self, company: Company) {
        self.companies.insert(company.id, company);
    }

    /// Inserts or replaces a profile.
    pub fn put_profile(&self, profile: Profile) {
        self.profiles.insert(profile.id, profile);
    }

    /// Inserts or replaces a rule.
    pub fn put_rule(&self, rule: ApprovalRule) {
        self.rules.insert(rule.id, rule);
    }

    /// Looks up a profile without going through the async store API.
    #[must_use]
    pub fn profile(&self, id: Uuid) -> Option<Profile> {
        self.profiles.get(&id).map(|p| p.clone())
    }

    /// Number of stored expenses.
    #[must_use]
    pub fn expense_count(&self) -> usize {
        self.expenses.len()
    }

    fn submitter_name(&self, profile_id: Uuid) -> String {
        self.profiles
            .get(&profile_id)
            .map(|p| p.full_name.clone())
            .unwrap_or_default()
    }

    fn handle(&self, expense_id: Uuid) -> Option<Arc<Mutex<ExpenseRecord>>> {
        // Clone the Arc so no map shard guard is held across an await.
        self.expenses.get(&expense_id).map(|r| Arc::clone(r.value()))
    }

    fn snapshot(&self, record: &ExpenseRecord) -> ExpenseWithSteps {
        ExpenseWithSteps {
            expense: record.expense.clone(),
            submitter_name: self.submitter_name(record.expense.created_by),
            steps: record.steps.clone(),
        }
    }
}

impl WorkflowStore for InMemoryWorkflowStore {
    async fn find_company(&self, id: Uuid) -> Result<Option<Company>, WorkflowError> {
        Ok(self.companies.get(&id).map(|c| c.clone()))
    }

    async fn find_profile(&self, id: Uuid) -> Result<Option<Profile>, WorkflowError> {
        Ok(self.profiles.get(&id).map(|p| p.clone()))
    }

    async fn find_rule(&self, id: Uuid) -> Result<Option<ApprovalRule>, WorkflowError> {
        Ok(self.rules.get(&id).map(|r| r.clone()))
    }

    async fn insert_submission(
        &self,
        expense: &Expense,
        steps: &[ApprovalStep],
    ) -> Result<(), WorkflowError> {
        let mut steps = steps.to_vec();
        steps.sort_by_key(|s| s.sequence_index);
        let record = ExpenseRecord {
            expense: expense.clone(),
            steps,
        };

        match self.expenses.entry(expense.id) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(WorkflowError::Storage(format!(
                "expense {} already exists",
                expense.id
            ))),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(Arc::new(Mutex::new(record)));
                Ok(())
            }
        }
    }

    async fn apply_decision<F>(&self, expense_id: Uuid, decide: F) -> Result<ActionResult, WorkflowError>
    where
        F: FnOnce(&Expense, &mut [ApprovalStep]) -> Result<Transition, WorkflowError> + Send,
    {
        let handle = self
            .handle(expense_id)
            .ok_or_else(|| WorkflowError::not_found("expense", expense_id))?;
        let mut record = handle.lock().await;

        let mut working = record.steps.clone();
        let transition = decide(&record.expense, &mut working)?;

        record.steps = working;
        if transition.status != record.expense.status {
            record.expense.status = transition.status;
            record.expense.updated_at = Utc::now();
        }

        Ok(ActionResult {
            record: self.snapshot(&record),
            changed_steps: transition.changed_steps,
        })
    }

    async fn find_expense(&self, id: Uuid) -> Result<Option<ExpenseWithSteps>, WorkflowError> {
        let Some(handle) = self.handle(id) else {
            return Ok(None);
        };
        let record = handle.lock().await;
        Ok(Some(self.snapshot(&record)))
    }

    async fn expenses_awaiting(
        &self,
        approver_id: Uuid,
    ) -> Result<Vec<ExpenseWithSteps>, WorkflowError> {
        let handles: Vec<_> = self.expenses.iter().map(|r| Arc::clone(r.value())).collect();

        let mut out = Vec::new();
        for handle in handles {
            let record = handle.lock().await;
            let waiting = record.expense.status == ExpenseStatus::Pending
                && record
                    .steps
                    .iter()
                    .any(|s| s.approver_id == approver_id && s.status == StepStatus::Pending);
            if waiting {
                out.push(self.snapshot(&record));
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expense::approval::ApprovalService;
    use crate::expense::fixtures::{Org, submit};
    use crate::workflow::types::{ApprovalAction, RuleKind};
    use outlay_shared::types::ExpenseId;
    use rust_decimal_macros::dec;
    use tokio::sync::Barrier;

    #[tokio::test]
    async fn test_duplicate_insert_rejected() {
        let org = Org::seed();
        let rule = org.rule(false, &[org.cfo], false);
        let submitted = submit(&org, org.employee, rule, dec!(1)).await;

        let err = org
            .store
            .insert_submission(&submitted.expense, &submitted.steps)
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "STORAGE_ERROR");
        assert_eq!(org.store.expense_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_decision_writes_nothing() {
        let org = Org::seed();
        let rule = org.rule(false, &[org.cfo], false);
        let submitted = submit(&org, org.employee, rule, dec!(1)).await;

        let err = org
            .store
            .apply_decision(submitted.expense.id, |_, steps| {
                steps[0].status = StepStatus::Approved;
                Err(WorkflowError::Validation("refused".into()))
            })
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");

        let stored = org.store.find_expense(submitted.expense.id).await.unwrap().unwrap();
        assert_eq!(stored.steps[0].status, StepStatus::Pending);
    }

    /// Four approvers race on a 50% rule: exactly two approvals land and the
    /// other two see a closed expense.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_approvals_are_serialized() {
        let org = Org::seed();
        let approvers = [org.cfo, org.director, org.admin, org.manager];
        let rule = org.rule_with(RuleKind::Percentage { required: 50 }, false, &approvers, false);
        let submitted = submit(&org, org.employee, rule, dec!(500)).await;
        let id = ExpenseId::from_uuid(submitted.expense.id);

        let service = Arc::new(ApprovalService::new(org.store.clone()));
        let barrier = Arc::new(Barrier::new(approvers.len()));
        let tasks: Vec<_> = approvers
            .iter()
            .map(|approver| {
                let service = Arc::clone(&service);
                let barrier = Arc::clone(&barrier);
                let ctx = org.ctx(*approver);
                tokio::spawn(async move {
                    barrier.wait().await;
                    service.act(&ctx, id, ApprovalAction::Approve, None).await
                })
            })
            .collect();

        let results = futures::future::join_all(tasks).await;
        let (ok, err): (Vec<_>, Vec<_>) = results
            .into_iter()
            .map(|r| r.unwrap())
            .partition(Result::is_ok);

        assert_eq!(ok.len(), 2);
        assert_eq!(err.len(), 2);
        assert!(err.iter().all(|e| matches!(
            e,
            Err(WorkflowError::InvalidAction { .. })
        )));

        let stored = org.store.find_expense(submitted.expense.id).await.unwrap().unwrap();
        assert_eq!(stored.expense.status, ExpenseStatus::Approved);
        let approved = stored
            .steps
            .iter()
            .filter(|s| s.status == StepStatus::Approved)
            .count();
        let skipped = stored
            .steps
            .iter()
            .filter(|s| s.status == StepStatus::Skipped)
            .count();
        assert_eq!((approved, skipped), (2, 2));
    }
}
