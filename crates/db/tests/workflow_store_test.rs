//! Approval workflow against Postgres through the `SeaORM` store.

#![allow(clippy::similar_names)]

mod common;

use std::sync::Arc;

use chrono::NaiveDate;
use futures::future::join_all;
use outlay_core::currency::{CurrencyCode, FixedRateNormalizer};
use outlay_core::expense::{
    ApprovalService, ExpenseDraft, ExpenseSubmissionCoordinator, ExpenseWithSteps, WorkflowStore,
};
use outlay_core::workflow::{ApprovalAction, ExpenseStatus, StepStatus, WorkflowError};
use outlay_db::repositories::{ApprovalRuleRepository, SeaOrmWorkflowStore};
use outlay_shared::types::ExpenseId;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;
use tokio::sync::Barrier;
use uuid::Uuid;

use common::TestOrg;

fn draft(rule_id: Uuid, amount: Decimal, currency: &str) -> ExpenseDraft {
    ExpenseDraft {
        description: "Conference tickets".to_string(),
        category: "Training & Education".to_string(),
        date_of_expense: NaiveDate::from_ymd_opt(2025, 4, 9).unwrap(),
        paid_by: Some("Company Card".to_string()),
        amount,
        currency: currency.to_string(),
        approval_rule_id: rule_id,
        receipt_path: None,
    }
}

async fn submit(
    db: &DatabaseConnection,
    org: &TestOrg,
    rule_id: Uuid,
    amount: Decimal,
    currency: &str,
) -> ExpenseWithSteps {
    let normalizer = FixedRateNormalizer::new().with_rate(
        CurrencyCode::parse("EUR").unwrap(),
        CurrencyCode::parse("USD").unwrap(),
        dec!(1.1),
    );
    ExpenseSubmissionCoordinator::new(
        Arc::new(SeaOrmWorkflowStore::new(db.clone())),
        Arc::new(normalizer),
    )
    .submit(&org.ctx(&org.employee), draft(rule_id, amount, currency))
    .await
    .unwrap()
}

fn service(db: &DatabaseConnection) -> ApprovalService<SeaOrmWorkflowStore> {
    ApprovalService::new(Arc::new(SeaOrmWorkflowStore::new(db.clone())))
}

#[tokio::test]
async fn test_submission_persists_expense_and_chain() {
    let Some(db) = common::connect().await else {
        return;
    };
    let org = TestOrg::create(&db).await;
    let rule = org
        .percentage_rule(&db, 100, true, &[org.cfo.id, org.director.id], false)
        .await;

    let submitted = submit(&db, &org, rule, dec!(100), "eur").await;
    assert_eq!(submitted.expense.status, ExpenseStatus::Pending);
    assert_eq!(submitted.expense.amount_base, dec!(110.0000));
    assert_eq!(submitted.expense.base_currency.as_str(), "USD");

    let stored = SeaOrmWorkflowStore::new(db.clone())
        .find_expense(submitted.expense.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.submitter_name, "Eli Employee");
    let approvers: Vec<Uuid> = stored.steps.iter().map(|s| s.approver_id).collect();
    assert_eq!(approvers, vec![org.manager.id, org.cfo.id, org.director.id]);
    let indices: Vec<i32> = stored.steps.iter().map(|s| s.sequence_index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
    assert!(stored.steps.iter().all(|s| s.status == StepStatus::Pending));
}

#[tokio::test]
async fn test_threshold_reached_skips_remaining_steps() {
    let Some(db) = common::connect().await else {
        return;
    };
    let org = TestOrg::create(&db).await;
    let rule = org
        .percentage_rule(&db, 60, true, &[org.cfo.id, org.director.id], false)
        .await;
    let submitted = submit(&db, &org, rule, dec!(42.50), "USD").await;
    let id = ExpenseId::from_uuid(submitted.expense.id);
    let service = service(&db);

    let first = service
        .act(&org.ctx(&org.cfo), id, ApprovalAction::Approve, None)
        .await
        .unwrap();
    assert_eq!(first.record.expense.status, ExpenseStatus::Pending);

    let second = service
        .act(&org.ctx(&org.manager), id, ApprovalAction::Approve, Some("fine".into()))
        .await
        .unwrap();
    assert_eq!(second.record.expense.status, ExpenseStatus::Approved);
    assert_eq!(second.changed_steps.len(), 2);

    let stored = service.expense_detail(&org.ctx(&org.admin), id).await.unwrap();
    assert_eq!(stored.expense.status, ExpenseStatus::Approved);
    let director_step = stored
        .steps
        .iter()
        .find(|s| s.approver_id == org.director.id)
        .unwrap();
    assert_eq!(director_step.status, StepStatus::Skipped);
    let manager_step = stored.steps.iter().find(|s| s.approver_id == org.manager.id).unwrap();
    assert_eq!(manager_step.comment.as_deref(), Some("fine"));
    assert!(manager_step.acted_at.is_some());
}

#[tokio::test]
async fn test_rejection_needs_comment_and_closes_expense() {
    let Some(db) = common::connect().await else {
        return;
    };
    let org = TestOrg::create(&db).await;
    let rule = org.percentage_rule(&db, 100, false, &[org.cfo.id], false).await;
    let submitted = submit(&db, &org, rule, dec!(10), "USD").await;
    let id = ExpenseId::from_uuid(submitted.expense.id);
    let service = service(&db);

    let err = service
        .act(&org.ctx(&org.cfo), id, ApprovalAction::Reject, Some("   ".into()))
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Validation(_)));
    let unchanged = service.expense_detail(&org.ctx(&org.cfo), id).await.unwrap();
    assert_eq!(unchanged.steps[0].status, StepStatus::Pending);

    let rejected = service
        .act(&org.ctx(&org.cfo), id, ApprovalAction::Reject, Some("not a business cost".into()))
        .await
        .unwrap();
    assert_eq!(rejected.record.expense.status, ExpenseStatus::Rejected);

    let again = service
        .act(&org.ctx(&org.cfo), id, ApprovalAction::Approve, None)
        .await
        .unwrap_err();
    assert_eq!(again.error_code(), "INVALID_ACTION");
}

#[tokio::test]
async fn test_sequential_chain_gates_later_steps() {
    let Some(db) = common::connect().await else {
        return;
    };
    let org = TestOrg::create(&db).await;
    let rule = org
        .percentage_rule(&db, 100, true, &[org.cfo.id], true)
        .await;
    let submitted = submit(&db, &org, rule, dec!(99), "USD").await;
    let id = ExpenseId::from_uuid(submitted.expense.id);
    let service = service(&db);

    let queue = service.list_pending_for(&org.ctx(&org.cfo)).await.unwrap();
    assert!(queue.iter().any(|p| p.expense.id == submitted.expense.id && !p.actionable));

    let err = service
        .act(&org.ctx(&org.cfo), id, ApprovalAction::Approve, None)
        .await
        .unwrap_err();
    assert_eq!(err, WorkflowError::OutOfSequence { requested: 1, next: 0 });

    service
        .act(&org.ctx(&org.manager), id, ApprovalAction::Approve, None)
        .await
        .unwrap();
    let queue = service.list_pending_for(&org.ctx(&org.cfo)).await.unwrap();
    assert!(queue.iter().any(|p| p.expense.id == submitted.expense.id && p.actionable));

    let done = service
        .act(&org.ctx(&org.cfo), id, ApprovalAction::Approve, None)
        .await
        .unwrap();
    assert_eq!(done.record.expense.status, ExpenseStatus::Approved);
}

#[tokio::test]
async fn test_deleting_rule_keeps_in_flight_policy() {
    let Some(db) = common::connect().await else {
        return;
    };
    let org = TestOrg::create(&db).await;
    let rule = org.percentage_rule(&db, 100, false, &[org.cfo.id], false).await;
    let submitted = submit(&db, &org, rule, dec!(15), "USD").await;

    ApprovalRuleRepository::new(db.clone())
        .delete_rule(org.company_id, rule)
        .await
        .unwrap();

    let id = ExpenseId::from_uuid(submitted.expense.id);
    let result = service(&db)
        .act(&org.ctx(&org.cfo), id, ApprovalAction::Approve, None)
        .await
        .unwrap();
    assert_eq!(result.record.expense.status, ExpenseStatus::Approved);
    assert_eq!(result.record.expense.approval_rule_id, None);
}

/// Four approvers on a 50% rule act at once; the row lock lets exactly two
/// approvals land before the expense closes.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_approvals_serialized_by_row_lock() {
    let Some(db) = common::connect().await else {
        return;
    };
    let org = TestOrg::create(&db).await;
    let approvers = [
        org.cfo.clone(),
        org.director.clone(),
        org.admin.clone(),
        org.manager.clone(),
    ];
    let ids: Vec<Uuid> = approvers.iter().map(|p| p.id).collect();
    let rule = org.percentage_rule(&db, 50, false, &ids, false).await;
    let submitted = submit(&db, &org, rule, dec!(500), "USD").await;
    let id = ExpenseId::from_uuid(submitted.expense.id);

    let service = Arc::new(service(&db));
    let barrier = Arc::new(Barrier::new(approvers.len()));
    let tasks: Vec<_> = approvers
        .iter()
        .map(|approver| {
            let service = Arc::clone(&service);
            let barrier = Arc::clone(&barrier);
            let ctx = org.ctx(approver);
            tokio::spawn(async move {
                barrier.wait().await;
                service.act(&ctx, id, ApprovalAction::Approve, None).await
            })
        })
        .collect();

    let results: Vec<_> = join_all(tasks).await.into_iter().map(Result::unwrap).collect();
    let ok = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(ok, 2);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| e.error_code() == "INVALID_ACTION")
    );

    let stored = service.expense_detail(&org.ctx(&org.admin), id).await.unwrap();
    assert_eq!(stored.expense.status, ExpenseStatus::Approved);
    let count = |status| stored.steps.iter().filter(|s| s.status == status).count();
    assert_eq!(count(StepStatus::Approved), 2);
    assert_eq!(count(StepStatus::Skipped), 2);
}
