//! Expense submission and approval services.
//!
//! # Modules
//!
//! - `types` - Expense, draft and queue types
//! - `store` - Persistence trait implemented by the db crate
//! - `submission` - Submission coordinator
//! - `approval` - Approver actions and queues
//! - `memory` - In-process store

pub mod approval;
pub mod memory;
pub mod store;
pub mod submission;
pub mod types;

#[cfg(test)]
mod fixtures;

pub use approval::ApprovalService;
pub use memory::InMemoryWorkflowStore;
pub use store::WorkflowStore;
pub use submission::ExpenseSubmissionCoordinator;
pub use types::{
    ActionResult, EXPENSE_CATEGORIES, Expense, ExpenseDraft, ExpenseFilter, ExpenseWithSteps,
    PAYMENT_METHODS, PendingApproval,
};
