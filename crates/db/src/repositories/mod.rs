//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! Every repository reports failures as [`outlay_core::workflow::WorkflowError`].

pub mod approval_rule;
pub mod company;
pub mod expense;
mod mapping;
pub mod profile;
pub mod workflow_store;

pub use approval_rule::ApprovalRuleRepository;
pub use company::{CompanyRepository, CreateCompanyInput};
pub use expense::ExpenseRepository;
pub use profile::{CreateProfileInput, ProfileRepository};
pub use workflow_store::SeaOrmWorkflowStore;
