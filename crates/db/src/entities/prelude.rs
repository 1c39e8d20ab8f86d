//! Entity re-exports.

pub use super::approval_rules::Entity as ApprovalRules;
pub use super::approval_steps::Entity as ApprovalSteps;
pub use super::companies::Entity as Companies;
pub use super::expenses::Entity as Expenses;
pub use super::profiles::Entity as Profiles;
