//! Expense approval workflow for Outlay.
//!
//! This module implements approval rules, chain construction and the
//! approval state machine.
//!
//! # Modules
//!
//! - `types` - Workflow domain types (ExpenseStatus, StepStatus, RuleKind)
//! - `error` - Workflow-specific error types
//! - `rule` - Approval rule validation
//! - `chain` - Approval chain construction
//! - `state_machine` - Approver decisions and terminal conditions

pub mod chain;
pub mod error;
pub mod rule;
pub mod state_machine;
pub mod types;

#[cfg(test)]
mod chain_props;
#[cfg(test)]
mod state_machine_props;

pub use chain::ApprovalChainBuilder;
pub use error::{InvalidActionReason, WorkflowError};
pub use rule::{ApprovalRule, RuleInput};
pub use state_machine::ApprovalStateMachine;
pub use types::{
    ApprovalAction, ApprovalPolicy, ApprovalStep, ChainSlot, Decision, ExpenseStatus, RuleKind,
    RuleType, StepStatus, Transition,
};
