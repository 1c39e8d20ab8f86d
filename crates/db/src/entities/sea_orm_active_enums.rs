//! `SeaORM` active enums mirroring the Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use outlay_core::workflow::types::{
    ExpenseStatus as CoreExpenseStatus, RuleType as CoreRuleType, StepStatus as CoreStepStatus,
};
use outlay_shared::auth::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "profile_role")]
pub enum ProfileRole {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "manager")]
    Manager,
    #[sea_orm(string_value = "employee")]
    Employee,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "approval_rule_type")]
pub enum ApprovalRuleType {
    #[sea_orm(string_value = "percentage")]
    Percentage,
    #[sea_orm(string_value = "specific")]
    Specific,
    #[sea_orm(string_value = "hybrid")]
    Hybrid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "expense_status")]
pub enum ExpenseStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "approval_step_status")]
pub enum ApprovalStepStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "skipped")]
    Skipped,
}

impl From<ProfileRole> for Role {
    fn from(role: ProfileRole) -> Self {
        match role {
            ProfileRole::Admin => Self::Admin,
            ProfileRole::Manager => Self::Manager,
            ProfileRole::Employee => Self::Employee,
        }
    }
}

impl From<Role> for ProfileRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Admin => Self::Admin,
            Role::Manager => Self::Manager,
            Role::Employee => Self::Employee,
        }
    }
}

impl From<ApprovalRuleType> for CoreRuleType {
    fn from(t: ApprovalRuleType) -> Self {
        match t {
            ApprovalRuleType::Percentage => Self::Percentage,
            ApprovalRuleType::Specific => Self::Specific,
            ApprovalRuleType::Hybrid => Self::Hybrid,
        }
    }
}

impl From<CoreRuleType> for ApprovalRuleType {
    fn from(t: CoreRuleType) -> Self {
        match t {
            CoreRuleType::Percentage => Self::Percentage,
            CoreRuleType::Specific => Self::Specific,
            CoreRuleType::Hybrid => Self::Hybrid,
        }
    }
}

impl From<ExpenseStatus> for CoreExpenseStatus {
    fn from(s: ExpenseStatus) -> Self {
        match s {
            ExpenseStatus::Draft => Self::Draft,
            ExpenseStatus::Pending => Self::Pending,
            ExpenseStatus::Approved => Self::Approved,
            ExpenseStatus::Rejected => Self::Rejected,
        }
    }
}

impl From<CoreExpenseStatus> for ExpenseStatus {
    fn from(s: CoreExpenseStatus) -> Self {
        match s {
            CoreExpenseStatus::Draft => Self::Draft,
            CoreExpenseStatus::Pending => Self::Pending,
            CoreExpenseStatus::Approved => Self::Approved,
            CoreExpenseStatus::Rejected => Self::Rejected,
        }
    }
}

impl From<ApprovalStepStatus> for CoreStepStatus {
    fn from(s: ApprovalStepStatus) -> Self {
        match s {
            ApprovalStepStatus::Pending => Self::Pending,
            ApprovalStepStatus::Approved => Self::Approved,
            ApprovalStepStatus::Rejected => Self::Rejected,
            ApprovalStepStatus::Skipped => Self::Skipped,
        }
    }
}

impl From<CoreStepStatus> for ApprovalStepStatus {
    fn from(s: CoreStepStatus) -> Self {
        match s {
            CoreStepStatus::Pending => Self::Pending,
            CoreStepStatus::Approved => Self::Approved,
            CoreStepStatus::Rejected => Self::Rejected,
            CoreStepStatus::Skipped => Self::Skipped,
        }
    }
}
