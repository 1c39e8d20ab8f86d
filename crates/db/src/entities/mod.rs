//! `SeaORM` entities.

#![allow(missing_docs)]

pub mod prelude;

pub mod approval_rules;
pub mod approval_steps;
pub mod companies;
pub mod expenses;
pub mod profiles;
pub mod sea_orm_active_enums;
