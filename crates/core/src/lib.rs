//! Core business logic for Outlay.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and workflow decisions live here.
//!
//! # Modules
//!
//! - `workflow` - Approval rules, chain construction and the approval state machine
//! - `expense` - Submission coordinator, approval service and the store seam
//! - `org` - Companies, profiles and the manager hierarchy
//! - `currency` - Currency codes, conversion and exchange rate sources

pub mod currency;
pub mod expense;
pub mod org;
pub mod workflow;
