//! Use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls and ledger rules into use-case APIs.
//! - Keep the front-end decoupled from storage details.
//!
//! Every method takes the acting `UserAccount`; resolving it from the
//! session is the composition root's job.

pub mod grade_service;
pub mod subject_service;
