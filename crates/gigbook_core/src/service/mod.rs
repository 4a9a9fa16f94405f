//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep callers decoupled from storage details.

pub mod client_service;
pub mod expense_service;
pub mod invoice_service;
pub mod project_service;
pub mod task_service;
