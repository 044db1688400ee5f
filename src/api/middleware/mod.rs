//! API middleware stack.
//!
//! Execution order (outermost → innermost):
//! 1. Audit logger: every request, public and admin
//! 2. Admin validator: bearer token check, admin routes only

pub mod admin;
pub mod audit;
