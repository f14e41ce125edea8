//! Application layer containing the approval workflow.
//!
//! `ApprovalWorkflow` is the single entry point for inbound updates. It
//! validates submissions, drives the order state machine through the
//! `OrderStore` port and reports every outcome through the `Notifier` port.

pub mod replies;
pub mod workflow;
