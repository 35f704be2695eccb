//! Core compliance logic - framework-agnostic region policy, document lifecycle,
//! and the regional hooks fired from it.

/// Explicit context passed to every hook
pub mod context;
/// Region-gated deletion guard
pub mod deletion;
/// Site defaults stored in the `system_state` table
pub mod defaults;
/// Minimal document store and lifecycle
pub mod document;
/// File records and their on-disk content
pub mod file;
/// Hook registry and dispatch
pub mod hooks;
/// Doctype schema capability checks and property setters
pub mod meta;
/// Document update notifications
pub mod notify;
/// QR code generation and cleanup for invoices
pub mod qr;
/// Region resolution and the region policy table
pub mod region;
/// Legal transaction log
pub mod transaction_log;
