//! Hook registry - which regional hooks run for which doctype and event.
//!
//! Hooks are plain async functions taking the context, the document and the
//! event that fired them. The registry maps `(doctype, event)` pairs to an
//! ordered list of [`Hook`]s and runs them in order, stopping at the first error.

use crate::{
    core::{context::HookContext, deletion, qr, transaction_log},
    entities::document,
    errors::Result,
};
use std::collections::HashMap;
use std::fmt;

/// Doctype of sales invoices.
pub const SALES_INVOICE: &str = "Sales Invoice";
/// Doctype of payment entries.
pub const PAYMENT_ENTRY: &str = "Payment Entry";

/// Document lifecycle event a hook can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocEvent {
    /// A document was inserted as a draft
    AfterInsert,
    /// A draft was submitted
    OnSubmit,
    /// A submitted document was cancelled
    OnCancel,
    /// A document is about to be deleted
    OnTrash,
}

impl DocEvent {
    /// Event name as the ERP spells it.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AfterInsert => "after_insert",
            Self::OnSubmit => "on_submit",
            Self::OnCancel => "on_cancel",
            Self::OnTrash => "on_trash",
        }
    }
}

impl fmt::Display for DocEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A regional hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    /// [`deletion::check_deletion_permission`]
    CheckDeletionPermission,
    /// [`transaction_log::create_transaction_log`]
    CreateTransactionLog,
    /// [`qr::create_qr_code`]
    CreateQrCode,
    /// [`qr::delete_qr_code_file`]
    DeleteQrCodeFile,
}

impl Hook {
    /// Runs the hook against `doc`.
    pub async fn run(
        self,
        ctx: &HookContext<'_>,
        doc: &mut document::Model,
        event: DocEvent,
    ) -> Result<()> {
        match self {
            Self::CheckDeletionPermission => {
                deletion::check_deletion_permission(ctx, doc, event).await
            }
            Self::CreateTransactionLog => {
                transaction_log::create_transaction_log(ctx, doc, event).await
            }
            Self::CreateQrCode => qr::create_qr_code(ctx, doc, event).await,
            Self::DeleteQrCodeFile => qr::delete_qr_code_file(ctx, doc, event).await,
        }
    }
}

/// Ordered hooks per `(doctype, event)`.
#[derive(Debug, Clone, Default)]
pub struct HookRegistry {
    hooks: HashMap<(String, DocEvent), Vec<Hook>>,
}

impl HookRegistry {
    /// A registry with no hooks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The regional hooks as the ERP wires them:
    ///
    /// * Sales Invoice: transaction log on submit, QR code after insert,
    ///   deletion guard then QR cleanup on trash.
    /// * Payment Entry: transaction log on submit, deletion guard on trash.
    #[must_use]
    pub fn regional() -> Self {
        let mut registry = Self::new();
        registry
            .register(SALES_INVOICE, DocEvent::OnSubmit, Hook::CreateTransactionLog)
            .register(SALES_INVOICE, DocEvent::AfterInsert, Hook::CreateQrCode)
            .register(SALES_INVOICE, DocEvent::OnTrash, Hook::CheckDeletionPermission)
            .register(SALES_INVOICE, DocEvent::OnTrash, Hook::DeleteQrCodeFile)
            .register(PAYMENT_ENTRY, DocEvent::OnSubmit, Hook::CreateTransactionLog)
            .register(PAYMENT_ENTRY, DocEvent::OnTrash, Hook::CheckDeletionPermission);
        registry
    }

    /// Appends `hook` to the hooks run for `doctype` on `event`.
    pub fn register(&mut self, doctype: &str, event: DocEvent, hook: Hook) -> &mut Self {
        self.hooks
            .entry((doctype.to_string(), event))
            .or_default()
            .push(hook);
        self
    }

    /// Hooks registered for `doctype` on `event`, in run order.
    #[must_use]
    pub fn hooks_for(&self, doctype: &str, event: DocEvent) -> &[Hook] {
        self.hooks
            .get(&(doctype.to_string(), event))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Runs every hook registered for the document's doctype on `event`.
    pub async fn dispatch(
        &self,
        ctx: &HookContext<'_>,
        doc: &mut document::Model,
        event: DocEvent,
    ) -> Result<()> {
        let hooks = self.hooks_for(&doc.doctype, event);
        if hooks.is_empty() {
            return Ok(());
        }

        tracing::debug!(doctype = %doc.doctype, name = %doc.name, %event, count = hooks.len(), "Dispatching hooks");
        for hook in hooks {
            hook.run(ctx, doc, event).await?;
        }
        Ok(())
    }
}
