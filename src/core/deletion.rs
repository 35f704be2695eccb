//! Region-gated deletion guard.
//!
//! Some regions require submitted and cancelled accounting documents to stay on
//! record. Deleting them there is refused; drafts can always be deleted.

use crate::{
    core::{
        context::HookContext,
        hooks::DocEvent,
        region::{ComplianceFeature, region_with_feature},
    },
    entities::document::{self, DOCSTATUS_DRAFT},
    errors::{Error, Result},
};
use tracing::instrument;

/// Refuses to delete a non-draft document in a region that restricts deletion.
///
/// # Errors
/// Returns [`Error::DeletionNotPermitted`] when the document's region restricts
/// deletion and the document is not a draft.
#[instrument(skip(ctx, doc), fields(doctype = %doc.doctype, name = %doc.name))]
pub async fn check_deletion_permission(
    ctx: &HookContext<'_>,
    doc: &document::Model,
    event: DocEvent,
) -> Result<()> {
    let Some(region) = region_with_feature(
        ctx,
        doc.company.as_deref(),
        ComplianceFeature::DeletionRestricted,
    )
    .await?
    else {
        return Ok(());
    };

    if doc.docstatus != DOCSTATUS_DRAFT {
        tracing::warn!(%region, docstatus = doc.docstatus, "Deletion refused");
        return Err(Error::DeletionNotPermitted { region });
    }

    Ok(())
}
