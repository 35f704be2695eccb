//! Document store and lifecycle.
//!
//! Provides the minimal document operations the regional hooks hang off:
//! insert, submit, cancel and delete. Each lifecycle step fires the hooks
//! registered for its event through a [`HookRegistry`]. Hooks that veto an
//! operation (the deletion guard) run before the row is touched.

use crate::{
    core::{
        context::HookContext,
        hooks::{DocEvent, HookRegistry},
    },
    entities::{
        Document,
        document::{self, DOCSTATUS_CANCELLED, DOCSTATUS_DRAFT, DOCSTATUS_SUBMITTED},
    },
    errors::{Error, Result},
};
use chrono::{DateTime, SubsecRound, Utc};
use sea_orm::{Set, prelude::*};
use serde_json::{Map, Value};
use sha2::{Digest, Sha224};

/// Timestamp layout used in serialized documents and signatures.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// A document to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDocument {
    pub doctype: String,
    /// Unique within the doctype
    pub name: String,
    /// Owning company; decides the region of most hooks
    pub company: Option<String>,
    /// Doctype-specific fields; must be a JSON object
    pub data: Value,
}

impl NewDocument {
    /// A draft with no company and no fields.
    #[must_use]
    pub fn new(doctype: &str, name: &str) -> Self {
        Self {
            doctype: doctype.to_string(),
            name: name.to_string(),
            company: None,
            data: Value::Object(Map::new()),
        }
    }

    #[must_use]
    pub fn company(mut self, company: &str) -> Self {
        self.company = Some(company.to_string());
        self
    }

    #[must_use]
    pub fn data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }
}

fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Formats a timestamp the way serialized documents carry it.
#[must_use]
pub fn format_datetime(value: &DateTime<Utc>) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

/// Finds a document by doctype and name.
pub async fn get_document<C>(db: &C, doctype: &str, name: &str) -> Result<Option<document::Model>>
where
    C: ConnectionTrait,
{
    Document::find()
        .filter(document::Column::Doctype.eq(doctype))
        .filter(document::Column::Name.eq(name))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Like [`get_document`], but a missing document is an error.
pub async fn require_document<C>(db: &C, doctype: &str, name: &str) -> Result<document::Model>
where
    C: ConnectionTrait,
{
    get_document(db, doctype, name)
        .await?
        .ok_or_else(|| Error::DocumentNotFound {
            doctype: doctype.to_string(),
            name: name.to_string(),
        })
}

/// Inserts a draft document, then fires its `after_insert` hooks.
///
/// Returns the document as it stands after the hooks ran (a hook may set
/// columns such as `qr_code`).
pub async fn insert_document(
    ctx: &HookContext<'_>,
    hooks: &HookRegistry,
    new: NewDocument,
) -> Result<document::Model> {
    if new.doctype.trim().is_empty() || new.name.trim().is_empty() {
        return Err(Error::InvalidDocument {
            message: "Doctype and name are required".to_string(),
        });
    }

    if !new.data.is_object() {
        return Err(Error::InvalidDocument {
            message: format!("Fields of {} {} must be an object", new.doctype, new.name),
        });
    }

    if get_document(ctx.db, &new.doctype, &new.name).await?.is_some() {
        return Err(Error::DuplicateDocument {
            doctype: new.doctype,
            name: new.name,
        });
    }

    let timestamp = now();
    let doc = document::ActiveModel {
        doctype: Set(new.doctype),
        name: Set(new.name),
        company: Set(new.company),
        docstatus: Set(DOCSTATUS_DRAFT),
        qr_code: Set(None),
        data: Set(new.data),
        creation: Set(timestamp),
        modified: Set(timestamp),
        ..Default::default()
    };

    let mut doc = doc.insert(ctx.db).await?;
    tracing::info!(doctype = %doc.doctype, name = %doc.name, "Inserted document");

    hooks.dispatch(ctx, &mut doc, DocEvent::AfterInsert).await?;
    Ok(doc)
}

async fn set_docstatus<C>(db: &C, doc: &document::Model, docstatus: i32) -> Result<document::Model>
where
    C: ConnectionTrait,
{
    let mut active_model: document::ActiveModel = doc.clone().into();
    active_model.docstatus = Set(docstatus);
    active_model.modified = Set(now());
    active_model.update(db).await.map_err(Into::into)
}

async fn transition(
    ctx: &HookContext<'_>,
    hooks: &HookRegistry,
    doctype: &str,
    name: &str,
    action: &'static str,
    (from, to): (i32, i32),
    event: DocEvent,
) -> Result<document::Model> {
    let original = require_document(ctx.db, doctype, name).await?;
    if original.docstatus != from {
        return Err(Error::InvalidDocStatus {
            action,
            doctype: original.doctype,
            name: original.name,
            docstatus: original.docstatus,
        });
    }

    let mut doc = set_docstatus(ctx.db, &original, to).await?;

    if let Err(e) = hooks.dispatch(ctx, &mut doc, event).await {
        tracing::error!(doctype, name, %event, "Hook failed, restoring docstatus: {e}");
        set_docstatus(ctx.db, &doc, from).await?;
        return Err(e);
    }

    tracing::info!(doctype, name, docstatus = to, "Document {action} succeeded");
    Ok(doc)
}

/// Submits a draft document and fires its `on_submit` hooks.
///
/// If a hook fails, the document goes back to draft and the error is returned.
pub async fn submit_document(
    ctx: &HookContext<'_>,
    hooks: &HookRegistry,
    doctype: &str,
    name: &str,
) -> Result<document::Model> {
    transition(
        ctx,
        hooks,
        doctype,
        name,
        "submit",
        (DOCSTATUS_DRAFT, DOCSTATUS_SUBMITTED),
        DocEvent::OnSubmit,
    )
    .await
}

/// Cancels a submitted document and fires its `on_cancel` hooks.
pub async fn cancel_document(
    ctx: &HookContext<'_>,
    hooks: &HookRegistry,
    doctype: &str,
    name: &str,
) -> Result<document::Model> {
    transition(
        ctx,
        hooks,
        doctype,
        name,
        "cancel",
        (DOCSTATUS_SUBMITTED, DOCSTATUS_CANCELLED),
        DocEvent::OnCancel,
    )
    .await
}

/// Fires the `on_trash` hooks of a document, then deletes it.
///
/// A hook error aborts the deletion and leaves the document in place.
pub async fn delete_document(
    ctx: &HookContext<'_>,
    hooks: &HookRegistry,
    doctype: &str,
    name: &str,
) -> Result<()> {
    let mut doc = require_document(ctx.db, doctype, name).await?;

    hooks.dispatch(ctx, &mut doc, DocEvent::OnTrash).await?;

    doc.delete(ctx.db).await?;
    tracing::info!(doctype, name, "Deleted document");
    Ok(())
}

/// Writes the `qr_code` column directly, bypassing the lifecycle, and mirrors
/// the change onto `doc`.
pub async fn db_set_qr_code<C>(db: &C, doc: &mut document::Model, value: Option<String>) -> Result<()>
where
    C: ConnectionTrait,
{
    let mut active_model: document::ActiveModel = doc.clone().into();
    active_model.qr_code = Set(value);
    active_model.modified = Set(now());
    *doc = active_model.update(db).await?;
    Ok(())
}

/// Flattens a document into a single JSON object: its doctype-specific fields
/// plus the standard fields, which take precedence.
#[must_use]
pub fn as_dict(doc: &document::Model) -> Value {
    let mut map = match &doc.data {
        Value::Object(fields) => fields.clone(),
        _ => Map::new(),
    };

    map.insert("doctype".to_string(), Value::from(doc.doctype.clone()));
    map.insert("name".to_string(), Value::from(doc.name.clone()));
    map.insert(
        "company".to_string(),
        doc.company.clone().map_or(Value::Null, Value::from),
    );
    map.insert("docstatus".to_string(), Value::from(doc.docstatus));
    map.insert(
        "qr_code".to_string(),
        doc.qr_code.clone().map_or(Value::Null, Value::from),
    );
    map.insert(
        "creation".to_string(),
        Value::from(format_datetime(&doc.creation)),
    );
    map.insert(
        "modified".to_string(),
        Value::from(format_datetime(&doc.modified)),
    );

    Value::Object(map)
}

/// Signature used to authorize public links to a document: sha224 of its
/// creation timestamp, hex encoded.
#[must_use]
pub fn signature(doc: &document::Model) -> String {
    hex::encode(Sha224::digest(format_datetime(&doc.creation).as_bytes()))
}
