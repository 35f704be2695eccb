//! Doctype schema queries.
//!
//! Hooks ask the schema whether a doctype declares a field instead of probing
//! documents for attributes. Property setters hold site-level overrides of
//! doctype properties such as the default print format.

use crate::{
    entities::{DocField, PropertySetter, doc_field, property_setter},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Property holding a doctype's default print format.
pub const DEFAULT_PRINT_FORMAT: &str = "default_print_format";

/// All fields of a doctype, in schema order.
pub async fn get_fields<C>(db: &C, doctype: &str) -> Result<Vec<doc_field::Model>>
where
    C: ConnectionTrait,
{
    DocField::find()
        .filter(doc_field::Column::Parent.eq(doctype))
        .order_by_asc(doc_field::Column::Idx)
        .order_by_asc(doc_field::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Whether `doctype` declares a field named `fieldname`, of any type.
pub async fn has_field<C>(db: &C, doctype: &str, fieldname: &str) -> Result<bool>
where
    C: ConnectionTrait,
{
    let count = DocField::find()
        .filter(doc_field::Column::Parent.eq(doctype))
        .filter(doc_field::Column::Fieldname.eq(fieldname))
        .count(db)
        .await?;
    Ok(count > 0)
}

/// The first field of `doctype` with the given name and type, in schema order.
pub async fn find_field<C>(
    db: &C,
    doctype: &str,
    fieldname: &str,
    fieldtype: &str,
) -> Result<Option<doc_field::Model>>
where
    C: ConnectionTrait,
{
    let fields = get_fields(db, doctype).await?;
    Ok(fields
        .into_iter()
        .find(|f| f.fieldname == fieldname && f.fieldtype == fieldtype))
}

/// Appends a field to the end of a doctype's schema.
pub async fn add_field<C>(
    db: &C,
    doctype: &str,
    fieldname: &str,
    fieldtype: &str,
) -> Result<doc_field::Model>
where
    C: ConnectionTrait,
{
    if fieldname.trim().is_empty() {
        return Err(Error::InvalidDocument {
            message: format!("Field name cannot be empty for {doctype}"),
        });
    }

    let last_idx = get_fields(db, doctype).await?.last().map(|f| f.idx);

    let field = doc_field::ActiveModel {
        parent: Set(doctype.to_string()),
        fieldname: Set(fieldname.to_string()),
        fieldtype: Set(fieldtype.to_string()),
        idx: Set(last_idx.map_or(1, |idx| idx + 1)),
        ..Default::default()
    };

    field.insert(db).await.map_err(Into::into)
}

/// Reads a property override for a doctype.
pub async fn get_property<C>(db: &C, doctype: &str, property: &str) -> Result<Option<String>>
where
    C: ConnectionTrait,
{
    let setter = PropertySetter::find()
        .filter(property_setter::Column::DocType.eq(doctype))
        .filter(property_setter::Column::Property.eq(property))
        .one(db)
        .await?;
    Ok(setter.map(|s| s.value))
}

/// Sets or replaces a property override for a doctype.
pub async fn set_property<C>(db: &C, doctype: &str, property: &str, value: &str) -> Result<()>
where
    C: ConnectionTrait,
{
    let existing = PropertySetter::find()
        .filter(property_setter::Column::DocType.eq(doctype))
        .filter(property_setter::Column::Property.eq(property))
        .one(db)
        .await?;

    if let Some(setter) = existing {
        let mut active_model: property_setter::ActiveModel = setter.into();
        active_model.value = Set(value.to_string());
        active_model.update(db).await?;
    } else {
        let setter = property_setter::ActiveModel {
            doc_type: Set(doctype.to_string()),
            property: Set(property.to_string()),
            value: Set(value.to_string()),
            ..Default::default()
        };
        setter.insert(db).await?;
    }

    Ok(())
}
