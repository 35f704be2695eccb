//! Database configuration module for the regional compliance hooks.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated with `Schema::create_table_from_entity`, so the database
//! schema always matches the entity definitions without hand-written SQL. Creation
//! is idempotent: existing tables are left untouched.

use crate::entities::{
    Company, DocField, Document, File, PropertySetter, SystemState, TransactionLog,
};
use crate::errors::Result;
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema, sea_query::TableCreateStatement,
};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/erp_regional.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the `SQLite` database using the `DATABASE_URL` environment variable.
///
/// Falls back to a default local `SQLite` file if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    tracing::debug!("Connecting to database at {database_url}");
    Database::connect(&database_url).await.map_err(Into::into)
}

fn table_for<E: EntityTrait>(schema: &Schema, entity: E) -> TableCreateStatement {
    let mut table = schema.create_table_from_entity(entity);
    table.if_not_exists();
    table
}

/// Creates all necessary database tables using `SeaORM`'s schema generation from entity definitions.
///
/// Covers companies, documents and their schema (doc fields, property setters),
/// files, the transaction log, and system defaults.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let tables = [
        table_for(&schema, Company),
        table_for(&schema, Document),
        table_for(&schema, DocField),
        table_for(&schema, PropertySetter),
        table_for(&schema, File),
        table_for(&schema, TransactionLog),
        table_for(&schema, SystemState),
    ];

    for table in &tables {
        db.execute(builder.build(table)).await?;
    }

    Ok(())
}
