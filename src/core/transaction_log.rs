//! Legal transaction log.
//!
//! In regions that require it, every submitted invoice or payment is appended to
//! the transaction log as a serialized snapshot. The log is a hash chain: each
//! row hashes its own content and links to the previous row's chaining hash, so
//! editing or removing a past row is detectable with [`verify_chain`].

use crate::{
    core::{
        context::HookContext,
        document::{as_dict, format_datetime},
        hooks::DocEvent,
        region::{ComplianceFeature, region_with_feature},
    },
    entities::{TransactionLog, document, transaction_log},
    errors::Result,
};
use chrono::{DateTime, SubsecRound, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use sha2::{Digest, Sha256};
use tracing::instrument;

/// Stored as `previous_hash` when the preceding row cannot be found.
pub const BROKEN_INDEX: &str = "Indexing broken";

/// Result of walking the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainStatus {
    /// Every row's hashes match its content and its predecessor
    Intact {
        /// Number of rows checked
        rows: usize,
    },
    /// The first row whose hashes do not check out
    Broken {
        /// Index of that row
        row_index: i64,
    },
}

fn sha256_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

fn hash_line(row_index: i64, timestamp: &DateTime<Utc>, data: &str) -> String {
    sha256_hex(&format!("{row_index}{}{data}", format_datetime(timestamp)))
}

fn hash_chain(transaction_hash: &str, previous_hash: &str) -> String {
    sha256_hex(&format!("{transaction_hash}{previous_hash}"))
}

/// Appends a snapshot of a submitted document to the transaction log.
///
/// Runs only when the site's region enables transaction logging. The region is
/// the site default, not the document's company.
#[instrument(skip(ctx, doc), fields(doctype = %doc.doctype, name = %doc.name))]
pub async fn create_transaction_log(
    ctx: &HookContext<'_>,
    doc: &document::Model,
    event: DocEvent,
) -> Result<()> {
    if region_with_feature(ctx, None, ComplianceFeature::TransactionLogged)
        .await?
        .is_none()
    {
        return Ok(());
    }

    let data = serde_json::to_string(&as_dict(doc))?;
    let row = append(ctx.db, &doc.doctype, &doc.name, &data).await?;
    tracing::info!(row_index = row.row_index, "Appended transaction log");
    Ok(())
}

/// Appends one row to the chain.
///
/// The row index, timestamp and hashes are computed here inside a database
/// transaction, so two appends cannot claim the same index.
pub async fn append(
    db: &DatabaseConnection,
    reference_doctype: &str,
    document_name: &str,
    data: &str,
) -> Result<transaction_log::Model> {
    let txn = db.begin().await?;

    let last = TransactionLog::find()
        .order_by_desc(transaction_log::Column::RowIndex)
        .one(&txn)
        .await?;

    let row_index = last.as_ref().map_or(1, |row| row.row_index + 1);
    let timestamp = Utc::now().trunc_subsecs(6);
    let transaction_hash = hash_line(row_index, &timestamp, data);

    let previous_hash = if row_index == 1 {
        transaction_hash.clone()
    } else {
        TransactionLog::find()
            .filter(transaction_log::Column::RowIndex.eq(row_index - 1))
            .one(&txn)
            .await?
            .map_or_else(|| BROKEN_INDEX.to_string(), |prev| prev.chaining_hash)
    };

    let chaining_hash = hash_chain(&transaction_hash, &previous_hash);

    let row = transaction_log::ActiveModel {
        row_index: Set(row_index),
        reference_doctype: Set(reference_doctype.to_string()),
        document_name: Set(document_name.to_string()),
        data: Set(data.to_string()),
        timestamp: Set(timestamp),
        transaction_hash: Set(transaction_hash),
        previous_hash: Set(previous_hash),
        chaining_hash: Set(chaining_hash),
        ..Default::default()
    };

    let result = row.insert(&txn).await?;
    txn.commit().await?;

    Ok(result)
}

/// Log rows for one document, oldest first.
pub async fn get_logs_for_document(
    db: &DatabaseConnection,
    reference_doctype: &str,
    document_name: &str,
) -> Result<Vec<transaction_log::Model>> {
    TransactionLog::find()
        .filter(transaction_log::Column::ReferenceDoctype.eq(reference_doctype))
        .filter(transaction_log::Column::DocumentName.eq(document_name))
        .order_by_asc(transaction_log::Column::RowIndex)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Recomputes every row's hashes in index order and reports the first mismatch.
pub async fn verify_chain(db: &DatabaseConnection) -> Result<ChainStatus> {
    let rows = TransactionLog::find()
        .order_by_asc(transaction_log::Column::RowIndex)
        .all(db)
        .await?;

    let mut previous_chaining: Option<&str> = None;
    for (position, row) in rows.iter().enumerate() {
        let expected_index = i64::try_from(position).map_or(i64::MAX, |p| p + 1);
        let transaction_hash = hash_line(row.row_index, &row.timestamp, &row.data);

        let expected_previous = previous_chaining.unwrap_or(&transaction_hash);
        let intact = row.row_index == expected_index
            && row.transaction_hash == transaction_hash
            && row.previous_hash == expected_previous
            && row.chaining_hash == hash_chain(&transaction_hash, &row.previous_hash);

        if !intact {
            tracing::warn!(row_index = row.row_index, "Transaction log chain broken");
            return Ok(ChainStatus::Broken {
                row_index: row.row_index,
            });
        }

        previous_chaining = Some(&row.chaining_hash);
    }

    Ok(ChainStatus::Intact { rows: rows.len() })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::{defaults, region::upsert_company};
    use crate::test_utils::{TestSite, sample_document};

    async fn log_count(db: &DatabaseConnection) -> Result<u64> {
        TransactionLog::find().count(db).await.map_err(Into::into)
    }

    #[tokio::test]
    async fn test_no_log_outside_logging_regions() -> Result<()> {
        let site = TestSite::new().await?;
        let ctx = site.ctx();
        let doc = sample_document("Sales Invoice", "SINV-0001", None);

        // No region at all
        create_transaction_log(&ctx, &doc, DocEvent::OnSubmit).await?;

        defaults::set_default(&site.db, defaults::COUNTRY_KEY, "Nepal").await?;
        create_transaction_log(&ctx, &doc, DocEvent::OnSubmit).await?;

        assert_eq!(log_count(&site.db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_one_log_per_submit_in_logging_regions() -> Result<()> {
        for country in ["France", "Germany"] {
            let site = TestSite::new().await?;
            defaults::set_default(&site.db, defaults::COUNTRY_KEY, country).await?;
            let doc = sample_document("Payment Entry", "PE-0001", None);

            create_transaction_log(&site.ctx(), &doc, DocEvent::OnSubmit).await?;

            let logs = get_logs_for_document(&site.db, "Payment Entry", "PE-0001").await?;
            assert_eq!(logs.len(), 1);
            let snapshot: serde_json::Value = serde_json::from_str(&logs[0].data)?;
            assert_eq!(snapshot, as_dict(&doc));
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_region_comes_from_site_not_company() -> Result<()> {
        let site = TestSite::new().await?;
        upsert_company(&site.db, "Berlin GmbH", Some("Germany")).await?;
        defaults::set_default(&site.db, defaults::COUNTRY_KEY, "India").await?;

        let doc = sample_document("Sales Invoice", "SINV-0001", Some("Berlin GmbH"));
        create_transaction_log(&site.ctx(), &doc, DocEvent::OnSubmit).await?;

        assert_eq!(log_count(&site.db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_chain_links_rows() -> Result<()> {
        let site = TestSite::new().await?;

        let first = append(&site.db, "Sales Invoice", "SINV-0001", "{\"a\":1}").await?;
        let second = append(&site.db, "Sales Invoice", "SINV-0002", "{\"a\":2}").await?;
        let third = append(&site.db, "Payment Entry", "PE-0001", "{\"a\":3}").await?;

        assert_eq!(first.row_index, 1);
        assert_eq!(first.previous_hash, first.transaction_hash);
        assert_eq!(second.row_index, 2);
        assert_eq!(second.previous_hash, first.chaining_hash);
        assert_eq!(third.previous_hash, second.chaining_hash);

        assert_eq!(verify_chain(&site.db).await?, ChainStatus::Intact { rows: 3 });
        Ok(())
    }

    #[tokio::test]
    async fn test_first_row_hashes() -> Result<()> {
        let site = TestSite::new().await?;
        let row = append(&site.db, "Sales Invoice", "SINV-0001", "data").await?;

        let line = format!("1{}data", format_datetime(&row.timestamp));
        let expected = hex::encode(Sha256::digest(line.as_bytes()));
        assert_eq!(row.transaction_hash, expected);
        assert_ne!(row.transaction_hash, sha256_hex("data"));

        assert_eq!(row.previous_hash, expected);
        assert_eq!(
            row.chaining_hash,
            sha256_hex(&format!("{expected}{expected}"))
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_verify_detects_tampering() -> Result<()> {
        let site = TestSite::new().await?;
        append(&site.db, "Sales Invoice", "SINV-0001", "original").await?;
        let second = append(&site.db, "Sales Invoice", "SINV-0002", "second").await?;
        append(&site.db, "Sales Invoice", "SINV-0003", "third").await?;

        let mut tampered: transaction_log::ActiveModel = second.into();
        tampered.data = Set("edited".to_string());
        tampered.update(&site.db).await?;

        assert_eq!(
            verify_chain(&site.db).await?,
            ChainStatus::Broken { row_index: 2 }
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_verify_detects_removed_row() -> Result<()> {
        let site = TestSite::new().await?;
        append(&site.db, "Sales Invoice", "SINV-0001", "one").await?;
        let second = append(&site.db, "Sales Invoice", "SINV-0002", "two").await?;
        append(&site.db, "Sales Invoice", "SINV-0003", "three").await?;

        second.delete(&site.db).await?;

        assert_eq!(
            verify_chain(&site.db).await?,
            ChainStatus::Broken { row_index: 3 }
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_chain_is_intact() -> Result<()> {
        let site = TestSite::new().await?;
        assert_eq!(verify_chain(&site.db).await?, ChainStatus::Intact { rows: 0 });
        Ok(())
    }
}
