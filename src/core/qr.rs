//! QR codes for invoices.
//!
//! In regions that require it, an invoice carries a QR code that links to its
//! public print view. The code is generated once after insert, stored as a
//! public File, and its URL written to the invoice's `qr_code` field. Deleting
//! the invoice deletes the File.

use crate::{
    core::{
        context::HookContext,
        defaults,
        document::{db_set_qr_code, signature},
        file::{self, NewFile},
        hooks::DocEvent,
        meta,
        region::{ComplianceFeature, region_with_feature},
    },
    entities::{doc_field::FIELDTYPE_ATTACH_IMAGE, document},
    errors::{Error, Result},
};
use image::{GrayImage, ImageEncoder, Luma, codecs::png::PngEncoder};
use qrcode::{Color, EcLevel, QrCode};
use tracing::instrument;

/// Field holding the QR image URL.
pub const QR_CODE_FIELD: &str = "qr_code";
/// Print format used when the doctype has no default.
pub const STANDARD_PRINT_FORMAT: &str = "Standard";

/// How a payload is encoded and rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QrOptions {
    /// Error correction level
    pub ec_level: EcLevel,
    /// Pixels per module
    pub scale: u32,
    /// Light border around the code, in modules
    pub quiet_zone: u32,
}

impl Default for QrOptions {
    fn default() -> Self {
        Self {
            ec_level: EcLevel::L,
            scale: 2,
            quiet_zone: 1,
        }
    }
}

/// Encodes `payload` as a QR code and renders it as a grayscale PNG.
///
/// The image is `(modules + 2 * quiet_zone) * scale` pixels on each side.
pub fn render_png(payload: &str, options: &QrOptions) -> Result<Vec<u8>> {
    let code = QrCode::with_error_correction_level(payload.as_bytes(), options.ec_level)?;
    let modules = u32::try_from(code.width()).map_err(|e| Error::QrEncode(e.to_string()))?;
    let scale = options.scale.max(1);
    let side = (modules + 2 * options.quiet_zone) * scale;

    let mut img = GrayImage::from_pixel(side, side, Luma([255]));
    for (i, color) in code.to_colors().into_iter().enumerate() {
        if color != Color::Dark {
            continue;
        }
        let i = u32::try_from(i).map_err(|e| Error::QrEncode(e.to_string()))?;
        let x0 = (i % modules + options.quiet_zone) * scale;
        let y0 = (i / modules + options.quiet_zone) * scale;
        for dy in 0..scale {
            for dx in 0..scale {
                img.put_pixel(x0 + dx, y0 + dy, Luma([0]));
            }
        }
    }

    let mut png = Vec::new();
    PngEncoder::new(&mut png).write_image(
        img.as_raw(),
        side,
        side,
        image::ExtendedColorType::L8,
    )?;
    Ok(png)
}

/// Name of the File holding a document's QR code.
#[must_use]
pub fn qr_file_name(document_name: &str) -> String {
    file::sanitize_file_name(&format!("QR-CODE-{document_name}.png"))
}

/// Public link to a document's print view, the payload of its QR code:
/// `{base_url}/{doctype}/{name}?format={print_format}&_lang={language}&key={signature}`.
pub async fn qr_code_url(ctx: &HookContext<'_>, doc: &document::Model) -> Result<String> {
    let print_format = meta::get_property(ctx.db, &doc.doctype, meta::DEFAULT_PRINT_FORMAT)
        .await?
        .unwrap_or_else(|| STANDARD_PRINT_FORMAT.to_string());

    let language = defaults::get_default(ctx.db, defaults::LANGUAGE_KEY)
        .await?
        .unwrap_or_else(|| ctx.site.language.clone());

    Ok(format!(
        "{}/{}/{}?format={print_format}&_lang={language}&key={}",
        ctx.site.url(),
        doc.doctype,
        doc.name,
        signature(doc)
    ))
}

/// Generates the QR code of an invoice and attaches it.
///
/// Does nothing when the region does not use QR codes, the doctype has no
/// `qr_code` image field, or the document already points at an existing File.
#[instrument(skip(ctx, doc), fields(doctype = %doc.doctype, name = %doc.name))]
pub async fn create_qr_code(
    ctx: &HookContext<'_>,
    doc: &mut document::Model,
    event: DocEvent,
) -> Result<()> {
    if region_with_feature(ctx, doc.company.as_deref(), ComplianceFeature::QrEnabled)
        .await?
        .is_none()
    {
        return Ok(());
    }

    if !meta::has_field(ctx.db, &doc.doctype, QR_CODE_FIELD).await? {
        return Ok(());
    }

    if let Some(existing) = doc.qr_code.as_deref().filter(|url| !url.is_empty()) {
        if file::file_exists(ctx.db, existing).await? {
            tracing::debug!(file_url = existing, "QR code already present");
            return Ok(());
        }
    }

    if meta::find_field(ctx.db, &doc.doctype, QR_CODE_FIELD, FIELDTYPE_ATTACH_IMAGE)
        .await?
        .is_none()
    {
        return Ok(());
    }

    let url = qr_code_url(ctx, doc).await?;
    let png = render_png(&url, &QrOptions::default())?;

    let saved = file::save_file(
        ctx.db,
        ctx.site,
        NewFile {
            file_name: qr_file_name(&doc.name),
            is_private: false,
            content: png,
            attached_to_doctype: Some(doc.doctype.clone()),
            attached_to_name: Some(doc.name.clone()),
        },
    )
    .await?;

    db_set_qr_code(ctx.db, doc, Some(saved.file_url)).await?;
    ctx.notifier.notify_update(doc);

    tracing::info!(qr_code = ?doc.qr_code, "Created QR code");
    Ok(())
}

/// Deletes the File behind an invoice's QR code. Missing Files are ignored.
#[instrument(skip(ctx, doc), fields(doctype = %doc.doctype, name = %doc.name))]
pub async fn delete_qr_code_file(
    ctx: &HookContext<'_>,
    doc: &document::Model,
    event: DocEvent,
) -> Result<()> {
    if region_with_feature(ctx, doc.company.as_deref(), ComplianceFeature::QrEnabled)
        .await?
        .is_none()
    {
        return Ok(());
    }

    if !meta::has_field(ctx.db, &doc.doctype, QR_CODE_FIELD).await? {
        return Ok(());
    }

    let Some(file_url) = doc.qr_code.as_deref().filter(|url| !url.is_empty()) else {
        return Ok(());
    };

    match file::find_files_by_url(ctx.db, file_url).await?.into_iter().next() {
        Some(found) => file::delete_file(ctx.db, ctx.site, found).await,
        None => {
            tracing::debug!(file_url, "No File behind QR code");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::{
        document::{NewDocument, get_document, insert_document},
        hooks::{HookRegistry, SALES_INVOICE},
        region::upsert_company,
    };
    use crate::entities::File;
    use crate::test_utils::{TestSite, sample_document};
    use sea_orm::{EntityTrait, PaginatorTrait};

    async fn file_count(site: &TestSite) -> Result<u64> {
        File::find().count(&site.db).await.map_err(Into::into)
    }

    /// A Saudi company and a Sales Invoice schema with a QR image field.
    async fn saudi_site() -> Result<TestSite> {
        let site = TestSite::new().await?;
        upsert_company(&site.db, "Riyadh Co", Some("Saudi Arabia")).await?;
        meta::add_field(&site.db, SALES_INVOICE, "customer", "Link").await?;
        meta::add_field(&site.db, SALES_INVOICE, QR_CODE_FIELD, FIELDTYPE_ATTACH_IMAGE).await?;
        Ok(site)
    }

    #[test]
    fn test_qr_file_name_strips_separators() {
        assert_eq!(qr_file_name("SINV-0001"), "QR-CODE-SINV-0001.png");
        assert_eq!(qr_file_name("ACC/SINV/1"), "QR-CODE-ACC__SINV__1.png");
    }

    #[test]
    fn test_render_png_dimensions() {
        let payload = "https://erp.example.com/Sales Invoice/SINV-0001?format=Standard&_lang=en&key=abc";
        let options = QrOptions::default();
        let png = render_png(payload, &options).unwrap();

        let modules = u32::try_from(
            QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::L)
                .unwrap()
                .width(),
        )
        .unwrap();
        let gray = image::load_from_memory(&png).unwrap().to_luma8();
        assert_eq!(gray.width(), (modules + 2) * 2);
        assert_eq!(gray.height(), gray.width());

        // Quiet zone is light, the finder pattern corner is dark
        assert_eq!(gray.get_pixel(0, 0).0, [255]);
        assert_eq!(gray.get_pixel(2, 2).0, [0]);
    }

    #[tokio::test]
    async fn test_qr_code_url() -> Result<()> {
        let site = saudi_site().await?;
        let doc = sample_document(SALES_INVOICE, "SINV-0001", Some("Riyadh Co"));

        let url = qr_code_url(&site.ctx(), &doc).await?;
        assert_eq!(
            url,
            format!(
                "https://erp.example.com/Sales Invoice/SINV-0001?format=Standard&_lang=en&key={}",
                signature(&doc)
            )
        );

        meta::set_property(&site.db, SALES_INVOICE, meta::DEFAULT_PRINT_FORMAT, "KSA VAT").await?;
        defaults::set_default(&site.db, defaults::LANGUAGE_KEY, "ar").await?;
        let url = qr_code_url(&site.ctx(), &doc).await?;
        assert!(url.contains("?format=KSA VAT&_lang=ar&key="));
        Ok(())
    }

    #[tokio::test]
    async fn test_insert_generates_exactly_one_file() -> Result<()> {
        let site = saudi_site().await?;
        let mut updates = site.notifier.subscribe();
        let hooks = HookRegistry::regional();

        let doc = insert_document(
            &site.ctx(),
            &hooks,
            NewDocument::new(SALES_INVOICE, "SINV-0001").company("Riyadh Co"),
        )
        .await?;

        assert_eq!(file_count(&site).await?, 1);
        let file_url = doc.qr_code.clone().unwrap();
        assert_eq!(file_url, "/files/QR-CODE-SINV-0001.png");

        let stored = get_document(&site.db, SALES_INVOICE, "SINV-0001").await?.unwrap();
        assert_eq!(stored.qr_code.as_deref(), Some(file_url.as_str()));

        let files = file::find_files_by_url(&site.db, &file_url).await?;
        assert_eq!(files[0].attached_to_name.as_deref(), Some("SINV-0001"));
        let png = file::get_content(&site.settings, &files[0]).await?;
        assert!(png.starts_with(b"\x89PNG"));

        let update = updates.recv().await.unwrap();
        assert_eq!(update.name, "SINV-0001");
        Ok(())
    }

    #[tokio::test]
    async fn test_create_qr_code_is_idempotent() -> Result<()> {
        let site = saudi_site().await?;
        let hooks = HookRegistry::regional();
        let mut doc = insert_document(
            &site.ctx(),
            &hooks,
            NewDocument::new(SALES_INVOICE, "SINV-0001").company("Riyadh Co"),
        )
        .await?;
        let first_url = doc.qr_code.clone();

        create_qr_code(&site.ctx(), &mut doc, DocEvent::AfterInsert).await?;
        create_qr_code(&site.ctx(), &mut doc, DocEvent::AfterInsert).await?;

        assert_eq!(file_count(&site).await?, 1);
        assert_eq!(doc.qr_code, first_url);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_qr_code_replaces_dangling_url() -> Result<()> {
        let site = saudi_site().await?;
        let hooks = HookRegistry::new();
        let mut doc = insert_document(
            &site.ctx(),
            &hooks,
            NewDocument::new(SALES_INVOICE, "SINV-0001").company("Riyadh Co"),
        )
        .await?;
        db_set_qr_code(&site.db, &mut doc, Some("/files/missing.png".to_string())).await?;

        create_qr_code(&site.ctx(), &mut doc, DocEvent::AfterInsert).await?;

        assert_eq!(file_count(&site).await?, 1);
        assert_eq!(doc.qr_code.as_deref(), Some("/files/QR-CODE-SINV-0001.png"));
        Ok(())
    }

    #[tokio::test]
    async fn test_no_qr_code_outside_saudi_arabia() -> Result<()> {
        let site = saudi_site().await?;
        upsert_company(&site.db, "Paris SARL", Some("France")).await?;
        let hooks = HookRegistry::regional();

        let doc = insert_document(
            &site.ctx(),
            &hooks,
            NewDocument::new(SALES_INVOICE, "SINV-0001").company("Paris SARL"),
        )
        .await?;

        assert_eq!(doc.qr_code, None);
        assert_eq!(file_count(&site).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_no_qr_code_without_image_field() -> Result<()> {
        let site = TestSite::new().await?;
        upsert_company(&site.db, "Riyadh Co", Some("Saudi Arabia")).await?;
        let hooks = HookRegistry::new();
        let ctx = site.ctx();

        // No qr_code field at all
        let mut doc = insert_document(
            &ctx,
            &hooks,
            NewDocument::new(SALES_INVOICE, "SINV-0001").company("Riyadh Co"),
        )
        .await?;
        create_qr_code(&ctx, &mut doc, DocEvent::AfterInsert).await?;
        assert_eq!(doc.qr_code, None);

        // A qr_code field of the wrong type
        meta::add_field(&site.db, SALES_INVOICE, QR_CODE_FIELD, "Data").await?;
        create_qr_code(&ctx, &mut doc, DocEvent::AfterInsert).await?;
        assert_eq!(doc.qr_code, None);
        assert_eq!(file_count(&site).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_qr_code_file() -> Result<()> {
        let site = saudi_site().await?;
        let hooks = HookRegistry::regional();
        let doc = insert_document(
            &site.ctx(),
            &hooks,
            NewDocument::new(SALES_INVOICE, "SINV-0001").company("Riyadh Co"),
        )
        .await?;
        assert_eq!(file_count(&site).await?, 1);

        delete_qr_code_file(&site.ctx(), &doc, DocEvent::OnTrash).await?;
        assert_eq!(file_count(&site).await?, 0);

        // Second run finds nothing and is fine
        delete_qr_code_file(&site.ctx(), &doc, DocEvent::OnTrash).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_qr_code_file_ignored_outside_saudi_arabia() -> Result<()> {
        let site = saudi_site().await?;
        let hooks = HookRegistry::regional();
        let mut doc = insert_document(
            &site.ctx(),
            &hooks,
            NewDocument::new(SALES_INVOICE, "SINV-0001").company("Riyadh Co"),
        )
        .await?;

        upsert_company(&site.db, "Riyadh Co", Some("Germany")).await?;
        delete_qr_code_file(&site.ctx(), &doc, DocEvent::OnTrash).await?;
        assert_eq!(file_count(&site).await?, 1);

        doc.qr_code = None;
        upsert_company(&site.db, "Riyadh Co", Some("Saudi Arabia")).await?;
        delete_qr_code_file(&site.ctx(), &doc, DocEvent::OnTrash).await?;
        assert_eq!(file_count(&site).await?, 1);
        Ok(())
    }
}
