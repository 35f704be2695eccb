mod cli;

use clap::Parser;
use cli::{Cli, Command};
use erp_regional::{
    config::{database, settings},
    core::{
        context::HookContext,
        document::{self, NewDocument},
        hooks::{DocEvent, HookRegistry},
        meta,
        notify::Notifier,
        region::{self, ComplianceFeature, RegionPolicy},
        transaction_log::{self, ChainStatus},
    },
    errors::{Error, Result},
};
use dotenvy::dotenv;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (as early as possible)
    dotenv().ok(); // Make it non-fatal, env vars can be set externally

    let Cli { command } = Cli::parse();

    // 3. Load site settings and the region policy
    let settings = settings::load_default_config()
        .inspect_err(|e| error!("Critical error loading site settings: {}", e))?;
    let policy = RegionPolicy::with_overrides(&settings.regions);
    for feature in [
        ComplianceFeature::DeletionRestricted,
        ComplianceFeature::TransactionLogged,
        ComplianceFeature::QrEnabled,
    ] {
        info!(?feature, regions = ?policy.regions_with(feature), "Region policy");
    }

    // 4. Connect and make sure all tables exist
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    let notifier = Notifier::default();
    let ctx = HookContext::new(&db, &settings.site, &policy, &notifier);
    let hooks = HookRegistry::regional();

    // 5. Run the requested lifecycle step
    match command {
        Command::Init => {}
        Command::Company { name, country } => {
            let company = region::upsert_company(&db, &name, country.as_deref()).await?;
            info!(name = %company.name, country = ?company.country, "Company saved");
        }
        Command::AddField {
            doctype,
            fieldname,
            fieldtype,
        } => {
            meta::add_field(&db, &doctype, &fieldname, &fieldtype).await?;
            info!(%doctype, %fieldname, %fieldtype, "Field added");
        }
        Command::Insert {
            doctype,
            name,
            company,
        } => {
            let mut new = NewDocument::new(&doctype, &name);
            if let Some(company) = company.as_deref() {
                new = new.company(company);
            }
            let doc = document::insert_document(&ctx, &hooks, new).await?;
            info!(qr_code = ?doc.qr_code, "Inserted {} {}", doc.doctype, doc.name);
        }
        Command::Submit { doctype, name } => {
            document::submit_document(&ctx, &hooks, &doctype, &name).await?;
        }
        Command::Cancel { doctype, name } => {
            document::cancel_document(&ctx, &hooks, &doctype, &name).await?;
        }
        Command::Delete { doctype, name } => {
            document::delete_document(&ctx, &hooks, &doctype, &name).await?;
        }
        Command::Qr { doctype, name } => {
            let mut doc = document::require_document(&db, &doctype, &name).await?;
            hooks.dispatch(&ctx, &mut doc, DocEvent::AfterInsert).await?;
            info!(qr_code = ?doc.qr_code, "QR code");
        }
        Command::VerifyLog => match transaction_log::verify_chain(&db).await? {
            ChainStatus::Intact { rows } => info!(rows, "Transaction log intact"),
            ChainStatus::Broken { row_index } => {
                warn!(row_index, "Transaction log broken");
                return Err(Error::Config {
                    message: format!("Transaction log broken at row {row_index}"),
                });
            }
        },
    }

    Ok(())
}
