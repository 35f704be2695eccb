use clap::{Parser, Subcommand};

/// Command line of the `erp-regional` binary.
#[derive(Debug, Parser)]
#[command(name = "erp-regional", version, about = "Regional compliance hooks for ERP documents")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// A document is addressed by its doctype and name.
#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Create the database tables
    Init,
    /// Create a company, or update its country
    Company {
        name: String,
        #[arg(long)]
        country: Option<String>,
    },
    /// Declare a field on a doctype (e.g. `qr_code` "Attach Image")
    AddField {
        doctype: String,
        fieldname: String,
        fieldtype: String,
    },
    /// Insert a draft document and run its after-insert hooks
    Insert {
        doctype: String,
        name: String,
        #[arg(long)]
        company: Option<String>,
    },
    /// Submit a draft document
    Submit { doctype: String, name: String },
    /// Cancel a submitted document
    Cancel { doctype: String, name: String },
    /// Delete a document
    Delete { doctype: String, name: String },
    /// Generate a document's QR code if it is missing
    Qr { doctype: String, name: String },
    /// Check the transaction log chain
    VerifyLog,
}
