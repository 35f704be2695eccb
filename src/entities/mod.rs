//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables the compliance hooks read and write.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod company;
pub mod doc_field;
pub mod document;
pub mod file;
pub mod property_setter;
pub mod system_state;
pub mod transaction_log;

// Re-export specific types to avoid conflicts
pub use company::{Column as CompanyColumn, Entity as Company, Model as CompanyModel};
pub use doc_field::{Column as DocFieldColumn, Entity as DocField, Model as DocFieldModel};
pub use document::{Column as DocumentColumn, Entity as Document, Model as DocumentModel};
pub use file::{Column as FileColumn, Entity as File, Model as FileModel};
pub use property_setter::{
    Column as PropertySetterColumn, Entity as PropertySetter, Model as PropertySetterModel,
};
pub use system_state::{
    Column as SystemStateColumn, Entity as SystemState, Model as SystemStateModel,
};
pub use transaction_log::{
    Column as TransactionLogColumn, Entity as TransactionLog, Model as TransactionLogModel,
};
