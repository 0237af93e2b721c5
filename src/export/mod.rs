//! CSV export of filtered transactions.

mod format;
mod handlers;

pub use handlers::{export_csv, get_export_preview};
