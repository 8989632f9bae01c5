pub mod workbook;

pub use workbook::{export, COLUMN_HEADER, FILE_NAME, MIME_TYPE, SHEET_NAME};
