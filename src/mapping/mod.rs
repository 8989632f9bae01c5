pub mod reader;
pub mod record;

pub use reader::{read, read_csv, read_named};
pub use record::{MappingRecord, MappingSet, REQUIRED_COLUMNS};
