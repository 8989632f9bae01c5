use serde::{Deserialize, Serialize};

/// Header names a mapping table must carry, in prompt field order.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    "Stage Table",
    "Source Column",
    "Target Table",
    "Target Column",
    "Transformation",
];

/// One source-to-target correspondence from the mapping table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRecord {
    pub stage_table: String,
    pub source_column: String,
    pub target_table: String,
    pub target_column: String,
    pub transformation: String,
}

impl MappingRecord {
    /// Builds a record from cells already ordered like [`REQUIRED_COLUMNS`].
    pub fn from_fields(fields: [String; 5]) -> Self {
        let [stage_table, source_column, target_table, target_column, transformation] = fields;
        Self {
            stage_table,
            source_column,
            target_table,
            target_column,
            transformation,
        }
    }

    pub fn fields(&self) -> [&str; 5] {
        [
            &self.stage_table,
            &self.source_column,
            &self.target_table,
            &self.target_column,
            &self.transformation,
        ]
    }
}

/// Mapping rows in the order they appeared in the uploaded file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingSet {
    records: Vec<MappingRecord>,
}

impl MappingSet {
    pub fn new(records: Vec<MappingRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[MappingRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MappingRecord> {
        self.records.iter()
    }
}

impl FromIterator<MappingRecord> for MappingSet {
    fn from_iter<I: IntoIterator<Item = MappingRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a MappingSet {
    type Item = &'a MappingRecord;
    type IntoIter = std::slice::Iter<'a, MappingRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
