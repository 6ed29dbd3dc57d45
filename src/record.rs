use bincode::{Decode, Encode};
use serde::Serialize;

/// Text stored at a position with no data. Parses as JSON `null`.
pub const ABSENT_RECORD: &str = "null";

/// One split of raw JSON records, tagged with the dataset and split it came from.
///
/// Records are kept as the text read from disk; parsing happens on access.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize)]
pub struct SplitDataset {
    dataset: String,
    split: String,
    records: Vec<String>,
}

impl SplitDataset {
    pub fn new(records: Vec<String>, dataset: impl Into<String>, split: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            split: split.into(),
            records,
        }
    }

    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    pub fn split(&self) -> &str {
        &self.split
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn raw(&self, index: usize) -> Option<&str> {
        self.records.get(index).map(String::as_str)
    }

    pub fn is_absent(&self, index: usize) -> bool {
        self.raw(index) == Some(ABSENT_RECORD)
    }

    pub fn absent_count(&self) -> usize {
        self.records.iter().filter(|r| r.as_str() == ABSENT_RECORD).count()
    }

    /// Parse the record at `index`. Absent records come back as `Value::Null`.
    pub fn get(&self, index: usize) -> Option<serde_json::Result<serde_json::Value>> {
        self.raw(index).map(serde_json::from_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(String::as_str)
    }

    pub fn records(&self) -> &[String] {
        &self.records
    }

    pub fn into_records(self) -> Vec<String> {
        self.records
    }
}

/// Split name to split records, in the order the splits were resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Encode, Decode, Serialize)]
pub struct DatasetBundle {
    splits: Vec<SplitDataset>,
}

impl DatasetBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a split. Returns the split back if one with the same name is already present.
    pub fn insert(&mut self, split: SplitDataset) -> Result<(), SplitDataset> {
        if self.contains(split.split()) {
            return Err(split);
        }
        self.splits.push(split);
        Ok(())
    }

    pub fn get(&self, split: &str) -> Option<&SplitDataset> {
        self.splits.iter().find(|s| s.split() == split)
    }

    pub fn contains(&self, split: &str) -> bool {
        self.get(split).is_some()
    }

    pub fn split_names(&self) -> Vec<&str> {
        self.splits.iter().map(SplitDataset::split).collect()
    }

    pub fn len(&self) -> usize {
        self.splits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.splits.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SplitDataset> {
        self.splits.iter()
    }
}

impl std::ops::Index<&str> for DatasetBundle {
    type Output = SplitDataset;

    fn index(&self, split: &str) -> &SplitDataset {
        match self.get(split) {
            Some(s) => s,
            None => panic!("no split named {}", split),
        }
    }
}
