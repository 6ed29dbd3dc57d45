use crate::error::{LoaderError, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Index parsed from a shard file name: everything before the first `.` of the base name.
pub fn shard_index(path: &Path) -> Result<usize> {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.split('.').next())
        .and_then(|stem| stem.parse::<usize>().ok())
        .ok_or_else(|| LoaderError::InvalidShardName(path.to_path_buf()))
}

/// Shard paths keyed by their integer index. Indices may have gaps and need not start at 0.
#[derive(Debug, Default, Clone)]
pub struct SparseIndex {
    entries: BTreeMap<usize, PathBuf>,
}

impl SparseIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_paths<I, P>(paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut index = Self::new();
        for path in paths {
            index.insert(path.into())?;
        }
        Ok(index)
    }

    /// Add a shard. Two paths that parse to the same index (`3.json.gz`, `03.json.gz`)
    /// collide and the later insert wins.
    pub fn insert(&mut self, path: PathBuf) -> Result<()> {
        let idx = shard_index(&path)?;
        self.entries.insert(idx, path);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_index(&self) -> Option<usize> {
        self.entries.keys().next_back().copied()
    }

    /// Fill every gap in `0..=max_index` with `None`, keeping at most `cap` positions.
    ///
    /// Only the kept positions are materialized; gaps are counted over the full range.
    pub fn densify(&self, cap: Option<usize>) -> Result<DenseIndex> {
        let Some(max_index) = self.max_index() else {
            return Ok(DenseIndex::default());
        };

        let span = max_index
            .checked_add(1)
            .ok_or(LoaderError::IndexOverflow(max_index))?;
        let missing = span - self.entries.len();
        let len = cap.map_or(span, |cap| cap.min(span));

        let slots = (0..len).map(|i| self.entries.get(&i).cloned()).collect();
        Ok(DenseIndex { slots, missing })
    }
}

/// Positional shard sequence: position `i` holds the path for index `i`, or `None` if absent.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DenseIndex {
    slots: Vec<Option<PathBuf>>,
    missing: usize,
}

impl DenseIndex {
    pub fn slots(&self) -> &[Option<PathBuf>] {
        &self.slots
    }

    /// Gaps found across the full `0..=max_index` range, counted before any cap.
    pub fn missing(&self) -> usize {
        self.missing
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
