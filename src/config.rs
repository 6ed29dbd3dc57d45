use crate::error::{LoaderError, Result};
use crate::fetch::FetchStrategy;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

/// Split names implied by a root directory, in resolution order.
pub const DEFAULT_SPLITS: [&str; 3] = ["train", "val", "test"];
pub const DEFAULT_DATASET_NAME: &str = "dataset";

/// Cap on the number of records loaded per split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordLimit {
    Uniform(usize),
    /// Splits not named here are uncapped.
    PerSplit(HashMap<String, usize>),
}

impl RecordLimit {
    pub fn for_split(&self, split: &str) -> Option<usize> {
        match self {
            RecordLimit::Uniform(n) => Some(*n),
            RecordLimit::PerSplit(map) => map.get(split).copied(),
        }
    }
}

/// Options for one dataset load.
#[derive(Debug, Clone)]
pub struct LoadConfig {
    pub path_to_splits: Option<PathBuf>,
    pub split_to_path: Option<Vec<(String, PathBuf)>>,
    /// 0 = sequential, < 0 = all cores, > 0 = fixed pool size
    pub num_workers: i32,
    pub use_cache: bool,
    pub max_records_per_split: Option<RecordLimit>,
    pub dataset_name: String,
    pub show_progress: bool,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            path_to_splits: None,
            split_to_path: None,
            num_workers: 0,
            use_cache: false,
            max_records_per_split: None,
            dataset_name: DEFAULT_DATASET_NAME.to_string(),
            show_progress: true,
        }
    }
}

impl LoadConfig {
    /// Root directory holding `train/`, `val/` and `test/`.
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        Self {
            path_to_splits: Some(root.into()),
            ..Self::default()
        }
    }

    /// Explicit split name to source mapping. Order is kept.
    pub fn from_splits<I, S, P>(splits: I) -> Self
    where
        I: IntoIterator<Item = (S, P)>,
        S: Into<String>,
        P: Into<PathBuf>,
    {
        Self {
            split_to_path: Some(splits.into_iter().map(|(s, p)| (s.into(), p.into())).collect()),
            ..Self::default()
        }
    }

    pub fn with_num_workers(mut self, num_workers: i32) -> Self {
        self.num_workers = num_workers;
        self
    }

    pub fn with_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    pub fn with_record_limit(mut self, limit: RecordLimit) -> Self {
        self.max_records_per_split = Some(limit);
        self
    }

    pub fn with_dataset_name(mut self, name: impl Into<String>) -> Self {
        self.dataset_name = name.into();
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Check option combinations. Touches no files.
    pub fn validate(&self) -> Result<()> {
        if self.path_to_splits.is_some() == self.split_to_path.is_some() {
            return Err(LoaderError::Config(
                "exactly one of path_to_splits or split_to_path must be provided".to_string(),
            ));
        }
        if self.use_cache && self.path_to_splits.is_none() {
            return Err(LoaderError::Config(
                "use_cache requires path_to_splits, the cache file is written into that directory".to_string(),
            ));
        }
        if self.use_cache && self.max_records_per_split.is_some() {
            return Err(LoaderError::Config(
                "use_cache cannot be combined with max_records_per_split".to_string(),
            ));
        }
        if let Some(splits) = &self.split_to_path {
            let mut seen = HashSet::new();
            for (name, _) in splits {
                if !seen.insert(name.as_str()) {
                    return Err(LoaderError::Config(format!("split {} is listed more than once", name)));
                }
            }
        }
        Ok(())
    }

    pub fn fetch_strategy(&self) -> FetchStrategy {
        FetchStrategy::from_worker_count(self.num_workers)
    }

    pub fn limit_for(&self, split: &str) -> Option<usize> {
        self.max_records_per_split.as_ref().and_then(|l| l.for_split(split))
    }

    /// Split sources in resolution order, before any existence check.
    pub fn split_sources(&self) -> Vec<(String, PathBuf)> {
        match (&self.path_to_splits, &self.split_to_path) {
            (Some(root), _) => DEFAULT_SPLITS
                .iter()
                .map(|name| (name.to_string(), root.join(name)))
                .collect(),
            (None, Some(splits)) => splits.clone(),
            (None, None) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_config_err(result: Result<()>) -> bool {
        matches!(result, Err(LoaderError::Config(_)))
    }

    #[test]
    fn test_exactly_one_source_form() {
        assert!(is_config_err(LoadConfig::default().validate()));

        let mut both = LoadConfig::from_root("/data");
        both.split_to_path = Some(vec![("train".to_string(), PathBuf::from("/data/train"))]);
        assert!(is_config_err(both.validate()));

        assert!(LoadConfig::from_root("/data").validate().is_ok());
        assert!(LoadConfig::from_splits([("train", "/x")]).validate().is_ok());
    }

    #[test]
    fn test_cache_requires_root() {
        let config = LoadConfig::from_splits([("train", "/x")]).with_cache(true);
        assert!(is_config_err(config.validate()));
    }

    #[test]
    fn test_cache_excludes_limits() {
        let config = LoadConfig::from_root("/data")
            .with_cache(true)
            .with_record_limit(RecordLimit::Uniform(10));
        assert!(is_config_err(config.validate()));
    }

    #[test]
    fn test_duplicate_split_names_rejected() {
        let config = LoadConfig::from_splits([("train", "/a"), ("train", "/b")]);
        assert!(is_config_err(config.validate()));
    }

    #[test]
    fn test_root_implies_default_splits() {
        let sources = LoadConfig::from_root("/data").split_sources();
        let names: Vec<_> = sources.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["train", "val", "test"]);
        assert_eq!(sources[1].1, PathBuf::from("/data/val"));
    }

    #[test]
    fn test_record_limits() {
        let uniform = LoadConfig::from_root("/d").with_record_limit(RecordLimit::Uniform(5));
        assert_eq!(uniform.limit_for("train"), Some(5));
        assert_eq!(uniform.limit_for("anything"), Some(5));

        let per_split = LoadConfig::from_root("/d")
            .with_record_limit(RecordLimit::PerSplit(HashMap::from([("val".to_string(), 2)])));
        assert_eq!(per_split.limit_for("val"), Some(2));
        assert_eq!(per_split.limit_for("train"), None);

        assert_eq!(LoadConfig::from_root("/d").limit_for("train"), None);
    }
}
