//! Resolves configured splits to their sources and assembles the dataset bundle.
//!
//! A split source is either a directory of `<index>.json.gz` shards or a single
//! `.jsonl.gz` file with one record per line. When caching is enabled the whole
//! bundle is snapshotted under the root directory and reused on later loads.

use crate::cache;
use crate::config::LoadConfig;
use crate::error::{LoaderError, Result};
use crate::fetch::{self, FetchStrategy};
use crate::record::{DatasetBundle, SplitDataset};
use crate::shard_reader;
use crate::sparse_index::SparseIndex;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const SHARD_SUFFIX: &str = ".json.gz";
pub const LINES_SUFFIX: &str = ".jsonl.gz";

/// Non-fatal conditions met during a load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    MissingSplit { split: String, path: PathBuf },
    MissingShards { split: String, dir: PathBuf, count: usize },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadWarning::MissingSplit { split, path } => write!(
                f,
                "Split {} does not exist at path {}, won't be included.",
                split,
                path.display()
            ),
            LoadWarning::MissingShards { dir, count, .. } => {
                write!(f, "Missing {} files in {}.", count, dir.display())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOrigin {
    Cache,
    Fresh,
}

#[derive(Debug)]
pub struct LoadReport {
    pub bundle: DatasetBundle,
    pub warnings: Vec<LoadWarning>,
    pub origin: LoadOrigin,
}

/// Where a split's records come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitSource {
    Lines(PathBuf),
    ShardDir(PathBuf),
}

impl SplitSource {
    pub fn classify(split: &str, path: &Path) -> Result<Self> {
        let is_lines = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(LINES_SUFFIX));
        if is_lines {
            Ok(SplitSource::Lines(path.to_path_buf()))
        } else if path.is_dir() {
            Ok(SplitSource::ShardDir(path.to_path_buf()))
        } else {
            Err(LoaderError::UnrecognizedSource {
                split: split.to_string(),
                path: path.to_path_buf(),
            })
        }
    }
}

/// Load with `config`, discarding warnings after they are logged.
pub fn load_dataset(config: LoadConfig) -> Result<DatasetBundle> {
    Ok(Loader::new(config)?.load()?.bundle)
}

pub struct Loader {
    config: LoadConfig,
}

impl Loader {
    /// Validates the configuration up front.
    pub fn new(config: LoadConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &LoadConfig {
        &self.config
    }

    fn cache_file(&self) -> Option<PathBuf> {
        match (&self.config.path_to_splits, self.config.use_cache) {
            (Some(root), true) => Some(cache::cache_path(root)),
            _ => None,
        }
    }

    pub fn load(&self) -> Result<LoadReport> {
        let cache_file = self.cache_file();
        if let Some(path) = &cache_file {
            if path.exists() {
                info!(path = %path.display(), "loading dataset from cache");
                return Ok(LoadReport {
                    bundle: cache::load(path)?,
                    warnings: Vec::new(),
                    origin: LoadOrigin::Cache,
                });
            }
        }

        if let Some(root) = &self.config.path_to_splits {
            if !root.exists() {
                return Err(LoaderError::Config(format!("Path {} does not exist.", root.display())));
            }
        }

        let mut warnings = Vec::new();
        let mut sources = Vec::new();
        for (split, path) in self.config.split_sources() {
            if path.exists() {
                sources.push((split, path));
            } else {
                let w = LoadWarning::MissingSplit { split, path };
                warn!("{}", w);
                warnings.push(w);
            }
        }

        if sources.is_empty() {
            return Err(LoaderError::NoSplits);
        }

        let strategy = self.config.fetch_strategy();
        let mut bundle = DatasetBundle::new();
        for (split, path) in sources {
            let source = SplitSource::classify(&split, &path)?;
            let records = self.load_split(&split, &source, strategy, &mut warnings)?;
            info!(split = %split, records = records.len(), "loaded split");
            let dataset = SplitDataset::new(records, self.config.dataset_name.clone(), split);
            if let Err(dup) = bundle.insert(dataset) {
                return Err(LoaderError::Config(format!("split {} resolved twice", dup.split())));
            }
        }

        if let Some(path) = &cache_file {
            if !path.exists() {
                cache::save(&bundle, path)?;
            }
        }

        Ok(LoadReport {
            bundle,
            warnings,
            origin: LoadOrigin::Fresh,
        })
    }

    fn load_split(
        &self,
        split: &str,
        source: &SplitSource,
        strategy: FetchStrategy,
        warnings: &mut Vec<LoadWarning>,
    ) -> Result<Vec<String>> {
        let cap = self.config.limit_for(split);
        match source {
            SplitSource::Lines(path) => {
                debug!(split, path = %path.display(), "reading line-delimited split");
                shard_reader::read_jsonl_gz(path, cap, self.config.show_progress)
            }
            SplitSource::ShardDir(dir) => {
                let shards = list_shards(dir)?;
                debug!(split, dir = %dir.display(), shards = shards.len(), "reading shard directory");

                let dense = SparseIndex::from_paths(shards)?.densify(cap)?;
                if dense.missing() > 0 {
                    let w = LoadWarning::MissingShards {
                        split: split.to_string(),
                        dir: dir.clone(),
                        count: dense.missing(),
                    };
                    warn!("{}", w);
                    warnings.push(w);
                }

                fetch::fetch_all(dense.slots(), strategy, self.config.show_progress)
            }
        }
    }
}

/// Every `*.json.gz` file directly inside `dir`, sorted by path.
pub fn list_shards(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut shards = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| LoaderError::read(dir, e))? {
        let path = entry.map_err(|e| LoaderError::read(dir, e))?.path();
        let is_shard = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(SHARD_SUFFIX));
        if is_shard && path.is_file() {
            shards.push(path);
        }
    }
    shards.sort();
    Ok(shards)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_sources() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            SplitSource::classify("train", dir.path()).unwrap(),
            SplitSource::ShardDir(dir.path().to_path_buf())
        );

        let lines = dir.path().join("val.jsonl.gz");
        assert!(matches!(SplitSource::classify("val", &lines), Ok(SplitSource::Lines(_))));

        let other = dir.path().join("test.csv");
        fs::write(&other, "a,b").unwrap();
        match SplitSource::classify("test", &other) {
            Err(LoaderError::UnrecognizedSource { split, path }) => {
                assert_eq!(split, "test");
                assert_eq!(path, other);
            }
            r => panic!("expected unrecognized source, got {:?}", r),
        }
    }

    #[test]
    fn test_list_shards_filters_by_suffix() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["2.json.gz", "0.json.gz", "notes.txt", "1.jsonl.gz"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("3.json.gz")).unwrap();

        let shards = list_shards(dir.path()).unwrap();
        let names: Vec<_> = shards
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["0.json.gz", "2.json.gz"]);
    }

    #[test]
    fn test_warning_messages() {
        let w = LoadWarning::MissingShards {
            split: "train".to_string(),
            dir: PathBuf::from("/d/train"),
            count: 3,
        };
        assert_eq!(w.to_string(), "Missing 3 files in /d/train.");
    }
}
