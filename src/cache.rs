use crate::error::{LoaderError, Result};
use crate::record::DatasetBundle;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

pub const CACHE_FILE_NAME: &str = "dataset_cache.pkl.gz";
const COMPRESSION_LEVEL: u32 = 2;

/// Where the snapshot of a dataset rooted at `root` lives.
pub fn cache_path(root: &Path) -> PathBuf {
    root.join(CACHE_FILE_NAME)
}

/// Uncompressed sibling written before compression: `x.pkl.gz` -> `x.pkl`.
fn temp_path(path: &Path) -> PathBuf {
    path.with_extension("")
}

/// Write `bundle` to `path`.
///
/// Refuses to run if `path` (or its uncompressed sibling) already exists. The bundle is
/// encoded into the uncompressed sibling first, then compressed into `path`, then the
/// sibling is removed, so a valid gzip stream at `path` always holds a complete snapshot.
pub fn save(bundle: &DatasetBundle, path: &Path) -> Result<()> {
    if path.exists() {
        return Err(LoaderError::CacheExists(path.to_path_buf()));
    }
    let tmp = temp_path(path);
    if tmp.exists() {
        return Err(LoaderError::CacheExists(tmp));
    }

    info!(path = %path.display(), "caching dataset, this may take a few minutes");

    {
        let file = File::create(&tmp).map_err(|e| LoaderError::write(&tmp, e))?;
        let mut writer = BufWriter::new(file);
        bincode::encode_into_std_write(bundle, &mut writer, bincode::config::standard())?;
        writer.flush().map_err(|e| LoaderError::write(&tmp, e))?;
    }

    compress_then_delete(&tmp, path)?;
    Ok(())
}

fn compress_then_delete(input: &Path, output: &Path) -> Result<()> {
    let mut reader = BufReader::new(File::open(input).map_err(|e| LoaderError::read(input, e))?);
    let out = File::create(output).map_err(|e| LoaderError::write(output, e))?;
    let mut encoder = GzEncoder::new(BufWriter::new(out), Compression::new(COMPRESSION_LEVEL));
    io::copy(&mut reader, &mut encoder).map_err(|e| LoaderError::write(output, e))?;
    encoder
        .finish()
        .and_then(|mut w| w.flush())
        .map_err(|e| LoaderError::write(output, e))?;
    fs::remove_file(input)?;
    Ok(())
}

/// Restore a bundle written by [`save`].
pub fn load(path: &Path) -> Result<DatasetBundle> {
    if !path.exists() {
        return Err(LoaderError::CacheMissing(path.to_path_buf()));
    }
    let file = File::open(path).map_err(|e| LoaderError::read(path, e))?;
    let mut reader = BufReader::new(GzDecoder::new(BufReader::new(file)));
    let bundle = bincode::decode_from_std_read(&mut reader, bincode::config::standard())?;
    Ok(bundle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ABSENT_RECORD, SplitDataset};

    fn bundle() -> DatasetBundle {
        let mut b = DatasetBundle::new();
        b.insert(SplitDataset::new(
            vec!["{\"h\":0}".to_string(), ABSENT_RECORD.to_string(), "{\"h\":2}".to_string()],
            "houses",
            "train",
        ))
        .unwrap();
        b.insert(SplitDataset::new(vec!["{\"h\":9}".to_string()], "houses", "val")).unwrap();
        b
    }

    #[test]
    fn test_cache_path_is_fixed() {
        assert_eq!(cache_path(Path::new("/data/houses")), PathBuf::from("/data/houses/dataset_cache.pkl.gz"));
        assert_eq!(temp_path(&cache_path(Path::new("/r"))), PathBuf::from("/r/dataset_cache.pkl"));
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = cache_path(dir.path());
        let original = bundle();

        save(&original, &path).unwrap();
        assert!(path.exists());
        assert!(!temp_path(&path).exists(), "temp file should be removed");

        let restored = load(&path).unwrap();
        assert_eq!(restored.split_names(), vec!["train", "val"]);
        assert_eq!(restored, original);
    }

    #[test]
    fn test_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = cache_path(dir.path());
        save(&bundle(), &path).unwrap();
        let before = fs::read(&path).unwrap();

        let mut other = DatasetBundle::new();
        other.insert(SplitDataset::new(vec![], "other", "test")).unwrap();
        assert!(matches!(save(&other, &path), Err(LoaderError::CacheExists(_))));

        assert_eq!(fs::read(&path).unwrap(), before);
        assert_eq!(load(&path).unwrap(), bundle());
    }

    #[test]
    fn test_refuses_when_orphaned_temp_exists() {
        let dir = tempfile::tempdir().unwrap();
        let path = cache_path(dir.path());
        fs::write(temp_path(&path), b"partial").unwrap();
        assert!(matches!(save(&bundle(), &path), Err(LoaderError::CacheExists(_))));
        assert!(!path.exists());
    }

    #[test]
    fn test_load_missing_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(load(&cache_path(dir.path())), Err(LoaderError::CacheMissing(_))));
    }

    #[test]
    fn test_load_corrupt_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = cache_path(dir.path());
        fs::write(&path, b"not a gzip stream").unwrap();
        assert!(load(&path).is_err());
    }

    #[test]
    fn test_unwritable_target_reports_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = cache_path(&dir.path().join("no_such_dir"));
        match save(&bundle(), &path) {
            Err(LoaderError::Write { path: p, .. }) => assert_eq!(p, temp_path(&path)),
            other => panic!("expected write error, got {:?}", other),
        }
        let err = save(&bundle(), &path).unwrap_err();
        assert!(err.to_string().starts_with("Failed to write"), "{}", err);
    }
}
