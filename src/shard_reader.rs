use crate::error::{LoaderError, Result};
use crate::progress;
use crate::record::ABSENT_RECORD;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Read one gzip shard as trimmed text.
///
/// `None` stands for a position with no file and yields the absence sentinel.
/// A file that exists but cannot be opened or decompressed is an error naming that file.
pub fn read_shard(path: Option<&Path>) -> Result<String> {
    let Some(path) = path else {
        return Ok(ABSENT_RECORD.to_string());
    };

    let file = File::open(path).map_err(|e| LoaderError::read(path, e))?;
    let mut gz = GzDecoder::new(file);
    let mut buf = String::new();
    gz.read_to_string(&mut buf).map_err(|e| LoaderError::read(path, e))?;

    let trimmed = buf.trim();
    if trimmed.len() == buf.len() {
        Ok(buf)
    } else {
        Ok(trimmed.to_string())
    }
}

/// Read a `.jsonl.gz` file as one record per line, stopping after `max_lines` if given.
pub fn read_jsonl_gz(path: &Path, max_lines: Option<usize>, show_progress: bool) -> Result<Vec<String>> {
    let file = File::open(path).map_err(|e| LoaderError::read(path, e))?;
    let reader = BufReader::new(GzDecoder::new(file));

    let mut lines = Vec::new();
    if max_lines == Some(0) {
        return Ok(lines);
    }

    let pb = progress::spinner(format!("Loading {}", path.display()), show_progress);
    for line in reader.lines() {
        let line = line.map_err(|e| LoaderError::read(path, e))?;
        lines.push(line);
        pb.inc(1);
        if max_lines.is_some_and(|max| lines.len() >= max) {
            break;
        }
    }
    pb.finish_and_clear();

    Ok(lines)
}
