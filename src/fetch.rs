use crate::error::Result;
use crate::progress;
use crate::shard_reader::read_shard;
use rayon::prelude::*;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use tracing::debug;

/// How shard reads are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStrategy {
    Sequential,
    /// A fixed pool of this many worker threads, built per fetch and dropped after it.
    Pool(NonZeroUsize),
}

impl FetchStrategy {
    /// `0` runs in-process, `n > 0` uses a pool of `n`, negative uses every available core.
    pub fn from_worker_count(num_workers: i32) -> Self {
        match num_workers {
            0 => FetchStrategy::Sequential,
            n if n > 0 => NonZeroUsize::new(n as usize)
                .map(FetchStrategy::Pool)
                .unwrap_or(FetchStrategy::Sequential),
            _ => {
                let cores = std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN);
                FetchStrategy::Pool(cores)
            }
        }
    }
}

/// Reads every slot, returning records in slot order.
///
/// The first failing shard aborts the whole fetch.
pub fn fetch_all(slots: &[Option<PathBuf>], strategy: FetchStrategy, show_progress: bool) -> Result<Vec<String>> {
    fetch_with(slots, strategy, show_progress, |slot| read_shard(slot.as_deref()))
}

/// Same as [`fetch_all`] with a caller-supplied reader.
pub fn fetch_with<F>(
    slots: &[Option<PathBuf>],
    strategy: FetchStrategy,
    show_progress: bool,
    read: F,
) -> Result<Vec<String>>
where
    F: Fn(&Option<PathBuf>) -> Result<String> + Sync,
{
    if slots.is_empty() {
        return Ok(Vec::new());
    }

    let label = match slots.iter().flatten().next() {
        Some(first) => format!("Loading {}", first.display()),
        None => "Loading".to_string(),
    };
    let pb = progress::counted_bar(slots.len() as u64, label, show_progress);

    let records = match strategy {
        FetchStrategy::Sequential => slots
            .iter()
            .map(|slot| {
                let record = read(slot);
                pb.inc(1);
                record
            })
            .collect::<Result<Vec<_>>>()?,
        FetchStrategy::Pool(workers) => {
            debug!(workers = workers.get(), shards = slots.len(), "starting fetch pool");
            let pool = rayon::ThreadPoolBuilder::new().num_threads(workers.get()).build()?;
            pool.install(|| {
                slots
                    .par_iter()
                    .map(|slot| {
                        let record = read(slot);
                        pb.inc(1);
                        record
                    })
                    .collect::<Result<Vec<_>>>()
            })?
        }
    };

    pb.finish_and_clear();
    Ok(records)
}
