pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod loader;
pub mod progress;
pub mod record;
pub mod shard_reader;
pub mod sparse_index;

pub use config::{LoadConfig, RecordLimit};
pub use error::*;
pub use loader::{LoadOrigin, LoadReport, LoadWarning, Loader, load_dataset};
pub use record::{ABSENT_RECORD, DatasetBundle, SplitDataset};
