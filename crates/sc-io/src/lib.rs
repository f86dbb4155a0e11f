pub mod error;
pub mod export;
pub mod generate;
pub mod storage;

pub use error::IoError;
pub use export::{export_bundle, export_json, export_markdown};
pub use generate::{CannedGenerator, TextGenerator};
pub use storage::{FileStorage, MemoryStorage, Storage, open_or_memory};
