//! Lectura, combinación y extracción de archivos zip.

pub mod engine;
pub mod extract;
pub mod filter;
pub mod sink;
pub mod source;

pub use engine::ArchiveInjector;
pub use extract::extract_archive;
pub use filter::{EntryFilter, IncludeAll, PatternFilter};
pub use sink::{ArchiveSink, InjectReport, MergeConflict};
pub use source::{DirectorySource, InjectSource, ZipSource};
