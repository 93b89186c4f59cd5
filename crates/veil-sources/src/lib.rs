pub mod collection;
pub mod handler;
pub mod text;

pub use collection::{DirectorySource, GlobSource};
pub use handler::{CorpusSource, SourceOptions, SourceRegistry};
pub use text::MemorySource;
