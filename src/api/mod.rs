pub mod source;

pub use source::{CacheFile, CacheThenFetch, HttpSource, Resolution, Source, source_for};
