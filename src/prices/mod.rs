// Price data: the series model, sources, and the loader that joins them.

pub mod analyzer;
pub mod csv_file;
pub mod loader;
pub mod series;
pub mod source;
pub mod yahoo;
