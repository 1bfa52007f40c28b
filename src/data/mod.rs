//! Toxicity datasets: CSV loading and borrowed record views
//!
//! - [`Record`]: one row, a text field plus named targets
//! - [`Dataset`]: immutable, ordered records loaded once per run
//! - [`DatasetView`]: index-based view used for fold train/validation sets

mod loader;
mod record;

pub use loader::{from_reader, load, CsvOptions, DatasetLoadError};
pub use record::{Dataset, DatasetView, Record, Target};
