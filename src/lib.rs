//! Reproducible k-fold cross-validation for toxicity fine-tuning runs
//!
//! Runs select their validation fold with `current_fold` from a layered
//! YAML config. The fold a record lands in depends only on the record
//! count, `k_fold` and `seed`, so every run of an experiment agrees on the
//! partition.
//!
//! - [`fold`]: seeded k-fold assignment and train/validation splits
//! - [`data`]: CSV dataset loading
//! - [`config`]: config composition, overrides, interpolation, validation
//! - [`tracking`]: per-fold run tracking
//! - [`metrics`]: pairwise ranking accuracy
//! - [`optim`]: layer-wise learning rate parameter groups
//!
//! # Example
//!
//! ```
//! use toxicity_cv::data::{Dataset, Record};
//! use toxicity_cv::fold::{FoldedDataset, KFold};
//!
//! let records = (0..10)
//!     .map(|i| Record::new(format!("comment {i}")).with_numeric("y", i as f64))
//!     .collect();
//! let dataset = Dataset::from_records(records);
//!
//! let folded = FoldedDataset::new(&dataset, &KFold::new(5).with_seed(42))?;
//! let split = folded.split(0)?;
//! assert_eq!(split.val_view(&dataset).len(), 2);
//! assert_eq!(split.train_view(&dataset).len(), 8);
//! # Ok::<(), toxicity_cv::Error>(())
//! ```

pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod fold;
pub mod metrics;
pub mod optim;
pub mod tracking;

pub use error::{Error, Result};
