//! `dpa-engine` loads delimited text, Parquet and JSON into an immutable, columnar, typed
//! [`frame::Frame`], and runs data-preparation operations over it: projection, predicate filtering,
//! profiling, schema/rule validation, sampling and train/test splitting.
//!
//! ## Loading and saving
//!
//! [`io::load`] picks the format from the extension (`.csv`, `.parquet`/`.pq`,
//! `.json`/`.ndjson`/`.jsonl`). Text formats are type-inferred per column (Int64, then Float64,
//! then Timestamp, then Bool, with String as the fallback); empty fields are nulls. Parquet dtypes
//! come from file metadata. [`io::save`] writes CSV or Parquet atomically, and
//! `load(save(frame))` is value-identical to `frame` for Parquet, and for CSV whenever the column
//! text re-infers to the same dtype (or a schema is supplied via [`io::IoOptions`]).
//!
//! ```no_run
//! use dpa_engine::io::{load, save};
//!
//! # fn main() -> Result<(), dpa_engine::EngineError> {
//! let frame = load("transactions.csv")?;
//! save(&frame, "transactions.parquet")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Filtering and profiling
//!
//! ```rust
//! use dpa_engine::frame::{Column, Frame};
//! use dpa_engine::processing::filter;
//! use dpa_engine::profile::{profile, ProfileOptions};
//!
//! let frame = Frame::new(vec![
//!     Column::from_i64("user_id", vec![Some(1), Some(2), Some(3)]),
//!     Column::from_f64("amount", vec![Some(250.0), Some(-4.5), None]),
//! ])
//! .unwrap();
//!
//! let big = filter(&frame, "amount > 100", None).unwrap();
//! assert_eq!(big.row_count(), 1);
//!
//! let stats = profile(&frame, &ProfileOptions::detailed()).to_map();
//! assert_eq!(stats["rows"], "3");
//! assert_eq!(stats["nulls:amount"], "1");
//! assert_eq!(stats["max:amount"], "250.0");
//! ```
//!
//! ## Validation, sampling and splitting
//!
//! ```rust
//! use dpa_engine::frame::{Column, Frame};
//! use dpa_engine::sampling::{sample, split, SampleMethod};
//! use dpa_engine::validation::{parse_rules, validate};
//!
//! let frame = Frame::new(vec![
//!     Column::from_f64("amount", vec![Some(10.0), Some(-1.0), Some(5000.0), Some(20.0)]),
//! ])
//! .unwrap();
//!
//! let rules = parse_rules(
//!     r#"[{"name": "amount_range", "column": "amount", "rule_type": "range", "expression": "0,1000"}]"#,
//! )
//! .unwrap();
//! let report = validate(&frame, None, &rules).unwrap();
//! assert!(!report.is_valid());
//! assert_eq!(report.error_rows(), vec![1, 2]);
//!
//! let picked = sample(&frame, SampleMethod::Random, 2, None, Some(42)).unwrap();
//! assert_eq!(picked, sample(&frame, SampleMethod::Random, 2, None, Some(42)).unwrap());
//!
//! let (train, test) = split(&frame, 0.25, None, Some(7)).unwrap();
//! assert_eq!((train.row_count(), test.row_count()), (3, 1));
//! ```
//!
//! ## Modules
//!
//! - [`types`]: dtypes, schemas and scalar values
//! - [`frame`]: the immutable columnar table
//! - [`io`]: CSV / Parquet / JSON loading and atomic saving, with observer hooks
//! - [`expr`]: the where-expression language
//! - [`processing`]: filter, select, reduce, group-by aggregate and join
//! - [`profile`]: single-pass profiling
//! - [`validation`]: schema and rule checks
//! - [`sampling`]: head/tail/random/stratified sampling and train/test splits
//! - [`execution`]: the same filter/profile on a dedicated thread pool, with metrics
//! - [`ops`]: path-in, path-out forms of every operation
//! - [`adapter`]: reader adapters a host library registers explicitly
//! - [`config`]: binding-level configuration such as the default output path
//! - [`error`]: the shared error type

pub mod adapter;
pub mod config;
pub mod error;
pub mod execution;
pub mod expr;
pub mod frame;
pub mod io;
pub mod ops;
pub mod processing;
pub mod profile;
pub mod sampling;
pub mod types;
pub mod validation;

pub use error::{EngineError, EngineResult, ErrorKind};
pub use frame::Frame;
