//! In-memory frame transformations.
//!
//! The processing layer operates on [`crate::frame::Frame`] values produced by [`crate::io`].
//! Every operation returns a new frame; inputs are never modified.
//!
//! Currently implemented:
//!
//! - [`filter()`]: row filtering by where-expression, with optional projection
//! - [`select()`]: exact column projection
//! - [`reduce()`]: common reductions (count/sum/min/max/mean)
//! - [`aggregate()`]: group-by with sum/mean/count outputs
//! - [`join()`]: inner/left hash join on one key
//!
//! ## Example: filter → aggregate → reduce
//!
//! ```rust
//! use dpa_engine::frame::{Column, Frame};
//! use dpa_engine::processing::{aggregate, filter, reduce, AggFunc, Aggregation, ReduceOp};
//! use dpa_engine::types::Value;
//!
//! let frame = Frame::new(vec![
//!     Column::from_strs("country", vec![Some("US"), Some("DE"), Some("US")]),
//!     Column::from_f64("amount", vec![Some(10.0), Some(-3.0), Some(20.0)]),
//! ])
//! .unwrap();
//!
//! let positive = filter(&frame, "amount > 0", None).unwrap();
//! let by_country = aggregate(
//!     &positive,
//!     "country",
//!     &[Aggregation::new(AggFunc::Sum, "amount")],
//! )
//! .unwrap();
//! assert_eq!(by_country.row_count(), 1);
//!
//! let total = reduce(&positive, "amount", ReduceOp::Sum).unwrap();
//! assert_eq!(total, Value::Float64(30.0));
//! ```

pub mod aggregate;
pub mod filter;
pub mod join;
pub mod reduce;
pub mod select;

pub use aggregate::{aggregate, AggFunc, Aggregation};
pub use filter::filter;
pub use join::{join, JoinHow};
pub use reduce::{reduce, reduce_column, ReduceOp};
pub use select::select;
