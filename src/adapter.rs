//! Explicit reader-adapter registry for host data-frame libraries.
//!
//! A host that wants to route its file reads through this engine registers a [`ReaderAdapter`]
//! under a name and dispatches `read` calls through the [`AdapterRegistry`]. Nothing in the host
//! library is replaced; the host opts in per call by choosing the adapter name.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{EngineError, EngineResult};
use crate::expr::{CmpOp, Literal};
use crate::frame::Frame;
use crate::io;
use crate::processing::filter;

/// One `column <op> value` predicate pushed down by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterTerm {
    pub column: String,
    pub op: CmpOp,
    pub value: Literal,
}

impl FilterTerm {
    pub fn new(column: impl Into<String>, op: CmpOp, value: Literal) -> Self {
        Self {
            column: column.into(),
            op,
            value,
        }
    }
}

impl fmt::Display for FilterTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\"{}\" {} {}",
            self.column.replace('"', "\"\""),
            self.op.symbol(),
            self.value
        )
    }
}

/// What the host asks an adapter to read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanRequest {
    pub path: PathBuf,
    /// Projection applied after filtering; `None` keeps every column.
    pub columns: Option<Vec<String>>,
    /// Conjunctive predicates.
    pub filters: Vec<FilterTerm>,
}

impl ScanRequest {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Filters rendered as one where-expression joined with `AND`, or `None` without filters.
    pub fn where_expr(&self) -> Option<String> {
        if self.filters.is_empty() {
            return None;
        }
        Some(
            self.filters
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" AND "),
        )
    }
}

/// A named reader a host can dispatch to.
pub trait ReaderAdapter: Send + Sync {
    /// Registry key.
    fn name(&self) -> &str;

    fn read(&self, request: &ScanRequest) -> EngineResult<Frame>;
}

/// Reads through this engine: load by extension, filter, then project.
#[derive(Debug, Default, Clone, Copy)]
pub struct EngineAdapter;

impl ReaderAdapter for EngineAdapter {
    fn name(&self) -> &str {
        "dpa"
    }

    fn read(&self, request: &ScanRequest) -> EngineResult<Frame> {
        let frame = io::load(&request.path)?;
        let frame = match request.where_expr() {
            Some(expr) => filter(&frame, &expr, None)?,
            None => frame,
        };
        match &request.columns {
            Some(columns) => frame.select(columns),
            None => Ok(frame),
        }
    }
}

/// Name-keyed set of adapters registered by the host.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: BTreeMap<String, Arc<dyn ReaderAdapter>>,
}

impl fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("adapters", &self.names())
            .finish()
    }
}

impl AdapterRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding only [`EngineAdapter`].
    pub fn with_engine() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(EngineAdapter));
        registry
    }

    /// Add `adapter`, returning any adapter previously registered under the same name.
    pub fn register(&mut self, adapter: Arc<dyn ReaderAdapter>) -> Option<Arc<dyn ReaderAdapter>> {
        self.adapters.insert(adapter.name().to_string(), adapter)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ReaderAdapter>> {
        self.adapters.get(name).cloned()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.adapters.keys().cloned().collect()
    }

    /// Dispatch `request` to the adapter registered as `name`.
    pub fn read(&self, name: &str, request: &ScanRequest) -> EngineResult<Frame> {
        let adapter = self.adapters.get(name).ok_or_else(|| {
            EngineError::argument(format!(
                "no reader adapter named '{name}'; registered: {:?}",
                self.names()
            ))
        })?;
        adapter.read(request)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{AdapterRegistry, EngineAdapter, FilterTerm, ReaderAdapter, ScanRequest};
    use crate::error::{EngineResult, ErrorKind};
    use crate::expr::{CmpOp, Literal};
    use crate::frame::{Column, Frame};
    use crate::io::save;

    struct Fixed;

    impl ReaderAdapter for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn read(&self, _request: &ScanRequest) -> EngineResult<Frame> {
            Frame::new(vec![Column::from_i64("x", vec![Some(1)])])
        }
    }

    #[test]
    fn renders_filters_as_conjunction() {
        let mut req = ScanRequest::new("data.parquet");
        assert_eq!(req.where_expr(), None);
        req.filters = vec![
            FilterTerm::new("amount", CmpOp::Gt, Literal::Int(100)),
            FilterTerm::new("country", CmpOp::Eq, Literal::Str("O'Neil".into())),
        ];
        assert_eq!(
            req.where_expr().unwrap(),
            r#""amount" > 100 AND "country" = 'O''Neil'"#
        );
    }

    #[test]
    fn dispatches_by_name() {
        let mut registry = AdapterRegistry::with_engine();
        assert!(registry.register(Arc::new(Fixed)).is_none());
        assert_eq!(registry.names(), vec!["dpa", "fixed"]);
        let out = registry.read("fixed", &ScanRequest::new("ignored")).unwrap();
        assert_eq!(out.row_count(), 1);
        assert_eq!(
            registry
                .read("pandas", &ScanRequest::new("x"))
                .unwrap_err()
                .kind(),
            ErrorKind::Argument
        );
    }

    #[test]
    fn float_filters_survive_rendering() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("amounts.csv");
        let frame = Frame::new(vec![Column::from_f64(
            "amount",
            vec![Some(1.5), Some(250.0), None],
        )])
        .unwrap();
        save(&frame, &path).unwrap();

        let term = FilterTerm::new("amount", CmpOp::Lt, Literal::Float(1e20));
        assert_eq!(term.to_string(), r#""amount" < 100000000000000000000.0"#);

        let rows = |op: CmpOp, value: f64| {
            let mut req = ScanRequest::new(&path);
            req.filters = vec![FilterTerm::new("amount", op, Literal::Float(value))];
            EngineAdapter.read(&req).unwrap().row_count()
        };
        assert_eq!(rows(CmpOp::Lt, 1e20), 2);
        assert_eq!(rows(CmpOp::Lt, f64::INFINITY), 2);
        assert_eq!(rows(CmpOp::Gt, f64::NEG_INFINITY), 2);
        assert_eq!(rows(CmpOp::GtEq, 2.0), 1);
        assert_eq!(rows(CmpOp::Eq, f64::NAN), 0);
        assert_eq!(rows(CmpOp::NotEq, f64::NAN), 0);
    }
}
