//! Parallel execution of frame operations on a dedicated thread pool.
//!
//! This module sits above [`crate::processing`] and [`crate::profile`] and provides:
//!
//! - chunked, parallel predicate evaluation for `filter`
//! - a per-column parallel scan for `profile`
//! - throttling of in-flight chunks
//! - live metrics and observer hooks
//!
//! Results are identical to the sequential [`crate::processing::filter()`] and
//! [`crate::profile::profile()`]: chunk masks are stitched back in row order and column profiles
//! are collected in column order.

mod observer;
mod semaphore;

use std::ops::Range;
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::{EngineError, EngineResult};
use crate::expr;
use crate::frame::Frame;
use crate::profile::{profile_column, Profile, ProfileOptions};

pub use observer::{
    ExecutionEvent, ExecutionMetrics, ExecutionMetricsSnapshot, ExecutionObserver,
    StdErrExecutionObserver,
};

use semaphore::Semaphore;

/// Configuration for the [`ExecutionEngine`].
#[derive(Debug, Clone)]
pub struct ExecutionOptions {
    /// Worker threads; `None` uses the available parallelism.
    pub num_threads: Option<usize>,
    /// Rows per predicate-evaluation chunk.
    pub chunk_size: usize,
    /// Upper bound on concurrently evaluated chunks.
    pub max_in_flight_chunks: usize,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        let n = available_threads();
        Self {
            num_threads: Some(n),
            chunk_size: 8_192,
            max_in_flight_chunks: n,
        }
    }
}

/// Runs `filter` and `profile` over a rayon pool owned by the engine.
pub struct ExecutionEngine {
    pool: ThreadPool,
    opts: ExecutionOptions,
    observer: Option<Arc<dyn ExecutionObserver>>,
    metrics: Arc<ExecutionMetrics>,
}

impl ExecutionEngine {
    /// Build an engine.
    ///
    /// Fails with an argument error if `chunk_size`, `max_in_flight_chunks` or `num_threads` is zero,
    /// or if the pool cannot be created.
    pub fn new(opts: ExecutionOptions) -> EngineResult<Self> {
        if opts.chunk_size == 0 {
            return Err(EngineError::argument("chunk_size must be > 0"));
        }
        if opts.max_in_flight_chunks == 0 {
            return Err(EngineError::argument("max_in_flight_chunks must be > 0"));
        }
        if opts.num_threads == Some(0) {
            return Err(EngineError::argument("num_threads must be > 0 when set"));
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(opts.num_threads.unwrap_or_else(available_threads))
            .thread_name(|i| format!("dpa-worker-{i}"))
            .build()
            .map_err(|e| EngineError::argument(format!("failed to build thread pool: {e}")))?;
        Ok(Self {
            pool,
            opts,
            observer: None,
            metrics: Arc::new(ExecutionMetrics::new()),
        })
    }

    /// Attach an observer for execution events.
    pub fn with_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Handle to the live metrics of the most recent run.
    pub fn metrics(&self) -> Arc<ExecutionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Parallel form of [`crate::processing::filter()`].
    ///
    /// The expression is parsed and bound once, before any chunk runs, so syntax and type errors
    /// surface without partial work.
    pub fn filter(
        &self,
        frame: &Frame,
        where_expr: &str,
        select: Option<&[&str]>,
    ) -> EngineResult<Frame> {
        let bound = expr::compile(where_expr, frame)?;
        bound.check(frame)?;
        let start = self.begin("filter");

        let sem = Semaphore::new(self.opts.max_in_flight_chunks);
        let chunks: Vec<Vec<bool>> = self.pool.install(|| {
            chunk_ranges(frame.row_count(), self.opts.chunk_size)
                .into_par_iter()
                .map(|range| {
                    let permit = sem.acquire();
                    if !permit.waited.is_zero() {
                        self.metrics.on_throttle_wait(permit.waited);
                        self.emit(ExecutionEvent::ThrottleWaited {
                            duration: permit.waited,
                        });
                    }
                    self.metrics.on_chunk_start();
                    self.emit(ExecutionEvent::ChunkStarted {
                        start_row: range.start,
                        row_count: range.len(),
                    });

                    let start_row = range.start;
                    let mask = bound.evaluate_range(frame, range);
                    self.metrics.on_rows(mask.len());

                    self.emit(ExecutionEvent::ChunkFinished {
                        start_row,
                        matched_rows: mask.iter().filter(|m| **m).count(),
                    });
                    self.metrics.on_chunk_end();
                    mask
                })
                .collect()
        });

        let mask: Vec<bool> = chunks.into_iter().flatten().collect();
        let out = frame.filter_mask(&mask)?;
        let out = match select {
            Some(names) => out.select(names)?,
            None => out,
        };
        self.finish(start);
        Ok(out)
    }

    /// Parallel form of [`crate::profile::profile()`]: one task per column.
    pub fn profile(&self, frame: &Frame, options: &ProfileOptions) -> Profile {
        let start = self.begin("profile");
        let rows = options.rows_for(frame);
        let columns = self.pool.install(|| {
            frame
                .columns()
                .par_iter()
                .map(|column| {
                    let p = profile_column(column, rows, options.detailed);
                    self.metrics.on_column();
                    self.metrics.on_rows(rows);
                    self.emit(ExecutionEvent::ColumnScanned {
                        column: p.name.clone(),
                        data_type: p.data_type,
                        null_count: p.null_count,
                    });
                    p
                })
                .collect()
        });
        self.finish(start);
        Profile::from_columns(rows, columns, options.detailed)
    }

    fn begin(&self, operation: &'static str) -> Instant {
        self.metrics.begin_run();
        self.emit(ExecutionEvent::RunStarted { operation });
        Instant::now()
    }

    fn finish(&self, start: Instant) {
        let elapsed = start.elapsed();
        self.metrics.end_run(elapsed);
        self.emit(ExecutionEvent::RunFinished {
            elapsed,
            metrics: self.metrics.snapshot(),
        });
    }

    fn emit(&self, event: ExecutionEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}

fn available_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn chunk_ranges(row_count: usize, chunk_size: usize) -> Vec<Range<usize>> {
    (0..row_count)
        .step_by(chunk_size)
        .map(|start| start..(start + chunk_size).min(row_count))
        .collect()
}
