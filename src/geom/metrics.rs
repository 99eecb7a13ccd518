//! Opt-in timing hooks for rebuild and displacement passes.
//!
//! Timing is only collected when the `mesh_engine_metrics` feature is enabled
//! and the target is not WASM (`std::time::Instant` is unavailable there).
//! Otherwise every call compiles down to running the closure.
//!
//! ```ignore
//! let mut metrics = GeomMetrics::default();
//! metrics.begin();
//! let samples = metrics.time(TimingBucket::CurveSampling, || curve.sample_points(10));
//! if let Some(report) = metrics.end() {
//!     println!("sampling: {} ns", report.curve_sampling_ns);
//! }
//! ```

/// Phases of the ribbon pipeline that are timed separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingBucket {
    /// Evaluating control-point splines into sample rows.
    CurveSampling,
    /// Building patches (triangles and their vertex normals).
    Triangulation,
    /// Detaching the previous generation from the scene.
    Teardown,
    /// Uploading new primitives into the scene.
    Attach,
    /// In-place normal-offset writes.
    Displacement,
}

/// Cumulative nanoseconds per bucket.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize)]
pub struct GeomTimingReport {
    pub curve_sampling_ns: u64,
    pub triangulation_ns: u64,
    pub teardown_ns: u64,
    pub attach_ns: u64,
    pub displacement_ns: u64,
}

impl GeomTimingReport {
    /// Returns the total time across all buckets in nanoseconds.
    #[must_use]
    pub fn total_ns(&self) -> u64 {
        self.curve_sampling_ns
            .saturating_add(self.triangulation_ns)
            .saturating_add(self.teardown_ns)
            .saturating_add(self.attach_ns)
            .saturating_add(self.displacement_ns)
    }

    /// Returns the total time in milliseconds (for display purposes).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn total_ms(&self) -> f64 {
        self.total_ns() as f64 / 1_000_000.0
    }

    #[cfg_attr(
        not(all(feature = "mesh_engine_metrics", not(target_arch = "wasm32"))),
        allow(dead_code)
    )]
    fn bucket_mut(&mut self, bucket: TimingBucket) -> &mut u64 {
        match bucket {
            TimingBucket::CurveSampling => &mut self.curve_sampling_ns,
            TimingBucket::Triangulation => &mut self.triangulation_ns,
            TimingBucket::Teardown => &mut self.teardown_ns,
            TimingBucket::Attach => &mut self.attach_ns,
            TimingBucket::Displacement => &mut self.displacement_ns,
        }
    }
}

/// Accumulator for timing pipeline phases.
///
/// When the `mesh_engine_metrics` feature is disabled (or on WASM), all methods
/// are no-ops and [`end`](Self::end) returns `None`.
#[derive(Debug, Default)]
pub struct GeomMetrics {
    #[cfg(all(feature = "mesh_engine_metrics", not(target_arch = "wasm32")))]
    report: GeomTimingReport,
}

impl GeomMetrics {
    /// Resets all timing counters to zero.
    pub fn begin(&mut self) {
        #[cfg(all(feature = "mesh_engine_metrics", not(target_arch = "wasm32")))]
        {
            self.report = GeomTimingReport::default();
        }
    }

    /// Returns the accumulated timing report, or `None` if metrics are disabled.
    #[must_use]
    pub fn end(&self) -> Option<GeomTimingReport> {
        #[cfg(all(feature = "mesh_engine_metrics", not(target_arch = "wasm32")))]
        {
            Some(self.report.clone())
        }
        #[cfg(not(all(feature = "mesh_engine_metrics", not(target_arch = "wasm32"))))]
        {
            None
        }
    }

    /// Times the execution of `f` and accumulates the elapsed time in `bucket`.
    pub fn time<R>(&mut self, bucket: TimingBucket, f: impl FnOnce() -> R) -> R {
        #[cfg(all(feature = "mesh_engine_metrics", not(target_arch = "wasm32")))]
        {
            let start = std::time::Instant::now();
            let result = f();
            // Cap at u64::MAX to prevent overflow
            #[allow(clippy::cast_possible_truncation)]
            let nanos = start.elapsed().as_nanos().min(u128::from(u64::MAX)) as u64;
            let slot = self.report.bucket_mut(bucket);
            *slot = slot.saturating_add(nanos);
            result
        }

        #[cfg(not(all(feature = "mesh_engine_metrics", not(target_arch = "wasm32"))))]
        {
            let _ = bucket;
            f()
        }
    }
}
