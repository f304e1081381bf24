//! Tracing helpers for fracture operations.
//!
//! Integrates with the `tracing` ecosystem. Enable output by installing a
//! subscriber in the host application, e.g. `RUST_LOG=shatter_core=debug`
//! for per-group detail or `RUST_LOG=shatter_core::timing=debug` for
//! operation timing.

use std::time::Instant;
use tracing::{debug, info, Span};

use crate::shell::FractureOutcome;
use crate::types::Mesh;

/// A performance timer that logs duration on drop.
///
/// ```rust,ignore
/// fn expensive_operation() {
///     let _timer = OperationTimer::new("expensive_operation");
///     // ... work ...
/// } // logs elapsed time here
/// ```
pub struct OperationTimer {
    name: &'static str,
    start: Instant,
    span: Span,
}

impl OperationTimer {
    /// Create a new operation timer.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!("shatter_operation", operation = name);
        debug!(target: "shatter_core::timing", operation = name, "starting operation");
        Self {
            name,
            start: Instant::now(),
            span,
        }
    }

    /// Create a timer with mesh-size context fields.
    pub fn with_context(name: &'static str, face_count: usize, vertex_count: usize) -> Self {
        let span = tracing::info_span!(
            "shatter_operation",
            operation = name,
            faces = face_count,
            vertices = vertex_count
        );
        debug!(
            target: "shatter_core::timing",
            operation = name,
            faces = face_count,
            vertices = vertex_count,
            "starting operation"
        );
        Self {
            name,
            start: Instant::now(),
            span,
        }
    }

    /// Elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// The span for this timer.
    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        info!(
            target: "shatter_core::timing",
            operation = self.name,
            elapsed_ms = format!("{:.2}", self.elapsed_ms()),
            "operation completed"
        );
    }
}

/// Log mesh statistics at debug level.
pub fn log_mesh_stats(mesh: &Mesh, context: &str) {
    let dims = crate::measure::dimensions(mesh);
    debug!(
        context,
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        width = format!("{:.3}", dims.width),
        depth = format!("{:.3}", dims.depth),
        height = format!("{:.3}", dims.height),
        "mesh stats"
    );
}

/// Log a fracture outcome summary at info level.
pub fn log_fracture_outcome(outcome: &FractureOutcome) {
    info!(
        shells = outcome.shell_count(),
        sites = outcome.sites.len(),
        groups = outcome.groups,
        skipped = outcome.skipped_groups,
        total_volume = format!("{:.4}", outcome.total_volume()),
        "fracture outcome"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_tracks_elapsed() {
        let timer = OperationTimer::new("test_op");
        assert!(timer.elapsed_ms() >= 0.0);
    }

    #[test]
    fn test_log_helpers_do_not_panic() {
        log_mesh_stats(&Mesh::new(), "empty");
    }
}
