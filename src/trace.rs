//! Per-frame instrumentation.
//!
//! `frame_span!` enters a `detect` span carrying the grid shape and
//! `stage_count!` records how many boxes a pipeline stage produced. With the
//! `tracing` feature off both expand to no-ops and only evaluate their
//! arguments.

#[cfg(feature = "tracing")]
macro_rules! frame_span {
    ($rows:expr, $cols:expr) => {
        tracing::info_span!("detect", rows = $rows, cols = $cols).entered()
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! frame_span {
    ($rows:expr, $cols:expr) => {{
        let _ = ($rows, $cols);
        $crate::trace::FrameGuard
    }};
}

#[cfg(feature = "tracing")]
macro_rules! stage_count {
    ($stage:literal, $count:expr) => {
        tracing::info!(stage = $stage, count = $count)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! stage_count {
    ($stage:literal, $count:expr) => {
        let _ = $count;
    };
}

pub(crate) use frame_span;
pub(crate) use stage_count;

/// Held for the duration of a frame when tracing is compiled out.
#[cfg(not(feature = "tracing"))]
pub(crate) struct FrameGuard;
