//! Clustering run orchestration
//!
//! - [`runner`]: [`ClusteringPipeline`], stage sequencing and thread pools
//! - [`observer`]: stage names, reports and observer hooks
//! - [`cancel`]: cooperative cancellation at stage boundaries

pub mod cancel;
pub mod observer;
pub mod runner;

pub use cancel::CancellationToken;
pub use observer::{NoopObserver, PipelineObserver, StageReport, StageTimingObserver, STAGES};
pub use runner::ClusteringPipeline;
