//! Page classification, extraction orchestration and statistics.
//!
//! Processing is sequential: one page in, one `PageResult` out, in page
//! order. Per-page failures are recorded on the result and never abort the
//! document.

mod cancel;
mod orchestrator;
mod stats;

pub use cancel::CancellationToken;
pub use orchestrator::{PageEvent, PageOrchestrator, ProcessedDocument};
pub use stats::aggregate;
