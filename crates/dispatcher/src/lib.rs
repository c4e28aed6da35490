pub mod controller;
pub mod parallel;
pub mod queue_service;
pub mod registrar;
pub mod report_service;
pub mod rerun;
pub mod serial;

#[cfg(test)]
mod test_utils;

#[cfg(test)]
mod queue_test;

pub use controller::{BatchRunService, ScenarioBatchRunRequest};
pub use parallel::ParallelDispatcher;
pub use queue_service::ExecutionQueueService;
pub use registrar::TaskRegistrar;
pub use report_service::ReportService;
pub use rerun::RerunCoordinator;
pub use serial::{DriveOutcome, SerialContext, SerialDriver, SerialState};
