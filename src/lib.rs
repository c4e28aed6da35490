//! 场景批量执行编排系统
//!
//! 把一批测试场景落为任务与任务项记录，按串行或并行模式驱动执行，
//! 并维护集成报告与重跑语义。对外入口见 [`app::Application`] 与
//! [`batchrun_dispatcher::BatchRunService`]。

pub mod app;

pub use app::Application;
pub use batchrun_core::config::BatchRunConfig;
pub use batchrun_core::errors::{BatchRunError, BatchRunResult};
pub use batchrun_core::logging::init_logging;
pub use batchrun_dispatcher::{BatchRunService, ScenarioBatchRunRequest};
