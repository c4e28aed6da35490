pub mod config;
pub mod errors;
pub mod logging;
pub mod models;
pub mod traits;

pub use config::BatchRunConfig;
pub use errors::{BatchRunError, BatchRunResult};
pub use models::{
    CollectionReport, ExecStatus, ExecTask, ExecTaskItem, ExecTaskType, ExecutionQueue,
    ExecutionQueueDetail, Project, ReportTaskRelation, ResourceType, ResultStatus, RunMode,
    RunModeConfig, ScenarioDetail, ScenarioRecord, ScenarioReport, ScenarioReportStep,
    ScenarioRunInfo, ScenarioStep, TaskBatchRequest, TaskInfo, TaskItemRequest, TaskRequest,
    TaskTriggerMode,
};
pub use traits::{
    CompletionSignal, ExecutionSetService, ItemCompletion, ProjectRepository, QueueRepository,
    ReportRepository, ScenarioExecutor, ScenarioRepository, TaskRepository,
};
