pub mod queue;
pub mod report;
pub mod request;
pub mod run_config;
pub mod scenario;
pub mod task;

pub use queue::{ExecutionQueue, ExecutionQueueDetail};
pub use report::{
    ExecStatus, ReportTaskRelation, ResultStatus, ScenarioRecord, ScenarioReport,
    ScenarioReportStep,
};
pub use request::{TaskBatchRequest, TaskInfo, TaskItemRequest, TaskRequest};
pub use run_config::{CollectionReport, RunMode, RunModeConfig};
pub use scenario::{ScenarioDetail, ScenarioRunInfo, ScenarioStep};
pub use task::{ExecTask, ExecTaskItem, ExecTaskType, Project, ResourceType, TaskTriggerMode};
