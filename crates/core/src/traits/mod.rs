pub mod executor;
pub mod repository;

pub use executor::{CompletionSignal, ExecutionSetService, ItemCompletion, ScenarioExecutor};
pub use repository::{
    ProjectRepository, QueueRepository, ReportRepository, ScenarioRepository, TaskRepository,
};
