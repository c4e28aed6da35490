pub mod execution_set;
pub mod local_executor;
pub mod memory;

pub use execution_set::MemoryExecutionSet;
pub use local_executor::LocalExecutor;
pub use memory::{
    MemoryProjectRepository, MemoryQueueRepository, MemoryReportRepository,
    MemoryScenarioRepository, MemoryTaskRepository,
};
