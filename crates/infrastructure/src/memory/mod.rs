//! 内存仓储实现，面向嵌入式部署与测试

pub mod project_repository;
pub mod queue_repository;
pub mod report_repository;
pub mod scenario_repository;
pub mod task_repository;

pub use project_repository::MemoryProjectRepository;
pub use queue_repository::MemoryQueueRepository;
pub use report_repository::MemoryReportRepository;
pub use scenario_repository::MemoryScenarioRepository;
pub use task_repository::MemoryTaskRepository;
