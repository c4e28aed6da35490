//! 嵌入式应用装配
//!
//! 把内存仓储、本地执行器与批量执行服务装配成一个可直接运行的实例，
//! 适用于嵌入式部署和集成验证。接入真实存储或执行引擎时按同样方式
//! 替换对应的trait实现即可。

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::info;

use batchrun_core::config::BatchRunConfig;
use batchrun_core::errors::BatchRunResult;
use batchrun_core::models::{ExecTask, Project};
use batchrun_dispatcher::{BatchRunService, ScenarioBatchRunRequest};
use batchrun_infrastructure::{
    LocalExecutor, MemoryExecutionSet, MemoryProjectRepository, MemoryQueueRepository,
    MemoryReportRepository, MemoryScenarioRepository, MemoryTaskRepository,
};

/// 嵌入式批量执行应用
pub struct Application {
    config: Arc<BatchRunConfig>,
    task_repo: Arc<MemoryTaskRepository>,
    queue_repo: Arc<MemoryQueueRepository>,
    report_repo: Arc<MemoryReportRepository>,
    scenario_repo: Arc<MemoryScenarioRepository>,
    project_repo: Arc<MemoryProjectRepository>,
    executor: Arc<LocalExecutor>,
    service: BatchRunService,
}

impl Application {
    /// 创建应用实例，配置在装配前校验
    pub fn new(config: BatchRunConfig) -> BatchRunResult<Self> {
        config.validate()?;
        info!(
            "初始化批量执行应用，任务分片 {}，查询分片 {}",
            config.task_batch_size, config.select_batch_size
        );

        let config = Arc::new(config);
        let task_repo = Arc::new(MemoryTaskRepository::new());
        let queue_repo = Arc::new(MemoryQueueRepository::new());
        let report_repo = Arc::new(MemoryReportRepository::new());
        let scenario_repo = Arc::new(MemoryScenarioRepository::new());
        let project_repo = Arc::new(MemoryProjectRepository::new());
        let execution_set = Arc::new(MemoryExecutionSet::new());
        let executor = Arc::new(LocalExecutor::new());

        let service = BatchRunService::new(
            config.clone(),
            task_repo.clone(),
            queue_repo.clone(),
            report_repo.clone(),
            scenario_repo.clone(),
            project_repo.clone(),
            execution_set,
            executor.clone(),
        );

        Ok(Self {
            config,
            task_repo,
            queue_repo,
            report_repo,
            scenario_repo,
            project_repo,
            executor,
            service,
        })
    }

    /// 从环境变量加载配置创建应用
    pub fn from_env() -> BatchRunResult<Self> {
        Self::new(BatchRunConfig::from_env()?)
    }

    pub fn config(&self) -> &BatchRunConfig {
        &self.config
    }

    /// 批量执行入口，即发即弃
    pub fn batch_run(
        &self,
        request: ScenarioBatchRunRequest,
        user_id: &str,
    ) -> JoinHandle<BatchRunResult<()>> {
        self.service.batch_run(request, user_id)
    }

    /// 重跑入口，即发即弃
    pub fn rerun(&self, task: ExecTask, user_id: &str) -> JoinHandle<BatchRunResult<()>> {
        self.service.rerun(task, user_id)
    }

    /// 登记项目（嵌入式部署中项目数据由调用方维护）
    pub async fn register_project(&self, project: Project) {
        self.project_repo.insert_project(project).await;
    }

    pub fn task_repo(&self) -> &Arc<MemoryTaskRepository> {
        &self.task_repo
    }

    pub fn queue_repo(&self) -> &Arc<MemoryQueueRepository> {
        &self.queue_repo
    }

    pub fn report_repo(&self) -> &Arc<MemoryReportRepository> {
        &self.report_repo
    }

    pub fn scenario_repo(&self) -> &Arc<MemoryScenarioRepository> {
        &self.scenario_repo
    }

    pub fn executor(&self) -> &Arc<LocalExecutor> {
        &self.executor
    }
}
