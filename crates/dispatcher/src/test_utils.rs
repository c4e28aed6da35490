//! 测试夹具：内存仓储装配与可编排的执行器假件

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use batchrun_core::config::BatchRunConfig;
use batchrun_core::errors::{BatchRunError, BatchRunResult};
use batchrun_core::models::{
    ExecTask, ExecutionQueue, Project, ResourceType, RunMode, RunModeConfig, ScenarioDetail,
    ScenarioStep, TaskBatchRequest, TaskRequest,
};
use batchrun_core::traits::{
    CompletionSignal, ExecutionSetService, ItemCompletion, ProjectRepository, ScenarioExecutor,
};
use batchrun_infrastructure::{
    MemoryExecutionSet, MemoryProjectRepository, MemoryQueueRepository, MemoryReportRepository,
    MemoryScenarioRepository, MemoryTaskRepository,
};

use crate::controller::BatchRunService;
use crate::queue_service::ExecutionQueueService;
use crate::registrar::TaskRegistrar;
use crate::report_service::ReportService;
use crate::serial::SerialContext;

pub const TEST_PROJECT_ID: &str = "project-1";
pub const TEST_USER_ID: &str = "user-1";
pub const TEST_POOL_ID: &str = "pool-1";

/// 可编排的执行器假件
///
/// 默认接受请求并立即回发成功完成事件；可按资源id注入委托失败
/// （基础设施故障）或失败完成事件（场景测试失败）。
#[derive(Default)]
pub struct FakeExecutor {
    requests: RwLock<Vec<TaskRequest>>,
    batches: RwLock<Vec<(TaskBatchRequest, BTreeMap<String, String>)>>,
    delegation_failures: RwLock<HashSet<String>>,
    failed_completions: RwLock<HashSet<String>>,
    /// 批量派发时进度集合的快照，用于断言登记先于派发
    set_at_dispatch: RwLock<Option<Vec<String>>>,
    execution_set: RwLock<Option<Arc<MemoryExecutionSet>>>,
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// execute对该资源返回错误，不回发完成事件
    pub async fn fail_delegation_for(&self, resource_id: &str) {
        self.delegation_failures
            .write()
            .await
            .insert(resource_id.to_string());
    }

    /// 该资源的完成事件标记为失败
    pub async fn complete_with_failure(&self, resource_id: &str) {
        self.failed_completions
            .write()
            .await
            .insert(resource_id.to_string());
    }

    pub async fn observe_execution_set(&self, set: Arc<MemoryExecutionSet>) {
        *self.execution_set.write().await = Some(set);
    }

    pub async fn requests(&self) -> Vec<TaskRequest> {
        self.requests.read().await.clone()
    }

    pub async fn executed_resource_ids(&self) -> Vec<String> {
        self.requests
            .read()
            .await
            .iter()
            .map(|request| request.task_item.resource_id.clone())
            .collect()
    }

    pub async fn batches(&self) -> Vec<(TaskBatchRequest, BTreeMap<String, String>)> {
        self.batches.read().await.clone()
    }

    pub async fn set_snapshot_at_dispatch(&self) -> Option<Vec<String>> {
        self.set_at_dispatch.read().await.clone()
    }
}

#[async_trait]
impl ScenarioExecutor for FakeExecutor {
    async fn execute(
        &self,
        request: TaskRequest,
        completion: CompletionSignal,
    ) -> BatchRunResult<()> {
        let resource_id = request.task_item.resource_id.clone();
        if self.delegation_failures.read().await.contains(&resource_id) {
            return Err(BatchRunError::executor_error(format!(
                "执行器不可用: {resource_id}"
            )));
        }
        let success = !self.failed_completions.read().await.contains(&resource_id);
        let item = ItemCompletion {
            task_item_id: request.task_item.task_item_id.clone(),
            resource_id,
            success,
        };
        self.requests.write().await.push(request);
        completion.notify(item);
        Ok(())
    }

    async fn execute_batch(
        &self,
        request: TaskBatchRequest,
        item_map: BTreeMap<String, String>,
    ) -> BatchRunResult<()> {
        if let Some(set) = self.execution_set.read().await.as_ref() {
            let snapshot = set.get_set(&request.task_info.task_id).await?;
            *self.set_at_dispatch.write().await = snapshot;
        }
        self.batches.write().await.push((request, item_map));
        Ok(())
    }
}

/// 测试装配：全套内存仓储加假执行器
pub struct TestHarness {
    pub config: Arc<BatchRunConfig>,
    pub task_repo: Arc<MemoryTaskRepository>,
    pub queue_repo: Arc<MemoryQueueRepository>,
    pub report_repo: Arc<MemoryReportRepository>,
    pub scenario_repo: Arc<MemoryScenarioRepository>,
    pub project_repo: Arc<MemoryProjectRepository>,
    pub execution_set: Arc<MemoryExecutionSet>,
    pub executor: Arc<FakeExecutor>,
}

impl TestHarness {
    pub async fn new() -> Self {
        Self::with_config(BatchRunConfig::default()).await
    }

    pub async fn with_config(config: BatchRunConfig) -> Self {
        let harness = Self {
            config: Arc::new(config),
            task_repo: Arc::new(MemoryTaskRepository::new()),
            queue_repo: Arc::new(MemoryQueueRepository::new()),
            report_repo: Arc::new(MemoryReportRepository::new()),
            scenario_repo: Arc::new(MemoryScenarioRepository::new()),
            project_repo: Arc::new(MemoryProjectRepository::new()),
            execution_set: Arc::new(MemoryExecutionSet::new()),
            executor: Arc::new(FakeExecutor::new()),
        };
        harness
            .project_repo
            .insert_project(Project {
                id: TEST_PROJECT_ID.to_string(),
                name: "测试项目".to_string(),
                organization_id: "org-1".to_string(),
            })
            .await;
        harness
            .executor
            .observe_execution_set(harness.execution_set.clone())
            .await;
        harness
    }

    pub fn service(&self) -> BatchRunService {
        BatchRunService::new(
            self.config.clone(),
            self.task_repo.clone(),
            self.queue_repo.clone(),
            self.report_repo.clone(),
            self.scenario_repo.clone(),
            self.project_repo.clone(),
            self.execution_set.clone(),
            self.executor.clone(),
        )
    }

    pub fn queue_service(&self) -> Arc<ExecutionQueueService> {
        Arc::new(ExecutionQueueService::new(
            self.config.clone(),
            self.queue_repo.clone(),
        ))
    }

    pub fn report_service(&self) -> Arc<ReportService> {
        Arc::new(ReportService::new(
            self.config.clone(),
            self.report_repo.clone(),
            self.scenario_repo.clone(),
            self.queue_repo.clone(),
        ))
    }

    pub fn registrar(&self) -> TaskRegistrar {
        TaskRegistrar::new(
            self.config.clone(),
            self.task_repo.clone(),
            self.scenario_repo.clone(),
        )
    }

    pub fn serial_ctx(&self) -> SerialContext {
        SerialContext {
            queue_service: self.queue_service(),
            report_service: self.report_service(),
            scenario_repo: self.scenario_repo.clone(),
            executor: self.executor.clone(),
        }
    }

    /// 写入一个带两个步骤的场景
    pub async fn seed_scenario(&self, id: &str, name: &str) {
        self.scenario_repo
            .insert_scenario(ScenarioDetail {
                id: id.to_string(),
                name: name.to_string(),
                project_id: TEST_PROJECT_ID.to_string(),
                environment_id: Some(format!("env-{id}")),
                steps: vec![
                    ScenarioStep {
                        id: format!("{id}-step-1"),
                        name: format!("{name} 步骤1"),
                    },
                    ScenarioStep {
                        id: format!("{id}-step-2"),
                        name: format!("{name} 步骤2"),
                    },
                ],
            })
            .await;
    }

    pub async fn seed_scenarios(&self, count: usize) -> Vec<String> {
        let mut ids = Vec::with_capacity(count);
        for index in 1..=count {
            let id = format!("scenario-{index:04}");
            self.seed_scenario(&id, &format!("场景{index}")).await;
            ids.push(id);
        }
        ids
    }

    /// 搭建一条可直接驱动的串行队列（注册任务、可选集成报告、入队明细）
    pub async fn setup_serial_run(
        &self,
        ids: &[String],
        mut run_mode_config: RunModeConfig,
    ) -> (ExecTask, ExecutionQueue) {
        let registrar = self.registrar();
        let report_service = self.report_service();
        let queue_service = self.queue_service();
        let project = self
            .project_repo
            .find_project(TEST_PROJECT_ID)
            .await
            .unwrap()
            .unwrap();

        let ids_vec = ids.to_vec();
        let task = registrar
            .register_task(&ids_vec, &run_mode_config, &project, TEST_USER_ID)
            .await
            .unwrap();
        if run_mode_config.is_integrated_report() {
            report_service
                .create_integrated_report(
                    &task.id,
                    &mut run_mode_config,
                    TEST_USER_ID,
                    TEST_PROJECT_ID,
                )
                .await
                .unwrap();
        }
        let queue = queue_service
            .create_queue(
                &task.id,
                &run_mode_config,
                ResourceType::Scenario,
                TEST_USER_ID,
                false,
            )
            .await
            .unwrap();

        let mut sort = 1i64;
        for sub_ids in ids_vec.chunks(self.config.task_batch_size) {
            let scenarios = registrar.resolve_ordered(sub_ids).await.unwrap();
            let items = registrar
                .register_items(&scenarios, &task, &project, TEST_USER_ID)
                .await
                .unwrap();
            queue_service
                .enqueue_details(&queue.queue_id, &items)
                .await
                .unwrap();
            if let Some(report_id) = run_mode_config.report_id() {
                report_service
                    .link_scenarios(report_id, &scenarios)
                    .await
                    .unwrap();
                sort = report_service
                    .append_steps(report_id, &scenarios, sort)
                    .await
                    .unwrap();
            }
        }
        (task, queue)
    }
}

pub fn serial_config() -> RunModeConfig {
    RunModeConfig::new(RunMode::Serial, TEST_POOL_ID)
}

pub fn parallel_config() -> RunModeConfig {
    RunModeConfig::new(RunMode::Parallel, TEST_POOL_ID)
}

pub fn integrated_serial_config(report_name: &str) -> RunModeConfig {
    let mut config = serial_config();
    config.integrated_report = true;
    config.integrated_report_name = Some(report_name.to_string());
    config.collection_report = Some(batchrun_core::models::CollectionReport {
        report_id: None,
        report_name: report_name.to_string(),
    });
    config
}
