//! 批量执行入口
//!
//! 对外暴露 `batch_run` 与 `rerun` 两个入口。完整流程（注册、建队、
//! 建报告、驱动/派发）在一个受监督的后台任务中执行：调用方立即返回，
//! 可丢弃句柄（即发即弃），也可通过JoinHandle检查结构化结果；任务
//! 内部的失败一律先记日志。

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::error;

use batchrun_core::config::BatchRunConfig;
use batchrun_core::errors::{BatchRunError, BatchRunResult};
use batchrun_core::models::{
    CollectionReport, ExecTask, ResourceType, RunModeConfig, ScenarioRunInfo,
};
use batchrun_core::traits::{
    ExecutionSetService, ProjectRepository, QueueRepository, ReportRepository, ScenarioExecutor,
    ScenarioRepository, TaskRepository,
};

use crate::parallel::ParallelDispatcher;
use crate::queue_service::ExecutionQueueService;
use crate::registrar::TaskRegistrar;
use crate::report_service::ReportService;
use crate::rerun::RerunCoordinator;
use crate::serial::{SerialContext, SerialDriver, SerialState};

/// 一次批量执行请求；场景的选择与过滤语义由上游完成
#[derive(Debug, Clone)]
pub struct ScenarioBatchRunRequest {
    pub project_id: String,
    pub scenario_ids: Vec<String>,
    pub run_mode_config: RunModeConfig,
}

pub struct BatchRunService {
    inner: Arc<BatchRunInner>,
}

struct BatchRunInner {
    config: Arc<BatchRunConfig>,
    project_repo: Arc<dyn ProjectRepository>,
    registrar: TaskRegistrar,
    queue_service: Arc<ExecutionQueueService>,
    report_service: Arc<ReportService>,
    parallel_dispatcher: Arc<ParallelDispatcher>,
    rerun_coordinator: RerunCoordinator,
    serial_ctx: SerialContext,
}

impl BatchRunService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Arc<BatchRunConfig>,
        task_repo: Arc<dyn TaskRepository>,
        queue_repo: Arc<dyn QueueRepository>,
        report_repo: Arc<dyn ReportRepository>,
        scenario_repo: Arc<dyn ScenarioRepository>,
        project_repo: Arc<dyn ProjectRepository>,
        execution_set: Arc<dyn ExecutionSetService>,
        executor: Arc<dyn ScenarioExecutor>,
    ) -> Self {
        let queue_service = Arc::new(ExecutionQueueService::new(
            config.clone(),
            queue_repo.clone(),
        ));
        let report_service = Arc::new(ReportService::new(
            config.clone(),
            report_repo.clone(),
            scenario_repo.clone(),
            queue_repo,
        ));
        let registrar = TaskRegistrar::new(config.clone(), task_repo.clone(), scenario_repo.clone());
        let parallel_dispatcher = Arc::new(ParallelDispatcher::new(execution_set, executor.clone()));
        let serial_ctx = SerialContext {
            queue_service: queue_service.clone(),
            report_service: report_service.clone(),
            scenario_repo,
            executor,
        };
        let rerun_coordinator = RerunCoordinator::new(
            config.clone(),
            task_repo,
            report_repo,
            queue_service.clone(),
            parallel_dispatcher.clone(),
            serial_ctx.clone(),
        );

        Self {
            inner: Arc::new(BatchRunInner {
                config,
                project_repo,
                registrar,
                queue_service,
                report_service,
                parallel_dispatcher,
                rerun_coordinator,
                serial_ctx,
            }),
        }
    }

    /// 批量执行
    ///
    /// 即发即弃：注册与驱动都在受监督的后台任务中进行，失败记日志，
    /// 调用方可通过返回的句柄检查结果。
    pub fn batch_run(
        &self,
        request: ScenarioBatchRunRequest,
        user_id: &str,
    ) -> JoinHandle<BatchRunResult<()>> {
        let inner = self.inner.clone();
        let user_id = user_id.to_string();
        tokio::spawn(async move {
            let result = if request.run_mode_config.is_parallel() {
                inner.parallel_execute(request, &user_id).await
            } else {
                inner.serial_execute(request, &user_id).await
            };
            if let Err(e) = &result {
                error!("批量执行场景失败: {}", e);
            }
            result
        })
    }

    /// 重跑已有任务的可重跑子集，同样即发即弃
    pub fn rerun(&self, task: ExecTask, user_id: &str) -> JoinHandle<BatchRunResult<()>> {
        let inner = self.inner.clone();
        let user_id = user_id.to_string();
        tokio::spawn(async move {
            let result = inner.rerun_coordinator.rerun(&task, &user_id).await;
            if let Err(e) = &result {
                error!("重跑任务 {} 失败: {}", task.id, e);
            }
            result
        })
    }
}

impl BatchRunInner {
    /// 串行批量执行
    async fn serial_execute(
        &self,
        request: ScenarioBatchRunRequest,
        user_id: &str,
    ) -> BatchRunResult<()> {
        let mut run_mode_config = normalize_run_config(request.run_mode_config);
        let project = self.find_project(&request.project_id).await?;
        let ids = request.scenario_ids;

        // 初始化任务
        let task = self
            .registrar
            .register_task(&ids, &run_mode_config, &project, user_id)
            .await?;

        // 先初始化集成报告，设置好报告id，再初始化执行队列
        if run_mode_config.is_integrated_report() {
            self.report_service
                .create_integrated_report(&task.id, &mut run_mode_config, user_id, &project.id)
                .await?;
        }
        let queue = self
            .queue_service
            .create_queue(
                &task.id,
                &run_mode_config,
                ResourceType::Scenario,
                user_id,
                false,
            )
            .await?;

        // 分批查询并初始化任务项、队列明细与集成报告步骤
        let mut sort = 1i64;
        for sub_ids in ids.chunks(self.config.task_batch_size) {
            let scenarios = self.registrar.resolve_ordered(sub_ids).await?;
            let items = self
                .registrar
                .register_items(&scenarios, &task, &project, user_id)
                .await?;
            self.queue_service
                .enqueue_details(&queue.queue_id, &items)
                .await?;
            sort = self
                .init_report_steps(&run_mode_config, &scenarios, sort)
                .await?;
        }

        // 驱动第一个场景，链路由完成事件推进
        let driver = SerialDriver::new(self.serial_ctx.clone());
        let state = driver.run(&queue).await?;
        if state != SerialState::Completed {
            tracing::info!("串行队列 {} 终止于 {:?}", queue.queue_id, state);
        }
        Ok(())
    }

    /// 并行批量执行
    async fn parallel_execute(
        &self,
        request: ScenarioBatchRunRequest,
        user_id: &str,
    ) -> BatchRunResult<()> {
        let mut run_mode_config = normalize_run_config(request.run_mode_config);
        let project = self.find_project(&request.project_id).await?;
        let ids = request.scenario_ids;

        // 初始化任务
        let task = self
            .registrar
            .register_task(&ids, &run_mode_config, &project, user_id)
            .await?;

        // 初始化集成报告
        if run_mode_config.is_integrated_report() {
            self.report_service
                .create_integrated_report(&task.id, &mut run_mode_config, user_id, &project.id)
                .await?;
        }

        // 记录场景和任务项的映射；分批初始化任务项与集成报告步骤
        let mut item_map = BTreeMap::new();
        let mut sort = 1i64;
        for sub_ids in ids.chunks(self.config.task_batch_size) {
            let scenarios = self.registrar.resolve_ordered(sub_ids).await?;
            let items = self
                .registrar
                .register_items(&scenarios, &task, &project, user_id)
                .await?;
            for item in &items {
                item_map.insert(item.resource_id.clone(), item.id.clone());
            }
            sort = self
                .init_report_steps(&run_mode_config, &scenarios, sort)
                .await?;
        }

        self.parallel_dispatcher
            .dispatch(&task, &run_mode_config, item_map, user_id, false)
            .await
    }

    /// 集成报告模式下初始化场景关联与一级步骤，返回下一个步骤序号
    async fn init_report_steps(
        &self,
        run_mode_config: &RunModeConfig,
        scenarios: &[ScenarioRunInfo],
        sort_start: i64,
    ) -> BatchRunResult<i64> {
        if !run_mode_config.is_integrated_report() {
            return Ok(sort_start);
        }
        let Some(report_id) = run_mode_config.report_id() else {
            return Ok(sort_start);
        };
        self.report_service
            .link_scenarios(report_id, scenarios)
            .await?;
        self.report_service
            .append_steps(report_id, scenarios, sort_start)
            .await
    }

    async fn find_project(&self, project_id: &str) -> BatchRunResult<batchrun_core::models::Project> {
        self.project_repo
            .find_project(project_id)
            .await?
            .ok_or_else(|| BatchRunError::project_not_found(project_id))
    }
}

/// 整理请求中的运行配置：集成模式且指定了报告名时准备集成报告引用
fn normalize_run_config(mut run_mode_config: RunModeConfig) -> RunModeConfig {
    if run_mode_config.is_integrated_report() {
        if let Some(name) = run_mode_config
            .integrated_report_name
            .clone()
            .filter(|name| !name.is_empty())
        {
            run_mode_config.collection_report = Some(CollectionReport {
                report_id: None,
                report_name: name,
            });
        }
    }
    run_mode_config
}
