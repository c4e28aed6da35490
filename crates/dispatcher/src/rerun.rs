//! 重跑协调器
//!
//! 针对已运行过的任务，限定可重跑子集重建队列/报告状态：先清理旧的
//! 步骤结果，再复用原任务id重建执行队列并按原并发模式推进。

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use batchrun_core::config::BatchRunConfig;
use batchrun_core::errors::BatchRunResult;
use batchrun_core::models::{
    CollectionReport, ExecTask, ExecTaskItem, ResourceType, RunMode, RunModeConfig,
};
use batchrun_core::traits::{ReportRepository, TaskRepository};

use crate::parallel::ParallelDispatcher;
use crate::queue_service::ExecutionQueueService;
use crate::serial::{SerialContext, SerialDriver, SerialState};

pub struct RerunCoordinator {
    config: Arc<BatchRunConfig>,
    task_repo: Arc<dyn TaskRepository>,
    report_repo: Arc<dyn ReportRepository>,
    queue_service: Arc<ExecutionQueueService>,
    parallel_dispatcher: Arc<ParallelDispatcher>,
    serial_ctx: SerialContext,
}

impl RerunCoordinator {
    pub fn new(
        config: Arc<BatchRunConfig>,
        task_repo: Arc<dyn TaskRepository>,
        report_repo: Arc<dyn ReportRepository>,
        queue_service: Arc<ExecutionQueueService>,
        parallel_dispatcher: Arc<ParallelDispatcher>,
        serial_ctx: SerialContext,
    ) -> Self {
        Self {
            config,
            task_repo,
            report_repo,
            queue_service,
            parallel_dispatcher,
            serial_ctx,
        }
    }

    /// 按任务存储的并发模式重跑可重跑子集
    pub async fn rerun(&self, task: &ExecTask, user_id: &str) -> BatchRunResult<()> {
        if task.parallel {
            self.parallel_rerun(task, user_id).await
        } else {
            self.serial_rerun(task, user_id).await
        }
    }

    async fn serial_rerun(&self, task: &ExecTask, user_id: &str) -> BatchRunResult<()> {
        let run_mode_config = self.run_mode_config_from(task).await?;
        let items = self.task_repo.find_rerun_items(&task.id).await?;
        info!("串行重跑任务 {}，共 {} 个任务项", task.id, items.len());

        // 删除重跑的步骤
        self.delete_rerun_step_results(task, &items, &run_mode_config)
            .await?;

        // 初始化执行队列，复用原任务id并标记重跑
        let queue = self
            .queue_service
            .create_queue(
                &task.id,
                &run_mode_config,
                ResourceType::Scenario,
                user_id,
                true,
            )
            .await?;
        self.queue_service
            .enqueue_details(&queue.queue_id, &items)
            .await?;

        // 驱动第一个场景，后续由完成事件推进
        let driver = SerialDriver::new(self.serial_ctx.clone());
        let state = driver.run(&queue).await?;
        if state != SerialState::Completed {
            info!("串行重跑队列 {} 终止于 {:?}", queue.queue_id, state);
        }
        Ok(())
    }

    async fn parallel_rerun(&self, task: &ExecTask, user_id: &str) -> BatchRunResult<()> {
        let run_mode_config = self.run_mode_config_from(task).await?;
        let items = self.task_repo.find_rerun_items(&task.id).await?;
        info!("并行重跑任务 {}，共 {} 个任务项", task.id, items.len());

        // 删除重跑的步骤
        self.delete_rerun_step_results(task, &items, &run_mode_config)
            .await?;

        // 记录场景和任务项的映射
        let item_map: BTreeMap<String, String> = items
            .iter()
            .map(|item| (item.resource_id.clone(), item.id.clone()))
            .collect();

        self.parallel_dispatcher
            .dispatch(task, &run_mode_config, item_map, user_id, true)
            .await
    }

    /// 从任务记录还原运行配置快照；集成模式下带回原报告id
    async fn run_mode_config_from(&self, task: &ExecTask) -> BatchRunResult<RunModeConfig> {
        let run_mode = if task.parallel {
            RunMode::Parallel
        } else {
            RunMode::Serial
        };
        let mut run_mode_config = RunModeConfig::new(run_mode, &task.pool_id);
        run_mode_config.integrated_report = task.integrated;
        run_mode_config.environment_id = task.environment_id.clone();
        run_mode_config.grouped = task.env_grouped;
        if task.integrated {
            let report_id = self.report_repo.find_report_id_by_task(&task.id).await?;
            run_mode_config.collection_report = Some(CollectionReport {
                report_id,
                report_name: task.task_name.clone(),
            });
        }
        Ok(run_mode_config)
    }

    /// 重跑前按parent_id分片删除旧步骤，避免同一场景出现重复步骤行
    async fn delete_rerun_step_results(
        &self,
        task: &ExecTask,
        items: &[ExecTaskItem],
        run_mode_config: &RunModeConfig,
    ) -> BatchRunResult<()> {
        if !task.integrated {
            return Ok(());
        }
        let Some(report_id) = run_mode_config.report_id() else {
            return Ok(());
        };
        for sub_items in items.chunks(self.config.task_batch_size) {
            let parent_ids: Vec<String> = sub_items
                .iter()
                .map(|item| item.resource_id.clone())
                .collect();
            self.report_repo
                .delete_steps_by_parent_ids(report_id, &parent_ids)
                .await?;
        }
        Ok(())
    }
}
