//! 批量注册器
//!
//! 把原始id列表与运行配置落为任务和任务项记录，批量执行总是先经过这里。

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use batchrun_core::config::BatchRunConfig;
use batchrun_core::errors::{BatchRunError, BatchRunResult};
use batchrun_core::models::{
    ExecTask, ExecTaskItem, Project, ResourceType, RunModeConfig, ScenarioRunInfo,
};
use batchrun_core::traits::{ScenarioRepository, TaskRepository};

pub struct TaskRegistrar {
    config: Arc<BatchRunConfig>,
    task_repo: Arc<dyn TaskRepository>,
    scenario_repo: Arc<dyn ScenarioRepository>,
}

impl TaskRegistrar {
    pub fn new(
        config: Arc<BatchRunConfig>,
        task_repo: Arc<dyn TaskRepository>,
        scenario_repo: Arc<dyn ScenarioRepository>,
    ) -> Self {
        Self {
            config,
            task_repo,
            scenario_repo,
        }
    }

    /// 初始化任务
    ///
    /// case_count按入参id数统计；集成报告模式下任务名取报告名。
    pub async fn register_task(
        &self,
        ids: &[String],
        run_mode_config: &RunModeConfig,
        project: &Project,
        user_id: &str,
    ) -> BatchRunResult<ExecTask> {
        if project.organization_id.is_empty() {
            return Err(BatchRunError::config_error(format!(
                "项目 {} 缺少所属组织",
                project.id
            )));
        }
        if run_mode_config.pool_id.is_empty() {
            return Err(BatchRunError::config_error("运行配置缺少资源池"));
        }

        let mut task = ExecTask::new(&project.id, &project.organization_id, user_id);
        task.case_count = ids.len() as i64;
        task.task_name = match run_mode_config.report_name() {
            Some(name) if run_mode_config.is_integrated_report() => name.to_string(),
            _ => "场景批量执行任务".to_string(),
        };
        task.pool_id = run_mode_config.pool_id.clone();
        task.parallel = run_mode_config.is_parallel();
        task.integrated = run_mode_config.is_integrated_report();
        task.env_grouped = run_mode_config.grouped;
        task.environment_id = run_mode_config.environment_id.clone();

        self.task_repo.insert_task(&task).await?;
        info!("初始化任务 {}，共 {} 个场景", task.id, task.case_count);
        Ok(task)
    }

    /// 初始化任务项，每个已解析场景一条，单次批量写入
    pub async fn register_items(
        &self,
        scenarios: &[ScenarioRunInfo],
        task: &ExecTask,
        project: &Project,
        user_id: &str,
    ) -> BatchRunResult<Vec<ExecTaskItem>> {
        let mut items = Vec::with_capacity(scenarios.len());
        for scenario in scenarios {
            let mut item = ExecTaskItem::new(&task.id, &project.id, user_id);
            item.organization_id = project.organization_id.clone();
            item.resource_type = ResourceType::Scenario;
            item.resource_id = scenario.id.clone();
            item.case_id = scenario.id.clone();
            item.resource_name = scenario.name.clone();
            items.push(item);
        }
        self.task_repo.insert_task_items(&items).await?;
        Ok(items)
    }

    /// 获取有序的场景执行信息
    ///
    /// 按select分片大小分批查询，再按调用方的id顺序重排。
    /// 遇到第一个解析不到的id（选中后被删除）即停止追加后续结果。
    pub async fn resolve_ordered(&self, ids: &[String]) -> BatchRunResult<Vec<ScenarioRunInfo>> {
        let mut fetched = Vec::with_capacity(ids.len());
        for sub_ids in ids.chunks(self.config.select_batch_size) {
            fetched.extend(self.scenario_repo.get_execute_info_by_ids(sub_ids).await?);
        }
        let mut scenario_map: HashMap<String, ScenarioRunInfo> = fetched
            .into_iter()
            .map(|scenario| (scenario.id.clone(), scenario))
            .collect();

        let mut scenarios = Vec::with_capacity(ids.len());
        for id in ids {
            match scenario_map.remove(id) {
                Some(scenario) => scenarios.push(scenario),
                None => {
                    info!("当前执行任务的场景已删除 {}", id);
                    break;
                }
            }
        }
        Ok(scenarios)
    }
}
