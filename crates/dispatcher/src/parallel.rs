//! 并行派发器
//!
//!（任务/任务项/报告/步骤全部落库之后）把整批场景一次性交给执行器的
//! 并发执行入口。批内并发、顺序与部分失败处理都由执行器负责，本组件
//! 只保证派发前记录已完整、进度集合已预登记。

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use batchrun_core::errors::BatchRunResult;
use batchrun_core::models::{ExecTask, RunModeConfig, TaskBatchRequest, TaskInfo};
use batchrun_core::traits::{ExecutionSetService, ScenarioExecutor};

pub struct ParallelDispatcher {
    execution_set: Arc<dyn ExecutionSetService>,
    executor: Arc<dyn ScenarioExecutor>,
}

impl ParallelDispatcher {
    pub fn new(
        execution_set: Arc<dyn ExecutionSetService>,
        executor: Arc<dyn ScenarioExecutor>,
    ) -> Self {
        Self {
            execution_set,
            executor,
        }
    }

    /// 整批派发
    ///
    /// 先把全量任务项id登记进进度集合，让完成率先于任何完成事件有
    /// 已知分母，再携带场景id到任务项id的映射一次性提交执行器。
    pub async fn dispatch(
        &self,
        task: &ExecTask,
        run_mode_config: &RunModeConfig,
        item_map: BTreeMap<String, String>,
        user_id: &str,
        rerun: bool,
    ) -> BatchRunResult<()> {
        let mut task_info = TaskInfo::new(&task.project_id, run_mode_config.clone());
        task_info.task_id = task.id.clone();
        task_info.set_id = Some(task.id.clone());
        task_info.user_id = user_id.to_string();
        task_info.rerun = rerun;
        let request = TaskBatchRequest { task_info };

        // 记录任务项，用于统计整体执行情况
        let item_ids: Vec<String> = item_map.values().cloned().collect();
        self.execution_set.init_set(&task.id, item_ids).await?;

        info!("并行派发任务 {}，共 {} 个场景", task.id, item_map.len());
        self.executor.execute_batch(request, item_map).await
    }
}
