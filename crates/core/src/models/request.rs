use serde::{Deserialize, Serialize};

use super::run_config::RunModeConfig;

/// 发往执行器的任务公共信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskInfo {
    pub project_id: String,
    pub task_id: String,
    /// 并行批次的进度统计集合id，与任务id一致
    pub set_id: Option<String>,
    /// 串行队列id，并行模式下为空
    pub queue_id: Option<String>,
    pub user_id: String,
    pub batch: bool,
    pub rerun: bool,
    pub run_mode_config: RunModeConfig,
}

impl TaskInfo {
    pub fn new(project_id: &str, run_mode_config: RunModeConfig) -> Self {
        Self {
            project_id: project_id.to_string(),
            task_id: String::new(),
            set_id: None,
            queue_id: None,
            user_id: String::new(),
            batch: true,
            rerun: false,
            run_mode_config,
        }
    }
}

/// 单场景执行请求中的任务项
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskItemRequest {
    /// 预创建的任务项id
    pub task_item_id: String,
    pub resource_id: String,
    /// 集成模式下为集成报告id，否则为惰性创建的单场景报告id
    pub report_id: Option<String>,
}

/// 串行路径的单场景执行请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRequest {
    pub task_info: TaskInfo,
    pub task_item: TaskItemRequest,
}

/// 并行路径的整批执行请求，一次调用提交全部场景
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskBatchRequest {
    pub task_info: TaskInfo,
}
