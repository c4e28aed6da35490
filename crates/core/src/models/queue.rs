use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::run_config::RunModeConfig;
use super::task::ResourceType;

/// 一次运行的有序待执行队列，每个任务同一时刻至多一个在被消费
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionQueue {
    /// 队列id与任务id一致，重跑时复用原任务id
    pub queue_id: String,
    /// 运行配置快照，集成报告id在报告创建后写入其中
    pub run_mode_config: RunModeConfig,
    pub resource_type: ResourceType,
    pub user_id: String,
    pub rerun: bool,
    pub create_time: DateTime<Utc>,
}

impl ExecutionQueue {
    pub fn new(
        queue_id: &str,
        run_mode_config: RunModeConfig,
        resource_type: ResourceType,
        user_id: &str,
    ) -> Self {
        Self {
            queue_id: queue_id.to_string(),
            run_mode_config,
            resource_type,
            user_id: user_id.to_string(),
            rerun: false,
            create_time: Utc::now(),
        }
    }
}

/// 队列中一条待消费明细，插入顺序即调度顺序，弹出后不再入队
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionQueueDetail {
    pub queue_id: String,
    pub resource_id: String,
    pub task_item_id: String,
}
