//! 执行队列管理
//!
//! 每次运行一条队列记录；集成报告模式下队列必须在报告创建之后建立，
//! 让配置快照携带最终的报告id。

use std::sync::Arc;

use tracing::{info, warn};

use batchrun_core::config::BatchRunConfig;
use batchrun_core::errors::BatchRunResult;
use batchrun_core::models::{
    ExecTaskItem, ExecutionQueue, ExecutionQueueDetail, ResourceType, RunModeConfig,
};
use batchrun_core::traits::QueueRepository;

pub struct ExecutionQueueService {
    config: Arc<BatchRunConfig>,
    queue_repo: Arc<dyn QueueRepository>,
}

impl ExecutionQueueService {
    pub fn new(config: Arc<BatchRunConfig>, queue_repo: Arc<dyn QueueRepository>) -> Self {
        Self { config, queue_repo }
    }

    /// 初始化执行队列，队列id与任务id一致
    pub async fn create_queue(
        &self,
        task_id: &str,
        run_mode_config: &RunModeConfig,
        resource_type: ResourceType,
        user_id: &str,
        rerun: bool,
    ) -> BatchRunResult<ExecutionQueue> {
        let mut queue =
            ExecutionQueue::new(task_id, run_mode_config.clone(), resource_type, user_id);
        queue.rerun = rerun;
        self.queue_repo.insert_queue(&queue).await?;
        Ok(queue)
    }

    /// 初始化队列明细，分片批量写入并保持任务项顺序
    pub async fn enqueue_details(
        &self,
        queue_id: &str,
        items: &[ExecTaskItem],
    ) -> BatchRunResult<()> {
        for sub_items in items.chunks(self.config.task_batch_size) {
            let details: Vec<ExecutionQueueDetail> = sub_items
                .iter()
                .map(|item| ExecutionQueueDetail {
                    queue_id: queue_id.to_string(),
                    resource_id: item.resource_id.clone(),
                    task_item_id: item.id.clone(),
                })
                .collect();
            self.queue_repo.insert_details(&details).await?;
        }
        Ok(())
    }

    /// 原子弹出最早的剩余明细，队列空时返回None
    pub async fn dequeue_next(
        &self,
        queue_id: &str,
    ) -> BatchRunResult<Option<ExecutionQueueDetail>> {
        self.queue_repo.pop_next_detail(queue_id).await
    }

    /// 删除队列及剩余明细，中止后续推进但保留已产出的结果
    pub async fn abort(&self, queue_id: &str) -> BatchRunResult<()> {
        let remaining = self.queue_repo.count_details(queue_id).await?;
        if remaining > 0 {
            warn!("中止执行队列 {}，丢弃 {} 条未消费明细", queue_id, remaining);
        } else {
            info!("删除执行队列 {}", queue_id);
        }
        self.queue_repo.delete_queue(queue_id).await
    }

    pub async fn remaining(&self, queue_id: &str) -> BatchRunResult<usize> {
        self.queue_repo.count_details(queue_id).await
    }
}
