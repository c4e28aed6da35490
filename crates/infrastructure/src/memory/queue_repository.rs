use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use tokio::sync::RwLock;

use batchrun_core::errors::BatchRunResult;
use batchrun_core::models::{ExecutionQueue, ExecutionQueueDetail};
use batchrun_core::traits::QueueRepository;

/// 内存执行队列仓储
///
/// 明细按插入顺序保存在VecDeque中，弹出在写锁内完成，满足原子出队要求。
#[derive(Debug, Default)]
pub struct MemoryQueueRepository {
    queues: RwLock<HashMap<String, ExecutionQueue>>,
    details: RwLock<HashMap<String, VecDeque<ExecutionQueueDetail>>>,
}

impl MemoryQueueRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QueueRepository for MemoryQueueRepository {
    async fn insert_queue(&self, queue: &ExecutionQueue) -> BatchRunResult<()> {
        self.queues
            .write()
            .await
            .insert(queue.queue_id.clone(), queue.clone());
        Ok(())
    }

    async fn insert_details(&self, details: &[ExecutionQueueDetail]) -> BatchRunResult<()> {
        let mut all = self.details.write().await;
        for detail in details {
            all.entry(detail.queue_id.clone())
                .or_default()
                .push_back(detail.clone());
        }
        Ok(())
    }

    async fn pop_next_detail(
        &self,
        queue_id: &str,
    ) -> BatchRunResult<Option<ExecutionQueueDetail>> {
        let mut all = self.details.write().await;
        Ok(all.get_mut(queue_id).and_then(VecDeque::pop_front))
    }

    async fn find_queue(&self, queue_id: &str) -> BatchRunResult<Option<ExecutionQueue>> {
        Ok(self.queues.read().await.get(queue_id).cloned())
    }

    async fn delete_queue(&self, queue_id: &str) -> BatchRunResult<()> {
        self.queues.write().await.remove(queue_id);
        self.details.write().await.remove(queue_id);
        Ok(())
    }

    async fn count_details(&self, queue_id: &str) -> BatchRunResult<usize> {
        Ok(self
            .details
            .read()
            .await
            .get(queue_id)
            .map(VecDeque::len)
            .unwrap_or(0))
    }
}
