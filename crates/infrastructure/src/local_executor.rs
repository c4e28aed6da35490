use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use batchrun_core::errors::BatchRunResult;
use batchrun_core::models::{TaskBatchRequest, TaskRequest};
use batchrun_core::traits::{CompletionSignal, ItemCompletion, ScenarioExecutor};

/// 内存执行器
///
/// 记录收到的执行请求并立即回发成功完成事件，适用于嵌入式部署
/// 和不接真实执行引擎的验证场景。
#[derive(Debug, Default)]
pub struct LocalExecutor {
    requests: RwLock<Vec<TaskRequest>>,
    batches: RwLock<Vec<(TaskBatchRequest, BTreeMap<String, String>)>>,
}

impl LocalExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已接受的单场景请求，按接受顺序
    pub async fn requests(&self) -> Vec<TaskRequest> {
        self.requests.read().await.clone()
    }

    pub async fn batches(&self) -> Vec<(TaskBatchRequest, BTreeMap<String, String>)> {
        self.batches.read().await.clone()
    }
}

#[async_trait]
impl ScenarioExecutor for LocalExecutor {
    async fn execute(
        &self,
        request: TaskRequest,
        completion: CompletionSignal,
    ) -> BatchRunResult<()> {
        info!(
            "本地执行器接受场景 {}，任务项 {}",
            request.task_item.resource_id, request.task_item.task_item_id
        );
        let item = ItemCompletion {
            task_item_id: request.task_item.task_item_id.clone(),
            resource_id: request.task_item.resource_id.clone(),
            success: true,
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
        info!(
            "本地执行器接受批量请求，任务 {}，共 {} 个场景",
            request.task_info.task_id,
            item_map.len()
        );
        self.batches.write().await.push((request, item_map));
        Ok(())
    }
}
