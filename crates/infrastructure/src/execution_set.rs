use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use batchrun_core::errors::BatchRunResult;
use batchrun_core::traits::ExecutionSetService;

/// 内存进度统计集合
///
/// 并行派发前登记整批任务项id，执行器按集合统计整体完成情况。
#[derive(Debug, Default)]
pub struct MemoryExecutionSet {
    sets: RwLock<HashMap<String, Vec<String>>>,
}

impl MemoryExecutionSet {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExecutionSetService for MemoryExecutionSet {
    async fn init_set(&self, set_id: &str, item_ids: Vec<String>) -> BatchRunResult<()> {
        debug!("登记执行集合 {}，共 {} 个任务项", set_id, item_ids.len());
        self.sets
            .write()
            .await
            .insert(set_id.to_string(), item_ids);
        Ok(())
    }

    async fn get_set(&self, set_id: &str) -> BatchRunResult<Option<Vec<String>>> {
        Ok(self.sets.read().await.get(set_id).cloned())
    }
}
