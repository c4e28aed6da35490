use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use batchrun_core::errors::BatchRunResult;
use batchrun_core::models::{ExecTask, ExecTaskItem};
use batchrun_core::traits::TaskRepository;

/// 内存任务仓储，适用于嵌入式部署场景
#[derive(Debug, Default)]
pub struct MemoryTaskRepository {
    tasks: RwLock<HashMap<String, ExecTask>>,
    items: RwLock<Vec<ExecTaskItem>>,
    /// 可重跑任务项标记：task_id -> resource_id集合
    rerun_marks: RwLock<HashMap<String, HashSet<String>>>,
}

impl MemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 标记任务下需要重跑的资源，模拟存储侧的重跑筛选条件
    pub async fn mark_rerun_items(&self, task_id: &str, resource_ids: &[String]) {
        let mut marks = self.rerun_marks.write().await;
        marks
            .entry(task_id.to_string())
            .or_default()
            .extend(resource_ids.iter().cloned());
    }

    pub async fn task_count(&self) -> usize {
        self.tasks.read().await.len()
    }
}

#[async_trait]
impl TaskRepository for MemoryTaskRepository {
    async fn insert_task(&self, task: &ExecTask) -> BatchRunResult<()> {
        self.tasks
            .write()
            .await
            .insert(task.id.clone(), task.clone());
        Ok(())
    }

    async fn insert_task_items(&self, items: &[ExecTaskItem]) -> BatchRunResult<()> {
        self.items.write().await.extend(items.iter().cloned());
        Ok(())
    }

    async fn find_task(&self, id: &str) -> BatchRunResult<Option<ExecTask>> {
        Ok(self.tasks.read().await.get(id).cloned())
    }

    async fn find_task_items(&self, task_id: &str) -> BatchRunResult<Vec<ExecTaskItem>> {
        Ok(self
            .items
            .read()
            .await
            .iter()
            .filter(|item| item.task_id == task_id)
            .cloned()
            .collect())
    }

    async fn find_rerun_items(&self, task_id: &str) -> BatchRunResult<Vec<ExecTaskItem>> {
        let marks = self.rerun_marks.read().await;
        let Some(resource_ids) = marks.get(task_id) else {
            return Ok(Vec::new());
        };
        Ok(self
            .items
            .read()
            .await
            .iter()
            .filter(|item| item.task_id == task_id && resource_ids.contains(&item.resource_id))
            .cloned()
            .collect())
    }
}
