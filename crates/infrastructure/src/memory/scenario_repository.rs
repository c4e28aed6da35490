use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use batchrun_core::errors::BatchRunResult;
use batchrun_core::models::{ScenarioDetail, ScenarioRunInfo};
use batchrun_core::traits::ScenarioRepository;

/// 内存场景元数据仓储
#[derive(Debug, Default)]
pub struct MemoryScenarioRepository {
    scenarios: RwLock<HashMap<String, ScenarioDetail>>,
    /// 执行信息可查但驱动阶段解析失败的场景，模拟选中后被删除的窗口
    suppressed_details: RwLock<HashSet<String>>,
}

impl MemoryScenarioRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_scenario(&self, detail: ScenarioDetail) {
        self.scenarios
            .write()
            .await
            .insert(detail.id.clone(), detail);
    }

    pub async fn remove_scenario(&self, id: &str) {
        self.scenarios.write().await.remove(id);
    }

    /// 保留执行信息但让get_for_run返回None
    pub async fn suppress_detail(&self, id: &str) {
        self.suppressed_details.write().await.insert(id.to_string());
    }
}

#[async_trait]
impl ScenarioRepository for MemoryScenarioRepository {
    async fn get_execute_info_by_ids(
        &self,
        ids: &[String],
    ) -> BatchRunResult<Vec<ScenarioRunInfo>> {
        let scenarios = self.scenarios.read().await;
        let mut infos: Vec<ScenarioRunInfo> = ids
            .iter()
            .filter_map(|id| scenarios.get(id))
            .map(ScenarioDetail::run_info)
            .collect();
        // 按id排序返回，模拟IN查询不保证顺序
        infos.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(infos)
    }

    async fn get_for_run(&self, id: &str) -> BatchRunResult<Option<ScenarioDetail>> {
        if self.suppressed_details.read().await.contains(id) {
            return Ok(None);
        }
        Ok(self.scenarios.read().await.get(id).cloned())
    }
}
