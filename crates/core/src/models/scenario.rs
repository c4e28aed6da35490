use serde::{Deserialize, Serialize};

/// 批量注册阶段按id批量查出的场景执行信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioRunInfo {
    pub id: String,
    pub name: String,
    pub project_id: String,
    pub environment_id: Option<String>,
}

/// 驱动阶段解析出的场景详情，含步骤用于统计请求数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioDetail {
    pub id: String,
    pub name: String,
    pub project_id: String,
    pub environment_id: Option<String>,
    pub steps: Vec<ScenarioStep>,
}

impl ScenarioDetail {
    /// 场景的预期工作量权重，用于停止执行后的pending统计
    pub fn request_count(&self) -> i64 {
        self.steps.len() as i64
    }

    pub fn run_info(&self) -> ScenarioRunInfo {
        ScenarioRunInfo {
            id: self.id.clone(),
            name: self.name.clone(),
            project_id: self.project_id.clone(),
            environment_id: self.environment_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioStep {
    pub id: String,
    pub name: String,
}
