use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::report::ExecStatus;

/// 一次批量执行实例，跨一个或多个场景
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecTask {
    pub id: String,
    pub project_id: String,
    pub organization_id: String,
    pub task_name: String,
    /// 注册时的用例数（按入参id数统计，解析缺口不回写）
    pub case_count: i64,
    pub task_type: ExecTaskType,
    pub trigger_mode: TaskTriggerMode,
    /// 并行/串行模式，重跑时沿用
    pub parallel: bool,
    /// 是否生成集成报告
    pub integrated: bool,
    pub env_grouped: bool,
    pub environment_id: Option<String>,
    pub pool_id: String,
    pub status: ExecStatus,
    pub create_user: String,
    pub create_time: DateTime<Utc>,
}

impl ExecTask {
    pub fn new(project_id: &str, organization_id: &str, user_id: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            project_id: project_id.to_string(),
            organization_id: organization_id.to_string(),
            task_name: String::new(),
            case_count: 0,
            task_type: ExecTaskType::ScenarioBatch,
            trigger_mode: TaskTriggerMode::Batch,
            parallel: false,
            integrated: false,
            env_grouped: false,
            environment_id: None,
            pool_id: String::new(),
            status: ExecStatus::Pending,
            create_user: user_id.to_string(),
            create_time: Utc::now(),
        }
    }
}

/// 任务中单个场景的执行槽位，批量插入后不再变更
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecTaskItem {
    pub id: String,
    pub task_id: String,
    pub project_id: String,
    pub organization_id: String,
    pub resource_type: ResourceType,
    pub resource_id: String,
    pub case_id: String,
    pub resource_name: String,
    pub executor: String,
}

impl ExecTaskItem {
    pub fn new(task_id: &str, project_id: &str, user_id: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            task_id: task_id.to_string(),
            project_id: project_id.to_string(),
            organization_id: String::new(),
            resource_type: ResourceType::Scenario,
            resource_id: String::new(),
            case_id: String::new(),
            resource_name: String::new(),
            executor: user_id.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExecTaskType {
    #[serde(rename = "SCENARIO_BATCH")]
    ScenarioBatch,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TaskTriggerMode {
    #[serde(rename = "BATCH")]
    Batch,
    #[serde(rename = "MANUAL")]
    Manual,
    #[serde(rename = "SCHEDULE")]
    Schedule,
    #[serde(rename = "API")]
    Api,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ResourceType {
    #[serde(rename = "SCENARIO")]
    Scenario,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Scenario => "SCENARIO",
        }
    }
}

/// 项目信息（外部协作方维护，此处只读）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub organization_id: String,
}
