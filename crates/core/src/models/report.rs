use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::run_config::RunMode;
use super::task::TaskTriggerMode;

/// 场景执行报告
///
/// 单场景执行的结果容器；集成报告则承载整个批次的聚合结果。
/// 单场景报告在执行时惰性创建，集成报告在批次注册阶段一次性预创建。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub id: String,
    pub name: String,
    pub project_id: String,
    pub environment_id: Option<String>,
    pub run_mode: RunMode,
    pub pool_id: String,
    pub trigger_mode: TaskTriggerMode,
    pub integrated: bool,
    pub start_time: DateTime<Utc>,
    pub pending_count: i64,
    pub success_count: i64,
    pub error_count: i64,
    /// 请求通过率（百分比）
    pub request_pass_rate: f64,
    pub status: ResultStatus,
    pub exec_status: ExecStatus,
    pub create_user: String,
}

impl ScenarioReport {
    pub fn new(user_id: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: String::new(),
            project_id: String::new(),
            environment_id: None,
            run_mode: RunMode::Serial,
            pool_id: String::new(),
            trigger_mode: TaskTriggerMode::Batch,
            integrated: false,
            start_time: Utc::now(),
            pending_count: 0,
            success_count: 0,
            error_count: 0,
            request_pass_rate: 0.0,
            status: ResultStatus::Pending,
            exec_status: ExecStatus::Pending,
            create_user: user_id.to_string(),
        }
    }

    /// 请求总数 = 各状态计数之和
    pub fn request_total(&self) -> i64 {
        self.pending_count + self.success_count + self.error_count
    }

    /// 按最终计数重算通过率
    pub fn compute_request_rate(&mut self, total: i64) {
        if total > 0 {
            self.request_pass_rate = (self.success_count as f64) * 100.0 / (total as f64);
        } else {
            self.request_pass_rate = 0.0;
        }
    }
}

/// 集成报告中的一条有序步骤，代表一个场景的贡献
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReportStep {
    pub report_id: String,
    /// 步骤id即场景id
    pub step_id: String,
    /// 重跑去重依据：同一场景重跑前按parent_id删除旧步骤
    pub parent_id: Option<String>,
    /// 调度顺序内从1起连续递增
    pub sort: i64,
    pub name: String,
    pub step_type: String,
}

/// 报告与任务的桥接记录，用于结果下钻
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportTaskRelation {
    pub report_id: String,
    pub task_resource_id: String,
}

/// 报告与组成场景的桥接记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioRecord {
    pub report_id: String,
    pub scenario_id: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ResultStatus {
    #[serde(rename = "PENDING")]
    Pending,
    #[serde(rename = "SUCCESS")]
    Success,
    #[serde(rename = "ERROR")]
    Error,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExecStatus {
    #[serde(rename = "PENDING")]
    Pending,
    #[serde(rename = "RUNNING")]
    Running,
    #[serde(rename = "COMPLETED")]
    Completed,
    #[serde(rename = "STOPPED")]
    Stopped,
}
