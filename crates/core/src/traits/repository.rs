//! 仓储抽象
//!
//! 每个实体一个窄接口，遵循依赖倒置原则，编排逻辑可针对内存实现测试。

use async_trait::async_trait;

use crate::errors::BatchRunResult;
use crate::models::{
    ExecTask, ExecTaskItem, ExecutionQueue, ExecutionQueueDetail, Project, ReportTaskRelation,
    ScenarioDetail, ScenarioRecord, ScenarioReport, ScenarioReportStep, ScenarioRunInfo,
};

/// 任务与任务项仓储
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn insert_task(&self, task: &ExecTask) -> BatchRunResult<()>;
    /// 批量插入任务项，调用方负责分片
    async fn insert_task_items(&self, items: &[ExecTaskItem]) -> BatchRunResult<()>;
    async fn find_task(&self, id: &str) -> BatchRunResult<Option<ExecTask>>;
    async fn find_task_items(&self, task_id: &str) -> BatchRunResult<Vec<ExecTaskItem>>;
    /// 查询可重跑的任务项子集，筛选条件由存储侧维护
    async fn find_rerun_items(&self, task_id: &str) -> BatchRunResult<Vec<ExecTaskItem>>;
}

/// 执行队列仓储
#[async_trait]
pub trait QueueRepository: Send + Sync {
    async fn insert_queue(&self, queue: &ExecutionQueue) -> BatchRunResult<()>;
    /// 批量插入队列明细，保持传入顺序
    async fn insert_details(&self, details: &[ExecutionQueueDetail]) -> BatchRunResult<()>;
    /// 原子地弹出最早一条剩余明细，队列空时返回None
    async fn pop_next_detail(&self, queue_id: &str)
        -> BatchRunResult<Option<ExecutionQueueDetail>>;
    async fn find_queue(&self, queue_id: &str) -> BatchRunResult<Option<ExecutionQueue>>;
    /// 删除队列及全部未消费明细
    async fn delete_queue(&self, queue_id: &str) -> BatchRunResult<()>;
    async fn count_details(&self, queue_id: &str) -> BatchRunResult<usize>;
}

/// 报告仓储
#[async_trait]
pub trait ReportRepository: Send + Sync {
    async fn insert_report(&self, report: &ScenarioReport) -> BatchRunResult<()>;
    async fn update_report(&self, report: &ScenarioReport) -> BatchRunResult<()>;
    async fn find_report(&self, id: &str) -> BatchRunResult<Option<ScenarioReport>>;
    async fn insert_task_relation(&self, relation: &ReportTaskRelation) -> BatchRunResult<()>;
    /// 按任务id反查集成报告id
    async fn find_report_id_by_task(&self, task_id: &str) -> BatchRunResult<Option<String>>;
    async fn insert_scenario_records(&self, records: &[ScenarioRecord]) -> BatchRunResult<()>;
    async fn insert_report_steps(&self, steps: &[ScenarioReportStep]) -> BatchRunResult<()>;
    async fn find_report_steps(&self, report_id: &str)
        -> BatchRunResult<Vec<ScenarioReportStep>>;
    /// 删除指定报告下parent_id命中的步骤，重跑前清理旧结果
    async fn delete_steps_by_parent_ids(
        &self,
        report_id: &str,
        parent_ids: &[String],
    ) -> BatchRunResult<()>;
}

/// 场景元数据仓储（场景本体由外部系统维护）
#[async_trait]
pub trait ScenarioRepository: Send + Sync {
    /// 按id批量查询执行信息，已删除的场景不在结果中
    async fn get_execute_info_by_ids(&self, ids: &[String])
        -> BatchRunResult<Vec<ScenarioRunInfo>>;
    /// 驱动阶段解析场景详情，场景已删除时返回None
    async fn get_for_run(&self, id: &str) -> BatchRunResult<Option<ScenarioDetail>>;
}

/// 项目仓储
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn find_project(&self, id: &str) -> BatchRunResult<Option<Project>>;
}
