//! 报告聚合
//!
//! 负责预生成集成报告、惰性创建单场景报告、维护报告步骤与桥接记录，
//! 以及批次停止后的报告收尾。

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};

use batchrun_core::config::BatchRunConfig;
use batchrun_core::errors::{BatchRunError, BatchRunResult};
use batchrun_core::models::{
    ExecStatus, ExecutionQueue, ReportTaskRelation, ResourceType, ResultStatus, ScenarioDetail,
    ScenarioRecord, ScenarioReport, ScenarioReportStep, ScenarioRunInfo, RunModeConfig,
};
use batchrun_core::traits::{QueueRepository, ReportRepository, ScenarioRepository};

/// 占位步骤类型，停止执行后补充的场景内步骤
const SCENARIO_STEP_TYPE: &str = "SCENARIO_STEP";

pub struct ReportService {
    config: Arc<BatchRunConfig>,
    report_repo: Arc<dyn ReportRepository>,
    scenario_repo: Arc<dyn ScenarioRepository>,
    queue_repo: Arc<dyn QueueRepository>,
}

impl ReportService {
    pub fn new(
        config: Arc<BatchRunConfig>,
        report_repo: Arc<dyn ReportRepository>,
        scenario_repo: Arc<dyn ScenarioRepository>,
        queue_repo: Arc<dyn QueueRepository>,
    ) -> Self {
        Self {
            config,
            report_repo,
            scenario_repo,
            queue_repo,
        }
    }

    /// 预生成集成报告并关联任务，报告id回写进运行配置供下游引用
    pub async fn create_integrated_report(
        &self,
        task_id: &str,
        run_mode_config: &mut RunModeConfig,
        user_id: &str,
        project_id: &str,
    ) -> BatchRunResult<ScenarioReport> {
        let requested_name = run_mode_config.report_name().unwrap_or("集成报告").to_string();

        let mut report = base_report(run_mode_config, user_id);
        report.name = format!("{}_{}", requested_name, time_suffix());
        report.integrated = true;
        report.project_id = project_id.to_string();

        self.report_repo.insert_report(&report).await?;
        self.report_repo
            .insert_task_relation(&ReportTaskRelation {
                report_id: report.id.clone(),
                task_resource_id: task_id.to_string(),
            })
            .await?;

        // 设置集成报告执行参数
        run_mode_config
            .collection_report
            .get_or_insert_with(Default::default)
            .report_id = Some(report.id.clone());

        info!("初始化集成报告 {}，任务 {}", report.id, task_id);
        Ok(report)
    }

    /// 初始化集成报告与场景的关联关系
    pub async fn link_scenarios(
        &self,
        report_id: &str,
        scenarios: &[ScenarioRunInfo],
    ) -> BatchRunResult<()> {
        let records: Vec<ScenarioRecord> = scenarios
            .iter()
            .map(|scenario| ScenarioRecord {
                report_id: report_id.to_string(),
                scenario_id: scenario.id.clone(),
            })
            .collect();
        self.report_repo.insert_scenario_records(&records).await
    }

    /// 集成报告初始化一级步骤
    ///
    /// sort从sort_start起连续递增并跨分片延续，返回下一个可用序号。
    pub async fn append_steps(
        &self,
        report_id: &str,
        scenarios: &[ScenarioRunInfo],
        sort_start: i64,
    ) -> BatchRunResult<i64> {
        let mut sort = sort_start;
        let mut steps = Vec::with_capacity(scenarios.len());
        for scenario in scenarios {
            steps.push(ScenarioReportStep {
                report_id: report_id.to_string(),
                step_id: scenario.id.clone(),
                // 一级步骤无父节点；执行期产生的子步骤以场景id为parent_id
                parent_id: None,
                sort,
                name: scenario.name.clone(),
                step_type: ResourceType::Scenario.as_str().to_string(),
            });
            sort += 1;
        }
        if !steps.is_empty() {
            self.report_repo.insert_report_steps(&steps).await?;
        }
        Ok(sort)
    }

    /// 串行路径在执行时惰性创建的单场景报告
    pub async fn create_per_scenario_report(
        &self,
        run_mode_config: &RunModeConfig,
        scenario: &ScenarioDetail,
        user_id: &str,
    ) -> BatchRunResult<ScenarioReport> {
        let mut report = base_report(run_mode_config, user_id);
        report.name = format!("{}_{}", scenario.name, time_suffix());
        report.project_id = scenario.project_id.clone();
        report.environment_id = resolve_environment(run_mode_config, scenario);
        self.report_repo.insert_report(&report).await?;
        Ok(report)
    }

    /// 失败停止后的集成报告收尾
    ///
    /// 遍历所有未消费明细，累计预期请求数进pending计数，补充占位步骤
    /// 让集成报告呈现最初计划的完整范围，最后重算通过率并标记
    /// status=ERROR、exec_status=COMPLETED。
    ///
    /// 收尾动作尽力而为：内部失败只记日志，不向失败路径继续抛错。
    pub async fn finalize_stopped_run(&self, queue: &ExecutionQueue) {
        if !queue.run_mode_config.is_integrated_report() {
            return;
        }
        if let Err(e) = self.finalize_inner(queue).await {
            error!("失败停止，补充报告步骤失败: {}", e);
        }
    }

    async fn finalize_inner(&self, queue: &ExecutionQueue) -> BatchRunResult<()> {
        let Some(report_id) = queue.run_mode_config.report_id().map(str::to_string) else {
            return Ok(());
        };

        // 队列已耗尽说明失败发生在最后一个场景，报告交由正常完成路径收口
        let mut next = self.queue_repo.pop_next_detail(&queue.queue_id).await?;
        if next.is_none() {
            return Ok(());
        }

        let mut request_count = 0i64;
        let mut placeholder_steps = Vec::new();
        while let Some(detail) = next {
            next = self.queue_repo.pop_next_detail(&queue.queue_id).await?;
            let Some(scenario) = self.scenario_repo.get_for_run(&detail.resource_id).await? else {
                info!("当前场景已删除 {}", detail.resource_id);
                continue;
            };
            request_count += scenario.request_count();

            // 补充场景内的占位步骤
            for (index, step) in scenario.steps.iter().enumerate() {
                placeholder_steps.push(ScenarioReportStep {
                    report_id: report_id.clone(),
                    step_id: step.id.clone(),
                    parent_id: Some(scenario.id.clone()),
                    sort: (index + 1) as i64,
                    name: step.name.clone(),
                    step_type: SCENARIO_STEP_TYPE.to_string(),
                });
            }
        }
        for sub_steps in placeholder_steps.chunks(self.config.task_batch_size) {
            self.report_repo.insert_report_steps(sub_steps).await?;
        }

        // 未执行的请求计入pending，按最终计数重算通过率
        let mut report = self
            .report_repo
            .find_report(&report_id)
            .await?
            .ok_or_else(|| BatchRunError::report_not_found(&report_id))?;
        report.pending_count += request_count;
        let total = report.request_total();
        report.compute_request_rate(total);
        report.status = ResultStatus::Error;
        report.exec_status = ExecStatus::Completed;
        self.report_repo.update_report(&report).await
    }
}

fn base_report(run_mode_config: &RunModeConfig, user_id: &str) -> ScenarioReport {
    let mut report = ScenarioReport::new(user_id);
    report.environment_id = run_mode_config.environment_id.clone();
    report.run_mode = run_mode_config.run_mode;
    report.pool_id = run_mode_config.pool_id.clone();
    report.start_time = Utc::now();
    report
}

/// 环境分组时使用场景自身环境，否则以运行配置为准
fn resolve_environment(
    run_mode_config: &RunModeConfig,
    scenario: &ScenarioDetail,
) -> Option<String> {
    if run_mode_config.grouped {
        scenario.environment_id.clone()
    } else {
        run_mode_config
            .environment_id
            .clone()
            .or_else(|| scenario.environment_id.clone())
    }
}

fn time_suffix() -> String {
    Utc::now().format("%Y%m%d%H%M%S").to_string()
}
