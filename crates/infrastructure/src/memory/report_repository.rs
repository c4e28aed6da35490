use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use batchrun_core::errors::BatchRunResult;
use batchrun_core::models::{
    ReportTaskRelation, ScenarioRecord, ScenarioReport, ScenarioReportStep,
};
use batchrun_core::traits::ReportRepository;

/// 内存报告仓储
#[derive(Debug, Default)]
pub struct MemoryReportRepository {
    reports: RwLock<HashMap<String, ScenarioReport>>,
    steps: RwLock<Vec<ScenarioReportStep>>,
    relations: RwLock<Vec<ReportTaskRelation>>,
    records: RwLock<Vec<ScenarioRecord>>,
}

impl MemoryReportRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn report_count(&self) -> usize {
        self.reports.read().await.len()
    }

    pub async fn scenario_records(&self, report_id: &str) -> Vec<ScenarioRecord> {
        self.records
            .read()
            .await
            .iter()
            .filter(|record| record.report_id == report_id)
            .cloned()
            .collect()
    }

    pub async fn all_reports(&self) -> Vec<ScenarioReport> {
        self.reports.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl ReportRepository for MemoryReportRepository {
    async fn insert_report(&self, report: &ScenarioReport) -> BatchRunResult<()> {
        self.reports
            .write()
            .await
            .insert(report.id.clone(), report.clone());
        Ok(())
    }

    async fn update_report(&self, report: &ScenarioReport) -> BatchRunResult<()> {
        self.reports
            .write()
            .await
            .insert(report.id.clone(), report.clone());
        Ok(())
    }

    async fn find_report(&self, id: &str) -> BatchRunResult<Option<ScenarioReport>> {
        Ok(self.reports.read().await.get(id).cloned())
    }

    async fn insert_task_relation(&self, relation: &ReportTaskRelation) -> BatchRunResult<()> {
        self.relations.write().await.push(relation.clone());
        Ok(())
    }

    async fn find_report_id_by_task(&self, task_id: &str) -> BatchRunResult<Option<String>> {
        Ok(self
            .relations
            .read()
            .await
            .iter()
            .find(|relation| relation.task_resource_id == task_id)
            .map(|relation| relation.report_id.clone()))
    }

    async fn insert_scenario_records(&self, records: &[ScenarioRecord]) -> BatchRunResult<()> {
        self.records.write().await.extend(records.iter().cloned());
        Ok(())
    }

    async fn insert_report_steps(&self, steps: &[ScenarioReportStep]) -> BatchRunResult<()> {
        self.steps.write().await.extend(steps.iter().cloned());
        Ok(())
    }

    async fn find_report_steps(
        &self,
        report_id: &str,
    ) -> BatchRunResult<Vec<ScenarioReportStep>> {
        Ok(self
            .steps
            .read()
            .await
            .iter()
            .filter(|step| step.report_id == report_id)
            .cloned()
            .collect())
    }

    async fn delete_steps_by_parent_ids(
        &self,
        report_id: &str,
        parent_ids: &[String],
    ) -> BatchRunResult<()> {
        self.steps.write().await.retain(|step| {
            step.report_id != report_id
                || step
                    .parent_id
                    .as_ref()
                    .map(|parent| !parent_ids.contains(parent))
                    .unwrap_or(true)
        });
        Ok(())
    }
}
