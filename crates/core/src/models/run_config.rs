use serde::{Deserialize, Serialize};

/// 批次并发模式：严格串行或完全并行
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RunMode {
    #[serde(rename = "SERIAL")]
    Serial,
    #[serde(rename = "PARALLEL")]
    Parallel,
}

/// 集成报告引用，报告创建后回填report_id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionReport {
    pub report_id: Option<String>,
    pub report_name: String,
}

/// 一次批量执行的运行配置，随队列持久化为快照
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunModeConfig {
    pub run_mode: RunMode,
    /// 是否聚合为一份集成报告
    pub integrated_report: bool,
    /// 请求方指定的集成报告名
    pub integrated_report_name: Option<String>,
    pub collection_report: Option<CollectionReport>,
    pub pool_id: String,
    pub environment_id: Option<String>,
    /// 环境分组时各场景使用自身环境
    pub grouped: bool,
    pub stop_on_failure: bool,
}

impl RunModeConfig {
    pub fn new(run_mode: RunMode, pool_id: &str) -> Self {
        Self {
            run_mode,
            integrated_report: false,
            integrated_report_name: None,
            collection_report: None,
            pool_id: pool_id.to_string(),
            environment_id: None,
            grouped: false,
            stop_on_failure: false,
        }
    }

    pub fn is_parallel(&self) -> bool {
        self.run_mode == RunMode::Parallel
    }

    pub fn is_integrated_report(&self) -> bool {
        self.integrated_report
    }

    /// 集成报告id，报告创建前为None
    pub fn report_id(&self) -> Option<&str> {
        self.collection_report
            .as_ref()
            .and_then(|report| report.report_id.as_deref())
    }

    pub fn report_name(&self) -> Option<&str> {
        self.collection_report
            .as_ref()
            .map(|report| report.report_name.as_str())
    }
}
