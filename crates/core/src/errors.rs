use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum BatchRunError {
    #[error("配置错误: {0}")]
    Configuration(String),
    #[error("项目不存在: id={id}")]
    ProjectNotFound { id: String },
    #[error("任务不存在: id={id}")]
    TaskNotFound { id: String },
    #[error("执行队列不存在: id={id}")]
    QueueNotFound { id: String },
    #[error("报告不存在: id={id}")]
    ReportNotFound { id: String },
    #[error("存储操作失败: {0}")]
    Storage(String),
    #[error("执行器调用失败: {0}")]
    Executor(String),
    #[error("数据序列化错误: {0}")]
    Serialization(String),
    #[error("系统内部错误: {0}")]
    Internal(String),
}

/// 统一的Result类型
pub type BatchRunResult<T> = std::result::Result<T, BatchRunError>;

impl BatchRunError {
    pub fn config_error<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }
    pub fn project_not_found<S: Into<String>>(id: S) -> Self {
        Self::ProjectNotFound { id: id.into() }
    }
    pub fn task_not_found<S: Into<String>>(id: S) -> Self {
        Self::TaskNotFound { id: id.into() }
    }
    pub fn queue_not_found<S: Into<String>>(id: S) -> Self {
        Self::QueueNotFound { id: id.into() }
    }
    pub fn report_not_found<S: Into<String>>(id: S) -> Self {
        Self::ReportNotFound { id: id.into() }
    }
    pub fn storage_error<S: Into<String>>(msg: S) -> Self {
        Self::Storage(msg.into())
    }
    pub fn executor_error<S: Into<String>>(msg: S) -> Self {
        Self::Executor(msg.into())
    }

    /// 装载阶段错误会回滚整个注册事务，其余错误在检测到的组件就地处理
    pub fn is_setup_error(&self) -> bool {
        matches!(
            self,
            BatchRunError::Configuration(_) | BatchRunError::ProjectNotFound { .. }
        )
    }
    pub fn is_retryable(&self) -> bool {
        matches!(self, BatchRunError::Storage(_) | BatchRunError::Executor(_))
    }
}

impl From<serde_json::Error> for BatchRunError {
    fn from(err: serde_json::Error) -> Self {
        BatchRunError::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for BatchRunError {
    fn from(err: anyhow::Error) -> Self {
        BatchRunError::Internal(err.to_string())
    }
}
