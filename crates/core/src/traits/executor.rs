//! 执行器接口定义
//!
//! 编排层不执行测试步骤，只通过该接口把整场景的执行委托给执行器。
//! 串行链路的推进依赖执行器通过 [`CompletionSignal`] 回发的完成事件，
//! 编排层既不轮询也不阻塞发起线程。

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::errors::BatchRunResult;
use crate::models::{TaskBatchRequest, TaskRequest};

/// 单个场景的完成事件
#[derive(Debug, Clone)]
pub struct ItemCompletion {
    pub task_item_id: String,
    pub resource_id: String,
    /// 场景测试失败是正常结果，只有stop_on_failure时才影响链路推进
    pub success: bool,
}

/// 完成信号发送端，随单场景请求交给执行器
#[derive(Debug, Clone)]
pub struct CompletionSignal {
    tx: mpsc::UnboundedSender<ItemCompletion>,
}

impl CompletionSignal {
    /// 创建完成事件通道，接收端由串行驱动器持有
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ItemCompletion>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// 通知一个场景执行完成；驱动器已退出时事件被丢弃
    pub fn notify(&self, completion: ItemCompletion) {
        let _ = self.tx.send(completion);
    }
}

/// 场景执行器（外部协作方）
#[async_trait]
pub trait ScenarioExecutor: Send + Sync {
    /// 委托执行单个场景，接受失败会中止串行队列
    async fn execute(
        &self,
        request: TaskRequest,
        completion: CompletionSignal,
    ) -> BatchRunResult<()>;

    /// 一次性提交整批场景，批内并发与部分失败由执行器负责
    async fn execute_batch(
        &self,
        request: TaskBatchRequest,
        item_map: BTreeMap<String, String>,
    ) -> BatchRunResult<()>;
}

/// 并行批次的进度统计集合
///
/// 派发前预登记全量任务项id，保证完成率有已知分母，完成事件不会跑在登记之前。
#[async_trait]
pub trait ExecutionSetService: Send + Sync {
    async fn init_set(&self, set_id: &str, item_ids: Vec<String>) -> BatchRunResult<()>;
    async fn get_set(&self, set_id: &str) -> BatchRunResult<Option<Vec<String>>>;
}
