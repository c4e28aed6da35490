//! 串行驱动器
//!
//! 串行模式下任一时刻只允许一个场景在执行。推进不靠内部轮询循环，
//! 而是由执行器通过完成事件通道回发信号：驱动器在自己的后台任务里
//! 消费完成事件，收到一条才弹出下一条明细。`drive_next` 仍作为可
//! 重入的单步操作暴露，供外部完成回调直接推进。

use std::sync::Arc;
use std::sync::Mutex as StdMutex;

use tokio::sync::mpsc;
use tokio::sync::Mutex;
use tracing::{error, info};

use batchrun_core::errors::BatchRunResult;
use batchrun_core::models::{
    ExecutionQueue, ExecutionQueueDetail, TaskInfo, TaskItemRequest, TaskRequest,
};
use batchrun_core::traits::{CompletionSignal, ItemCompletion, ScenarioExecutor, ScenarioRepository};

use crate::queue_service::ExecutionQueueService;
use crate::report_service::ReportService;

/// 串行链路状态机：PENDING → RUNNING → {ADVANCING, STALLED, ABORTED}，
/// ADVANCING随即回到RUNNING处理下一条，队列耗尽则终止于COMPLETED
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialState {
    Pending,
    Running,
    Advancing,
    /// 场景缺口使链路停滞，后续明细保持未消费
    Stalled,
    Aborted,
    Completed,
}

/// 单步驱动的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveOutcome {
    /// 已委托给执行器，等待完成事件
    Delegated,
    /// 场景在入队后被删除，链路停滞且不推进下一条
    Stalled,
    /// 执行器调用失败，整条队列已被中止
    Aborted,
}

/// 串行驱动器的共享依赖，每次运行据此构建一个驱动器实例
#[derive(Clone)]
pub struct SerialContext {
    pub queue_service: Arc<ExecutionQueueService>,
    pub report_service: Arc<ReportService>,
    pub scenario_repo: Arc<dyn ScenarioRepository>,
    pub executor: Arc<dyn ScenarioExecutor>,
}

pub struct SerialDriver {
    ctx: SerialContext,
    completion: CompletionSignal,
    completion_rx: Mutex<mpsc::UnboundedReceiver<ItemCompletion>>,
    state: StdMutex<SerialState>,
}

impl SerialDriver {
    pub fn new(ctx: SerialContext) -> Self {
        let (completion, completion_rx) = CompletionSignal::channel();
        Self {
            ctx,
            completion,
            completion_rx: Mutex::new(completion_rx),
            state: StdMutex::new(SerialState::Pending),
        }
    }

    /// 完成信号句柄，外部完成回调据此推进链路
    pub fn completion_handle(&self) -> CompletionSignal {
        self.completion.clone()
    }

    pub fn state(&self) -> SerialState {
        *self.state.lock().unwrap()
    }

    fn set_state(&self, state: SerialState) {
        *self.state.lock().unwrap() = state;
    }

    /// 执行串行的下一个场景
    ///
    /// 解析明细背后的场景；解析不到（入队后被删除）时记日志返回，
    /// 不推进下一条明细。执行器调用失败属于基础设施故障，删除队列
    /// 中止整条串行链路，与单个场景测试失败（执行器上报的正常结果）
    /// 区分开。
    pub async fn drive_next(
        &self,
        queue: &ExecutionQueue,
        detail: &ExecutionQueueDetail,
    ) -> BatchRunResult<DriveOutcome> {
        let run_mode_config = &queue.run_mode_config;

        let Some(scenario) = self.ctx.scenario_repo.get_for_run(&detail.resource_id).await? else {
            info!("当前执行任务的场景已删除 {}", detail.resource_id);
            return Ok(DriveOutcome::Stalled);
        };

        let report_id = if run_mode_config.is_integrated_report() {
            run_mode_config.report_id().map(str::to_string)
        } else {
            // 单场景报告在执行时惰性创建
            let report = self
                .ctx
                .report_service
                .create_per_scenario_report(run_mode_config, &scenario, &queue.user_id)
                .await?;
            Some(report.id)
        };

        let mut task_info = TaskInfo::new(&scenario.project_id, run_mode_config.clone());
        task_info.task_id = queue.queue_id.clone();
        task_info.queue_id = Some(queue.queue_id.clone());
        task_info.user_id = queue.user_id.clone();
        task_info.rerun = queue.rerun;
        let request = TaskRequest {
            task_info,
            task_item: TaskItemRequest {
                task_item_id: detail.task_item_id.clone(),
                resource_id: detail.resource_id.clone(),
                report_id,
            },
        };

        match self
            .ctx
            .executor
            .execute(request, self.completion_handle())
            .await
        {
            Ok(()) => Ok(DriveOutcome::Delegated),
            Err(e) => {
                // 执行失败，删除队列
                error!("场景执行委托失败，中止队列 {}: {}", queue.queue_id, e);
                self.ctx.queue_service.abort(&queue.queue_id).await?;
                Ok(DriveOutcome::Aborted)
            }
        }
    }

    /// 串行链路主循环，在调用方的后台任务里运行
    ///
    /// 弹出明细→单步驱动→等待完成事件，循环直至队列耗尽。
    /// stop_on_failure配置下收到失败完成事件时，先收尾集成报告再
    /// 中止剩余队列。
    pub async fn run(&self, queue: &ExecutionQueue) -> BatchRunResult<SerialState> {
        let mut completion_rx = self.completion_rx.lock().await;
        loop {
            let Some(detail) = self.ctx.queue_service.dequeue_next(&queue.queue_id).await? else {
                self.set_state(SerialState::Completed);
                info!("串行队列 {} 已全部消费", queue.queue_id);
                break;
            };
            self.set_state(SerialState::Running);

            match self.drive_next(queue, &detail).await? {
                DriveOutcome::Stalled => {
                    // 场景缺口使链路停在当前位置，后续明细保持未消费
                    self.set_state(SerialState::Stalled);
                    break;
                }
                DriveOutcome::Aborted => {
                    self.set_state(SerialState::Aborted);
                    break;
                }
                DriveOutcome::Delegated => match completion_rx.recv().await {
                    Some(completion) => {
                        self.set_state(SerialState::Advancing);
                        if queue.run_mode_config.stop_on_failure && !completion.success {
                            info!(
                                "场景 {} 失败且配置了失败停止，收尾队列 {}",
                                completion.resource_id, queue.queue_id
                            );
                            self.ctx.report_service.finalize_stopped_run(queue).await;
                            self.ctx.queue_service.abort(&queue.queue_id).await?;
                            self.set_state(SerialState::Aborted);
                            break;
                        }
                    }
                    None => {
                        // 完成通道关闭，无法再推进
                        self.set_state(SerialState::Aborted);
                        break;
                    }
                },
            }
        }
        Ok(self.state())
    }
}
