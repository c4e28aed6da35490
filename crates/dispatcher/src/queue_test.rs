use batchrun_core::config::BatchRunConfig;
use batchrun_core::models::{ExecTaskItem, ResourceType};
use batchrun_core::traits::QueueRepository;

use crate::test_utils::{serial_config, TestHarness, TEST_USER_ID};

fn make_items(task_id: &str, count: usize) -> Vec<ExecTaskItem> {
    (1..=count)
        .map(|index| {
            let mut item = ExecTaskItem::new(task_id, "project-1", TEST_USER_ID);
            item.resource_id = format!("scenario-{index:04}");
            item
        })
        .collect()
}

#[tokio::test]
async fn test_create_queue_reuses_task_id() {
    let harness = TestHarness::new().await;
    let queue_service = harness.queue_service();

    let queue = queue_service
        .create_queue(
            "task-1",
            &serial_config(),
            ResourceType::Scenario,
            TEST_USER_ID,
            false,
        )
        .await
        .unwrap();

    // 队列id与任务id一致，配置快照随队列持久化
    assert_eq!(queue.queue_id, "task-1");
    assert!(!queue.rerun);
    let stored = harness.queue_repo.find_queue("task-1").await.unwrap().unwrap();
    assert_eq!(stored.run_mode_config.pool_id, "pool-1");
}

#[tokio::test]
async fn test_create_queue_marks_rerun() {
    let harness = TestHarness::new().await;
    let queue_service = harness.queue_service();

    let queue = queue_service
        .create_queue(
            "task-1",
            &serial_config(),
            ResourceType::Scenario,
            TEST_USER_ID,
            true,
        )
        .await
        .unwrap();
    assert!(queue.rerun);
}

#[tokio::test]
async fn test_dequeue_follows_insertion_order() {
    let harness = TestHarness::new().await;
    let queue_service = harness.queue_service();
    queue_service
        .create_queue(
            "task-1",
            &serial_config(),
            ResourceType::Scenario,
            TEST_USER_ID,
            false,
        )
        .await
        .unwrap();
    let items = make_items("task-1", 3);
    queue_service.enqueue_details("task-1", &items).await.unwrap();

    // 插入顺序即调度顺序
    for item in &items {
        let detail = queue_service.dequeue_next("task-1").await.unwrap().unwrap();
        assert_eq!(detail.resource_id, item.resource_id);
        assert_eq!(detail.task_item_id, item.id);
    }
    // 队列耗尽后返回None
    assert!(queue_service.dequeue_next("task-1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_enqueue_chunks_preserve_order() {
    let config = BatchRunConfig {
        task_batch_size: 2,
        ..Default::default()
    };
    let harness = TestHarness::with_config(config).await;
    let queue_service = harness.queue_service();
    queue_service
        .create_queue(
            "task-1",
            &serial_config(),
            ResourceType::Scenario,
            TEST_USER_ID,
            false,
        )
        .await
        .unwrap();

    // 5条明细按2条一片写入，顺序跨分片保持
    let items = make_items("task-1", 5);
    queue_service.enqueue_details("task-1", &items).await.unwrap();
    assert_eq!(queue_service.remaining("task-1").await.unwrap(), 5);

    let mut popped = Vec::new();
    while let Some(detail) = queue_service.dequeue_next("task-1").await.unwrap() {
        popped.push(detail.resource_id);
    }
    let expected: Vec<String> = items.iter().map(|item| item.resource_id.clone()).collect();
    assert_eq!(popped, expected);
}

#[tokio::test]
async fn test_abort_drops_queue_and_details() {
    let harness = TestHarness::new().await;
    let queue_service = harness.queue_service();
    queue_service
        .create_queue(
            "task-1",
            &serial_config(),
            ResourceType::Scenario,
            TEST_USER_ID,
            false,
        )
        .await
        .unwrap();
    let items = make_items("task-1", 3);
    queue_service.enqueue_details("task-1", &items).await.unwrap();

    queue_service.abort("task-1").await.unwrap();

    // 队列记录与未消费明细一并删除
    assert!(harness.queue_repo.find_queue("task-1").await.unwrap().is_none());
    assert_eq!(queue_service.remaining("task-1").await.unwrap(), 0);
}
