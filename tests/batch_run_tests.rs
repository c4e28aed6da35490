//! 嵌入式应用端到端验证：串行、并行与重跑全链路

use batchrun::{Application, BatchRunConfig, ScenarioBatchRunRequest};
use batchrun_core::models::{
    CollectionReport, Project, RunMode, RunModeConfig, ScenarioDetail, ScenarioStep,
};
use batchrun_core::traits::{ReportRepository, TaskRepository};

const PROJECT_ID: &str = "project-e2e";
const USER_ID: &str = "user-e2e";

async fn make_app() -> Application {
    let app = Application::new(BatchRunConfig {
        task_batch_size: 3,
        select_batch_size: 2,
    })
    .unwrap();
    app.register_project(Project {
        id: PROJECT_ID.to_string(),
        name: "端到端项目".to_string(),
        organization_id: "org-e2e".to_string(),
    })
    .await;
    app
}

async fn seed_scenarios(app: &Application, count: usize) -> Vec<String> {
    let mut ids = Vec::with_capacity(count);
    for index in 1..=count {
        let id = format!("scenario-{index:04}");
        app.scenario_repo()
            .insert_scenario(ScenarioDetail {
                id: id.clone(),
                name: format!("场景{index}"),
                project_id: PROJECT_ID.to_string(),
                environment_id: Some("env-e2e".to_string()),
                steps: vec![ScenarioStep {
                    id: format!("{id}-step-1"),
                    name: "发起请求".to_string(),
                }],
            })
            .await;
        ids.push(id);
    }
    ids
}

fn serial_request(ids: Vec<String>) -> ScenarioBatchRunRequest {
    ScenarioBatchRunRequest {
        project_id: PROJECT_ID.to_string(),
        scenario_ids: ids,
        run_mode_config: RunModeConfig::new(RunMode::Serial, "pool-e2e"),
    }
}

#[tokio::test]
async fn test_serial_batch_run_end_to_end() {
    let app = make_app().await;
    let ids = seed_scenarios(&app, 7).await;

    app.batch_run(serial_request(ids.clone()), USER_ID)
        .await
        .unwrap()
        .unwrap();

    // 全部场景按提交顺序执行
    let requests = app.executor().requests().await;
    let executed: Vec<&str> = requests
        .iter()
        .map(|request| request.task_item.resource_id.as_str())
        .collect();
    let expected: Vec<&str> = ids.iter().map(String::as_str).collect();
    assert_eq!(executed, expected);

    // 任务与任务项落库完整
    assert_eq!(app.task_repo().task_count().await, 1);
    let task_id = &requests[0].task_info.task_id;
    let items = app.task_repo().find_task_items(task_id).await.unwrap();
    assert_eq!(items.len(), 7);

    // 非集成模式每个场景一份报告
    assert_eq!(app.report_repo().report_count().await, 7);
}

#[tokio::test]
async fn test_integrated_serial_run_builds_one_report() {
    let app = make_app().await;
    let ids = seed_scenarios(&app, 5).await;

    let mut request = serial_request(ids.clone());
    request.run_mode_config.integrated_report = true;
    request.run_mode_config.integrated_report_name = Some("端到端回归".to_string());

    app.batch_run(request, USER_ID).await.unwrap().unwrap();

    let reports = app.report_repo().all_reports().await;
    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    assert!(report.name.starts_with("端到端回归_"));

    // 一级步骤跨分片连续编号且顺序与提交一致
    let steps = app.report_repo().find_report_steps(&report.id).await.unwrap();
    assert_eq!(steps.len(), 5);
    for (index, step) in steps.iter().enumerate() {
        assert_eq!(step.sort, (index + 1) as i64);
        assert_eq!(step.step_id, ids[index]);
    }
}

#[tokio::test]
async fn test_parallel_batch_run_submits_once() {
    let app = make_app().await;
    let ids = seed_scenarios(&app, 5).await;

    let mut request = serial_request(ids);
    request.run_mode_config.run_mode = RunMode::Parallel;

    app.batch_run(request, USER_ID).await.unwrap().unwrap();

    // 并行模式整批一次提交，不走串行队列
    let batches = app.executor().batches().await;
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].1.len(), 5);
    assert!(app.executor().requests().await.is_empty());
}

#[tokio::test]
async fn test_serial_rerun_reuses_task() {
    let app = make_app().await;
    let ids = seed_scenarios(&app, 3).await;

    app.batch_run(serial_request(ids), USER_ID)
        .await
        .unwrap()
        .unwrap();

    let requests = app.executor().requests().await;
    let task_id = requests[0].task_info.task_id.clone();
    let task = app.task_repo().find_task(&task_id).await.unwrap().unwrap();

    // 标记一个场景重跑
    app.task_repo()
        .mark_rerun_items(&task_id, &["scenario-0002".to_string()])
        .await;

    app.rerun(task, USER_ID).await.unwrap().unwrap();

    let requests = app.executor().requests().await;
    assert_eq!(requests.len(), 4);
    let rerun_request = requests.last().unwrap();
    assert_eq!(rerun_request.task_item.resource_id, "scenario-0002");
    assert!(rerun_request.task_info.rerun);
    // 重跑复用原任务id
    assert_eq!(rerun_request.task_info.task_id, task_id);
}

#[tokio::test]
async fn test_invalid_config_rejected_at_startup() {
    let result = Application::new(BatchRunConfig {
        task_batch_size: 0,
        select_batch_size: 100,
    });
    assert!(result.is_err());
}

#[tokio::test]
async fn test_missing_project_surfaces_error() {
    let app = Application::new(BatchRunConfig::default()).unwrap();
    let mut request = serial_request(vec!["scenario-0001".to_string()]);
    request.run_mode_config.collection_report = Some(CollectionReport::default());

    let result = app.batch_run(request, USER_ID).await.unwrap();
    assert!(result.is_err());
    assert_eq!(app.task_repo().task_count().await, 0);
}
