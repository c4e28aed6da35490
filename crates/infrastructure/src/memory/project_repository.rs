use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use batchrun_core::errors::BatchRunResult;
use batchrun_core::models::Project;
use batchrun_core::traits::ProjectRepository;

/// 内存项目仓储
#[derive(Debug, Default)]
pub struct MemoryProjectRepository {
    projects: RwLock<HashMap<String, Project>>,
}

impl MemoryProjectRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_project(&self, project: Project) {
        self.projects
            .write()
            .await
            .insert(project.id.clone(), project);
    }
}

#[async_trait]
impl ProjectRepository for MemoryProjectRepository {
    async fn find_project(&self, id: &str) -> BatchRunResult<Option<Project>> {
        Ok(self.projects.read().await.get(id).cloned())
    }
}
