use std::sync::Arc;

use crate::api::QuizBackend;
use crate::errors::AppResult;
use crate::models::domain::Dashboard;

/// Fetches the dashboard's two data sets together. The aggregate succeeds
/// only when both legs resolve; a failure on either side fails the whole
/// fetch even if the other succeeded.
pub struct DashboardService {
    backend: Arc<dyn QuizBackend>,
}

impl DashboardService {
    pub fn new(backend: Arc<dyn QuizBackend>) -> Self {
        Self { backend }
    }

    pub async fn fetch(&self) -> AppResult<Dashboard> {
        let (history, progress) =
            futures::try_join!(self.backend.history(), self.backend.progress())?;

        Ok(Dashboard { history, progress })
    }
}
