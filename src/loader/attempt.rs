use tokio::time::{timeout, Duration, Instant};

use super::surface::{Surface, SurfaceEvent};
use super::verify::verify;
use crate::models::ProjectDescriptor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Loaded,
    TimedOut,
    Errored(String),
}

/// One top-level load request. Lives until the load resolves or the retry
/// budget is spent; never shared outside the loader.
#[derive(Debug, Clone)]
pub struct LoadAttempt {
    pub project_key: String,
    pub sequence: u64,
    pub retry_count: u32,
    pub started_at: Instant,
    /// Outcome of the latest navigation; `None` until the first settles.
    pub outcome: Option<AttemptOutcome>,
}

impl LoadAttempt {
    pub fn new(project_key: &str, sequence: u64) -> Self {
        Self {
            project_key: project_key.to_string(),
            sequence,
            retry_count: 0,
            started_at: Instant::now(),
            outcome: None,
        }
    }

    /// Point `surface` at the project and wait for its first signal.
    ///
    /// The listener is registered before navigating and released before
    /// this returns, on every path.
    pub async fn run(
        &mut self,
        project: &ProjectDescriptor,
        surface: &dyn Surface,
        limit: Duration,
    ) -> AttemptOutcome {
        let mut subscription = surface.events().subscribe();
        surface.navigate(&project.entry_url());

        let signal = timeout(limit, subscription.next()).await;
        drop(subscription);

        let outcome = match signal {
            Err(_) => AttemptOutcome::TimedOut,
            Ok(Some(SurfaceEvent::Load)) => match verify(surface, project) {
                Ok(()) => AttemptOutcome::Loaded,
                Err(e) => AttemptOutcome::Errored(e.to_string()),
            },
            Ok(Some(SurfaceEvent::Error(reason))) => AttemptOutcome::Errored(reason),
            Ok(None) => AttemptOutcome::Errored("surface stopped emitting events".to_string()),
        };
        self.outcome = Some(outcome.clone());
        outcome
    }
}
