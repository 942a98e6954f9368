//! Asynchronous handle around a single classification.
//!
//! The busy indicator of a caller is the `AwaitingResult` state: it is
//! entered before the worker thread starts and left only when the worker
//! stores its outcome. There is no cancellation; a started analysis always
//! runs to completion or failure (bounded by the client timeout).

use anyhow::{anyhow, Result};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Duration;

use crate::classify::client::ClassificationClient;
use crate::classify::error::ClassificationFailed;
use crate::classify::result::ClassificationResult;
use crate::payload::ImagePayload;

const WORKER_PANICKED: &str = "classifier worker panicked";

#[derive(Clone, Debug, Default, PartialEq)]
pub enum AnalysisState {
    #[default]
    Idle,
    AwaitingResult,
    Classified(ClassificationResult),
    Failed(ClassificationFailed),
}

impl AnalysisState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AnalysisState::Classified(_) | AnalysisState::Failed(_))
    }
}

#[derive(Default)]
struct Shared {
    state: Mutex<AnalysisState>,
    done: Condvar,
}

#[derive(Clone, Default)]
pub struct Analysis {
    shared: Arc<Shared>,
}

impl Analysis {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to `AwaitingResult` and classify on a worker thread.
    pub fn start(&self, client: &ClassificationClient, image: ImagePayload) -> Result<()> {
        {
            let mut state = self.lock()?;
            if *state == AnalysisState::AwaitingResult {
                return Err(anyhow!("analysis already in progress"));
            }
            *state = AnalysisState::AwaitingResult;
        }

        let shared = self.shared.clone();
        let client = client.clone();
        let spawned = std::thread::Builder::new()
            .name("foodshare-classify".to_string())
            .spawn(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| client.classify(&image)));
                let next = match outcome {
                    Ok(Ok(result)) => AnalysisState::Classified(result),
                    Ok(Err(err)) => AnalysisState::Failed(err),
                    Err(_) => {
                        log::error!("classification worker panicked");
                        AnalysisState::Failed(ClassificationFailed::Transport(
                            WORKER_PANICKED.to_string(),
                        ))
                    }
                };
                match shared.state.lock() {
                    Ok(mut state) => *state = next,
                    Err(poisoned) => *poisoned.into_inner() = next,
                }
                shared.done.notify_all();
            });

        if let Err(err) = spawned {
            *self.lock()? = AnalysisState::Idle;
            return Err(anyhow!("spawn classification worker: {}", err));
        }
        Ok(())
    }

    pub fn is_analyzing(&self) -> bool {
        self.state() == AnalysisState::AwaitingResult
    }

    pub fn state(&self) -> AnalysisState {
        match self.shared.state.lock() {
            Ok(state) => state.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Block until the current analysis leaves `AwaitingResult`.
    pub fn wait(&self) -> Result<AnalysisState> {
        let mut state = self.lock()?;
        while *state == AnalysisState::AwaitingResult {
            state = self
                .shared
                .done
                .wait(state)
                .map_err(|_| anyhow!("analysis state lock poisoned"))?;
        }
        Ok(state.clone())
    }

    /// Like `wait`, but returns the still-pending state after `timeout`.
    pub fn wait_timeout(&self, timeout: Duration) -> Result<AnalysisState> {
        let state = self.lock()?;
        let (state, _) = self
            .shared
            .done
            .wait_timeout_while(state, timeout, |state| *state == AnalysisState::AwaitingResult)
            .map_err(|_| anyhow!("analysis state lock poisoned"))?;
        Ok(state.clone())
    }

    pub fn reset(&self) -> Result<()> {
        let mut state = self.lock()?;
        if *state == AnalysisState::AwaitingResult {
            return Err(anyhow!("cannot reset while analysis is in progress"));
        }
        *state = AnalysisState::Idle;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, AnalysisState>> {
        self.shared
            .state
            .lock()
            .map_err(|_| anyhow!("analysis state lock poisoned"))
    }
}

impl std::fmt::Debug for Analysis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analysis")
            .field("state", &self.state())
            .finish()
    }
}
