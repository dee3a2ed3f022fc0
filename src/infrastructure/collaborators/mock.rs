//! Mock collaborators for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use tokio::sync::Mutex;

use crate::domain::models::{InterventionKind, Region};
use crate::domain::ports::{
    ActionExecutor, CaptureError, DispatchError, GenerateError, InstructionGenerator, ScreenSource,
};

/// Screen source that replays a scripted sequence of snapshots.
///
/// The last snapshot repeats once the script is exhausted, which makes
/// "content sits unchanged" scenarios trivial to drive.
pub struct ScriptedScreenSource {
    script: Mutex<VecDeque<Result<String, CaptureError>>>,
    last: Mutex<Option<String>>,
}

impl ScriptedScreenSource {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            last: Mutex::new(None),
        }
    }

    pub fn from_texts(texts: &[&str]) -> Self {
        let source = Self::new();
        {
            let mut script = source.script.try_lock().expect("fresh mutex");
            for text in texts {
                script.push_back(Ok((*text).to_string()));
            }
        }
        source
    }

    /// Queue one snapshot.
    pub async fn push(&self, text: impl Into<String>) {
        self.script.lock().await.push_back(Ok(text.into()));
    }

    /// Queue one capture failure.
    pub async fn push_failure(&self, error: CaptureError) {
        self.script.lock().await.push_back(Err(error));
    }
}

impl Default for ScriptedScreenSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScreenSource for ScriptedScreenSource {
    async fn capture(&self, _region: &Region) -> Result<String, CaptureError> {
        let next = self.script.lock().await.pop_front();
        match next {
            Some(Ok(text)) => {
                *self.last.lock().await = Some(text.clone());
                Ok(text)
            }
            Some(Err(err)) => Err(err),
            None => {
                let last = self.last.lock().await;
                last.clone().ok_or(CaptureError::Empty)
            }
        }
    }
}

/// Generator returning a canned instruction, optionally failing first.
pub struct MockGenerator {
    response: String,
    failures: Mutex<u32>,
    calls: Mutex<Vec<(String, String, InterventionKind)>>,
}

impl MockGenerator {
    pub fn with_response(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            failures: Mutex::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fail the next `count` calls before answering normally.
    pub fn failing_first(response: impl Into<String>, count: u32) -> Self {
        let generator = Self::with_response(response);
        *generator.failures.try_lock().expect("fresh mutex") = count;
        generator
    }

    /// Every (context, reason, kind) triple the generator saw.
    pub async fn calls(&self) -> Vec<(String, String, InterventionKind)> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl InstructionGenerator for MockGenerator {
    async fn generate(
        &self,
        context: &str,
        reason: &str,
        kind: InterventionKind,
    ) -> Result<String, GenerateError> {
        self.calls
            .lock()
            .await
            .push((context.to_string(), reason.to_string(), kind));

        let mut failures = self.failures.lock().await;
        if *failures > 0 {
            *failures -= 1;
            return Err(GenerateError::RequestFailed("mock failure".to_string()));
        }
        Ok(self.response.clone())
    }
}

/// Executor that records every delivered instruction.
pub struct MockExecutor {
    delivered: Mutex<Vec<String>>,
    fail_with_error: Mutex<u32>,
    refuse: Mutex<u32>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
            fail_with_error: Mutex::new(0),
            refuse: Mutex::new(0),
        }
    }

    /// Error out (as if the command crashed) on the next `count` dispatches.
    pub async fn fail_next(&self, count: u32) {
        *self.fail_with_error.lock().await = count;
    }

    /// Report delivery failure (exit status) on the next `count` dispatches.
    pub async fn refuse_next(&self, count: u32) {
        *self.refuse.lock().await = count;
    }

    pub async fn delivered(&self) -> Vec<String> {
        self.delivered.lock().await.clone()
    }
}

impl Default for MockExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ActionExecutor for MockExecutor {
    async fn dispatch(&self, instruction: &str) -> Result<bool, DispatchError> {
        let mut failures = self.fail_with_error.lock().await;
        if *failures > 0 {
            *failures -= 1;
            return Err(DispatchError::CommandFailed("mock crash".to_string()));
        }
        drop(failures);

        let mut refusals = self.refuse.lock().await;
        if *refusals > 0 {
            *refusals -= 1;
            return Ok(false);
        }
        drop(refusals);

        self.delivered.lock().await.push(instruction.to_string());
        Ok(true)
    }
}
