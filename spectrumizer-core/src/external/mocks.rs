// spectrumizer-core/src/external/mocks.rs

// --- Scripted runner (for testing) ---

use std::sync::{Arc, Mutex, MutexGuard};

use super::command::{CommandOutput, CommandRunner, Invocation, OutputMode};
use crate::error::{CoreError, CoreResult};

type Responder = Arc<dyn Fn(&Invocation) -> CoreResult<CommandOutput> + Send + Sync>;

/// A [`CommandRunner`] that answers from a list of rules instead of spawning
/// processes.
///
/// Each rule is a substring matched against the rendered command line. The
/// first matching rule answers; invocations that match no rule succeed with
/// empty output. Every call is recorded.
#[derive(Default)]
pub struct ScriptedRunner {
    rules: Mutex<Vec<(String, Responder)>>,
    calls: Mutex<Vec<Invocation>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers invocations containing `pattern` with `responder`.
    pub fn on<F>(&self, pattern: &str, responder: F)
    where
        F: Fn(&Invocation) -> CoreResult<CommandOutput> + Send + Sync + 'static,
    {
        lock(&self.rules).push((pattern.to_string(), Arc::new(responder)));
    }

    pub fn succeed_with(&self, pattern: &str, output: &str) {
        let output = output.to_string();
        self.on(pattern, move |_| {
            Ok(CommandOutput {
                combined: output.clone(),
            })
        });
    }

    /// Makes matching invocations fail with exit code 1 and `output`.
    pub fn fail_with(&self, pattern: &str, output: &str) {
        let output = output.to_string();
        self.on(pattern, move |inv| {
            Err(CoreError::CommandFailed {
                command: inv.command_line(),
                status: "exit code 1".to_string(),
                output: output.clone(),
            })
        });
    }

    /// All invocations received so far, in call order.
    pub fn calls(&self) -> Vec<Invocation> {
        lock(&self.calls).clone()
    }

    pub fn calls_matching(&self, pattern: &str) -> Vec<Invocation> {
        lock(&self.calls)
            .iter()
            .filter(|inv| inv.command_line().contains(pattern))
            .cloned()
            .collect()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, invocation: &Invocation, _mode: OutputMode) -> CoreResult<CommandOutput> {
        lock(&self.calls).push(invocation.clone());

        let line = invocation.command_line();
        let responder = lock(&self.rules)
            .iter()
            .find(|(pattern, _)| line.contains(pattern.as_str()))
            .map(|(_, responder)| Arc::clone(responder));

        // Rules lock is already released here; responders may block.
        match responder {
            Some(responder) => responder(invocation),
            None => Ok(CommandOutput::default()),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
