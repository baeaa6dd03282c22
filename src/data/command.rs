//! External command capability and the short-lived result cache that bounds
//! how often each tool is spawned.

use log::{debug, warn};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::runtime::{Builder, Runtime};

/// Runs an external program and hands back its stdout, or `None` when the
/// program is missing, fails to start or does not finish in time.
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> Option<String>;
}

/// Spawns children through tokio so a hung tool can be killed on a deadline.
///
/// The runtime is private and current-thread: the caller still blocks for the
/// duration of the child, there is no background work.
pub struct TokioCommandRunner {
    runtime: Runtime,
    timeout: Duration,
}

impl TokioCommandRunner {
    pub fn new(timeout: Duration) -> std::io::Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(Self { runtime, timeout })
    }
}

impl CommandRunner for TokioCommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> Option<String> {
        let mut command = tokio::process::Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let outcome = self
            .runtime
            .block_on(async { tokio::time::timeout(self.timeout, command.output()).await });

        match outcome {
            Ok(Ok(output)) => Some(String::from_utf8_lossy(&output.stdout).into_owned()),
            Ok(Err(err)) => {
                debug!("{program} unavailable: {err}");
                None
            }
            Err(_) => {
                warn!("{program} timed out after {:?}", self.timeout);
                None
            }
        }
    }
}

/// Holds one value for `ttl`, refreshed lazily on the next read after expiry.
#[derive(Debug, Clone)]
pub struct TimedCache<T> {
    ttl: Duration,
    entry: Option<(Instant, T)>,
}

impl<T: Clone> TimedCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entry: None }
    }

    pub fn get_or_refresh(&mut self, now: Instant, refresh: impl FnOnce() -> T) -> T {
        if let Some((stored_at, value)) = &self.entry {
            if now.saturating_duration_since(*stored_at) < self.ttl {
                return value.clone();
            }
        }
        let value = refresh();
        self.entry = Some((now, value.clone()));
        value
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::CommandRunner;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Returns canned stdout per program name and counts invocations.
    #[derive(Default)]
    pub struct ScriptedRunner {
        outputs: HashMap<String, String>,
        calls: RefCell<HashMap<String, usize>>,
    }

    impl ScriptedRunner {
        pub fn with(mut self, program: &str, stdout: &str) -> Self {
            self.outputs.insert(program.to_string(), stdout.to_string());
            self
        }

        pub fn set(&mut self, program: &str, stdout: &str) {
            self.outputs.insert(program.to_string(), stdout.to_string());
        }

        pub fn calls(&self, program: &str) -> usize {
            self.calls.borrow().get(program).copied().unwrap_or(0)
        }
    }

    impl CommandRunner for ScriptedRunner {
        fn run(&self, program: &str, _args: &[&str]) -> Option<String> {
            *self
                .calls
                .borrow_mut()
                .entry(program.to_string())
                .or_insert(0) += 1;
            self.outputs.get(program).cloned()
        }
    }
}
