// ─── Repair Worker Process ───
// Concrete repair client that supervises an external worker binary over
// line-delimited JSON on its stdio.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, info, warn};

use crate::core::error::{DistroError, DistroResult};
use crate::core::repair::task::{ProgressFn, RepairClient, RepairFactory, RepairSettings};

/// Command sent to the worker on stdin.
#[derive(Debug, Serialize)]
struct WorkerCommand<'a> {
    action: &'a str,
}

/// Message received from the worker on stdout.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WorkerMessage {
    Progress { percent: f64 },
    Result { invalid: usize },
    Complete,
    Error { message: String },
}

/// Repair client backed by a spawned worker process.
pub struct ProcessRepairClient {
    settings: RepairSettings,
    program: PathBuf,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stdout: Option<Lines<BufReader<ChildStdout>>>,
}

impl ProcessRepairClient {
    pub fn new(settings: RepairSettings, program: PathBuf) -> Self {
        Self {
            settings,
            program,
            child: None,
            stdin: None,
            stdout: None,
        }
    }

    async fn send(&mut self, action: &str) -> DistroResult<()> {
        let stdin = self.stdin.as_mut().ok_or(DistroError::NotInitialized)?;
        let mut line = serde_json::to_string(&WorkerCommand { action })?;
        line.push('\n');
        stdin
            .write_all(line.as_bytes())
            .await
            .map_err(|e| DistroError::Worker(format!("cannot write to worker: {}", e)))?;
        stdin
            .flush()
            .await
            .map_err(|e| DistroError::Worker(format!("cannot flush worker stdin: {}", e)))?;
        Ok(())
    }

    async fn next_message(&mut self) -> DistroResult<WorkerMessage> {
        let stdout = self.stdout.as_mut().ok_or(DistroError::NotInitialized)?;
        loop {
            let line = stdout
                .next_line()
                .await
                .map_err(|e| DistroError::Worker(format!("cannot read from worker: {}", e)))?
                .ok_or_else(|| DistroError::Worker("worker exited unexpectedly".to_string()))?;

            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(message) => return Ok(message),
                Err(e) => {
                    // Workers may emit plain log lines between messages.
                    debug!("Skipping non-message worker output ({}): {}", e, line);
                }
            }
        }
    }

    /// Drive one request/response exchange, reporting progress along the way.
    async fn run_action(
        &mut self,
        action: &str,
        on_progress: ProgressFn<'_>,
    ) -> DistroResult<usize> {
        self.send(action).await?;
        loop {
            match self.next_message().await? {
                WorkerMessage::Progress { percent } => on_progress(percent),
                WorkerMessage::Result { invalid } => return Ok(invalid),
                WorkerMessage::Complete => return Ok(0),
                WorkerMessage::Error { message } => return Err(DistroError::Worker(message)),
            }
        }
    }
}

#[async_trait]
impl RepairClient for ProcessRepairClient {
    fn spawn_receiver(&mut self, env: HashMap<String, String>) -> DistroResult<()> {
        let mut cmd = Command::new(&self.program);
        cmd.arg("--common-dir")
            .arg(&self.settings.common_dir)
            .arg("--instance-dir")
            .arg(&self.settings.instance_dir)
            .arg("--launcher-dir")
            .arg(&self.settings.launcher_dir)
            .arg("--server")
            .arg(&self.settings.server_id);
        if self.settings.dev_mode {
            cmd.arg("--dev");
        }
        cmd.envs(env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        info!(
            "Spawning repair worker {:?} for server '{}'",
            self.program, self.settings.server_id
        );

        let mut child = cmd
            .spawn()
            .map_err(|e| DistroError::Worker(format!("cannot spawn repair worker: {}", e)))?;

        self.stdin = child.stdin.take();
        self.stdout = child
            .stdout
            .take()
            .map(|out| BufReader::new(out).lines());
        self.child = Some(child);
        Ok(())
    }

    fn child_process(&self) -> Option<&Child> {
        self.child.as_ref()
    }

    fn destroy_receiver(&mut self) {
        self.stdin = None;
        self.stdout = None;
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.start_kill() {
                warn!("Failed to kill repair worker: {}", e);
            }
        }
    }

    async fn verify_files(&mut self, on_progress: ProgressFn<'_>) -> DistroResult<usize> {
        self.run_action("verify", on_progress).await
    }

    async fn download(&mut self, on_progress: ProgressFn<'_>) -> DistroResult<()> {
        self.run_action("download", on_progress).await.map(|_| ())
    }
}

/// Factory spawning [`ProcessRepairClient`]s for a fixed worker binary.
pub struct ProcessRepairFactory {
    program: PathBuf,
}

impl ProcessRepairFactory {
    pub fn new(program: PathBuf) -> Self {
        Self { program }
    }
}

impl RepairFactory for ProcessRepairFactory {
    fn build(&self, settings: &RepairSettings) -> DistroResult<Box<dyn RepairClient>> {
        Ok(Box::new(ProcessRepairClient::new(
            settings.clone(),
            self.program.clone(),
        )))
    }
}
