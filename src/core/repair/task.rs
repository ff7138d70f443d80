// ─── Repair Task ───
// Wrapper around the external file-repair client that injects the
// user-configured ignore patterns into the worker environment.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Child;
use tracing::info;

use crate::core::config::ConfigProvider;
use crate::core::error::{DistroError, DistroResult};
use crate::core::patterns::matches_pattern;

/// Environment key carrying the JSON-encoded ignore patterns to the
/// repair worker.
pub const IGNORED_PATTERNS_ENV: &str = "IGNORED_VALIDATION_PATTERNS";

/// Progress callback for verify/download, as a fraction in `0.0..=100.0`.
pub type ProgressFn<'a> = &'a (dyn Fn(f64) + Send + Sync);

/// Construction parameters for a repair client.
#[derive(Debug, Clone)]
pub struct RepairSettings {
    pub common_dir: PathBuf,
    pub instance_dir: PathBuf,
    pub launcher_dir: PathBuf,
    pub server_id: String,
    pub dev_mode: bool,
}

/// Seam to the external file-repair client.
#[async_trait]
pub trait RepairClient: Send {
    /// Spawn the worker process with the given environment overrides.
    fn spawn_receiver(&mut self, env: HashMap<String, String>) -> DistroResult<()>;

    /// Terminate the worker process.
    fn destroy_receiver(&mut self);

    /// Handle to the spawned worker process, when the client is
    /// process-backed. `None` before spawn or for in-process clients.
    fn child_process(&self) -> Option<&Child>;

    /// Validate local files, returning the number of invalid ones.
    async fn verify_files(&mut self, on_progress: ProgressFn<'_>) -> DistroResult<usize>;

    /// Download/repair the invalid files found by `verify_files`.
    async fn download(&mut self, on_progress: ProgressFn<'_>) -> DistroResult<()>;
}

/// Builds repair clients. Injection point for tests.
pub trait RepairFactory: Send + Sync {
    fn build(&self, settings: &RepairSettings) -> DistroResult<Box<dyn RepairClient>>;
}

/// Repair facade: defers worker construction to [`RepairTask::spawn_receiver`]
/// and guarantees teardown when the task is dropped.
pub struct RepairTask<C: ConfigProvider, F: RepairFactory> {
    config: C,
    factory: F,
    settings: RepairSettings,
    receiver: Option<Box<dyn RepairClient>>,
}

impl<C: ConfigProvider, F: RepairFactory> RepairTask<C, F> {
    pub fn new(config: C, factory: F, server_id: impl Into<String>, dev_mode: bool) -> Self {
        let settings = RepairSettings {
            common_dir: config.common_directory(),
            instance_dir: config.instance_directory(),
            launcher_dir: config.launcher_directory(),
            server_id: server_id.into(),
            dev_mode,
        };
        Self {
            config,
            factory,
            settings,
            receiver: None,
        }
    }

    /// Spawn the repair worker, passing the configured ignore patterns
    /// through the environment when any are set.
    pub fn spawn_receiver(&mut self) -> DistroResult<()> {
        let patterns = self.config.ignored_validation_files();

        let mut env = HashMap::new();
        if !patterns.is_empty() {
            env.insert(
                IGNORED_PATTERNS_ENV.to_string(),
                serde_json::to_string(&patterns)?,
            );
            info!(
                "Passing {} ignore pattern(s) to validation process",
                patterns.len()
            );
        }

        let mut receiver = self.factory.build(&self.settings)?;
        receiver.spawn_receiver(env)?;
        self.receiver = Some(receiver);
        Ok(())
    }

    /// Terminate the worker. No-op when it was never spawned.
    pub fn destroy_receiver(&mut self) {
        if let Some(receiver) = self.receiver.as_mut() {
            receiver.destroy_receiver();
        }
        self.receiver = None;
    }

    pub fn is_spawned(&self) -> bool {
        self.receiver.is_some()
    }

    /// Handle to the spawned worker process, if the underlying client
    /// exposes one.
    pub fn child_process(&self) -> Option<&Child> {
        self.receiver.as_ref().and_then(|r| r.child_process())
    }

    pub async fn verify_files(&mut self, on_progress: ProgressFn<'_>) -> DistroResult<usize> {
        self.receiver
            .as_mut()
            .ok_or(DistroError::NotInitialized)?
            .verify_files(on_progress)
            .await
    }

    pub async fn download(&mut self, on_progress: ProgressFn<'_>) -> DistroResult<()> {
        self.receiver
            .as_mut()
            .ok_or(DistroError::NotInitialized)?
            .download(on_progress)
            .await
    }

    /// Whether a path is excluded from validation by the configured
    /// ignore patterns. Independent of any spawned worker.
    pub fn should_ignore_file(config: &dyn ConfigProvider, file_path: &str) -> bool {
        matches_pattern(file_path, &config.ignored_validation_files())
    }
}

impl<C: ConfigProvider, F: RepairFactory> Drop for RepairTask<C, F> {
    fn drop(&mut self) {
        self.destroy_receiver();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct FakeConfig {
        ignored: Vec<String>,
    }

    impl ConfigProvider for FakeConfig {
        fn launcher_directory(&self) -> PathBuf {
            PathBuf::from("/tmp/launcher")
        }
        fn common_directory(&self) -> PathBuf {
            PathBuf::from("/tmp/launcher/common")
        }
        fn instance_directory(&self) -> PathBuf {
            PathBuf::from("/tmp/launcher/instances")
        }
        fn distribution_branch(&self) -> String {
            "main".to_string()
        }
        fn ignored_validation_files(&self) -> Vec<String> {
            self.ignored.clone()
        }
    }

    #[derive(Default)]
    struct Recorded {
        spawn_env: Option<HashMap<String, String>>,
        destroyed: usize,
    }

    struct FakeRepairClient {
        recorded: Arc<Mutex<Recorded>>,
    }

    #[async_trait]
    impl RepairClient for FakeRepairClient {
        fn spawn_receiver(&mut self, env: HashMap<String, String>) -> DistroResult<()> {
            self.recorded.lock().unwrap().spawn_env = Some(env);
            Ok(())
        }

        fn destroy_receiver(&mut self) {
            self.recorded.lock().unwrap().destroyed += 1;
        }

        fn child_process(&self) -> Option<&Child> {
            None
        }

        async fn verify_files(&mut self, on_progress: ProgressFn<'_>) -> DistroResult<usize> {
            on_progress(100.0);
            Ok(3)
        }

        async fn download(&mut self, on_progress: ProgressFn<'_>) -> DistroResult<()> {
            on_progress(100.0);
            Ok(())
        }
    }

    struct FakeFactory {
        recorded: Arc<Mutex<Recorded>>,
        builds: AtomicUsize,
    }

    impl RepairFactory for FakeFactory {
        fn build(&self, _settings: &RepairSettings) -> DistroResult<Box<dyn RepairClient>> {
            self.builds.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(FakeRepairClient {
                recorded: self.recorded.clone(),
            }))
        }
    }

    fn task(
        ignored: &[&str],
    ) -> (RepairTask<FakeConfig, FakeFactory>, Arc<Mutex<Recorded>>) {
        let recorded = Arc::new(Mutex::new(Recorded::default()));
        let config = FakeConfig {
            ignored: ignored.iter().map(|p| p.to_string()).collect(),
        };
        let factory = FakeFactory {
            recorded: recorded.clone(),
            builds: AtomicUsize::new(0),
        };
        (RepairTask::new(config, factory, "main-server", false), recorded)
    }

    #[tokio::test]
    async fn operations_before_spawn_are_rejected() {
        let (mut task, _) = task(&[]);
        let progress = |_: f64| {};
        assert!(matches!(
            task.verify_files(&progress).await,
            Err(DistroError::NotInitialized)
        ));
        assert!(matches!(
            task.download(&progress).await,
            Err(DistroError::NotInitialized)
        ));
    }

    #[tokio::test]
    async fn spawn_serializes_patterns_into_environment() {
        let (mut task, recorded) = task(&["mods/*.jar", "options.txt"]);
        task.spawn_receiver().unwrap();

        let env = recorded.lock().unwrap().spawn_env.clone().unwrap();
        let raw = env.get(IGNORED_PATTERNS_ENV).unwrap();
        let decoded: Vec<String> = serde_json::from_str(raw).unwrap();
        assert_eq!(decoded, ["mods/*.jar", "options.txt"]);

        let invalid = task.verify_files(&|_| {}).await.unwrap();
        assert_eq!(invalid, 3);
    }

    #[test]
    fn spawn_without_patterns_leaves_environment_empty() {
        let (mut task, recorded) = task(&[]);
        task.spawn_receiver().unwrap();

        let env = recorded.lock().unwrap().spawn_env.clone().unwrap();
        assert!(env.is_empty());
    }

    #[test]
    fn destroy_is_a_noop_before_spawn() {
        let (mut task, recorded) = task(&[]);
        task.destroy_receiver();
        assert_eq!(recorded.lock().unwrap().destroyed, 0);
        assert!(!task.is_spawned());
    }

    #[test]
    fn destroy_delegates_after_spawn() {
        let (mut task, recorded) = task(&[]);
        task.spawn_receiver().unwrap();
        assert!(task.is_spawned());

        task.destroy_receiver();
        assert_eq!(recorded.lock().unwrap().destroyed, 1);
        assert!(!task.is_spawned());
    }

    #[test]
    fn dropping_the_task_destroys_the_receiver() {
        let (mut task, recorded) = task(&[]);
        task.spawn_receiver().unwrap();
        drop(task);
        assert_eq!(recorded.lock().unwrap().destroyed, 1);
    }

    #[test]
    fn child_handle_is_absent_before_spawn_and_delegated_after() {
        let (mut task, _) = task(&[]);
        assert!(task.child_process().is_none());

        // The fake client is in-process, so the handle stays `None` even
        // once spawned; the call still goes through the receiver.
        task.spawn_receiver().unwrap();
        assert!(task.child_process().is_none());
    }

    #[test]
    fn should_ignore_file_consults_config_patterns() {
        let config = FakeConfig {
            ignored: vec!["*.log".to_string()],
        };
        assert!(RepairTask::<FakeConfig, FakeFactory>::should_ignore_file(
            &config,
            "logs/latest.log"
        ));
        assert!(!RepairTask::<FakeConfig, FakeFactory>::should_ignore_file(
            &config,
            "mods/jei.jar"
        ));
    }

    #[test]
    fn settings_are_captured_from_config() {
        let (task, _) = task(&[]);
        assert_eq!(task.settings.server_id, "main-server");
        assert_eq!(
            task.settings.common_dir,
            PathBuf::from("/tmp/launcher/common")
        );
        assert_eq!(
            task.settings.instance_dir,
            PathBuf::from("/tmp/launcher/instances")
        );
    }
}
