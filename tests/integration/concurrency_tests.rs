//! Concurrent submissions: unique workspaces, bounded parallelism, full cleanup

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use proctor_common::Submission;
use proctor_sandbox::{
    ExecutionStage, ExecutionStrategy, Language, LanguageRegistry, SandboxService,
    StrategyContext, StrategyOutcome,
};

use crate::common::{remaining_workspaces, setup_test_logging, test_config};

/// Records the workspace paths that are in use at the same time.
#[derive(Default)]
struct InFlight {
    paths: Mutex<HashSet<PathBuf>>,
    duplicates: AtomicUsize,
    running: AtomicUsize,
    peak: AtomicUsize,
}

struct RecordingStrategy {
    in_flight: Arc<InFlight>,
}

#[async_trait]
impl ExecutionStrategy for RecordingStrategy {
    fn language(&self) -> Language {
        Language::Css
    }

    async fn execute(&self, mut ctx: StrategyContext<'_>) -> StrategyOutcome {
        ctx.enter(ExecutionStage::Executing);
        let path = ctx.workspace.path().to_path_buf();
        assert!(path.is_dir());

        if !self.in_flight.paths.lock().unwrap().insert(path.clone()) {
            self.in_flight.duplicates.fetch_add(1, Ordering::SeqCst);
        }
        let running = self.in_flight.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.in_flight.peak.fetch_max(running, Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(30)).await;

        self.in_flight.running.fetch_sub(1, Ordering::SeqCst);
        self.in_flight.paths.lock().unwrap().remove(&path);
        StrategyOutcome::succeeded(path.display().to_string())
    }
}

#[tokio::test]
async fn test_concurrent_submissions_get_unique_workspaces() {
    setup_test_logging();
    let root = tempfile::tempdir().unwrap();
    let mut config = test_config(root.path());
    config.max_concurrent_executions = 3;

    let in_flight = Arc::new(InFlight::default());
    let mut registry = LanguageRegistry::new(&config.toolchains, &config.heuristics);
    registry.register(Arc::new(RecordingStrategy {
        in_flight: in_flight.clone(),
    }));
    let service = SandboxService::new(&config).with_registry(registry);

    let submissions = (0..12).map(|i| {
        let service = &service;
        async move {
            service
                .execute(Submission::new("css", format!("/* {} */", i)))
                .await
                .unwrap()
        }
    });
    let results = join_all(submissions).await;

    assert!(results.iter().all(|r| r.success));
    let outputs: HashSet<_> = results.iter().filter_map(|r| r.output.clone()).collect();
    assert_eq!(outputs.len(), 12);

    assert_eq!(in_flight.duplicates.load(Ordering::SeqCst), 0);
    let peak = in_flight.peak.load(Ordering::SeqCst);
    assert!(peak >= 2, "submissions never overlapped");
    assert!(peak <= 3, "semaphore exceeded: {}", peak);

    assert_eq!(service.workspaces().created_count(), 12);
    assert_eq!(remaining_workspaces(root.path()), 0);
}

#[tokio::test]
async fn test_concurrent_heuristic_runs_clean_up() {
    let root = tempfile::tempdir().unwrap();
    let mut config = test_config(root.path());
    config.heuristics.delay_max = Duration::from_millis(20);
    let service = SandboxService::new(&config);

    let codes = [
        ("html", "<p>x</p>"),
        ("css", "a { color: red; }"),
        ("scss", "$x: 1px; a { margin: $x; }"),
        ("vue", "<template><div/></template>"),
        ("svelte", "<script>let n = 0;</script><button on:click={() => n++}>{n}</button>"),
        ("jsx", "export const App = () => <div className=\"app\" />;"),
    ];
    let runs = codes
        .iter()
        .cycle()
        .take(24)
        .map(|(language, code)| service.execute(Submission::new(*language, *code)));
    let results = join_all(runs).await;

    assert_eq!(results.len(), 24);
    assert!(results.iter().all(|r| r.is_ok()));
    assert_eq!(remaining_workspaces(root.path()), 0);
}
