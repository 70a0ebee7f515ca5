use mc_manager::config::{HttpConfig, ManagerConfig, ServerConfig};
use mc_manager::error::Error;
use mc_manager::logs::{LogLevel, LogLine, LogStore};
use mc_manager::server::{ServerState, Supervisor};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Shell script that behaves like a game server: echoes a ready line,
/// then exits cleanly when `stop` arrives on stdin.
const WELL_BEHAVED: &str = r#"echo "[12:00:01] [Server thread/INFO]: Done (3.2s)!"
while read line; do
    if [ "$line" = "stop" ]; then exit 0; fi
done"#;

/// Shell script that ignores stdin entirely, forcing the kill path.
const STUBBORN: &str = "sleep 30";

fn test_supervisor(dir: &Path, script: &str) -> Supervisor {
    let config = ManagerConfig {
        server: ServerConfig {
            command: "/bin/sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
            env: HashMap::new(),
        },
        server_dir: dir.to_path_buf(),
        grace_period_secs: 5,
        kill_timeout_secs: 5,
        log_capacity: 500,
        // A pattern no real process matches, so kill-all sweeps find nothing
        // outside the test.
        process_pattern: "mc-manager-test-no-such-process".to_string(),
        http: HttpConfig::default(),
    };
    Supervisor::new(config, Arc::new(LogStore::new(500)))
}

/// Poll the log store until a line matches, or time out.
async fn wait_for_line(
    supervisor: &Supervisor,
    predicate: impl Fn(&LogLine) -> bool,
) -> Option<LogLine> {
    for _ in 0..100 {
        let (lines, _) = supervisor.logs().read_tail(500);
        if let Some(line) = lines.into_iter().find(|l| predicate(l)) {
            return Some(line);
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    None
}

#[tokio::test]
async fn test_start_and_graceful_stop() {
    let dir = tempfile::tempdir().unwrap();
    let supervisor = test_supervisor(dir.path(), WELL_BEHAVED);

    let pid = supervisor.start().await.unwrap();
    assert!(pid > 0);
    assert_eq!(supervisor.state(), ServerState::Running);
    assert_eq!(supervisor.pid(), Some(pid));

    supervisor.stop(None).await.unwrap();
    assert_eq!(supervisor.state(), ServerState::Stopped);
    assert_eq!(supervisor.pid(), None);

    let (lines, _) = supervisor.logs().read_tail(500);
    assert!(
        lines
            .iter()
            .any(|l| l.level == LogLevel::Success && l.text == "Server stopped")
    );
}

#[tokio::test]
async fn test_double_start_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let supervisor = test_supervisor(dir.path(), WELL_BEHAVED);

    supervisor.start().await.unwrap();
    assert!(matches!(
        supervisor.start().await,
        Err(Error::AlreadyRunning)
    ));
    assert_eq!(supervisor.state(), ServerState::Running);

    supervisor.stop(None).await.unwrap();
}

#[tokio::test]
async fn test_stop_when_stopped_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let supervisor = test_supervisor(dir.path(), WELL_BEHAVED);

    assert!(matches!(supervisor.stop(None).await, Err(Error::NotRunning)));
    assert!(matches!(
        supervisor.send_command("help").await,
        Err(Error::NotRunning)
    ));
}

#[tokio::test]
async fn test_grace_expiry_escalates_to_force_kill() {
    let dir = tempfile::tempdir().unwrap();
    let supervisor = test_supervisor(dir.path(), STUBBORN);

    supervisor.start().await.unwrap();
    supervisor
        .stop(Some(Duration::from_millis(200)))
        .await
        .unwrap();
    assert_eq!(supervisor.state(), ServerState::Stopped);

    let (lines, _) = supervisor.logs().read_tail(500);
    assert!(
        lines
            .iter()
            .any(|l| l.level == LogLevel::Warn && l.text.contains("force killed"))
    );
}

#[tokio::test]
async fn test_restart_yields_new_process() {
    let dir = tempfile::tempdir().unwrap();
    let supervisor = test_supervisor(dir.path(), WELL_BEHAVED);

    let first = supervisor.start().await.unwrap();
    let second = supervisor.restart(None).await.unwrap();
    assert_ne!(first, second);
    assert_eq!(supervisor.state(), ServerState::Running);

    supervisor.stop(None).await.unwrap();
}

#[tokio::test]
async fn test_restart_from_stopped_just_starts() {
    let dir = tempfile::tempdir().unwrap();
    let supervisor = test_supervisor(dir.path(), WELL_BEHAVED);

    supervisor.restart(None).await.unwrap();
    assert_eq!(supervisor.state(), ServerState::Running);
    supervisor.stop(None).await.unwrap();
}

#[tokio::test]
async fn test_command_is_echoed_and_delivered() {
    let dir = tempfile::tempdir().unwrap();
    // Echo every stdin line back to stdout so delivery is observable.
    let supervisor = test_supervisor(dir.path(), r#"while read line; do echo "$line"; done"#);

    supervisor.start().await.unwrap();
    supervisor.send_command("say hello").await.unwrap();

    let echo = wait_for_line(&supervisor, |l| {
        l.level == LogLevel::Command && l.text == "say hello"
    })
    .await;
    assert!(echo.is_some(), "command echo missing from log stream");

    let delivered = wait_for_line(&supervisor, |l| {
        l.level == LogLevel::Info && l.text == "say hello"
    })
    .await;
    assert!(delivered.is_some(), "command output missing from log stream");

    // This child echoes "stop" instead of exiting, so use a short grace.
    supervisor
        .stop(Some(Duration::from_millis(200)))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_output_is_restamped_and_classified() {
    let dir = tempfile::tempdir().unwrap();
    let supervisor = test_supervisor(dir.path(), WELL_BEHAVED);

    supervisor.start().await.unwrap();

    let ready = wait_for_line(&supervisor, |l| l.text.contains("Done (3.2s)!"))
        .await
        .expect("ready line missing from log stream");
    assert_eq!(ready.level, LogLevel::Success);
    assert!(!ready.text.contains("[12:00:01]"));

    supervisor.stop(None).await.unwrap();
}

#[tokio::test]
async fn test_crashed_process_reconciles_to_stopped() {
    let dir = tempfile::tempdir().unwrap();
    let supervisor = test_supervisor(dir.path(), "echo goodbye");

    supervisor.start().await.unwrap();
    wait_for_line(&supervisor, |l| l.text == "goodbye")
        .await
        .expect("output missing from log stream");
    tokio::time::sleep(Duration::from_millis(100)).await;

    // The process is gone, so stop finds nothing to do once reconciled.
    assert!(matches!(supervisor.stop(None).await, Err(Error::NotRunning)));
    assert_eq!(supervisor.state(), ServerState::Stopped);

    let (lines, _) = supervisor.logs().read_tail(500);
    assert!(lines.iter().any(|l| l.text.contains("exited unexpectedly")));
}

#[tokio::test]
async fn test_kill_all_with_unmatched_pattern_finds_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let supervisor = test_supervisor(dir.path(), WELL_BEHAVED);

    let killed = supervisor.kill_all().await;
    assert_eq!(killed, 0);
    assert_eq!(supervisor.state(), ServerState::Stopped);
}

#[tokio::test]
async fn test_kill_all_while_running_stops_server() {
    let dir = tempfile::tempdir().unwrap();
    let supervisor = test_supervisor(dir.path(), STUBBORN);

    supervisor.start().await.unwrap();
    // The test pattern matches nothing, so only the tracked pid goes down.
    let killed = supervisor.kill_all().await;
    assert_eq!(killed, 1);
    assert_eq!(supervisor.state(), ServerState::Stopped);

    let report = supervisor.status().await;
    assert_eq!(report.state, ServerState::Stopped);
    assert!(!report.snapshot.running);
}

#[tokio::test]
async fn test_start_after_kill_all_does_not_leak_old_process() {
    let dir = tempfile::tempdir().unwrap();
    let supervisor = test_supervisor(dir.path(), STUBBORN);

    let first = supervisor.start().await.unwrap();
    supervisor.kill_all().await;
    assert_eq!(supervisor.state(), ServerState::Stopped);

    let second = supervisor.start().await.unwrap();
    assert_ne!(first, second);
    assert_eq!(supervisor.state(), ServerState::Running);
    // The first child was reaped, not left running untracked.
    assert!(!std::path::Path::new(&format!("/proc/{}", first)).exists());

    supervisor
        .stop(Some(Duration::from_millis(200)))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_command_racing_stop_does_not_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let supervisor = Arc::new(test_supervisor(dir.path(), WELL_BEHAVED));
    supervisor.start().await.unwrap();

    let stopper = {
        let supervisor = Arc::clone(&supervisor);
        tokio::spawn(async move { supervisor.stop(None).await })
    };
    let commander = {
        let supervisor = Arc::clone(&supervisor);
        tokio::spawn(async move { supervisor.send_command("list").await })
    };

    let stop_result = stopper.await.unwrap();
    let command_result = commander.await.unwrap();

    // The exclusion lock serializes them: either the command got in first
    // and the stop followed, or the stop won and the command was refused.
    assert!(stop_result.is_ok());
    match command_result {
        Ok(()) | Err(Error::NotRunning) => {}
        Err(e) => panic!("unexpected command outcome: {}", e),
    }
    assert_eq!(supervisor.state(), ServerState::Stopped);
}

#[tokio::test]
async fn test_status_reports_running_metrics() {
    let dir = tempfile::tempdir().unwrap();
    let supervisor = test_supervisor(dir.path(), STUBBORN);

    let report = supervisor.status().await;
    assert_eq!(report.state, ServerState::Stopped);
    assert!(!report.snapshot.running);

    supervisor.start().await.unwrap();
    let report = supervisor.status().await;
    assert_eq!(report.state, ServerState::Running);
    assert!(report.snapshot.running);
    assert_eq!(report.snapshot.pid, supervisor.pid());

    supervisor
        .stop(Some(Duration::from_millis(200)))
        .await
        .unwrap();
}
