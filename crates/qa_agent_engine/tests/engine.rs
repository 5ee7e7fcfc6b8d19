use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use qa_agent_core::{FileRole, TestCase, UploadedFile};
use qa_agent_engine::{
    EngineConfig, EngineEvent, EngineHandle, GenerationError, ModelClient, ModelRequest,
};
use tempfile::TempDir;

const WAIT: Duration = Duration::from_secs(5);

/// Answers every request after `delay` with `reply`.
struct SlowClient {
    delay: Duration,
    reply: String,
}

#[async_trait]
impl ModelClient for SlowClient {
    async fn generate(&self, _request: &ModelRequest) -> Result<String, GenerationError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.reply.clone())
    }
}

fn engine(dir: &TempDir, delay: Duration, reply: &str) -> EngineHandle {
    let mut config = EngineConfig::default_with_export_dir(dir.path().to_path_buf());
    config.build_delay = Duration::from_millis(50);
    EngineHandle::with_client(
        config,
        Arc::new(SlowClient {
            delay,
            reply: reply.to_string(),
        }),
    )
}

fn files() -> Vec<UploadedFile> {
    vec![
        UploadedFile::new("specs.md", "SAVE15", FileRole::Document),
        UploadedFile::new("checkout.html", "<form></form>", FileRole::Html),
    ]
}

fn case() -> TestCase {
    TestCase {
        test_id: "TC-1".to_string(),
        feature: "Discount".to_string(),
        scenario: "Apply code".to_string(),
        expected_result: "Reduced".to_string(),
        grounded_in: "specs.md".to_string(),
    }
}

#[test]
fn knowledge_base_ready_after_delay() {
    let dir = TempDir::new().unwrap();
    let engine = engine(&dir, Duration::ZERO, "");
    let started = Instant::now();

    engine.build_knowledge_base();
    let event = engine.recv_timeout(WAIT).expect("ready event");

    assert!(matches!(event, EngineEvent::KnowledgeBaseReady));
    assert!(started.elapsed() >= Duration::from_millis(50));
}

#[test]
fn test_cases_come_back_with_their_token() {
    let dir = TempDir::new().unwrap();
    let engine = engine(
        &dir,
        Duration::ZERO,
        r#"[{"testId":"TC-1","feature":"Discount","scenario":"Apply code",
            "expectedResult":"Reduced","groundedIn":"specs.md"}]"#,
    );

    engine.generate_test_cases(7, "cover discounts", files());
    match engine.recv_timeout(WAIT).expect("event") {
        EngineEvent::TestCasesGenerated { token, result } => {
            assert_eq!(token, 7);
            assert_eq!(result, Ok(vec![case()]));
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn unparseable_test_cases_report_failure() {
    let dir = TempDir::new().unwrap();
    let engine = engine(&dir, Duration::ZERO, "not json");

    engine.generate_test_cases(1, "x", files());
    match engine.recv_timeout(WAIT).expect("event") {
        EngineEvent::TestCasesGenerated { token, result } => {
            assert_eq!(token, 1);
            assert!(matches!(result, Err(GenerationError::InvalidTestCases(_))));
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn cancelled_request_emits_nothing() {
    let dir = TempDir::new().unwrap();
    let engine = engine(&dir, Duration::from_millis(300), "print(1)");

    engine.generate_script(3, case(), files());
    engine.cancel(3);

    assert!(engine.recv_timeout(Duration::from_millis(800)).is_none());
}

#[test]
fn cancel_leaves_other_requests_running() {
    let dir = TempDir::new().unwrap();
    let engine = engine(&dir, Duration::from_millis(100), "```python\nprint(1)\n```");

    engine.generate_test_cases(1, "x", files());
    engine.cancel(1);
    engine.generate_script(2, case(), files());

    match engine.recv_timeout(WAIT).expect("script event") {
        EngineEvent::ScriptGenerated { token, result } => {
            assert_eq!(token, 2);
            assert_eq!(result, Ok("print(1)".to_string()));
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert!(engine.recv_timeout(Duration::from_millis(300)).is_none());
}

#[test]
fn cancelling_a_finished_request_is_harmless() {
    let dir = TempDir::new().unwrap();
    let engine = engine(&dir, Duration::ZERO, "print(1)");

    engine.generate_script(4, case(), files());
    let first = engine.recv_timeout(WAIT).expect("event");
    assert!(matches!(first, EngineEvent::ScriptGenerated { token: 4, .. }));

    engine.cancel(4);
    assert!(engine.try_recv().is_none());
}

#[test]
fn files_are_read_through_the_engine() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("checkout.html");
    std::fs::write(&path, "<html></html>").unwrap();
    let engine = engine(&dir, Duration::ZERO, "");

    engine.read_files(FileRole::Html, vec![path]);
    match engine.recv_timeout(WAIT).expect("event") {
        EngineEvent::FilesLoaded { role, result } => {
            assert_eq!(role, FileRole::Html);
            let files = result.expect("read ok");
            assert_eq!(files[0].name, "checkout.html");
            assert_eq!(files[0].content, "<html></html>");
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn export_writes_into_configured_directory() {
    let dir = TempDir::new().unwrap();
    let engine = engine(&dir, Duration::ZERO, "");

    engine.export_script("TC-1_selenium.py", "print('ok')");
    match engine.recv_timeout(WAIT).expect("event") {
        EngineEvent::ScriptExported { result } => {
            let path = result.expect("exported");
            assert_eq!(path, dir.path().join("TC-1_selenium.py"));
            assert_eq!(std::fs::read_to_string(path).unwrap(), "print('ok')");
        }
        other => panic!("unexpected event {other:?}"),
    }
}
