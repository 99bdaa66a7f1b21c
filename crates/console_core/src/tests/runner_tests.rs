use super::*;
use crate::transcript::{ActionState, TranscriptEvent};

use std::io;

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().expect("logs")).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("logs").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn runner(reentry: ReentryPolicy) -> ActionRunner {
    ActionRunner::new(
        TranscriptStore::new(),
        RunnerOptions {
            reentry,
            timeout: None,
        },
    )
}

#[tokio::test]
async fn successful_summary_becomes_the_transcript() {
    let runner = runner(ReentryPolicy::Reject);

    let outcome = runner
        .run("balance", |_| async { Ok("balance: 42".to_string()) })
        .await;

    assert_eq!(
        outcome,
        ActionOutcome::Succeeded {
            summary: "balance: 42".to_string()
        }
    );
    assert_eq!(runner.store().text(), "balance: 42");
    assert!(!runner.store().busy());
    assert_eq!(runner.store().state(), ActionState::Succeeded);
    assert!(!runner.is_running());
}

#[tokio::test]
async fn busy_flag_goes_true_then_false_for_subscribers() {
    let runner = runner(ReentryPolicy::Reject);
    let mut events = runner.store().subscribe();
    assert!(!runner.store().busy());

    runner
        .run("chain_id", |scope| async move {
            scope.append("top chainId: 137");
            Ok(String::new())
        })
        .await;

    let mut busy_transitions = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let Some(busy) = event.busy_after() {
            busy_transitions.push(busy);
        }
    }
    assert_eq!(busy_transitions, vec![true, false]);
}

#[tokio::test]
async fn empty_summary_is_not_appended() {
    let runner = runner(ReentryPolicy::Reject);
    let mut events = runner.store().subscribe();

    runner
        .run("is_opened", |scope| async move {
            scope.append("isOpened?: false");
            Ok(String::new())
        })
        .await;

    assert_eq!(runner.store().text(), "isOpened?: false");
    let appended: Vec<TranscriptEvent> = std::iter::from_fn(|| events.try_recv().ok())
        .filter(|event| matches!(event, TranscriptEvent::Appended(_)))
        .collect();
    assert_eq!(appended.len(), 1);
}

#[tokio::test]
async fn failure_shows_generic_notice_and_logs_the_cause() {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let runner = runner(ReentryPolicy::Reject);
    let outcome = runner
        .run("balance", |_| async { Err::<String, _>(anyhow!("network unreachable")) })
        .await;

    let err = match outcome {
        ActionOutcome::Failed(err) => err,
        other => panic!("expected failure, got {other:?}"),
    };
    assert_eq!(err.message, "network unreachable");
    assert!(!runner.store().busy());
    assert_eq!(runner.store().state(), ActionState::Failed);
    assert_eq!(runner.store().text(), FAILURE_NOTICE);
    assert!(!runner.store().text().contains("network unreachable"));
    assert!(logs.contents().contains("network unreachable"));
}

#[tokio::test]
async fn operation_error_keeps_context_chain_as_cause() {
    let runner = runner(ReentryPolicy::Reject);
    let outcome = runner
        .run("send_funds", |_| async {
            Err::<String, _>(anyhow!("connection reset").context("send failed"))
        })
        .await;

    assert_eq!(
        outcome,
        ActionOutcome::Failed(OperationError {
            message: "send failed".to_string(),
            cause: Some("connection reset".to_string()),
        })
    );
}

#[tokio::test]
async fn next_action_never_sees_previous_lines() {
    let runner = runner(ReentryPolicy::Reject);

    runner
        .run("first", |scope| async move {
            scope.append("first line");
            Ok("first summary".to_string())
        })
        .await;
    runner
        .run("second", |scope| async move {
            scope.append("second line");
            Ok("second summary".to_string())
        })
        .await;

    assert_eq!(runner.store().text(), "second line\n\nsecond summary");
}

#[tokio::test]
async fn failed_action_is_followed_by_clean_transcript() {
    let runner = runner(ReentryPolicy::Reject);

    runner
        .run("first", |_| async { Err::<String, _>(anyhow!("boom")) })
        .await;
    runner
        .run("second", |_| async { Ok("ok".to_string()) })
        .await;

    assert_eq!(runner.store().text(), "ok");
    assert_eq!(runner.store().state(), ActionState::Succeeded);
}

#[tokio::test]
async fn reject_policy_keeps_the_running_action_output() {
    let runner = runner(ReentryPolicy::Reject);
    let (release_tx, release_rx) = oneshot::channel::<()>();

    let first = runner.run("first", |scope| async move {
        scope.append("first: start");
        let _ = release_rx.await;
        Ok("first: done".to_string())
    });
    let second = async {
        tokio::task::yield_now().await;
        let outcome = runner
            .run("second", |scope| async move {
                scope.append("second: start");
                Ok("second: done".to_string())
            })
            .await;
        let _ = release_tx.send(());
        outcome
    };

    let (first, second) = tokio::join!(first, second);

    assert_eq!(
        second,
        ActionOutcome::Rejected {
            running: "first".to_string()
        }
    );
    assert!(matches!(first, ActionOutcome::Succeeded { .. }));
    assert_eq!(runner.store().text(), "first: start\n\nfirst: done");
}

#[tokio::test]
async fn supersede_policy_replaces_the_running_action() {
    let runner = runner(ReentryPolicy::Supersede);
    let (_hold_tx, hold_rx) = oneshot::channel::<()>();

    let first = runner.run("first", |scope| async move {
        scope.append("first: start");
        let _ = hold_rx.await;
        Ok("first: done".to_string())
    });
    let second = async {
        tokio::task::yield_now().await;
        runner
            .run("second", |scope| async move {
                scope.append("second: start");
                Ok("second: done".to_string())
            })
            .await
    };

    let (first, second) = tokio::join!(first, second);

    assert_eq!(first, ActionOutcome::Superseded);
    assert!(matches!(second, ActionOutcome::Succeeded { .. }));
    assert_eq!(runner.store().text(), "second: start\n\nsecond: done");
    assert!(!runner.is_running());
}

#[tokio::test]
async fn superseded_scope_cannot_write() {
    let runner = runner(ReentryPolicy::Supersede);
    let (scope_tx, scope_rx) = oneshot::channel::<ActionScope>();
    let (_hold_tx, hold_rx) = oneshot::channel::<()>();

    let first = runner.run("first", |scope| async move {
        let _ = scope_tx.send(scope.clone());
        let _ = hold_rx.await;
        Ok(String::new())
    });
    let second = async {
        let stale = scope_rx.await.expect("scope");
        runner
            .run("second", |_| async { Ok("second".to_string()) })
            .await;
        assert!(!stale.is_current());
        stale.append("late write from first");
    };

    tokio::join!(first, second);

    assert_eq!(runner.store().text(), "second");
}

#[tokio::test(start_paused = true)]
async fn timeout_converts_to_failure() {
    let runner = ActionRunner::new(
        TranscriptStore::new(),
        RunnerOptions {
            reentry: ReentryPolicy::Reject,
            timeout: Some(Duration::from_secs(1)),
        },
    );

    let outcome = runner
        .run("estimate_unwrap_gas", |_| async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok("never".to_string())
        })
        .await;

    let err = match outcome {
        ActionOutcome::Failed(err) => err,
        other => panic!("expected timeout failure, got {other:?}"),
    };
    assert!(err.message.contains("timed out"));
    assert_eq!(runner.store().text(), FAILURE_NOTICE);
    assert!(!runner.store().busy());
}

#[tokio::test]
async fn panicking_operation_is_contained() {
    let runner = runner(ReentryPolicy::Reject);

    let outcome = runner
        .run("explodes", |_| async {
            if true {
                panic!("boom");
            }
            Ok(String::new())
        })
        .await;

    assert!(matches!(outcome, ActionOutcome::Failed(_)));
    assert!(!runner.store().busy());
    assert!(!runner.is_running());
}

#[tokio::test]
async fn dropped_run_releases_the_active_slot() {
    let runner = runner(ReentryPolicy::Reject);

    {
        let pending = runner.run("stuck", |_| {
            futures::future::pending::<anyhow::Result<String>>()
        });
        futures::pin_mut!(pending);
        assert!(futures::poll!(pending.as_mut()).is_pending());
        assert!(runner.is_running());
    }

    assert!(!runner.is_running());
    assert_eq!(runner.store().state(), ActionState::Failed);
}

#[test]
fn reentry_policy_parses_case_insensitively() {
    assert_eq!("Reject".parse::<ReentryPolicy>(), Ok(ReentryPolicy::Reject));
    assert_eq!(
        " supersede ".parse::<ReentryPolicy>(),
        Ok(ReentryPolicy::Supersede)
    );
    assert!("queue".parse::<ReentryPolicy>().is_err());
}
