//! Behaviour of the fallback strategy for every combination of remote and
//! local dispositions.

use fallbuild::exec::{ExecutionHandle, Resolution};
use fallbuild::strategy::{
    FallbackPolicy, FallbackState, LocalFallbackStrategy, RemoteFailure,
};
use fallbuild::types::SuccessKind;

use fallbuild_test_utils::builders::{
    failed_outcome, faulted_handle, finished_handle, local_success_outcome, success_outcome,
};
use fallbuild_test_utils::fake_context::FakeStrategyContext;
use fallbuild_test_utils::{init_tracing, with_timeout};

const RULE_NAME: &str = "//topspin:rule";

#[tokio::test]
async fn remote_success_is_published_verbatim_and_local_never_runs() {
    init_tracing();

    let remote_outcome = success_outcome("//finished:successfully");
    let context = FakeStrategyContext::new(
        finished_handle(remote_outcome.clone()),
        // Programmed but never used; the counter is what matters.
        finished_handle(local_success_outcome("//never:used")),
    );

    let strategy = LocalFallbackStrategy::default();
    let result = strategy.build_rule(RULE_NAME, context.clone());

    let resolution = with_timeout(result.wait()).await;
    assert_eq!(resolution, Resolution::Finished(remote_outcome));
    assert_eq!(context.local_invocations(), 0);
    assert_eq!(result.state(), FallbackState::RemoteAccepted);
    assert!(result.remote_failure().is_none());
}

#[tokio::test]
async fn remote_execution_error_falls_back_to_local_success() {
    init_tracing();

    let local_outcome = local_success_outcome("//local/did:though");
    let context = FakeStrategyContext::new(
        faulted_handle("This did not go well..."),
        finished_handle(local_outcome.clone()),
    );

    let strategy = LocalFallbackStrategy::default();
    let result = strategy.build_rule(RULE_NAME, context.clone());

    let resolution = with_timeout(result.wait()).await;
    assert_eq!(resolution, Resolution::Finished(local_outcome));
    assert_eq!(context.local_invocations(), 1);
    assert_eq!(result.state(), FallbackState::LocalAccepted);

    match result.remote_failure() {
        Some(RemoteFailure::Faulted(error)) => {
            assert_eq!(error.message(), "This did not go well...");
        }
        other => panic!("expected recorded remote fault, got {other:?}"),
    }
}

#[tokio::test]
async fn remote_build_failure_falls_back_to_local_success() {
    init_tracing();

    let local_outcome = local_success_outcome("//hurrah:weeeee");
    let context = FakeStrategyContext::new(
        finished_handle(failed_outcome("//super:cool")),
        finished_handle(local_outcome.clone()),
    );

    let strategy = LocalFallbackStrategy::default();
    let result = strategy.build_rule(RULE_NAME, context.clone());

    let resolution = with_timeout(result.wait()).await;
    assert_eq!(resolution, Resolution::Finished(local_outcome));
    assert_eq!(context.local_invocations(), 1);

    // The remote build failure is absorbed, but stays observable for
    // diagnostics.
    match result.remote_failure() {
        Some(RemoteFailure::BuildFailed(outcome)) => {
            assert_eq!(outcome.rule(), "//super:cool");
            assert!(!outcome.is_success());
        }
        other => panic!("expected recorded remote build failure, got {other:?}"),
    }
}

#[tokio::test]
async fn local_build_failure_is_the_final_answer() {
    init_tracing();

    let local_outcome = failed_outcome("//will/fail:locally");
    let context = FakeStrategyContext::new(
        finished_handle(failed_outcome("//will/fail:remotely")),
        finished_handle(local_outcome.clone()),
    );

    let strategy = LocalFallbackStrategy::default();
    let result = strategy.build_rule(RULE_NAME, context.clone());

    // The local failure is published, not the remote one.
    let resolution = with_timeout(result.wait()).await;
    assert_eq!(resolution, Resolution::Finished(local_outcome));
    assert_eq!(context.local_invocations(), 1);
    assert_eq!(result.state(), FallbackState::LocalAccepted);
}

#[tokio::test]
async fn local_execution_error_is_propagated_with_its_own_cause() {
    init_tracing();

    let context = FakeStrategyContext::new(
        finished_handle(failed_outcome("//will/fail:remotely")),
        faulted_handle("local failed miserably."),
    );

    let strategy = LocalFallbackStrategy::default();
    let result = strategy.build_rule(RULE_NAME, context.clone());

    let resolution = with_timeout(result.wait()).await;
    assert!(result.is_done());
    match resolution {
        Resolution::Faulted(error) => {
            // The local error wins; the remote failure never masks it.
            assert_eq!(error.message(), "local failed miserably.");
        }
        other => panic!("expected execution error, got {other:?}"),
    }
    assert_eq!(result.state(), FallbackState::LocalRejected);
}

#[tokio::test]
async fn polling_a_terminal_result_returns_the_identical_resolution() {
    init_tracing();

    let remote_outcome = success_outcome("//finished:successfully");
    let context = FakeStrategyContext::without_local(finished_handle(remote_outcome.clone()));

    let strategy = LocalFallbackStrategy::default();
    let result = strategy.build_rule(RULE_NAME, context);

    let first = with_timeout(result.wait()).await;
    for _ in 0..3 {
        assert_eq!(with_timeout(result.wait()).await, first);
        assert_eq!(result.handle().poll_now(), Some(first.clone()));
    }

    // The blocking accessor agrees with the async one.
    let handle = result.handle();
    let blocking = tokio::task::spawn_blocking(move || handle.wait_blocking())
        .await
        .unwrap();
    assert_eq!(blocking, first);
}

#[tokio::test]
async fn remote_resolving_later_still_publishes_exactly_once() {
    init_tracing();

    let (remote_completer, remote) = ExecutionHandle::new_pair();
    let context = FakeStrategyContext::without_local(remote);

    let strategy = LocalFallbackStrategy::default();
    let result = strategy.build_rule(RULE_NAME, context.clone());
    assert!(!result.is_done());
    assert_eq!(result.state(), FallbackState::AwaitingRemote);

    let outcome = success_outcome(RULE_NAME);
    let late_outcome = outcome.clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        remote_completer.finish(late_outcome);
    });

    let resolution = with_timeout(result.wait()).await;
    assert_eq!(resolution, Resolution::Finished(outcome));
    assert_eq!(context.local_invocations(), 0);
}

#[tokio::test]
async fn disabled_fallback_publishes_the_remote_failure_verbatim() {
    init_tracing();

    let remote_outcome = failed_outcome("//remote:fail");
    let context = FakeStrategyContext::without_local(finished_handle(remote_outcome.clone()));

    let strategy = LocalFallbackStrategy::new(FallbackPolicy {
        local_fallback_enabled: false,
    });
    let result = strategy.build_rule(RULE_NAME, context.clone());

    let resolution = with_timeout(result.wait()).await;
    assert_eq!(resolution, Resolution::Finished(remote_outcome));
    assert_eq!(context.local_invocations(), 0);
}

#[tokio::test]
async fn disabled_fallback_propagates_the_remote_execution_error() {
    init_tracing();

    let context = FakeStrategyContext::without_local(faulted_handle("remote infra down"));

    let strategy = LocalFallbackStrategy::new(FallbackPolicy {
        local_fallback_enabled: false,
    });
    let result = strategy.build_rule(RULE_NAME, context.clone());

    match with_timeout(result.wait()).await {
        Resolution::Faulted(error) => assert_eq!(error.message(), "remote infra down"),
        other => panic!("expected execution error, got {other:?}"),
    }
    assert_eq!(context.local_invocations(), 0);
}

#[tokio::test]
async fn published_success_kind_reflects_the_winning_tier() {
    init_tracing();

    let context = FakeStrategyContext::new(
        finished_handle(failed_outcome("//remote:fail")),
        finished_handle(local_success_outcome(RULE_NAME)),
    );

    let strategy = LocalFallbackStrategy::default();
    let result = strategy.build_rule(RULE_NAME, context);

    match with_timeout(result.wait()).await {
        Resolution::Finished(outcome) => {
            assert_eq!(outcome.success_kind(), Some(SuccessKind::BuiltLocally));
        }
        other => panic!("expected finished outcome, got {other:?}"),
    }
}
