use super::capture_logs;
use crate::*;

#[test]
fn htmx_defaults_per_status() {
    assert_eq!(
        BeforeSwapDetail::for_status(200),
        BeforeSwapDetail {
            status: 200,
            should_swap: true,
            is_error: false
        }
    );
    assert!(!BeforeSwapDetail::for_status(204).should_swap);
    for status in [301, 304] {
        let redirect = BeforeSwapDetail::for_status(status);
        assert!(redirect.should_swap, "status {status}");
        assert!(!redirect.is_error, "status {status}");
    }
    assert!(!BeforeSwapDetail::for_status(101).should_swap);
    let unprocessable = BeforeSwapDetail::for_status(422);
    assert!(!unprocessable.should_swap);
    assert!(unprocessable.is_error);
}

#[test]
fn validation_and_conflict_responses_are_swapped() {
    let policy = SwapPolicy::default();
    for status in [409, 422] {
        let (detail, logs) = capture_logs(|| policy.resolve(status));
        assert!(detail.should_swap, "status {status}");
        assert!(!detail.is_error, "status {status}");
        assert!(logs.contains("forcing htmx swap"), "logs: {logs}");
    }
}

#[test]
fn other_statuses_are_left_alone() {
    let policy = SwapPolicy::default();
    let mut detail = BeforeSwapDetail::for_status(500);
    assert!(!policy.apply(&mut detail));
    assert_eq!(detail, BeforeSwapDetail::for_status(500));
    assert_eq!(policy.resolve(200), BeforeSwapDetail::for_status(200));
}

#[test]
fn apply_reports_whether_anything_changed() {
    let policy = SwapPolicy::default();
    let mut detail = BeforeSwapDetail::for_status(422);
    assert!(policy.apply(&mut detail));
    assert!(!policy.apply(&mut detail));
}

#[test]
fn custom_status_sets() {
    let policy = SwapPolicy::new([400]);
    assert_eq!(policy.statuses().collect::<Vec<_>>(), vec![400]);
    assert!(policy.resolve(400).should_swap);
    assert!(!policy.resolve(422).should_swap);
}
