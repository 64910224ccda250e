//! Domain-specific assertions for loglift harnesses.

use loglift::Event;

/// Assert the sink saw exactly `expected` paths, in order.
#[macro_export]
macro_rules! assert_paths_in_order {
    ($events:expr, $expected:expr) => {{
        let events: &[loglift::Event] = &$events;
        let actual: Vec<&str> = events.iter().map(|e| e.path.as_str()).collect();
        let expected: Vec<String> = $expected.into_iter().map(|p| p.to_string()).collect();
        let expected: Vec<&str> = expected.iter().map(|s| s.as_str()).collect();
        if actual != expected {
            panic!(
                "assert_paths_in_order! failed:\n  expected: {:?}\n  actual:   {:?}",
                expected, actual
            );
        }
    }};
}

/// Assert the fields every event built from [`REFERENCE_LINE`](super::REFERENCE_LINE) carries.
pub fn assert_reference_event(event: &Event) {
    assert_eq!(event.method, "GET");
    assert_eq!(event.path, "/foo");
    assert_eq!(event.scheme, "http");
    assert_eq!(event.status, "200");
    assert_eq!(event.bytes_sent, 612);
    assert_eq!(event.upstream_time, 0.001);
    assert_eq!(event.request_time, 0.002);
}
