//! Static access-log corpora used across harnesses.

/// The reference line from the format documentation.
pub const REFERENCE_LINE: &str = r#"127.0.0.1 - - [10/Jan/2021:12:00:00 +0000] http "GET /foo?query=t HTTP/1.0" 200 612 "-" "UA" "-" 0.001 0.002 -"#;

/// Lines that fully match the grammar.
pub const CORPUS_VALID: &[&str] = &[
    REFERENCE_LINE,
    r#"10.0.0.7 - alice [10/Jan/2021:12:00:01 +0000] https "POST /api/v1/orders HTTP/1.1" 201 48 "https://shop.example/cart" "Mozilla/5.0 (X11; Linux x86_64)" "203.0.113.9" 0.120 0.131 -"#,
    r#"192.168.1.20 - - [10/Jan/2021:12:00:02 +0000] http "GET /static/app.js?v=3#main HTTP/1.1" 304 0 "-" "curl/7.68.0" "-" - 0.000 -"#,
    r#"2001:db8::5 - - [10/Jan/2021:12:00:03 +0000] https "DELETE /api/v1/sessions/99 HTTP/2.0" 204 - "-" "okhttp/4.9" "-" 0.004 0.005 1"#,
    r#"172.16.0.3 - - [10/Jan/2021:12:00:04 +0000] http "GET http://origin.internal/health HTTP/1.1" 200 2 "-" "kube-probe/1.20" "-" 0.001 0.001 -"#,
];

/// Lines the parser must drop, with the reason.
pub const CORPUS_DROPPED: &[(&str, &str)] = &[
    ("ten tokens", "127.0.0.1 - - [10/Jan/2021:12:00:00 +0000] http GET / 200 612"),
    ("empty", ""),
    ("free text", "upstream timed out (110: Connection timed out) while reading response header"),
    ("two-token request", r#"127.0.0.1 - - [10/Jan/2021:12:00:00 +0000] http "GET /foo" 200 612 "-" "UA" "-" 0.001 0.002 -"#),
    ("four-token request", r#"127.0.0.1 - - [10/Jan/2021:12:00:00 +0000] http "GET /foo HTTP/1.0 x" 200 612 "-" "UA" "-" 0.001 0.002 -"#),
    ("bad target", r#"127.0.0.1 - - [10/Jan/2021:12:00:00 +0000] http "GET http://[::1/x HTTP/1.0" 200 612 "-" "UA" "-" 0.001 0.002 -"#),
    ("double-space request", r#"127.0.0.1 - - [10/Jan/2021:12:00:00 +0000] http "GET  /foo HTTP/1.0" 200 612 "-" "UA" "-" 0.001 0.002 -"#),
    ("bad escape", r#"127.0.0.1 - - [10/Jan/2021:12:00:00 +0000] http "GET /foo%zz HTTP/1.0" 200 612 "-" "UA" "-" 0.001 0.002 -"#),
];

/// Lines that parse, but only by degrading a field under the lenient policy.
pub const CORPUS_DEGRADED: &[&str] = &[
    r#"127.0.0.1 - - [31/Foo/2021:12:00:00 +0000] http "GET /foo HTTP/1.0" 200 612 "-" "UA" "-" 0.001 0.002 -"#,
    r#"127.0.0.1 - - [10/Jan/2021:12:00:00 +0000] http "GET /foo HTTP/1.0" 200 612 "-" "UA" "-" 1..2 0.002 -"#,
    r#"127.0.0.1 - - [10/Jan/2021:12:00:00 +0800] http "GET /foo HTTP/1.0" 200 612 "-" "UA" "-" 0.001 0.002 -"#,
];

/// `n` well-formed lines whose path encodes their sequence number
/// (`/seq/0`, `/seq/1`, ...), so ordering can be checked on the sink side.
pub fn numbered_lines(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            crate::common::AccessLineBuilder::new()
                .target(format!("/seq/{i}?page={i}"))
                .bytes(i.to_string())
                .build()
        })
        .collect()
}
