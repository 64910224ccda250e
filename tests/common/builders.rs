//! Test builders — ergonomic constructors for access-log lines.
//!
//! These builders are designed for readability in test assertions, not for
//! production use.

/// Fluent builder for one access-log line. Defaults reproduce
/// [`REFERENCE_LINE`](super::REFERENCE_LINE).
///
/// # Example
///
/// ```rust
/// let line = AccessLineBuilder::new()
///     .method("POST")
///     .target("/api/v1/orders")
///     .status("201")
///     .build();
/// ```
pub struct AccessLineBuilder {
    client: String,
    time_local: String,
    scheme: String,
    method: String,
    target: String,
    protocol: String,
    status: String,
    bytes: String,
    user_agent: String,
    upstream_time: String,
    request_time: String,
}

impl Default for AccessLineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AccessLineBuilder {
    pub fn new() -> Self {
        Self {
            client: "127.0.0.1".to_string(),
            time_local: "10/Jan/2021:12:00:00 +0000".to_string(),
            scheme: "http".to_string(),
            method: "GET".to_string(),
            target: "/foo?query=t".to_string(),
            protocol: "HTTP/1.0".to_string(),
            status: "200".to_string(),
            bytes: "612".to_string(),
            user_agent: "UA".to_string(),
            upstream_time: "0.001".to_string(),
            request_time: "0.002".to_string(),
        }
    }

    pub fn client(mut self, client: impl Into<String>) -> Self {
        self.client = client.into();
        self
    }

    pub fn time_local(mut self, time_local: impl Into<String>) -> Self {
        self.time_local = time_local.into();
        self
    }

    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn bytes(mut self, bytes: impl Into<String>) -> Self {
        self.bytes = bytes.into();
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn upstream_time(mut self, t: impl Into<String>) -> Self {
        self.upstream_time = t.into();
        self
    }

    pub fn request_time(mut self, t: impl Into<String>) -> Self {
        self.request_time = t.into();
        self
    }

    pub fn build(self) -> String {
        format!(
            r#"{} - - [{}] {} "{} {} {}" {} {} "-" "{}" "-" {} {} -"#,
            self.client,
            self.time_local,
            self.scheme,
            self.method,
            self.target,
            self.protocol,
            self.status,
            self.bytes,
            self.user_agent,
            self.upstream_time,
            self.request_time,
        )
    }
}
