use serde::Serialize;
use serde_json::Value;
use tracing::Level;

use crate::logger::SharedSink;
use crate::problem::StructuredError;
use crate::request::Request;

use super::Stage;

/// Snapshot of a request attached to the synthetic rate-limit event.
#[derive(Clone, Debug, Serialize)]
pub struct RequestContext {
    pub method: String,
    pub url: String,
    pub body: Value,
    pub client_ip: Option<String>,
    #[serde(rename = "type")]
    pub tag: String,
}

impl RequestContext {
    pub fn capture(req: &Request, tag: &str) -> Self {
        Self {
            method: req.method().to_string(),
            url: req.url().to_owned(),
            body: req.json_body().unwrap_or(Value::Null),
            client_ip: req.client_ip(),
            tag: tag.to_owned(),
        }
    }
}

/// Logs one `TooManyRequestsError` for every request it sees, then lets the
/// request through. There is no counter behind it: the alarm is always on.
pub struct RateLimitAlarm {
    tag: String,
    sink: SharedSink,
}

impl RateLimitAlarm {
    pub fn new(tag: impl Into<String>, sink: SharedSink) -> Self {
        Self { tag: tag.into(), sink }
    }
}

impl Stage for RateLimitAlarm {
    fn run(&self, req: &mut Request) -> Result<(), StructuredError> {
        let context = RequestContext::capture(req, &self.tag);
        let event = StructuredError::too_many_requests()
            .with_context(serde_json::to_value(context).unwrap_or(Value::Null));
        self.sink.log(Level::ERROR, &event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use crate::logger::MemorySink;

    use super::*;

    #[test]
    fn logs_context_and_passes() {
        let sink = MemorySink::new();
        let alarm = RateLimitAlarm::new("sessions", sink.clone());

        let http = http::Request::post("/v1/sessions?next=/")
            .body(Bytes::from_static(br#"{"email":"a@b.c","password":"hunter22"}"#))
            .unwrap();
        let mut req = Request::from_http(http, Some("[::1]:9000".parse().unwrap()));

        assert!(alarm.run(&mut req).is_ok());

        let entries = sink.named("TooManyRequestsError");
        assert_eq!(entries.len(), 1);
        let ctx = &entries[0].event["context"];
        assert_eq!(ctx["type"], "sessions");
        assert_eq!(ctx["method"], "POST");
        assert_eq!(ctx["url"], "/v1/sessions?next=/");
        assert_eq!(ctx["client_ip"], "127.0.0.1");
        assert_eq!(ctx["body"]["password"], "[Redacted]");
        assert_eq!(entries[0].event["status_code"], 429);
    }
}
