//! Incoming HTTP request type.

use std::collections::HashMap;
use std::net::SocketAddr;

use bytes::Bytes;
use http::{HeaderMap, Method, Uri};
use serde_json::{Map, Value};

/// Per-request metadata attached by
/// [`InjectMetadata`](crate::middleware::InjectMetadata).
#[derive(Clone, Debug)]
pub struct RequestMetadata {
    pub client_ip: Option<String>,
}

/// An incoming HTTP request with its body fully buffered.
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    params: HashMap<String, String>,
    remote_addr: Option<SocketAddr>,
    metadata: Option<RequestMetadata>,
}

impl Request {
    /// Wraps an already-buffered `http` request.
    ///
    /// The server calls this after collecting the hyper body; tests call it
    /// with a request built by `http::Request::builder()`.
    pub fn from_http(req: http::Request<Bytes>, remote_addr: Option<SocketAddr>) -> Self {
        let (parts, body) = req.into_parts();
        Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
            params: HashMap::new(),
            remote_addr,
            metadata: None,
        }
    }

    pub(crate) fn set_params(&mut self, params: HashMap<String, String>) {
        self.params = params;
    }

    pub(crate) fn set_metadata(&mut self, metadata: RequestMetadata) {
        self.metadata = Some(metadata);
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn path(&self) -> &str { self.uri.path() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }
    pub fn remote_addr(&self) -> Option<SocketAddr> { self.remote_addr }
    pub fn metadata(&self) -> Option<&RequestMetadata> { self.metadata.as_ref() }

    /// Path plus query string, as the client sent it.
    pub fn url(&self) -> &str {
        self.uri.path_and_query().map_or_else(|| self.uri.path(), |pq| pq.as_str())
    }

    /// Header lookup. Non-UTF-8 values read as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// All cookies across every `cookie` header, as a string mapping.
    ///
    /// A cookie sent as `session_id=` is present with an empty value. When a
    /// name repeats, the first occurrence wins. One pair of surrounding
    /// double quotes is stripped from the value.
    pub fn cookies(&self) -> Map<String, Value> {
        let pairs = self
            .headers
            .get_all(http::header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='));

        let mut cookies = Map::new();
        for (name, value) in pairs {
            let name = name.trim();
            if name.is_empty() || cookies.contains_key(name) {
                continue;
            }
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value);
            cookies.insert(name.to_owned(), Value::String(value.to_owned()));
        }
        cookies
    }

    pub fn cookie(&self, name: &str) -> Option<String> {
        match self.cookies().remove(name) {
            Some(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    /// The body parsed as JSON, or `None` when empty or malformed.
    pub fn json_body(&self) -> Option<Value> {
        if self.body.is_empty() {
            return None;
        }
        serde_json::from_slice(&self.body).ok()
    }

    /// The body as a JSON object. Anything that is not an object reads as
    /// an empty mapping.
    pub fn body_map(&self) -> Map<String, Value> {
        match self.json_body() {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// Client address: the injected metadata if present, else the socket peer.
    pub fn client_ip(&self) -> Option<String> {
        match &self.metadata {
            Some(meta) => meta.client_ip.clone(),
            None => self.remote_addr.map(|addr| crate::ip::normalize(addr.ip()).to_string()),
        }
    }
}
