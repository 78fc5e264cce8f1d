//! Incoming HTTP request type.

use std::collections::HashMap;
use std::net::SocketAddr;

use bytes::Bytes;
use serde::de::DeserializeOwned;

/// An incoming HTTP request with its body already collected.
///
/// The server reads the whole body before dispatch, so handlers see plain
/// bytes and never touch hyper's streaming body type. Routing has already
/// consumed the method and path.
pub struct Request {
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
    pub(crate) remote_addr: Option<SocketAddr>,
}

impl Request {
    pub(crate) fn new(
        body: Bytes,
        params: HashMap<String, String>,
        remote_addr: Option<SocketAddr>,
    ) -> Self {
        Self { body, params, remote_addr }
    }

    /// Peer address of the connection, when the request arrived over TCP.
    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/user/{id}`, `req.param("id")` on `/user/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Decodes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}
