//! Radix-tree request router with shared application state.
//!
//! One tree per HTTP method. O(path-length) lookup. A path registered under a
//! different method answers `405` with an `allow` header; an unknown path
//! answers `404`. `HEAD` falls back to the `GET` route and drops the body.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

/// The application router.
///
/// Owns the state `S` handed to every handler. Build it once at startup and
/// pass it to [`Server::serve`](crate::Server::serve).
pub struct Router<S> {
    routes: HashMap<Method, MatchitRouter<BoxedHandler<S>>>,
    state: Arc<S>,
}

impl<S: Send + Sync + 'static> Router<S> {
    pub fn new(state: S) -> Self {
        Self { routes: HashMap::new(), state: Arc::new(state) }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax and `req.param("name")` retrieves them.
    ///
    /// # Panics
    ///
    /// Panics on a malformed or conflicting route. Routes are fixed at startup,
    /// so this is a programming error rather than a runtime condition.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler<S>) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{method} {path}`: {e}"));
        self
    }

    pub fn get(self, path: &str, handler: impl Handler<S>) -> Self {
        self.on(Method::Get, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler<S>) -> Self {
        self.on(Method::Post, path, handler)
    }

    pub fn put(self, path: &str, handler: impl Handler<S>) -> Self {
        self.on(Method::Put, path, handler)
    }

    pub fn delete(self, path: &str, handler: impl Handler<S>) -> Self {
        self.on(Method::Delete, path, handler)
    }

    /// Routes one fully-read request and produces its response.
    ///
    /// This is what the server calls per request; tests call it directly to
    /// exercise handlers without a socket.
    pub async fn handle(&self, req: http::Request<Bytes>) -> Response {
        self.dispatch(req, None).await
    }

    pub(crate) async fn dispatch(
        &self,
        req: http::Request<Bytes>,
        remote_addr: Option<SocketAddr>,
    ) -> Response {
        let (parts, body) = req.into_parts();

        let Ok(method) = Method::try_from(&parts.method) else {
            return Response::status(Status::MethodNotAllowed);
        };

        let path = parts.uri.path();
        let found = self.lookup(method, path).or_else(|| match method {
            Method::Head => self.lookup(Method::Get, path),
            _ => None,
        });
        let Some((handler, params)) = found else {
            return self.unmatched(path);
        };

        let req = Request::new(body, params, remote_addr);
        let mut response = handler.call(Arc::clone(&self.state), req).await;
        if method == Method::Head {
            response.body.clear();
        }
        response
    }

    fn lookup(
        &self,
        method: Method,
        path: &str,
    ) -> Option<(BoxedHandler<S>, HashMap<String, String>)> {
        let tree = self.routes.get(&method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }

    fn unmatched(&self, path: &str) -> Response {
        let mut allowed: Vec<&str> = self.routes.iter()
            .filter(|(_, tree)| tree.at(path).is_ok())
            .map(|(method, _)| method.as_str())
            .collect();

        if allowed.is_empty() {
            return Response::status(Status::NotFound);
        }
        if allowed.contains(&"GET") && !allowed.contains(&"HEAD") {
            allowed.push("HEAD");
        }

        allowed.sort_unstable();
        Response::builder()
            .status(Status::MethodNotAllowed)
            .header("allow", &allowed.join(", "))
            .no_body()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn echo_id(_: Arc<()>, req: Request) -> Response {
        Response::text(req.param("id").unwrap_or_default().to_owned())
    }

    async fn ok(_: Arc<()>, _: Request) -> Status {
        Status::Ok
    }

    fn app() -> Router<()> {
        Router::new(())
            .get("/user/{id}", echo_id)
            .delete("/user/{id}", ok)
            .post("/user", ok)
    }

    fn request(method: http::Method, path: &str) -> http::Request<Bytes> {
        http::Request::builder()
            .method(method)
            .uri(path)
            .body(Bytes::new())
            .unwrap()
    }

    #[tokio::test]
    async fn extracts_path_params() {
        let res = app().handle(request(http::Method::GET, "/user/abc")).await;
        assert_eq!(res.status_code(), http::StatusCode::OK);
        assert_eq!(res.body(), b"abc");
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let res = app().handle(request(http::Method::GET, "/nope")).await;
        assert_eq!(res.status_code(), http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn wrong_method_lists_allowed_ones() {
        let res = app().handle(request(http::Method::PUT, "/user/abc")).await;
        assert_eq!(res.status_code(), http::StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(res.header("allow"), Some("DELETE, GET, HEAD"));
    }

    #[tokio::test]
    async fn head_runs_the_get_route_without_a_body() {
        let res = app().handle(request(http::Method::HEAD, "/user/abc")).await;
        assert_eq!(res.status_code(), http::StatusCode::OK);
        assert_eq!(res.header("content-type"), Some("text/plain; charset=utf-8"));
        assert!(res.body().is_empty());
    }

    #[tokio::test]
    async fn head_without_a_get_route_is_not_allowed() {
        let res = app().handle(request(http::Method::HEAD, "/user")).await;
        assert_eq!(res.status_code(), http::StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(res.header("allow"), Some("POST"));
    }

    #[tokio::test]
    async fn unsupported_method_is_rejected() {
        let res = app().handle(request(http::Method::TRACE, "/user")).await;
        assert_eq!(res.status_code(), http::StatusCode::METHOD_NOT_ALLOWED);
    }
}
