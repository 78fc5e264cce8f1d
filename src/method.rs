//! HTTP method as a typed enum.
//!
//! Only the RFC 9110 methods a JSON resource service routes on are modelled.
//! Anything else (CONNECT, TRACE, WebDAV verbs) is rejected at dispatch with
//! `405 Method Not Allowed` before it ever reaches a handler.

use std::fmt;

/// A routable HTTP method.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Method {
    Delete,
    Get,
    Head,
    Options,
    Patch,
    Post,
    Put,
}

impl Method {
    /// Returns the uppercase wire representation (e.g. `"GET"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Delete  => "DELETE",
            Self::Get     => "GET",
            Self::Head    => "HEAD",
            Self::Options => "OPTIONS",
            Self::Patch   => "PATCH",
            Self::Post    => "POST",
            Self::Put     => "PUT",
        }
    }
}

/// Maps hyper's method onto the routable subset. Extension methods fail.
impl TryFrom<&http::Method> for Method {
    type Error = UnsupportedMethod;

    fn try_from(m: &http::Method) -> Result<Self, Self::Error> {
        match *m {
            http::Method::DELETE  => Ok(Self::Delete),
            http::Method::GET     => Ok(Self::Get),
            http::Method::HEAD    => Ok(Self::Head),
            http::Method::OPTIONS => Ok(Self::Options),
            http::Method::PATCH   => Ok(Self::Patch),
            http::Method::POST    => Ok(Self::Post),
            http::Method::PUT     => Ok(Self::Put),
            _                     => Err(UnsupportedMethod),
        }
    }
}

impl From<Method> for http::Method {
    fn from(m: Method) -> Self {
        match m {
            Method::Delete  => http::Method::DELETE,
            Method::Get     => http::Method::GET,
            Method::Head    => http::Method::HEAD,
            Method::Options => http::Method::OPTIONS,
            Method::Patch   => http::Method::PATCH,
            Method::Post    => http::Method::POST,
            Method::Put     => http::Method::PUT,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a request uses a method outside [`Method`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnsupportedMethod;
