//! The transport seam between the order builder and the network.
//!
//! [`Dispatcher`] is the narrow contract the node needs from an HTTP
//! client: send a JSON body to an API path on behalf of an account and
//! hand back the JSON response. The `mpqr-http` crate provides the
//! `reqwest` implementation; tests plug in recording fakes.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::credentials::Credentials;

/// A boxed, `Send` future, as returned by [`Dispatcher::send`].
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// HTTP method of a dispatched request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
}

impl Method {
    /// Returns the method name in upper case.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sends authenticated JSON requests to the MercadoPago API.
///
/// Implementations must not retry: any transport failure or non-2xx
/// response is reported through [`Dispatcher::Error`] as-is.
pub trait Dispatcher: Send + Sync {
    /// Error produced when the request fails or is rejected.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Sends `body` to `path` (relative to the API base URL) using the
    /// credentials' access token, and returns the decoded JSON response.
    fn send<'a>(
        &'a self,
        method: Method,
        path: &'a str,
        body: &'a serde_json::Value,
        credentials: &'a Credentials,
    ) -> BoxFuture<'a, Result<serde_json::Value, Self::Error>>;
}

impl<D: Dispatcher + ?Sized> Dispatcher for &D {
    type Error = D::Error;

    fn send<'a>(
        &'a self,
        method: Method,
        path: &'a str,
        body: &'a serde_json::Value,
        credentials: &'a Credentials,
    ) -> BoxFuture<'a, Result<serde_json::Value, Self::Error>> {
        (**self).send(method, path, body, credentials)
    }
}
