//! Calling forms: the shapes a sample can take when invoking a method.

use crate::Method;
use serde::Serialize;
use std::fmt;

/// How a sample invokes its method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CallingForm {
    /// Unary request/response.
    Request,
    /// Request returning a paged list.
    RequestPaged,
    /// Client streams requests, single response.
    RequestStreamingClient,
    /// Single request, server streams responses.
    RequestStreamingServer,
    /// Both sides stream.
    RequestStreamingBidi,
    /// Request returning a long-running operation.
    LongRunningRequestPromise,
}

impl CallingForm {
    /// Every calling form, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Request,
        Self::RequestPaged,
        Self::RequestStreamingClient,
        Self::RequestStreamingServer,
        Self::RequestStreamingBidi,
        Self::LongRunningRequestPromise,
    ];

    /// Picks the default calling form for a method.
    ///
    /// Long-running wins over paging, paging over streaming.
    ///
    /// # Examples
    ///
    /// ```
    /// use samplegen_schema::{CallingForm, Method};
    ///
    /// let method = Method::new("StreamBooks", ".acme.v1.Req", ".acme.v1.Book")
    ///     .with_streaming(false, true);
    /// assert_eq!(CallingForm::method_default(&method), CallingForm::RequestStreamingServer);
    /// ```
    #[must_use]
    pub fn method_default(method: &Method) -> Self {
        if method.is_long_running() {
            return Self::LongRunningRequestPromise;
        }
        if method.paged_result_field().is_some() {
            return Self::RequestPaged;
        }
        match (method.client_streaming(), method.server_streaming()) {
            (true, true) => Self::RequestStreamingBidi,
            (true, false) => Self::RequestStreamingClient,
            (false, true) => Self::RequestStreamingServer,
            (false, false) => Self::Request,
        }
    }

    /// Variant name as written in templates, e.g. `RequestPaged`.
    #[must_use]
    pub const fn variant_name(self) -> &'static str {
        match self {
            Self::Request => "Request",
            Self::RequestPaged => "RequestPaged",
            Self::RequestStreamingClient => "RequestStreamingClient",
            Self::RequestStreamingServer => "RequestStreamingServer",
            Self::RequestStreamingBidi => "RequestStreamingBidi",
            Self::LongRunningRequestPromise => "LongRunningRequestPromise",
        }
    }

    /// Snake case form, e.g. `request_paged`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::RequestPaged => "request_paged",
            Self::RequestStreamingClient => "request_streaming_client",
            Self::RequestStreamingServer => "request_streaming_server",
            Self::RequestStreamingBidi => "request_streaming_bidi",
            Self::LongRunningRequestPromise => "long_running_request_promise",
        }
    }
}

impl fmt::Display for CallingForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
