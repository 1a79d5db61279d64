//! Optional third-party integrations.
//!
//! - `axum`: envelopes as responses, `RequestInfo` from request parts
//! - `jwt`: `jsonwebtoken` errors as token-kind shapes
//! - `http-client`: `reqwest` errors as outbound-call shapes

#[cfg(feature = "axum")]
mod axum_support {
    use crate::{
        ErrorEnvelope, ErrorLogger, Failure, RequestInfo, Responder, SuccessEnvelope,
    };
    use axum::Json;
    use axum::http::StatusCode;
    use axum::http::request::Parts;
    use axum::response::{IntoResponse, Response};
    use serde::Serialize;

    #[inline]
    fn status_of(code: u16) -> StatusCode {
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    impl IntoResponse for ErrorEnvelope {
        fn into_response(self) -> Response {
            (status_of(self.status_code), Json(self)).into_response()
        }
    }

    impl<T: Serialize> IntoResponse for SuccessEnvelope<T> {
        fn into_response(self) -> Response {
            (status_of(self.status_code), Json(self)).into_response()
        }
    }

    impl From<&Parts> for RequestInfo {
        fn from(parts: &Parts) -> Self {
            Self::new(parts.method.as_str(), parts.uri.path())
        }
    }

    impl<L: ErrorLogger> Responder<L> {
        /// Handle `failure` and turn the envelope into an axum response.
        pub fn into_response(&self, failure: &Failure, request: &RequestInfo) -> Response {
            self.handle(failure, request).into_response()
        }
    }

}

#[cfg(feature = "jwt")]
mod jwt_support {
    use crate::failure::conventions;
    use crate::{ErrorShape, Failure};
    use jsonwebtoken::errors::{Error, ErrorKind};

    impl From<&Error> for ErrorShape {
        fn from(err: &Error) -> Self {
            let kind = match err.kind() {
                ErrorKind::ExpiredSignature => conventions::TOKEN_EXPIRED_KIND,
                ErrorKind::ImmatureSignature => conventions::TOKEN_NOT_ACTIVE_KIND,
                _ => conventions::TOKEN_MALFORMED_KIND,
            };
            ErrorShape::named(kind).with_message(err.to_string())
        }
    }

    impl From<Error> for Failure {
        fn from(err: Error) -> Self {
            Self::Shaped(ErrorShape::from(&err))
        }
    }

}

#[cfg(feature = "http-client")]
mod http_client_support {
    use crate::{ErrorShape, Failure};

    /// Kind name for outbound client failures.
    const CLIENT_KIND: &str = "RequestError";

    impl From<&reqwest::Error> for ErrorShape {
        fn from(err: &reqwest::Error) -> Self {
            // upstream status is not carried over
            ErrorShape::named(CLIENT_KIND)
                .outbound()
                .with_message(err.to_string())
        }
    }

    impl From<reqwest::Error> for Failure {
        fn from(err: reqwest::Error) -> Self {
            Self::Shaped(ErrorShape::from(&err))
        }
    }

}
