//! Async-boundary adapter.
//!
//! [`wrap`] turns a request handler into a [`Guarded`] handler whose every
//! failure reaches the dispatch path exactly once:
//!
//! - `Err(e)` returned by the handler's future
//! - a panic while the handler is called (before any future exists)
//! - a panic while the future is polled
//!
//! The adapter does not classify or transform anything beyond converting the
//! error into a [`Failure`]; that is the responder's job.
//!
//! ```rust
//! use taxon_errors::{wrap, Failure, TaxonomyError, definitions, taxonomy_err};
//!
//! async fn load(id: u32) -> Result<u32, TaxonomyError> {
//!     if id == 0 {
//!         return Err(taxonomy_err!(definitions::NOT_FOUND));
//!     }
//!     Ok(id)
//! }
//!
//! let guarded = wrap(load);
//! let mut forwarded = Vec::new();
//! let result = futures::executor::block_on(guarded.call(0, |f: Failure| forwarded.push(f)));
//! assert!(result.is_none());
//! assert_eq!(forwarded.len(), 1);
//! ```

use crate::Failure;
use futures::FutureExt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};

/// Wrap `handler` so its failures are forwarded instead of lost.
#[inline]
pub fn wrap<H>(handler: H) -> Guarded<H> {
    Guarded { handler }
}

/// A handler whose failures go to a `next` callback.
#[derive(Debug, Clone, Copy)]
pub struct Guarded<H> {
    handler: H,
}

impl<H> Guarded<H> {
    /// Run the handler for `req`.
    ///
    /// Returns `Some(value)` on success. On any failure `next` is invoked
    /// exactly once with the failure and `None` is returned; the success
    /// path is never taken.
    pub async fn call<Req, Fut, T, E, N>(&self, req: Req, next: N) -> Option<T>
    where
        H: Fn(Req) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<Failure>,
        N: FnOnce(Failure),
    {
        let future = match panic::catch_unwind(AssertUnwindSafe(|| (self.handler)(req))) {
            Ok(future) => future,
            Err(payload) => {
                tracing::debug!("handler panicked before returning a future");
                next(Failure::from_panic(payload));
                return None;
            }
        };

        match AssertUnwindSafe(future).catch_unwind().await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(err)) => {
                next(err.into());
                None
            }
            Err(payload) => {
                tracing::debug!("handler future panicked while polled");
                next(Failure::from_panic(payload));
                None
            }
        }
    }

    /// The wrapped handler.
    #[inline]
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Unwrap the handler.
    #[inline]
    pub fn into_inner(self) -> H {
        self.handler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorShape, definitions, failure::conventions, taxonomy_err};
    use futures::executor::block_on;
    use std::cell::RefCell;
    use std::future::{Ready, ready};
    use std::io;

    #[test]
    fn success_does_not_call_next() {
        let guarded = wrap(|x: u32| ready(Ok::<_, io::Error>(x * 2)));
        let mut calls = 0;
        let out = block_on(guarded.call(21, |_| calls += 1));
        assert_eq!(out, Some(42));
        assert_eq!(calls, 0);
    }

    #[test]
    fn err_is_forwarded_once() {
        let guarded = wrap(|_: ()| ready(Err::<(), _>(taxonomy_err!(definitions::FORBIDDEN))));
        let seen = RefCell::new(Vec::new());
        let out = block_on(guarded.call((), |f| seen.borrow_mut().push(f)));
        assert!(out.is_none());
        let seen = seen.into_inner();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].kind(), "ForbiddenError");
    }

    #[test]
    fn foreign_err_is_converted() {
        let guarded = wrap(|_: ()| ready(Err::<(), _>(io::Error::from(io::ErrorKind::NotFound))));
        let seen = RefCell::new(Vec::new());
        block_on(guarded.call((), |f| seen.borrow_mut().push(f)));
        assert_eq!(seen.borrow()[0].kind(), conventions::SYSTEM_KIND);
    }

    #[test]
    fn synchronous_panic_is_forwarded_once() {
        fn explode(_: ()) -> Ready<Result<(), ErrorShape>> {
            panic!("sync boom");
        }
        let guarded = wrap(explode);
        let seen = RefCell::new(Vec::new());
        let out = block_on(guarded.call((), |f| seen.borrow_mut().push(f)));
        assert!(out.is_none());
        let seen = seen.into_inner();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].kind(), conventions::PANIC_KIND);
        assert_eq!(seen[0].message(), Some("sync boom"));
    }

    #[test]
    fn polled_panic_is_forwarded_once() {
        async fn explode(_: ()) -> Result<(), ErrorShape> {
            panic!("async boom");
        }
        let guarded = wrap(explode);
        let seen = RefCell::new(Vec::new());
        let out = block_on(guarded.call((), |f| seen.borrow_mut().push(f)));
        assert!(out.is_none());
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(seen.borrow()[0].message(), Some("async boom"));
    }
}
