//! Endpoint dispatch and source type erasure.
//!
//! [`ModelSource`] returns `impl Future` from its methods, which keeps the
//! two strategies free of boxing but makes the trait unusable as `dyn`.
//! The router needs one concrete type whatever source it serves, so each
//! source is wrapped once, at startup, behind [`ErasedSource`]:
//!
//! ```text
//! Router::new(SyntheticModel { .. })
//!        ↓
//! Arc::new(source) as Arc<dyn ErasedSource>      ← blanket impl below
//!        ↓
//! source.call(Endpoint::Download, req)           ← one vtable dispatch
//!        ↓
//! Box::pin(async move { source.download(req).await })
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::Response;
use crate::source::ModelSource;

/// A heap-allocated, type-erased future that resolves to a [`Response`].
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// What a routed path asks a source for.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Endpoint {
    Download,
    Health,
}

/// Object-safe view of a [`ModelSource`].
///
/// Takes `Arc<Self>` so the returned future owns its source and can outlive
/// the borrow of the router it was looked up in.
pub(crate) trait ErasedSource: Send + Sync + 'static {
    fn call(self: Arc<Self>, endpoint: Endpoint, req: Request) -> BoxFuture;
}

impl<S: ModelSource> ErasedSource for S {
    fn call(self: Arc<Self>, endpoint: Endpoint, req: Request) -> BoxFuture {
        Box::pin(async move {
            match endpoint {
                Endpoint::Download => self.download(req).await,
                Endpoint::Health => self.health(req).await,
            }
        })
    }
}

/// A source shared by every connection.
pub(crate) type SharedSource = Arc<dyn ErasedSource>;
