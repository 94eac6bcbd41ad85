//! Radix-tree request router.
//!
//! One source, a handful of fixed paths, one radix tree. A path either
//! resolves to an [`Endpoint`] of the source or it is a 404.

use std::sync::Arc;

use matchit::Router as MatchitRouter;

use crate::handler::{BoxFuture, Endpoint, SharedSource};
use crate::request::Request;
use crate::source::ModelSource;

/// Health path served by every source.
pub const HEALTH_PATH: &str = "/health";

/// The application router.
///
/// Build it once at startup and pass it to [`Server::serve`](crate::Server::serve).
pub struct Router {
    tree: MatchitRouter<Endpoint>,
    source: SharedSource,
}

impl Router {
    /// Routes each of `source`'s download paths and [`HEALTH_PATH`].
    ///
    /// # Panics
    ///
    /// Panics if a download path is not a valid route or collides with
    /// another one. Paths are `'static` constants of the source, so this is
    /// a programming error rather than a runtime condition.
    pub fn new<S: ModelSource>(source: S) -> Self {
        let mut tree = MatchitRouter::new();
        let routes = source.download_paths().iter()
            .map(|path| (*path, Endpoint::Download))
            .chain([(HEALTH_PATH, Endpoint::Health)]);
        for (path, endpoint) in routes {
            tree.insert(path, endpoint)
                .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        }
        Self { tree, source: Arc::new(source) }
    }

    pub(crate) fn lookup(&self, path: &str) -> Option<Endpoint> {
        self.tree.at(path).ok().map(|matched| *matched.value)
    }

    pub(crate) fn call(&self, endpoint: Endpoint, req: Request) -> BoxFuture {
        Arc::clone(&self.source).call(endpoint, req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SyntheticConfig, SyntheticModel};

    fn synthetic() -> Router {
        Router::new(SyntheticModel::new(SyntheticConfig::default()))
    }

    #[test]
    fn resolves_fixed_paths() {
        let router = synthetic();

        assert_eq!(router.lookup("/model.gguf"), Some(Endpoint::Download));
        assert_eq!(router.lookup("/health"), Some(Endpoint::Health));
        assert_eq!(router.lookup("/healthz"), None);
        assert_eq!(router.lookup("/"), None);
        assert_eq!(router.lookup("/model.gguf/extra"), None);
    }

    #[tokio::test]
    async fn health_reaches_the_source() {
        let router = synthetic();
        let res = router.call(Endpoint::Health, Request::test("/health")).await;
        assert_eq!(res.status_code(), 200);
    }
}
