//! `Ctx` extractor: a per-request context tied to server shutdown.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use keyward_service::RequestContext;

use crate::state::AppState;

/// Request context handed to service calls.
///
/// Its cancellation token is a child of the server shutdown token, so
/// in-flight operations stop once shutdown begins.
#[derive(Debug, Clone)]
pub struct Ctx(pub RequestContext);

impl std::ops::Deref for Ctx {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for Ctx {
    type Rejection = Infallible;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Ctx(RequestContext::child_of(&state.shutdown)))
    }
}
