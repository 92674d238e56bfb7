pub mod admin;
pub mod health;
pub mod ln;
pub mod onchain;
pub mod team;

use crate::client::RequestOutcome;
use crate::error::AppError;
use crate::observability::correlation::RequestContext;

/// Attach the request's ids to whatever error a handler step produced
pub(crate) trait InContext<T> {
    fn in_context(self, context: &RequestContext) -> Result<T, AppError>;
}

impl<T> InContext<T> for Result<T, AppError> {
    fn in_context(self, context: &RequestContext) -> Result<T, AppError> {
        self.map_err(|e| e.with_context(context.clone()))
    }
}

impl<T> InContext<T> for RequestOutcome<T> {
    fn in_context(self, context: &RequestContext) -> Result<T, AppError> {
        self.into_result()
            .map_err(|e| AppError::from(e).with_context(context.clone()))
    }
}

/// `federationId` query values may list several ids separated by commas
pub(crate) fn split_federation_ids(param: Option<&str>) -> Vec<String> {
    param
        .map(|ids| {
            ids.split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
