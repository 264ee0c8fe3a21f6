//! Calling-officer identity
//!
//! Authentication happens upstream. The verified identity is forwarded in
//! headers; this layer only requires that it is present.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tanod_core::OfficerIdentity;

use crate::error::ApiError;

/// Header carrying the verified officer id
pub const OFFICER_ID_HEADER: &str = "x-officer-id";
/// Header carrying the verified officer role
pub const OFFICER_ROLE_HEADER: &str = "x-officer-role";
/// Role assumed when the upstream layer sends none
pub const DEFAULT_ROLE: &str = "tanod";

/// Extractor for the authenticated caller
#[derive(Debug, Clone)]
pub struct Caller(pub OfficerIdentity);

impl Caller {
    pub fn identity(&self) -> &OfficerIdentity {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let officer_id = header_value(parts, OFFICER_ID_HEADER)
            .ok_or_else(|| ApiError::Unauthorized("missing officer identity".to_string()))?;
        let role = header_value(parts, OFFICER_ROLE_HEADER).unwrap_or_else(|| DEFAULT_ROLE.to_string());

        Ok(Caller(OfficerIdentity::new(officer_id, role)))
    }
}

fn header_value(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
