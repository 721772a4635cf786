// SPDX-FileCopyrightText: 2026 Crabtree Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Admin authentication.
//!
//! Admin routes require `Authorization: Bearer <admin password>`. When no
//! password is configured every admin request is rejected (fail-closed).
//! This is a shared secret with no expiry or per-user identity.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};

/// The configured admin credential.
#[derive(Clone, Default)]
pub struct AdminAuth {
    password: Option<Arc<str>>,
}

impl std::fmt::Debug for AdminAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminAuth")
            .field("password", &self.password.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

impl AdminAuth {
    /// A blank password counts as unset.
    pub fn new(password: Option<String>) -> Self {
        Self {
            password: password
                .filter(|p| !p.trim().is_empty())
                .map(Arc::from),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.password.is_some()
    }

    /// Whether `candidate` is the admin password.
    ///
    /// Both sides are hashed first so the comparison time does not depend on
    /// how much of the password matched.
    pub fn verify(&self, candidate: &str) -> bool {
        match &self.password {
            Some(expected) => {
                Sha256::digest(expected.as_bytes()) == Sha256::digest(candidate.as_bytes())
            }
            None => false,
        }
    }
}

/// Middleware guarding the admin routes.
pub async fn admin_auth_middleware(
    State(auth): State<AdminAuth>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if !auth.is_configured() {
        tracing::error!("admin password is not configured -- rejecting admin request");
        return Err(StatusCode::UNAUTHORIZED);
    }

    let token = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match token {
        Some(token) if auth.verify(token) => Ok(next.run(request).await),
        _ => {
            tracing::warn!(path = %request.uri().path(), "rejected admin request");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_matches_only_exact_password() {
        let auth = AdminAuth::new(Some("hunter2".into()));
        assert!(auth.verify("hunter2"));
        assert!(!auth.verify("hunter"));
        assert!(!auth.verify("hunter22"));
        assert!(!auth.verify(""));
    }

    #[test]
    fn unset_or_blank_password_never_verifies() {
        for auth in [AdminAuth::new(None), AdminAuth::new(Some("  ".into()))] {
            assert!(!auth.is_configured());
            assert!(!auth.verify(""));
            assert!(!auth.verify("  "));
        }
    }

    #[test]
    fn debug_redacts_password() {
        let debug = format!("{:?}", AdminAuth::new(Some("hunter2".into())));
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[redacted]"));
    }
}
