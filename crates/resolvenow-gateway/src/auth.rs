// SPDX-FileCopyrightText: 2026 ResolveNow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bearer-token authentication for the gateway.
//!
//! Tokens have the form `<userId>.<role>.<hex hmac>`, where the HMAC-SHA256
//! covers `<userId>.<role>`. Credential issuance lives elsewhere; the
//! gateway only verifies. With no signing key configured every request is
//! rejected (fail-closed).

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use resolvenow_core::{Identity, ResolveError, Role};

type HmacSha256 = Hmac<Sha256>;

/// Signs and verifies identity tokens with a shared key.
#[derive(Clone)]
pub struct TokenSigner {
    mac: HmacSha256,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("key", &"[redacted]")
            .finish()
    }
}

impl TokenSigner {
    pub fn new(key: impl AsRef<[u8]>) -> Result<Self, ResolveError> {
        let mac = HmacSha256::new_from_slice(key.as_ref())
            .map_err(|e| ResolveError::Config(format!("invalid signing key: {e}")))?;
        Ok(Self { mac })
    }

    /// Mints a token for `identity`.
    pub fn issue(&self, identity: &Identity) -> String {
        let payload = format!("{}.{}", identity.id, identity.role);
        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        let sig = hex::encode(mac.finalize().into_bytes());
        format!("{payload}.{sig}")
    }

    /// Returns the identity carried by a well-formed, correctly signed token.
    pub fn verify(&self, token: &str) -> Option<Identity> {
        let (payload, sig_hex) = token.rsplit_once('.')?;
        let (user_id, role) = payload.rsplit_once('.')?;
        if user_id.is_empty() {
            return None;
        }
        let role: Role = role.parse().ok()?;
        let sig = hex::decode(sig_hex).ok()?;

        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        mac.verify_slice(&sig).ok()?;
        Some(Identity::new(user_id, role))
    }
}

/// Auth state shared with the middleware and the WebSocket handshake.
#[derive(Clone, Debug, Default)]
pub struct AuthState {
    pub signer: Option<TokenSigner>,
}

impl AuthState {
    pub fn new(signer: Option<TokenSigner>) -> Self {
        Self { signer }
    }

    pub fn identify(&self, token: &str) -> Option<Identity> {
        self.signer.as_ref()?.verify(token)
    }
}

fn bearer(request: &Request) -> Option<&str> {
    request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Verifies the bearer token and stores the resulting [`Identity`] as a
/// request extension for the handlers.
pub async fn auth_middleware(
    State(auth): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if auth.signer.is_none() {
        tracing::error!("gateway has no signing key configured -- rejecting request");
        return Err(StatusCode::UNAUTHORIZED);
    }

    let identity = bearer(&request)
        .and_then(|token| auth.identify(token))
        .ok_or(StatusCode::UNAUTHORIZED)?;
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::new("0123456789abcdef-test-key").unwrap()
    }

    #[test]
    fn issued_tokens_verify() {
        let s = signer();
        let id = Identity::new("agent", Role::Agent);
        let token = s.issue(&id);
        assert!(token.starts_with("agent.agent."));
        assert_eq!(s.verify(&token), Some(id));
    }

    #[test]
    fn user_ids_may_contain_dots() {
        let s = signer();
        let id = Identity::new("john.doe", Role::User);
        assert_eq!(s.verify(&s.issue(&id)), Some(id));
    }

    #[test]
    fn tampered_tokens_are_rejected() {
        let s = signer();
        let token = s.issue(&Identity::new("user", Role::User));
        let escalated = token.replacen(".user.", ".admin.", 1);
        assert_eq!(s.verify(&escalated), None);
        assert_eq!(s.verify("user.user.zz"), None);
        assert_eq!(s.verify("garbage"), None);
        assert_eq!(s.verify(".admin.00"), None);

        let other = TokenSigner::new("another-key-of-16-bytes").unwrap();
        assert_eq!(other.verify(&token), None);
    }

    #[test]
    fn debug_redacts_key() {
        let debug = format!("{:?}", AuthState::new(Some(signer())));
        assert!(!debug.contains("0123456789abcdef"));
        assert!(debug.contains("[redacted]"));
    }

    #[test]
    fn no_signer_identifies_nobody() {
        let token = signer().issue(&Identity::new("admin", Role::Admin));
        assert_eq!(AuthState::default().identify(&token), None);
    }
}
