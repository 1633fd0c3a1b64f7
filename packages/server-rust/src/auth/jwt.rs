use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use super::{AuthError, Authenticator, Claims};

/// Token signing and verification settings.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HS256 shared secret.
    pub secret: String,
    /// Expected `iss` claim.
    pub issuer: String,
    /// Lifetime of tokens minted by [`JwtAuthenticator::issue`].
    pub token_ttl: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            issuer: "ichor".to_string(),
            token_ttl: Duration::from_secs(3600),
        }
    }
}

/// HS256 JWT authenticator.
pub struct JwtAuthenticator {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    token_ttl: Duration,
}

impl JwtAuthenticator {
    /// # Errors
    ///
    /// Returns [`AuthError::MissingSecret`] if the secret is empty.
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        if config.secret.is_empty() {
            return Err(AuthError::MissingSecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            issuer: config.issuer.clone(),
            token_ttl: config.token_ttl,
        })
    }

    /// Mints a signed token for `user_id` with `roles`.
    ///
    /// # Errors
    ///
    /// Returns an error if the lifetime overflows or signing fails.
    pub fn issue(&self, user_id: Uuid, roles: &[String]) -> Result<String, AuthError> {
        let ttl = i64::try_from(self.token_ttl.as_secs()).map_err(|_| AuthError::Lifetime)?;
        let iat = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            roles: roles.to_vec(),
            iss: self.issuer.clone(),
            iat,
            exp: iat.checked_add(ttl).ok_or(AuthError::Lifetime)?,
        };
        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        Ok(encode(&Header::new(Algorithm::HS256), claims, &self.encoding)?)
    }
}

impl Authenticator for JwtAuthenticator {
    fn authenticate(&self, token: &str) -> Result<Claims, AuthError> {
        Ok(decode::<Claims>(token, &self.decoding, &self.validation)?.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str) -> AuthConfig {
        AuthConfig {
            secret: secret.to_string(),
            ..AuthConfig::default()
        }
    }

    #[test]
    fn empty_secret_is_rejected() {
        assert!(matches!(
            JwtAuthenticator::new(&config("")),
            Err(AuthError::MissingSecret)
        ));
    }

    #[test]
    fn issued_token_verifies() {
        let auth = JwtAuthenticator::new(&config("s3cret")).unwrap();
        let user = Uuid::new_v4();
        let token = auth.issue(user, &["ADMIN".to_string()]).unwrap();

        let claims = auth.authenticate(&token).unwrap();
        assert_eq!(claims.sub, user);
        assert_eq!(claims.roles, vec!["ADMIN"]);
        assert_eq!(claims.iss, "ichor");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn token_signed_with_other_secret_fails() {
        let ours = JwtAuthenticator::new(&config("ours")).unwrap();
        let theirs = JwtAuthenticator::new(&config("theirs")).unwrap();
        let token = theirs.issue(Uuid::new_v4(), &[]).unwrap();
        assert!(ours.authenticate(&token).is_err());
    }

    #[test]
    fn expired_token_fails() {
        let auth = JwtAuthenticator::new(&config("s3cret")).unwrap();
        let now = Utc::now().timestamp();
        let token = auth
            .sign(&Claims {
                sub: Uuid::new_v4(),
                roles: vec![],
                iss: "ichor".to_string(),
                iat: now - 7200,
                exp: now - 3600,
            })
            .unwrap();
        assert!(auth.authenticate(&token).is_err());
    }

    #[test]
    fn wrong_issuer_fails() {
        let auth = JwtAuthenticator::new(&config("s3cret")).unwrap();
        let other = JwtAuthenticator::new(&AuthConfig {
            issuer: "someone-else".to_string(),
            ..config("s3cret")
        })
        .unwrap();
        let token = other.issue(Uuid::new_v4(), &[]).unwrap();
        assert!(auth.authenticate(&token).is_err());
    }

    #[test]
    fn garbage_token_fails() {
        let auth = JwtAuthenticator::new(&config("s3cret")).unwrap();
        assert!(auth.authenticate("not.a.jwt").is_err());
    }
}
