use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// The logged-in user as returned by `/auth/login` and `/auth/me`
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Persisted login state. Constructed at login, removed at logout.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Session {
    pub token: String,
    #[serde(default)]
    pub company_id: Option<i64>,
    #[serde(default)]
    pub tenant_name: Option<String>,
    pub user: User,
}

#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    #[allow(dead_code)]
    exp: u64,
}

impl Session {
    /// Whether the bearer token's `exp` claim has passed.
    ///
    /// The signature is not checked here; the server does that. Tokens that
    /// are not JWTs are treated as unexpired and left for the server to judge.
    pub fn is_expired(&self) -> bool {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.leeway = 0;

        match decode::<ExpiryClaims>(&self.token, &DecodingKey::from_secret(&[]), &validation) {
            Ok(_) => false,
            Err(e) => matches!(e.kind(), ErrorKind::ExpiredSignature),
        }
    }

    /// Name to show for the current tenant
    pub fn tenant_label(&self) -> &str {
        self.tenant_name.as_deref().unwrap_or("(no tenant)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;

    #[derive(Serialize)]
    struct Claims {
        sub: String,
        exp: u64,
    }

    fn session_with(token: String) -> Session {
        Session {
            token,
            company_id: Some(1),
            tenant_name: None,
            user: User {
                id: 1,
                email: "a@b.co".to_string(),
                name: None,
                role: None,
            },
        }
    }

    fn token_expiring_at(exp: i64) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            &Claims {
                sub: "1".to_string(),
                exp: exp as u64,
            },
            &EncodingKey::from_secret(b"server-secret"),
        )
        .unwrap()
    }

    #[test]
    fn past_exp_is_expired() {
        let exp = chrono::Utc::now().timestamp() - 3600;
        assert!(session_with(token_expiring_at(exp)).is_expired());
    }

    #[test]
    fn future_exp_is_not_expired() {
        let exp = chrono::Utc::now().timestamp() + 3600;
        assert!(!session_with(token_expiring_at(exp)).is_expired());
    }

    #[test]
    fn opaque_token_is_left_to_the_server() {
        assert!(!session_with("not-a-jwt".to_string()).is_expired());
    }

    #[test]
    fn tenant_label_defaults() {
        assert_eq!(session_with("t".to_string()).tenant_label(), "(no tenant)");
    }
}
