use serde::{Deserialize, Serialize};

use super::{require_min_len, validate_email};
use crate::config::{Session, User};
use crate::error::Result;

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<()> {
        validate_email("email", &self.email)?;
        require_min_len("password", &self.password, 6)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub company_id: Option<i64>,
    #[serde(default)]
    pub tenant_name: Option<String>,
    pub user: User,
}

impl From<LoginResponse> for Session {
    fn from(resp: LoginResponse) -> Self {
        Session {
            token: resp.token,
            company_id: resp.company_id,
            tenant_name: resp.tenant_name,
            user: resp.user,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_validation() {
        let ok = LoginRequest {
            email: "ops@fleet.io".to_string(),
            password: "secret1".to_string(),
        };
        assert!(ok.validate().is_ok());

        let short = LoginRequest {
            email: "ops@fleet.io".to_string(),
            password: "123".to_string(),
        };
        assert!(short.validate().is_err());
    }

    #[test]
    fn login_response_becomes_session() {
        let body = r#"{
            "token": "jwt",
            "companyId": 3,
            "tenantName": "Metro Taxi",
            "user": {"id": 9, "email": "boss@metro.io", "role": "OWNER"}
        }"#;
        let resp: LoginResponse = serde_json::from_str(body).unwrap();
        let session = Session::from(resp);
        assert_eq!(session.company_id, Some(3));
        assert_eq!(session.tenant_label(), "Metro Taxi");
        assert_eq!(session.user.role.as_deref(), Some("OWNER"));
    }
}
