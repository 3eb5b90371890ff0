use tracing::info;

use super::ApiClient;
use crate::config::{Session, User};
use crate::error::Result;
use crate::models::{LoginRequest, LoginResponse};

impl ApiClient {
    /// Exchange credentials for a session and keep it on this client
    pub fn login(&mut self, request: &LoginRequest) -> Result<Session> {
        request.validate()?;
        let response: LoginResponse = self.post_anonymous("/auth/login", request)?;
        let session = Session::from(response);
        info!(user = %session.user.email, tenant = session.tenant_label(), "logged in");
        self.session = Some(session.clone());
        Ok(session)
    }

    /// Drop the session held by this client
    pub fn logout(&mut self) -> Option<Session> {
        self.session.take()
    }

    pub fn me(&self) -> Result<User> {
        self.get("/auth/me", &[])
    }
}
