use crate::backend::{AssetBackend, BackendResult};
use crate::wire::LoginRequest;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Viewer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Viewer => "viewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "viewer" => Ok(Role::Viewer),
            other => Err(format!("unknown role '{other}' (expected admin or viewer)")),
        }
    }
}

/// Who is using the dashboard. Handed to every view when it is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub role: Role,
}

impl Session {
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }

    pub fn admin() -> Self {
        Self::new(Role::Admin.as_str(), Role::Admin)
    }

    pub fn viewer() -> Self {
        Self::new(Role::Viewer.as_str(), Role::Viewer)
    }

    /// Only admins may write to the backend.
    pub fn can_edit(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Single owner of the current session.
#[derive(Debug, Clone, Default)]
pub struct SessionManager {
    current: Arc<RwLock<Option<Session>>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Authenticates against the backend. The role the backend answers with
    /// wins over the one that was requested.
    pub async fn login<B>(&self, backend: &B, role: Role, password: &str) -> BackendResult<Session>
    where
        B: AssetBackend + ?Sized,
    {
        let request = LoginRequest::for_role(role, password);
        let response = backend.login(&request).await?;
        let session = Session::new(request.username, response.role);
        tracing::info!(username = %session.username, role = %session.role, "logged in");
        *self.current.write() = Some(session.clone());
        Ok(session)
    }

    pub fn logout(&self) -> Option<Session> {
        let previous = self.current.write().take();
        if let Some(session) = &previous {
            tracing::info!(username = %session.username, "logged out");
        }
        previous
    }

    pub fn current(&self) -> Option<Session> {
        self.current.read().clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.current.read().is_some()
    }
}
