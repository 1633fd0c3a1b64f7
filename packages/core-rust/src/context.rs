use uuid::Uuid;

/// Role name granting full access to every table.
pub const ROLE_ADMIN: &str = "ADMIN";
/// Role name for regular authenticated users.
pub const ROLE_USER: &str = "USER";

/// Per-request context carrying identity and tracing information.
/// Threaded from the HTTP layer through the app and business layers so that
/// audit fields and delegate events know who made a change.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Authenticated user performing the request.
    pub user_id: Uuid,
    /// Roles granted to the user by the token.
    pub roles: Vec<String>,
    /// Request identifier for log correlation (`X-Request-Id`).
    pub request_id: Option<String>,
}

impl RequestContext {
    /// Creates a context for the given user and roles.
    #[must_use]
    pub fn new(user_id: Uuid, roles: Vec<String>) -> Self {
        Self {
            user_id,
            roles,
            request_id: None,
        }
    }

    /// Context used by background jobs and migrations (nil user, admin role).
    #[must_use]
    pub fn system() -> Self {
        Self::new(Uuid::nil(), vec![ROLE_ADMIN.to_string()])
    }

    /// Attaches a request identifier.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Whether any of the user's roles matches `role` (case-insensitive).
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN)
    }
}
