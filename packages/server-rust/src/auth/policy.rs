//! Role to table access policy and per-route rules.

use std::fmt;

use ichor_core::context::{ROLE_ADMIN, ROLE_USER};
use ichor_core::RequestContext;
use uuid::Uuid;

/// Table the `USER` role may update besides reading everything.
const USER_WRITABLE_TABLE: &str = "core.users";

/// CRUD action checked against the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableAction {
    Create,
    Read,
    Update,
    Delete,
}

impl TableAction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Read => "READ",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for TableAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extra condition a route places on the caller after the table check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Any,
    AdminOnly,
    /// Admins, or the user whose id is the route's `{id}`.
    AdminOrSubject,
}

impl Rule {
    #[must_use]
    pub fn permits(self, ctx: &RequestContext, subject: Option<Uuid>) -> bool {
        match self {
            Self::Any => true,
            Self::AdminOnly => ctx.is_admin(),
            Self::AdminOrSubject => ctx.is_admin() || subject == Some(ctx.user_id),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::AdminOnly => "admin_only",
            Self::AdminOrSubject => "admin_or_subject",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What one route requires of its caller.
#[derive(Debug, Clone, Copy)]
pub struct Access {
    pub table: &'static str,
    pub action: TableAction,
    pub rule: Rule,
}

impl Access {
    #[must_use]
    pub const fn new(table: &'static str, action: TableAction, rule: Rule) -> Self {
        Self {
            table,
            action,
            rule,
        }
    }
}

/// Whether any of the caller's roles grants `action` on `table`.
///
/// `ADMIN` may do everything. `USER` may read every table and update
/// `core.users`. Unknown roles grant nothing.
#[must_use]
pub fn allows(ctx: &RequestContext, table: &str, action: TableAction) -> bool {
    ctx.roles.iter().any(|role| role_allows(role, table, action))
}

fn role_allows(role: &str, table: &str, action: TableAction) -> bool {
    if role.eq_ignore_ascii_case(ROLE_ADMIN) {
        return true;
    }
    if role.eq_ignore_ascii_case(ROLE_USER) {
        return match action {
            TableAction::Read => true,
            TableAction::Update => table == USER_WRITABLE_TABLE,
            TableAction::Create | TableAction::Delete => false,
        };
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(roles: &[&str]) -> RequestContext {
        RequestContext::new(Uuid::new_v4(), roles.iter().map(ToString::to_string).collect())
    }

    #[test]
    fn admin_may_do_everything() {
        let admin = ctx(&["ADMIN"]);
        for action in [
            TableAction::Create,
            TableAction::Read,
            TableAction::Update,
            TableAction::Delete,
        ] {
            assert!(allows(&admin, "core.currencies", action));
        }
    }

    #[test]
    fn user_reads_everything_and_updates_only_users() {
        let user = ctx(&["USER"]);
        assert!(allows(&user, "core.currencies", TableAction::Read));
        assert!(!allows(&user, "core.currencies", TableAction::Create));
        assert!(!allows(&user, "core.currencies", TableAction::Update));
        assert!(allows(&user, "core.users", TableAction::Update));
        assert!(!allows(&user, "core.users", TableAction::Delete));
    }

    #[test]
    fn no_roles_grant_nothing() {
        assert!(!allows(&ctx(&[]), "assets.tags", TableAction::Read));
        assert!(!allows(&ctx(&["AUDITOR"]), "assets.tags", TableAction::Read));
    }

    #[test]
    fn subject_rule_matches_own_id() {
        let user = ctx(&["USER"]);
        assert!(Rule::AdminOrSubject.permits(&user, Some(user.user_id)));
        assert!(!Rule::AdminOrSubject.permits(&user, Some(Uuid::new_v4())));
        assert!(!Rule::AdminOrSubject.permits(&user, None));
        assert!(Rule::AdminOrSubject.permits(&ctx(&["ADMIN"]), None));
        assert!(!Rule::AdminOnly.permits(&user, None));
        assert!(Rule::Any.permits(&user, None));
    }

    #[test]
    fn action_names_are_upper_case() {
        assert_eq!(TableAction::Create.to_string(), "CREATE");
        assert_eq!(Rule::AdminOnly.to_string(), "admin_only");
    }
}
