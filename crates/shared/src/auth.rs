//! Caller identity: roles, JWT claims and the request-scoped context.
//!
//! Sessions and sign-in are handled by an external identity provider. The
//! service only verifies bearer tokens and turns their claims into a
//! [`RequestContext`] that is passed explicitly into every operation.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{CompanyId, ProfileId};

/// Role of a profile within its company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Manages rules and people.
    Admin,
    /// Approves expenses and may manage a team.
    Manager,
    /// Submits expenses.
    Employee,
}

impl Role {
    /// Parses a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "manager" => Some(Self::Manager),
            "employee" => Some(Self::Employee),
            _ => None,
        }
    }

    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Employee => "employee",
        }
    }

    /// Admins and managers can be designated approvers.
    #[must_use]
    pub const fn can_approve(&self) -> bool {
        matches!(self, Self::Admin | Self::Manager)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT claims for access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (profile ID).
    pub sub: Uuid,
    /// Company the profile belongs to.
    pub company: Uuid,
    /// Profile role in the company.
    pub role: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a profile.
    #[must_use]
    pub fn new(profile_id: Uuid, company_id: Uuid, role: Role, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: profile_id,
            company: company_id,
            role: role.as_str().to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Builds the request context, or `None` if the role claim is unknown.
    #[must_use]
    pub fn context(&self) -> Option<RequestContext> {
        Role::parse(&self.role).map(|role| RequestContext {
            company_id: CompanyId::from_uuid(self.company),
            profile_id: ProfileId::from_uuid(self.sub),
            role,
        })
    }
}

/// Who is calling, scoped to one company.
///
/// Constructed once per request and passed by reference into the workflow
/// services; nothing in the core reads caller identity from globals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    /// Tenant the caller acts within.
    pub company_id: CompanyId,
    /// The caller's own profile.
    pub profile_id: ProfileId,
    /// The caller's role.
    pub role: Role,
}

impl RequestContext {
    /// Creates a context.
    #[must_use]
    pub const fn new(company_id: CompanyId, profile_id: ProfileId, role: Role) -> Self {
        Self {
            company_id,
            profile_id,
            role,
        }
    }

    /// Returns true for admins.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Returns true for admins and managers.
    #[must_use]
    pub fn can_review(&self) -> bool {
        self.role.can_approve()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_role_parse_roundtrip() {
        for role in [Role::Admin, Role::Manager, Role::Employee] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("MANAGER"), Some(Role::Manager));
        assert_eq!(Role::parse("owner"), None);
    }

    #[test]
    fn test_role_can_approve() {
        assert!(Role::Admin.can_approve());
        assert!(Role::Manager.can_approve());
        assert!(!Role::Employee.can_approve());
    }

    #[test]
    fn test_claims_context() {
        let profile_id = Uuid::new_v4();
        let company_id = Uuid::new_v4();
        let claims = Claims::new(
            profile_id,
            company_id,
            Role::Manager,
            Utc::now() + Duration::hours(1),
        );

        let ctx = claims.context().unwrap();
        assert_eq!(ctx.profile_id.into_inner(), profile_id);
        assert_eq!(ctx.company_id.into_inner(), company_id);
        assert!(ctx.can_review());
        assert!(!ctx.is_admin());
    }

    #[test]
    fn test_claims_unknown_role_has_no_context() {
        let mut claims = Claims::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Role::Employee,
            Utc::now() + Duration::hours(1),
        );
        claims.role = "superuser".to_string();
        assert!(claims.context().is_none());
    }
}
