//! Role gate for client views
//!
//! Nothing is decided while the session or the role is still loading; a
//! missing session sends the user to sign in and remembers where they came
//! from, a signed-in user without the role goes home.

use shared::models::Role;

use crate::identity::SessionState;
use crate::{ClientResult, HttpClient};

/// Role of the signed-in user as seen by the UI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RoleState {
    #[default]
    Unresolved,
    /// The server did not accept the session
    Absent,
    Resolved(Role),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redirect {
    /// Sign-in page; return to `from` afterwards
    SignIn { from: String },
    Home,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Still loading; render nothing yet
    Pending,
    Allow,
    Redirect(Redirect),
}

/// Decide whether a view guarded by `allowed` may render; an empty list admits any signed-in user
pub fn authorize(
    session: &SessionState,
    role: &RoleState,
    allowed: &[Role],
    from: &str,
) -> GateDecision {
    let sign_in = || {
        GateDecision::Redirect(Redirect::SignIn {
            from: from.to_string(),
        })
    };

    match (session, role) {
        (SessionState::Unresolved, _) => GateDecision::Pending,
        (SessionState::Absent, _) => sign_in(),
        (SessionState::Present(_), RoleState::Unresolved) => GateDecision::Pending,
        (SessionState::Present(_), RoleState::Absent) => sign_in(),
        (SessionState::Present(_), RoleState::Resolved(role)) => {
            if allowed.is_empty() || role.is_any_of(allowed) {
                GateDecision::Allow
            } else {
                GateDecision::Redirect(Redirect::Home)
            }
        }
    }
}

/// Ask the server which role the current session carries
pub async fn resolve_role(http: &HttpClient, session: &SessionState) -> ClientResult<RoleState> {
    let session = match session {
        SessionState::Unresolved => return Ok(RoleState::Unresolved),
        SessionState::Absent => return Ok(RoleState::Absent),
        SessionState::Present(session) => session,
    };

    match http.with_token(&session.access_token).me().await {
        Ok(user) => Ok(RoleState::Resolved(user.role)),
        Err(e) if e.is_unauthorized() => {
            tracing::debug!(error = %e, "Session rejected by server");
            Ok(RoleState::Absent)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::tests::session_for;

    fn signed_in() -> SessionState {
        SessionState::Present(session_for("u-1", "a@x.com"))
    }

    #[test]
    fn test_pending_while_loading() {
        let decision = authorize(
            &SessionState::Unresolved,
            &RoleState::Unresolved,
            Role::BACK_OFFICE,
            "/admin",
        );
        assert_eq!(decision, GateDecision::Pending);

        let decision = authorize(&signed_in(), &RoleState::Unresolved, Role::BACK_OFFICE, "/admin");
        assert_eq!(decision, GateDecision::Pending);
    }

    #[test]
    fn test_signed_out_goes_to_sign_in_with_origin() {
        let decision = authorize(
            &SessionState::Absent,
            &RoleState::Unresolved,
            Role::BACK_OFFICE,
            "/admin",
        );
        assert_eq!(
            decision,
            GateDecision::Redirect(Redirect::SignIn {
                from: "/admin".into()
            })
        );

        let decision = authorize(&signed_in(), &RoleState::Absent, &[], "/cart");
        assert!(matches!(decision, GateDecision::Redirect(Redirect::SignIn { .. })));
    }

    #[test]
    fn test_role_check() {
        let staff = RoleState::Resolved(Role::Staff);
        assert_eq!(
            authorize(&signed_in(), &staff, Role::BACK_OFFICE, "/admin"),
            GateDecision::Allow
        );
        assert_eq!(
            authorize(&signed_in(), &staff, Role::ADMIN_ONLY, "/admin/users"),
            GateDecision::Redirect(Redirect::Home)
        );

        let customer = RoleState::Resolved(Role::Customer);
        assert_eq!(authorize(&signed_in(), &customer, &[], "/cart"), GateDecision::Allow);
    }

    #[tokio::test]
    async fn test_resolve_role_without_session_skips_network() {
        let http = HttpClient::new(&crate::ClientConfig::new("http://127.0.0.1:9")).unwrap();
        assert_eq!(resolve_role(&http, &SessionState::Absent).await.unwrap(), RoleState::Absent);
        assert_eq!(
            resolve_role(&http, &SessionState::Unresolved).await.unwrap(),
            RoleState::Unresolved
        );
    }
}
