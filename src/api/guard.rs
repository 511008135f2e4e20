//! Request authorization gate.
//!
//! Every inbound request is matched against an ordered table of protected
//! path prefixes. Unmatched paths are public. Matched paths require a valid
//! identity token whose role is a member of the rule's role set; every
//! denial is a redirect, never a hard failure.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;

use crate::db::Role;
use crate::AppState;

use super::auth::{extract_token, verify_token};

const LOGIN_REDIRECT: &str = "/auth";
const UNAUTHORIZED_REDIRECT: &str = "/unauthorized";

pub struct RouteRule {
    pub prefix: &'static str,
    pub roles: &'static [Role],
}

/// Ordered table of protected prefixes; the first match wins
const PROTECTED_ROUTES: &[RouteRule] = &[
    RouteRule {
        prefix: "/dashboard/admin",
        roles: &[Role::Admin],
    },
    RouteRule {
        prefix: "/dashboard/user",
        roles: &[Role::User],
    },
    RouteRule {
        prefix: "/coupon",
        roles: &[Role::Admin],
    },
    RouteRule {
        prefix: "/estimate",
        roles: &[Role::User, Role::Admin],
    },
    RouteRule {
        prefix: "/profile",
        roles: &[Role::User, Role::Admin],
    },
    RouteRule {
        prefix: "/sell",
        roles: &[Role::User, Role::Admin],
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    RedirectLogin,
    RedirectUnauthorized,
}

fn matched_rule(path: &str) -> Option<&'static RouteRule> {
    PROTECTED_ROUTES.iter().find(|r| path.starts_with(r.prefix))
}

/// Stateless per-request evaluation of the gate
pub fn evaluate(path: &str, token: Option<&str>, secret: &str) -> GateDecision {
    let Some(rule) = matched_rule(path) else {
        return GateDecision::Allow;
    };

    let Some(token) = token else {
        return GateDecision::RedirectLogin;
    };

    let claims = match verify_token(token, secret) {
        Ok(claims) => claims,
        Err(_) => return GateDecision::RedirectLogin,
    };

    // Membership is a set test over the parsed role; substrings of a valid
    // role name must never pass
    match Role::parse(&claims.role) {
        Some(role) if rule.roles.contains(&role) => GateDecision::Allow,
        _ => GateDecision::RedirectUnauthorized,
    }
}

/// Middleware wrapping the whole router
pub async fn authorize(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let token = extract_token(request.headers());
    match evaluate(
        request.uri().path(),
        token.as_deref(),
        &state.config.auth.jwt_secret,
    ) {
        GateDecision::Allow => next.run(request).await,
        GateDecision::RedirectLogin => Redirect::to(LOGIN_REDIRECT).into_response(),
        GateDecision::RedirectUnauthorized => Redirect::to(UNAUTHORIZED_REDIRECT).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::auth::issue_token;

    const SECRET: &str = "gate-test-secret";

    fn token_for(role: &str) -> String {
        issue_token("u1", "u1@example.com", role, SECRET, 30).unwrap()
    }

    #[test]
    fn test_public_paths_allowed_without_token() {
        assert_eq!(evaluate("/", None, SECRET), GateDecision::Allow);
        assert_eq!(evaluate("/buy", None, SECRET), GateDecision::Allow);
        assert_eq!(evaluate("/buy/123", None, SECRET), GateDecision::Allow);
        assert_eq!(evaluate("/auth/login", None, SECRET), GateDecision::Allow);
        assert_eq!(evaluate("/health", None, SECRET), GateDecision::Allow);
    }

    #[test]
    fn test_missing_token_redirects_to_login() {
        assert_eq!(evaluate("/sell", None, SECRET), GateDecision::RedirectLogin);
        assert_eq!(
            evaluate("/dashboard/admin", None, SECRET),
            GateDecision::RedirectLogin
        );
    }

    #[test]
    fn test_invalid_or_expired_token_redirects_to_login() {
        assert_eq!(
            evaluate("/sell", Some("garbage"), SECRET),
            GateDecision::RedirectLogin
        );

        let expired = issue_token("u1", "u1@example.com", "user", SECRET, -1).unwrap();
        assert_eq!(
            evaluate("/sell", Some(&expired), SECRET),
            GateDecision::RedirectLogin
        );

        let wrong_secret = issue_token("u1", "u1@example.com", "user", "other", 30).unwrap();
        assert_eq!(
            evaluate("/sell", Some(&wrong_secret), SECRET),
            GateDecision::RedirectLogin
        );
    }

    #[test]
    fn test_admin_dashboard_gating() {
        let user = token_for("user");
        let admin = token_for("admin");

        assert_eq!(
            evaluate("/dashboard/admin", Some(&user), SECRET),
            GateDecision::RedirectUnauthorized
        );
        assert_eq!(
            evaluate("/dashboard/admin", Some(&admin), SECRET),
            GateDecision::Allow
        );
        assert_eq!(
            evaluate("/dashboard/user", Some(&admin), SECRET),
            GateDecision::RedirectUnauthorized
        );
    }

    #[test]
    fn test_coupon_routes_are_admin_only() {
        let user = token_for("user");
        let admin = token_for("admin");

        assert_eq!(
            evaluate("/coupon", Some(&user), SECRET),
            GateDecision::RedirectUnauthorized
        );
        assert_eq!(evaluate("/coupon", Some(&admin), SECRET), GateDecision::Allow);
    }

    #[test]
    fn test_sell_routes_allow_both_roles() {
        let user = token_for("user");
        let admin = token_for("admin");

        assert_eq!(evaluate("/sell", Some(&user), SECRET), GateDecision::Allow);
        assert_eq!(
            evaluate("/sell/abc123", Some(&admin), SECRET),
            GateDecision::Allow
        );
    }

    #[test]
    fn test_role_substrings_do_not_match() {
        // A "use" role must not pass a set containing "user"
        let truncated = token_for("use");
        assert_eq!(
            evaluate("/sell", Some(&truncated), SECRET),
            GateDecision::RedirectUnauthorized
        );

        let joined = token_for("user,admin");
        assert_eq!(
            evaluate("/sell", Some(&joined), SECRET),
            GateDecision::RedirectUnauthorized
        );
    }

    #[test]
    fn test_first_matching_prefix_wins() {
        // "/dashboard/admin" is listed before "/dashboard/user", so an
        // admin-only decision applies to everything under it
        let user = token_for("user");
        assert_eq!(
            evaluate("/dashboard/admin/reports", Some(&user), SECRET),
            GateDecision::RedirectUnauthorized
        );
    }
}
