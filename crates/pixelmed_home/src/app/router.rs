use nav_engine::{MountContext, ZoneAction, ZoneHandler, LOGIN_ROUTE};
use tracing::info;

pub(crate) const HOME_ROUTE: &str = "/home";

/// Stored credentials as handed over by the login flow. The token itself is
/// opaque here; only its presence matters.
#[derive(Debug, Clone, Default)]
pub(crate) struct Session {
    token: Option<String>,
    role_claim: Option<String>,
}

impl Session {
    pub(crate) fn new(token: Option<String>, role_claim: Option<String>) -> Self {
        Self {
            token: token.filter(|token| !token.trim().is_empty()),
            role_claim,
        }
    }

    pub(crate) fn is_present(&self) -> bool {
        self.token.is_some()
    }

    pub(crate) fn role_claim(&self) -> Option<&str> {
        self.role_claim.as_deref()
    }

    fn clear(&mut self) {
        self.token = None;
        self.role_claim = None;
    }
}

/// Routing and session collaborator for the home screen.
#[derive(Debug)]
pub(crate) struct HomeRouter {
    route: String,
    history: Vec<String>,
    session: Session,
}

impl HomeRouter {
    pub(crate) fn new(session: Session) -> Self {
        Self {
            route: HOME_ROUTE.to_string(),
            history: Vec::new(),
            session,
        }
    }

    pub(crate) fn current_route(&self) -> &str {
        &self.route
    }

    pub(crate) fn is_home(&self) -> bool {
        self.route == HOME_ROUTE
    }

    pub(crate) fn history(&self) -> &[String] {
        &self.history
    }

    pub(crate) fn session(&self) -> &Session {
        &self.session
    }

    pub(crate) fn mount_context(&self) -> MountContext {
        if self.session.is_present() {
            MountContext::signed_in(self.session.role_claim())
        } else {
            MountContext::signed_out()
        }
    }

    /// Back to the home screen; refused without a session.
    pub(crate) fn go_home(&mut self) -> bool {
        if !self.session.is_present() {
            info!(route = %self.route, "go_home_refused_no_session");
            return false;
        }
        self.navigate(HOME_ROUTE);
        true
    }
}

impl ZoneHandler for HomeRouter {
    fn navigate(&mut self, path: &str) {
        if self.route == path {
            return;
        }
        info!(from = %self.route, to = path, "route_changed");
        let previous = std::mem::replace(&mut self.route, path.to_string());
        self.history.push(previous);
    }

    fn invoke(&mut self, action: ZoneAction) {
        match action {
            ZoneAction::Logout => {
                self.session.clear();
                info!("session_cleared");
                self.navigate(LOGIN_ROUTE);
            }
        }
    }
}
