use crate::{
    models::{role::Role, session::Session, user::UserProfile},
    services::session_store::{SessionStorage, SessionStore},
};

/// The session as read once at the start of a request.
///
/// Consumers read this snapshot instead of going back to storage; call
/// [`SessionContext::refresh`] after anything that writes the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    session: Option<Session>,
}

impl SessionContext {
    /// Reads the current session from `store`.
    pub fn load<S: SessionStorage>(store: &SessionStore<S>) -> Self {
        Self {
            session: store.get_session(),
        }
    }

    /// A context with no signed-in user.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Wraps an already-known session.
    pub fn from_session(session: Session) -> Self {
        Self {
            session: Some(session),
        }
    }

    /// Re-reads the session from `store`.
    pub fn refresh<S: SessionStorage>(&mut self, store: &SessionStore<S>) {
        self.session = store.get_session();
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.session.as_ref().map(|s| &s.user)
    }

    pub fn role(&self) -> Option<Role> {
        self.session.as_ref().map(Session::role)
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }
}
