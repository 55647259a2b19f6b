//! Observed authentication state.
//!
//! Sign-in itself happens in a third-party service; this module only holds
//! the resulting session and tells subscribers when it changes.

use serde::{Deserialize, Serialize};

/// An authenticated session handed over by the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub access_token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn Fn(Option<&Session>)>;

/// Current session plus change listeners.
#[derive(Default)]
pub struct AuthState {
    session: Option<Session>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl AuthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            session: Some(session),
            ..Self::default()
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Register a listener. It is called immediately with the current
    /// session and again on every change.
    pub fn subscribe(&mut self, listener: impl Fn(Option<&Session>) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        listener(self.session.as_ref());
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `false` if the id was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    /// Replace the session. Listeners only fire when it actually changes.
    pub fn set_session(&mut self, session: Option<Session>) {
        if self.session == session {
            return;
        }
        tracing::info!(
            authenticated = session.is_some(),
            user = session.as_ref().map(|s| s.email.as_str()).unwrap_or(""),
            "auth state changed"
        );
        self.session = session;
        for (_, listener) in &self.listeners {
            listener(self.session.as_ref());
        }
    }

    pub fn clear(&mut self) {
        self.set_session(None);
    }
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("authenticated", &self.is_authenticated())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn session(email: &str) -> Session {
        Session {
            user_id: "u-1".into(),
            email: email.into(),
            access_token: "token".into(),
        }
    }

    #[test]
    fn subscribe_fires_immediately_and_on_change() {
        let seen: Rc<RefCell<Vec<Option<String>>>> = Rc::default();
        let mut auth = AuthState::new();
        let sink = Rc::clone(&seen);
        auth.subscribe(move |s| sink.borrow_mut().push(s.map(|s| s.email.clone())));

        auth.set_session(Some(session("a@example.test")));
        auth.set_session(Some(session("a@example.test")));
        auth.clear();

        assert_eq!(
            *seen.borrow(),
            vec![None, Some("a@example.test".to_string()), None]
        );
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let count = Rc::new(RefCell::new(0));
        let mut auth = AuthState::new();
        let c = Rc::clone(&count);
        let id = auth.subscribe(move |_| *c.borrow_mut() += 1);
        assert!(auth.unsubscribe(id));
        assert!(!auth.unsubscribe(id));
        auth.set_session(Some(session("b@example.test")));
        assert_eq!(*count.borrow(), 1);
        assert!(auth.is_authenticated());
    }
}
