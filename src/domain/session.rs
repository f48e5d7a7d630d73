//! Signed-in session shared by the API client and the forms.
//!
//! A [`Session`] is created once by the application shell and handed by
//! reference to whichever component needs it. It starts empty, is filled by
//! [`Session::init`] after sign-in and emptied by [`Session::clear`] on
//! sign-out.

use std::sync::{RwLock, RwLockReadGuard};

use serde::Deserialize;

use crate::domain::types::{AccessToken, ContactEmail, DisplayName, UserId};

/// Profile of the signed-in account.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub id: UserId,
    pub name: DisplayName,
    pub email: ContactEmail,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Clone, Debug)]
struct SessionState {
    token: AccessToken,
    user: UserProfile,
}

/// Credentials and profile for the current sign-in.
#[derive(Debug, Default)]
pub struct Session {
    state: RwLock<Option<SessionState>>,
}

impl Session {
    /// Creates a signed-out session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores credentials after a successful sign-in, replacing any previous ones.
    pub fn init(&self, token: AccessToken, user: UserProfile) {
        log::debug!("Session initialized for user {}", user.id);
        let mut guard = match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(SessionState { token, user });
    }

    /// Forgets credentials on sign-out.
    pub fn clear(&self) {
        let mut guard = match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = None;
    }

    pub fn token(&self) -> Option<AccessToken> {
        self.read().as_ref().map(|state| state.token.clone())
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.read().as_ref().map(|state| state.user.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<SessionState>> {
        match self.state.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> UserProfile {
        UserProfile {
            id: UserId::new(3).expect("valid id"),
            name: DisplayName::new("Awa K.").expect("valid name"),
            email: ContactEmail::new("a@k.com").expect("valid email"),
            phone: Some("+22670000000".to_string()),
            is_admin: false,
        }
    }

    #[test]
    fn init_and_clear_lifecycle() {
        let session = Session::new();
        assert!(!session.is_authenticated());
        assert!(session.token().is_none());

        session.init(AccessToken::new("tok-123").expect("token"), profile());
        assert!(session.is_authenticated());
        assert_eq!(session.token().map(|t| t.as_str().to_string()), Some("tok-123".into()));
        assert_eq!(session.user(), Some(profile()));

        session.clear();
        assert!(!session.is_authenticated());
        assert!(session.user().is_none());
    }
}
