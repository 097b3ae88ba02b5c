use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// The signed-in user, as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    /// Profile display name. Accounts created without one report `None`.
    pub display_name: Option<String>,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, display_name: Option<&str>) -> Self {
        Self {
            user_id: UserId(user_id.into()),
            display_name: display_name.map(str::to_string),
        }
    }
}

/// Source of the current identity. Queried once per operation, so sign-in
/// and sign-out take effect on the next send or notification.
pub trait IdentityProvider: Send + Sync + 'static {
    /// `None` when nobody is signed in.
    fn current_user(&self) -> Option<Identity>;
}

/// An identity held in memory, switched by whatever drives sign-in.
#[derive(Debug, Default)]
pub struct StaticIdentity {
    current: RwLock<Option<Identity>>,
}

impl StaticIdentity {
    pub fn new(identity: Option<Identity>) -> Self {
        Self {
            current: RwLock::new(identity),
        }
    }

    pub fn sign_in(&self, identity: Identity) {
        if let Ok(mut guard) = self.current.write() {
            *guard = Some(identity);
        }
    }

    pub fn sign_out(&self) {
        if let Ok(mut guard) = self.current.write() {
            *guard = None;
        }
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user(&self) -> Option<Identity> {
        self.current.read().ok().and_then(|guard| guard.clone())
    }
}
