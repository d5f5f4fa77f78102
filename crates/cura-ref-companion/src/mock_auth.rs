//! In-memory authentication provider.
//!
//! Stands in for the hosted auth service: accounts live in a `HashMap`,
//! session changes are broadcast over a `tokio::sync::watch` channel so the
//! gate can react to sign-ins and sign-outs the same way it would to real
//! auth-state callbacks.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::info;

use cura_contracts::{
    error::{CuraError, CuraResult},
    user::{Session, UserId},
};
use cura_core::traits::AuthProvider;

/// Minimum accepted password length, matching the hosted service's default.
const MIN_PASSWORD_LEN: usize = 6;

struct Account {
    password: String,
    user_id: UserId,
}

/// Mock auth backend with in-memory accounts and watch-channel session
/// broadcasting.
pub struct MockAuthProvider {
    accounts: Mutex<HashMap<String, Account>>,
    sender: watch::Sender<Option<Session>>,
}

impl MockAuthProvider {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self { accounts: Mutex::new(HashMap::new()), sender }
    }

    fn set_session(&self, session: Option<Session>) {
        // send() only fails with no receivers; the session state is still
        // updated for get_session(), so that is not an error here.
        let _ = self.sender.send(session);
    }

    fn make_session(&self, email: &str, user_id: UserId) -> Session {
        Session {
            user_id,
            email: email.to_string(),
            access_token: uuid::Uuid::new_v4().simple().to_string(),
            refresh_token: uuid::Uuid::new_v4().simple().to_string(),
        }
    }
}

impl Default for MockAuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthProvider for MockAuthProvider {
    async fn get_session(&self) -> CuraResult<Option<Session>> {
        Ok(self.sender.borrow().clone())
    }

    fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.sender.subscribe()
    }

    async fn sign_in(&self, email: &str, password: &str) -> CuraResult<Session> {
        let accounts = self.accounts.lock().map_err(|_| CuraError::AuthFailed {
            reason: "account registry is unavailable".to_string(),
        })?;

        let account = accounts
            .get(email)
            .filter(|account| account.password == password)
            .ok_or_else(|| CuraError::AuthFailed {
                reason: "invalid email or password".to_string(),
            })?;

        let session = self.make_session(email, account.user_id.clone());
        drop(accounts);

        info!(user_id = %session.user_id, "signed in");
        self.set_session(Some(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str) -> CuraResult<Session> {
        validate_email(email)?;
        if password.len() < MIN_PASSWORD_LEN {
            return Err(CuraError::AuthFailed {
                reason: format!("password must be at least {} characters", MIN_PASSWORD_LEN),
            });
        }

        let mut accounts = self.accounts.lock().map_err(|_| CuraError::AuthFailed {
            reason: "account registry is unavailable".to_string(),
        })?;
        if accounts.contains_key(email) {
            return Err(CuraError::AuthFailed {
                reason: "an account with this email already exists".to_string(),
            });
        }

        let user_id = UserId::new(uuid::Uuid::new_v4().simple().to_string());
        accounts.insert(
            email.to_string(),
            Account { password: password.to_string(), user_id: user_id.clone() },
        );
        drop(accounts);

        let session = self.make_session(email, user_id);
        info!(user_id = %session.user_id, "account created");
        self.set_session(Some(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> CuraResult<()> {
        info!("signed out");
        self.set_session(None);
        Ok(())
    }
}

fn validate_email(email: &str) -> CuraResult<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(CuraError::AuthFailed {
            reason: format!("'{}' is not a valid email address", email),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sign_up_then_sign_in_round_trip() {
        let auth = MockAuthProvider::new();
        let created = auth.sign_up("pat@example.com", "hunter22").await.unwrap();
        auth.sign_out().await.unwrap();
        assert_eq!(auth.get_session().await.unwrap(), None);

        let session = auth.sign_in("pat@example.com", "hunter22").await.unwrap();
        assert_eq!(session.user_id, created.user_id);
        assert_eq!(auth.get_session().await.unwrap(), Some(session));
    }

    #[tokio::test]
    async fn bad_credentials_are_rejected() {
        let auth = MockAuthProvider::new();
        auth.sign_up("pat@example.com", "hunter22").await.unwrap();

        assert!(matches!(
            auth.sign_in("pat@example.com", "wrong").await,
            Err(CuraError::AuthFailed { .. })
        ));
        assert!(matches!(
            auth.sign_in("nobody@example.com", "hunter22").await,
            Err(CuraError::AuthFailed { .. })
        ));
    }

    #[tokio::test]
    async fn sign_up_validates_email_and_password() {
        let auth = MockAuthProvider::new();
        assert!(matches!(
            auth.sign_up("not-an-email", "hunter22").await,
            Err(CuraError::AuthFailed { .. })
        ));
        assert!(matches!(
            auth.sign_up("pat@example.com", "short").await,
            Err(CuraError::AuthFailed { .. })
        ));
        // Duplicate registration.
        auth.sign_up("pat@example.com", "hunter22").await.unwrap();
        assert!(matches!(
            auth.sign_up("pat@example.com", "hunter22").await,
            Err(CuraError::AuthFailed { .. })
        ));
    }

    #[tokio::test]
    async fn session_changes_are_broadcast() {
        let auth = MockAuthProvider::new();
        let mut receiver = auth.subscribe();

        auth.sign_up("pat@example.com", "hunter22").await.unwrap();
        receiver.changed().await.unwrap();
        assert!(receiver.borrow_and_update().is_some());

        auth.sign_out().await.unwrap();
        receiver.changed().await.unwrap();
        assert!(receiver.borrow_and_update().is_none());
    }
}
