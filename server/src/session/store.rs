use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{MediaListError, Result};
use crate::store::UserStore;

const TOKEN_ALPHABET: &[u8] = b"1234567890abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

pub const TOKEN_LENGTH: usize = 24;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Identity bound to a bearer token. The admin flag is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
    username: String,
    is_admin: bool,
}

impl Session {
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }
}

#[derive(Debug)]
struct SessionEntry {
    session: Session,
    last_access: DateTime<Utc>,
}

impl SessionEntry {
    fn is_expired(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        // A negative age (clock stepped backwards) never expires a session.
        (now - self.last_access)
            .to_std()
            .map(|age| age > timeout)
            .unwrap_or(false)
    }
}

pub fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    (0..TOKEN_LENGTH)
        .map(|_| TOKEN_ALPHABET[rng.gen_range(0..TOKEN_ALPHABET.len())] as char)
        .collect()
}

#[derive(Clone)]
pub struct SessionStore {
    // token -> SessionEntry
    sessions: Arc<DashMap<String, SessionEntry>>,
    users: UserStore,
    admin_username: Arc<str>,
    timeout: Duration,
}

impl SessionStore {
    pub fn new(users: UserStore, admin_username: &str, timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            users,
            admin_username: Arc::from(admin_username),
            timeout,
        }
    }

    /// The admin name is never available for registration.
    pub fn is_reserved(&self, username: &str) -> bool {
        username == &*self.admin_username
    }

    /// Checks credentials and opens a session. The admin username is always
    /// accepted; everyone else needs a registered user with a matching password.
    pub fn create(&self, username: &str, password: &str) -> Result<Session> {
        self.sweep();

        if self.is_reserved(username) {
            return Ok(self.open(username));
        }

        if username.is_empty() || !self.users.verify_credentials(username, password)? {
            log::warn!("Failed login attempt for user: {}", username);
            return Err(MediaListError::InvalidCredentials);
        }

        Ok(self.open(username))
    }

    /// Issues a session without a credential check.
    pub fn open(&self, username: &str) -> Session {
        let session = Session {
            token: generate_token(),
            username: username.to_string(),
            is_admin: self.is_reserved(username),
        };

        self.sessions.insert(
            session.token.clone(),
            SessionEntry {
                session: session.clone(),
                last_access: Utc::now(),
            },
        );

        log::info!(
            "Created session for {}{}",
            session.username,
            if session.is_admin { " (admin)" } else { "" }
        );

        session
    }

    /// Looks a token up and refreshes its last access. Expired sessions are
    /// swept first.
    pub fn get(&self, token: &str) -> Option<Session> {
        self.sweep();

        let mut entry = self.sessions.get_mut(token)?;
        entry.last_access = Utc::now();
        Some(entry.session.clone())
    }

    /// Presence check without touching last access.
    pub fn contains(&self, token: &str) -> bool {
        self.sessions.contains_key(token)
    }

    pub fn close(&self, session: &Session) -> bool {
        let removed = self.sessions.remove(session.token()).is_some();
        if removed {
            log::info!("Closed session for {}", session.username());
        }
        removed
    }

    /// Drops every session belonging to `username`.
    pub fn close_user(&self, username: &str) -> usize {
        let mut removed = 0;
        self.sessions.retain(|_, entry| {
            let keep = entry.session.username != username;
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    pub fn sweep(&self) -> usize {
        let now = Utc::now();
        let timeout = self.timeout;
        let mut removed = 0;

        self.sessions.retain(|_, entry| {
            if entry.is_expired(now, timeout) {
                log::debug!("Expired session for {}", entry.session.username);
                removed += 1;
                false
            } else {
                true
            }
        });

        removed
    }

    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }

    #[cfg(test)]
    pub(crate) fn backdate(&self, token: &str, by: Duration) {
        if let Some(mut entry) = self.sessions.get_mut(token) {
            let by = chrono::Duration::from_std(by).expect("backdate fits");
            entry.last_access = entry.last_access - by;
        }
    }
}
