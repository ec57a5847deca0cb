//! Authorization policy shared by every mutable entity.
//!
//! The checks are pure: they read the session store for presence only and
//! never refresh last access. Failure messages stay generic so callers cannot
//! tell which check rejected them.

use crate::error::{MediaListError, Result};
use crate::session::{Session, SessionStore};

pub const ADMIN_REQUIRED: &str = "Admin privileges required.";
pub const OWNER_OR_ADMIN_REQUIRED: &str = "Admin or owner privileges required.";

/// The session must exist and still be present in the store.
pub fn require_valid_session<'a>(
    sessions: &SessionStore,
    session: Option<&'a Session>,
) -> Result<&'a Session> {
    match session {
        Some(session) if sessions.contains(session.token()) => Ok(session),
        _ => Err(MediaListError::InvalidSession),
    }
}

pub fn require_admin<'a>(
    sessions: &SessionStore,
    session: Option<&'a Session>,
) -> Result<&'a Session> {
    let session = require_valid_session(sessions, session)?;
    if !session.is_admin() {
        log::warn!("Admin check failed for {}", session.username());
        return Err(MediaListError::Forbidden(ADMIN_REQUIRED));
    }
    Ok(session)
}

pub fn require_owner_or_admin<'a>(
    sessions: &SessionStore,
    session: Option<&'a Session>,
    owner: &str,
) -> Result<&'a Session> {
    let session = require_valid_session(sessions, session)?;
    if !(session.is_admin() || session.username() == owner) {
        log::warn!(
            "Owner check failed: {} is not {} and not admin",
            session.username(),
            owner
        );
        return Err(MediaListError::Forbidden(OWNER_OR_ADMIN_REQUIRED));
    }
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MIN_HASH_COST;
    use crate::session::DEFAULT_TIMEOUT;
    use crate::store::UserStore;

    fn store_with_admin(admin: &str) -> SessionStore {
        SessionStore::new(UserStore::new(MIN_HASH_COST), admin, DEFAULT_TIMEOUT)
    }

    #[test]
    fn test_missing_session_is_unauthorized() {
        let sessions = store_with_admin("admin");
        assert!(matches!(
            require_valid_session(&sessions, None),
            Err(MediaListError::InvalidSession)
        ));
    }

    #[test]
    fn test_closed_session_is_unauthorized() {
        let sessions = store_with_admin("admin");
        let session = sessions.open("alice");
        sessions.close(&session);

        assert!(matches!(
            require_owner_or_admin(&sessions, Some(&session), "alice"),
            Err(MediaListError::InvalidSession)
        ));
    }

    #[test]
    fn test_require_admin() {
        let sessions = store_with_admin("admin");
        let admin = sessions.open("admin");
        let alice = sessions.open("alice");

        assert!(require_admin(&sessions, Some(&admin)).is_ok());
        assert!(matches!(
            require_admin(&sessions, Some(&alice)),
            Err(MediaListError::Forbidden(ADMIN_REQUIRED))
        ));
    }

    #[test]
    fn test_owner_or_admin_matrix() {
        let plain = store_with_admin("admin");
        let bob = plain.open("bob");
        assert!(matches!(
            require_owner_or_admin(&plain, Some(&bob), "alice"),
            Err(MediaListError::Forbidden(OWNER_OR_ADMIN_REQUIRED))
        ));

        let alice = plain.open("alice");
        assert!(require_owner_or_admin(&plain, Some(&alice), "alice").is_ok());

        let bob_is_admin = store_with_admin("bob");
        let admin_bob = bob_is_admin.open("bob");
        assert!(admin_bob.is_admin());
        assert!(require_owner_or_admin(&bob_is_admin, Some(&admin_bob), "alice").is_ok());
    }
}
