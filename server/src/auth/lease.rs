use super::guard;
use crate::error::Result;
use crate::session::{Session, SessionStore};

/// The session an entity is currently being edited under.
///
/// Entities carry one of these as a field. A store's `save`/`delete` checks
/// the recorded session against the guard and then ends the edit.
#[derive(Debug, Clone, Default)]
pub struct EditLease {
    session: Option<Session>,
}

impl EditLease {
    /// Records the session even when it turns out to be invalid, so a later
    /// check reports the same failure.
    pub fn begin(&mut self, sessions: &SessionStore, session: &Session) -> Result<()> {
        self.session = Some(session.clone());
        self.ensure_valid(sessions).map(|_| ())
    }

    pub fn ensure_valid(&self, sessions: &SessionStore) -> Result<&Session> {
        guard::require_valid_session(sessions, self.session.as_ref())
    }

    pub fn ensure_admin(&self, sessions: &SessionStore) -> Result<&Session> {
        guard::require_admin(sessions, self.session.as_ref())
    }

    pub fn ensure_owner_or_admin(&self, sessions: &SessionStore, owner: &str) -> Result<&Session> {
        guard::require_owner_or_admin(sessions, self.session.as_ref(), owner)
    }

    pub fn end(&mut self) {
        self.session = None;
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MIN_HASH_COST;
    use crate::error::MediaListError;
    use crate::session::DEFAULT_TIMEOUT;
    use crate::store::UserStore;

    fn sessions() -> SessionStore {
        SessionStore::new(UserStore::new(MIN_HASH_COST), "admin", DEFAULT_TIMEOUT)
    }

    #[test]
    fn test_begin_with_closed_session_fails_but_records_it() {
        let sessions = sessions();
        let alice = sessions.open("alice");
        sessions.close(&alice);

        let mut lease = EditLease::default();
        assert!(matches!(
            lease.begin(&sessions, &alice),
            Err(MediaListError::InvalidSession)
        ));
        assert!(lease.is_open());
        assert!(lease.ensure_valid(&sessions).is_err());
    }

    #[test]
    fn test_lease_revalidates_after_session_closes() {
        let sessions = sessions();
        let alice = sessions.open("alice");

        let mut lease = EditLease::default();
        lease.begin(&sessions, &alice).unwrap();
        assert!(lease.ensure_owner_or_admin(&sessions, "alice").is_ok());

        sessions.close(&alice);
        assert!(lease.ensure_owner_or_admin(&sessions, "alice").is_err());
    }

    #[test]
    fn test_end_clears_session() {
        let sessions = sessions();
        let admin = sessions.open("admin");

        let mut lease = EditLease::default();
        lease.begin(&sessions, &admin).unwrap();
        assert!(lease.ensure_admin(&sessions).is_ok());

        lease.end();
        assert!(!lease.is_open());
        assert!(lease.ensure_admin(&sessions).is_err());
    }
}
