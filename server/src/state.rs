use crate::config::ServerConfig;
use crate::handlers::{MediaHandler, RatingHandler, SessionHandler, UserHandler, VersionHandler};
use crate::http::{Handler, HandlerChain};
use crate::session::SessionStore;
use crate::store::{MediaStore, RatingStore, UserStore};

/// Every store the process owns. Cloning shares the same underlying maps.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub users: UserStore,
    pub media: MediaStore,
    pub ratings: RatingStore,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Self {
        let users = UserStore::new(config.users.password_hash_cost);
        let sessions = SessionStore::new(
            users.clone(),
            &config.sessions.admin_username,
            config.session_timeout(),
        );

        Self {
            sessions,
            users,
            media: MediaStore::new(),
            ratings: RatingStore::new(),
        }
    }

    /// The fixed dispatch order: sessions, users, media, ratings, version.
    pub fn handler_chain(&self) -> HandlerChain {
        let handlers: Vec<Box<dyn Handler>> = vec![
            Box::new(SessionHandler),
            Box::new(UserHandler::new(self.users.clone())),
            Box::new(MediaHandler::new(self.media.clone())),
            Box::new(RatingHandler::new(self.ratings.clone(), self.media.clone())),
            Box::new(VersionHandler),
        ];
        HandlerChain::new(handlers)
    }
}
