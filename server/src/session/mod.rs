pub mod store;

pub use store::{generate_token, Session, SessionStore, DEFAULT_TIMEOUT, TOKEN_LENGTH};
