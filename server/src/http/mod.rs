pub mod chain;
pub mod context;
pub mod listener;

pub use chain::{Handler, HandlerChain};
pub use context::{bearer_token, RequestContext, JSON_CONTENT_TYPE};
pub use listener::{dispatch_request, HttpRestServer, NOT_FOUND_REASON};
