use actix_web::{
    dev::ServerHandle,
    http::StatusCode,
    middleware as actix_middleware, web, App, HttpRequest, HttpResponse, HttpServer,
    ResponseError,
};
use serde_json::json;
use std::any::Any;
use std::net::SocketAddr;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use super::chain::HandlerChain;
use super::context::RequestContext;
use crate::config::HttpConfig;
use crate::session::SessionStore;
use crate::store::table::lock;

pub const NOT_FOUND_REASON: &str = "Not found.";

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Handler panicked.".to_string()
    }
}

/// Entry point for every request: build the context, run the chain, then
/// make sure exactly one response comes out.
pub async fn dispatch_request(
    req: HttpRequest,
    body: web::Bytes,
    chain: web::Data<HandlerChain>,
    sessions: web::Data<SessionStore>,
) -> HttpResponse {
    let mut ctx = match RequestContext::from_request(&req, &body, sessions.get_ref().clone()) {
        Ok(ctx) => ctx,
        Err(err) => {
            log::warn!("Rejected {} {}: {}", req.method(), req.path(), err);
            return err.error_response();
        }
    };

    let failure = match panic::catch_unwind(AssertUnwindSafe(|| chain.dispatch(&mut ctx))) {
        Ok(Ok(())) => None,
        Ok(Err(err)) => Some(err.to_string()),
        Err(payload) => Some(panic_message(payload.as_ref())),
    };

    if let Some(reason) = failure {
        log::error!("Unhandled failure on {} {}: {}", ctx.method(), ctx.path(), reason);
        if !ctx.responded() {
            ctx.respond(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "success": false, "reason": reason }),
            );
        }
    }

    if !ctx.responded() {
        ctx.respond(
            StatusCode::NOT_FOUND,
            json!({ "success": false, "reason": NOT_FOUND_REASON }),
        );
    }

    ctx.into_response()
        .unwrap_or_else(|| HttpResponse::InternalServerError().finish())
}

enum ListenerState {
    Stopped,
    Running {
        handle: ServerHandle,
        addrs: Vec<SocketAddr>,
    },
}

/// Accepts connections and feeds every request through the handler chain.
///
/// `Stopped -> Running` on [`run`](Self::run), back to `Stopped` on
/// [`stop`](Self::stop). Each request is served by an actix worker
/// independently of the others.
pub struct HttpRestServer {
    config: HttpConfig,
    chain: Arc<HandlerChain>,
    sessions: SessionStore,
    state: Mutex<ListenerState>,
}

impl HttpRestServer {
    pub fn new(config: HttpConfig, chain: HandlerChain, sessions: SessionStore) -> Self {
        Self {
            config,
            chain: Arc::new(chain),
            sessions,
            state: Mutex::new(ListenerState::Stopped),
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(*lock(&self.state), ListenerState::Running { .. })
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        match &*lock(&self.state) {
            ListenerState::Running { addrs, .. } => addrs.first().copied(),
            ListenerState::Stopped => None,
        }
    }

    /// Binds and serves until [`stop`](Self::stop) is called. Calling it on a
    /// running server returns immediately.
    pub async fn run(&self) -> std::io::Result<()> {
        let server = {
            let mut state = lock(&self.state);
            if matches!(*state, ListenerState::Running { .. }) {
                log::warn!("HTTP listener is already running");
                return Ok(());
            }

            if self.chain.is_empty() {
                log::warn!("HTTP listener starting with no handlers; every request will be 404");
            }

            let chain = web::Data::from(self.chain.clone());
            let sessions = web::Data::new(self.sessions.clone());

            let http = HttpServer::new(move || {
                App::new()
                    .app_data(chain.clone())
                    .app_data(sessions.clone())
                    .wrap(actix_middleware::Logger::default())
                    .default_service(web::to(dispatch_request))
            })
            .workers(self.config.workers.max(1))
            .bind((self.config.host.as_str(), self.config.port))?;

            let addrs = http.addrs();
            let server = http.run();
            *state = ListenerState::Running {
                handle: server.handle(),
                addrs: addrs.clone(),
            };

            log::info!(
                "HTTP listener running on {:?} with handlers {:?}",
                addrs,
                self.chain.names()
            );
            server
        };

        let result = server.await;
        *lock(&self.state) = ListenerState::Stopped;
        log::info!("HTTP listener stopped");
        result
    }

    /// Closes the listening socket and waits for in-flight requests.
    pub async fn stop(&self) {
        let previous = std::mem::replace(&mut *lock(&self.state), ListenerState::Stopped);
        if let ListenerState::Running { handle, .. } = previous {
            log::info!("Stopping HTTP listener");
            handle.stop(true).await;
        }
    }
}
