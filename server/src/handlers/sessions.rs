use actix_web::http::{Method, StatusCode};
use serde_json::json;

use super::fields::optional_string;
use crate::{
    auth,
    error::{MediaListError, Result},
    http::{Handler, RequestContext},
};

const PREFIX: &str = "/sessions";

/// Login (`POST /sessions`) and logout (`DELETE /sessions`).
pub struct SessionHandler;

impl SessionHandler {
    fn create(&self, ctx: &mut RequestContext) -> Result<()> {
        let username = optional_string(ctx.content(), "username")?.unwrap_or_default();
        let password = optional_string(ctx.content(), "password")?.unwrap_or_default();

        let session = ctx.sessions().create(&username, &password)?;
        log::info!("Successful login for user: {}", username);

        ctx.respond(
            StatusCode::OK,
            json!({ "success": true, "token": session.token() }),
        );
        Ok(())
    }

    fn close(&self, ctx: &mut RequestContext) -> Result<()> {
        let session = auth::require_valid_session(ctx.sessions(), ctx.session())?.clone();
        ctx.sessions().close(&session);

        ctx.respond(
            StatusCode::OK,
            json!({ "success": true, "message": "Session closed." }),
        );
        Ok(())
    }
}

impl Handler for SessionHandler {
    fn name(&self) -> &'static str {
        "sessions"
    }

    fn handle(&self, ctx: &mut RequestContext) -> anyhow::Result<()> {
        if !ctx.path().starts_with(PREFIX) {
            return Ok(());
        }

        let exact = ctx.path() == PREFIX;
        let outcome = match ctx.method().clone() {
            Method::POST if exact => self.create(ctx),
            Method::DELETE if exact => self.close(ctx),
            _ => Err(MediaListError::InvalidEndpoint("Invalid session endpoint.")),
        };

        ctx.finish(outcome);
        Ok(())
    }
}
