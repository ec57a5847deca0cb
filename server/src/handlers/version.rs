use actix_web::http::{Method, StatusCode};
use serde_json::json;

use crate::{
    error::MediaListError,
    http::{Handler, RequestContext},
};

const PREFIX: &str = "/version";

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Read-only `GET /version` probe.
pub struct VersionHandler;

impl Handler for VersionHandler {
    fn name(&self) -> &'static str {
        "version"
    }

    fn handle(&self, ctx: &mut RequestContext) -> anyhow::Result<()> {
        if !ctx.path().starts_with(PREFIX) {
            return Ok(());
        }

        if ctx.path() == PREFIX && *ctx.method() == Method::GET {
            ctx.respond(StatusCode::OK, json!({ "success": true, "version": VERSION }));
        } else {
            ctx.respond_error(&MediaListError::InvalidEndpoint("Invalid version endpoint."));
        }
        Ok(())
    }
}
