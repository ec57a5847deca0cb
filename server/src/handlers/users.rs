use actix_web::http::{Method, StatusCode};
use serde_json::json;

use super::fields::{optional_string, segments};
use crate::{
    auth,
    error::{MediaListError, Result},
    http::{Handler, RequestContext},
    store::{User, UserProfile, UserStore},
};

const PREFIX: &str = "/users";
const INVALID_ENDPOINT: &str = "Invalid user endpoint.";

/// Registration plus owner-or-admin profile management.
pub struct UserHandler {
    users: UserStore,
}

impl UserHandler {
    pub fn new(users: UserStore) -> Self {
        Self { users }
    }

    fn register(&self, ctx: &mut RequestContext) -> Result<()> {
        let content = ctx.content();
        let username = optional_string(content, "username")?.unwrap_or_default();
        let password = optional_string(content, "password")?
            .filter(|password| !password.is_empty())
            .ok_or_else(|| MediaListError::missing_field("password"))?;

        let mut user = User::new(&username)?;
        user.full_name = optional_string(content, "fullname")?.unwrap_or_default();
        user.email = optional_string(content, "email")?.unwrap_or_default();

        if ctx.sessions().is_reserved(user.username()) {
            return Err(MediaListError::Conflict(format!(
                "User '{}' already exists.",
                user.username()
            )));
        }

        user.set_password(&password, self.users.hash_cost())?;
        self.users.save(ctx.sessions(), &mut user)?;

        ctx.respond(
            StatusCode::OK,
            json!({ "success": true, "message": "User created." }),
        );
        Ok(())
    }

    fn list(&self, ctx: &mut RequestContext) -> Result<()> {
        auth::require_admin(ctx.sessions(), ctx.session())?;

        let profiles: Vec<UserProfile> = self.users.list().iter().map(User::profile).collect();
        ctx.respond(StatusCode::OK, json!({ "success": true, "data": profiles }));
        Ok(())
    }

    fn get(&self, ctx: &mut RequestContext, username: &str) -> Result<()> {
        auth::require_owner_or_admin(ctx.sessions(), ctx.session(), username)?;

        let user = self
            .users
            .get(username)
            .ok_or(MediaListError::NotFound("User not found."))?;
        ctx.respond(
            StatusCode::OK,
            json!({ "success": true, "data": user.profile() }),
        );
        Ok(())
    }

    fn update(&self, ctx: &mut RequestContext, username: &str) -> Result<()> {
        let session = auth::require_owner_or_admin(ctx.sessions(), ctx.session(), username)?.clone();

        let mut user = self
            .users
            .get(username)
            .ok_or(MediaListError::NotFound("User not found."))?;
        user.begin_edit(ctx.sessions(), &session)?;

        let content = ctx.content();
        if let Some(full_name) = optional_string(content, "fullname")? {
            user.full_name = full_name;
        }
        if let Some(email) = optional_string(content, "email")? {
            user.email = email;
        }
        if let Some(password) = optional_string(content, "password")? {
            if password.is_empty() {
                return Err(MediaListError::missing_field("password"));
            }
            user.set_password(&password, self.users.hash_cost())?;
        }

        self.users.save(ctx.sessions(), &mut user)?;
        ctx.respond(
            StatusCode::OK,
            json!({ "success": true, "data": user.profile() }),
        );
        Ok(())
    }

    fn delete(&self, ctx: &mut RequestContext, username: &str) -> Result<()> {
        let session = auth::require_owner_or_admin(ctx.sessions(), ctx.session(), username)?.clone();

        let mut user = self
            .users
            .get(username)
            .ok_or(MediaListError::NotFound("User not found."))?;
        user.begin_edit(ctx.sessions(), &session)?;
        self.users.delete(ctx.sessions(), &mut user)?;

        ctx.respond(
            StatusCode::OK,
            json!({ "success": true, "message": "User deleted." }),
        );
        Ok(())
    }

    fn route(&self, ctx: &mut RequestContext) -> Result<()> {
        let path = ctx.path().to_string();
        let method = ctx.method().clone();

        match (method, segments(&path).as_slice()) {
            (Method::POST, ["users"]) => self.register(ctx),
            (Method::GET, ["users"]) => self.list(ctx),
            (Method::GET, ["users", name]) => self.get(ctx, name),
            (Method::PUT, ["users", name]) => self.update(ctx, name),
            (Method::DELETE, ["users", name]) => self.delete(ctx, name),
            _ => Err(MediaListError::InvalidEndpoint(INVALID_ENDPOINT)),
        }
    }
}

impl Handler for UserHandler {
    fn name(&self) -> &'static str {
        "users"
    }

    fn handle(&self, ctx: &mut RequestContext) -> anyhow::Result<()> {
        if !ctx.path().starts_with(PREFIX) {
            return Ok(());
        }

        let outcome = self.route(ctx);
        ctx.finish(outcome);
        Ok(())
    }
}
