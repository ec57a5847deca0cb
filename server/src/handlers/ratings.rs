use actix_web::http::{Method, StatusCode};
use serde_json::json;

use super::fields::{optional_i64, optional_string, required_i64, segments};
use crate::{
    auth,
    error::{MediaListError, Result},
    http::{Handler, RequestContext},
    store::{validate_rating_value, MediaStore, Rating, RatingDraft, RatingStore},
};

const PREFIX: &str = "/ratings";
const ANONYMOUS: &str = "anonymous";

pub struct RatingHandler {
    ratings: RatingStore,
    media: MediaStore,
}

impl RatingHandler {
    pub fn new(ratings: RatingStore, media: MediaStore) -> Self {
        Self { ratings, media }
    }

    fn create(&self, ctx: &mut RequestContext) -> Result<()> {
        let owner = match ctx.session() {
            Some(session) => session.username().to_string(),
            None => optional_string(ctx.content(), "username")?
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| ANONYMOUS.to_string()),
        };

        let content = ctx.content();
        let media_id = u64::try_from(required_i64(content, "mediaId")?)
            .map_err(|_| MediaListError::invalid_field("mediaId", "a valid media id"))?;
        let value = validate_rating_value(required_i64(content, "value")?)?;
        let comment = optional_string(content, "comment")?.unwrap_or_default();

        if !self.media.exists(media_id) {
            return Err(MediaListError::NotFound("Media entry not found."));
        }

        let rating = self.ratings.create(
            RatingDraft {
                media_id,
                value,
                comment,
            },
            &owner,
        );

        ctx.respond(
            StatusCode::OK,
            json!({ "success": true, "message": "Rating created.", "id": rating.id }),
        );
        Ok(())
    }

    fn load(&self, id: u64) -> Result<Rating> {
        self.ratings
            .get(id)
            .ok_or(MediaListError::NotFound("Rating not found."))
    }

    fn get(&self, ctx: &mut RequestContext, id: u64) -> Result<()> {
        let rating = self.load(id)?;
        ctx.respond(
            StatusCode::OK,
            json!({
                "success": true,
                "data": {
                    "id": rating.id,
                    "username": rating.username,
                    "mediaId": rating.media_id,
                    "value": rating.value,
                    "comment": rating.comment,
                }
            }),
        );
        Ok(())
    }

    fn update(&self, ctx: &mut RequestContext, id: u64) -> Result<()> {
        let mut rating = self.load(id)?;
        let session =
            auth::require_owner_or_admin(ctx.sessions(), ctx.session(), &rating.username)?.clone();
        rating.begin_edit(ctx.sessions(), &session)?;

        let content = ctx.content();
        if let Some(value) = optional_i64(content, "value")? {
            rating.value = validate_rating_value(value)?;
        }
        if let Some(comment) = optional_string(content, "comment")? {
            rating.comment = comment;
        }

        self.ratings.save(ctx.sessions(), &mut rating)?;
        ctx.respond(
            StatusCode::OK,
            json!({ "success": true, "message": "Rating updated." }),
        );
        Ok(())
    }

    fn delete(&self, ctx: &mut RequestContext, id: u64) -> Result<()> {
        let mut rating = self.load(id)?;
        let session =
            auth::require_owner_or_admin(ctx.sessions(), ctx.session(), &rating.username)?.clone();
        rating.begin_edit(ctx.sessions(), &session)?;
        self.ratings.delete(ctx.sessions(), &mut rating)?;

        ctx.respond(
            StatusCode::OK,
            json!({ "success": true, "message": "Rating deleted." }),
        );
        Ok(())
    }

    fn route(&self, ctx: &mut RequestContext) -> Result<()> {
        let path = ctx.path().to_string();
        let method = ctx.method().clone();

        match segments(&path).as_slice() {
            ["ratings"] if method == Method::POST => self.create(ctx),
            ["ratings", raw_id]
                if [Method::GET, Method::PUT, Method::DELETE].contains(&method) =>
            {
                let id: u64 = raw_id
                    .parse()
                    .map_err(|_| MediaListError::Validation("Invalid rating id.".to_string()))?;
                match method {
                    Method::GET => self.get(ctx, id),
                    Method::PUT => self.update(ctx, id),
                    _ => self.delete(ctx, id),
                }
            }
            _ => Err(MediaListError::InvalidEndpoint("Invalid ratings endpoint.")),
        }
    }
}

impl Handler for RatingHandler {
    fn name(&self) -> &'static str {
        "ratings"
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
