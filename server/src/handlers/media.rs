use actix_web::http::{Method, StatusCode};
use serde_json::{json, Map, Value};

use super::fields::{non_negative, optional_i64, optional_string, optional_string_list, segments};
use crate::{
    auth,
    error::{MediaListError, Result},
    http::{Handler, RequestContext},
    store::{MediaDraft, MediaEntry, MediaStore, MediaType},
};

const PREFIX: &str = "/api/media";
const ANONYMOUS: &str = "anonymous";

/// Media catalog CRUD under `/api/media`.
///
/// Creation is open to anonymous callers; the creator falls back to the
/// body's `createdBy` and then to `"anonymous"`. Updates and deletes need the
/// creator's session or an admin session.
pub struct MediaHandler {
    media: MediaStore,
}

impl MediaHandler {
    pub fn new(media: MediaStore) -> Self {
        Self { media }
    }

    fn list(&self, ctx: &mut RequestContext) -> Result<()> {
        let entries = self.media.list();
        ctx.respond(StatusCode::OK, json!({ "success": true, "data": entries }));
        Ok(())
    }

    fn create(&self, ctx: &mut RequestContext) -> Result<()> {
        let creator = match ctx.session() {
            Some(session) => session.username().to_string(),
            None => optional_string(ctx.content(), "createdBy")?
                .unwrap_or_else(|| ANONYMOUS.to_string()),
        };

        let draft = draft_from(ctx.content())?;
        let entry = self.media.create(draft, &creator)?;

        ctx.respond(StatusCode::CREATED, json!({ "success": true, "data": entry }));
        Ok(())
    }

    fn get(&self, ctx: &mut RequestContext, id: u64) -> Result<()> {
        let entry = self
            .media
            .get(id)
            .ok_or(MediaListError::NotFound("Not found."))?;
        ctx.respond(StatusCode::OK, json!({ "success": true, "data": entry }));
        Ok(())
    }

    fn update(&self, ctx: &mut RequestContext, id: u64) -> Result<()> {
        let mut entry = self
            .media
            .get(id)
            .ok_or(MediaListError::NotFound("Not found."))?;
        let session = auth::require_owner_or_admin(ctx.sessions(), ctx.session(), &entry.created_by)?
            .clone();
        entry.begin_edit(ctx.sessions(), &session)?;

        apply_changes(&mut entry, ctx.content())?;
        self.media.save(ctx.sessions(), &mut entry)?;

        ctx.respond(StatusCode::OK, json!({ "success": true, "data": entry }));
        Ok(())
    }

    fn delete(&self, ctx: &mut RequestContext, id: u64) -> Result<()> {
        let mut entry = self
            .media
            .get(id)
            .ok_or(MediaListError::NotFound("Not found."))?;
        let session = auth::require_owner_or_admin(ctx.sessions(), ctx.session(), &entry.created_by)?
            .clone();
        entry.begin_edit(ctx.sessions(), &session)?;
        self.media.delete(ctx.sessions(), &mut entry)?;

        ctx.respond(StatusCode::OK, json!({ "success": true }));
        Ok(())
    }

    fn route(&self, ctx: &mut RequestContext) -> Result<()> {
        let path = ctx.path().to_string();
        let method = ctx.method().clone();

        match segments(&path).as_slice() {
            ["api", "media"] => match method {
                Method::GET => self.list(ctx),
                Method::POST => self.create(ctx),
                _ => Err(MediaListError::MethodNotAllowed(
                    "Method not allowed on collection.",
                )),
            },
            ["api", "media", raw_id] => {
                let id: u64 = raw_id
                    .parse()
                    .map_err(|_| MediaListError::Validation("Invalid id.".to_string()))?;
                match method {
                    Method::GET => self.get(ctx, id),
                    Method::PUT => self.update(ctx, id),
                    Method::DELETE => self.delete(ctx, id),
                    _ => Err(MediaListError::MethodNotAllowed(
                        "Method not allowed on resource.",
                    )),
                }
            }
            _ => Err(MediaListError::InvalidEndpoint("Invalid media endpoint.")),
        }
    }
}

fn draft_from(content: &Map<String, Value>) -> Result<MediaDraft> {
    let title = optional_string(content, "title")?.unwrap_or_default();
    if title.trim().is_empty() {
        return Err(MediaListError::Validation("Title is required.".to_string()));
    }

    Ok(MediaDraft {
        title,
        description: optional_string(content, "description")?.unwrap_or_default(),
        media_type: optional_string(content, "type")?
            .map(|raw| MediaType::parse_lenient(&raw))
            .unwrap_or_default(),
        release_year: optional_i64(content, "releaseYear")?
            .map(|year| non_negative("releaseYear", year))
            .transpose()?
            .unwrap_or(0),
        genres: optional_string_list(content, "genres")?.unwrap_or_default(),
        age_restriction: optional_i64(content, "ageRestriction")?
            .map(|age| non_negative("ageRestriction", age))
            .transpose()?
            .unwrap_or(0),
    })
}

/// Partial update: only fields present in the body change.
fn apply_changes(entry: &mut MediaEntry, content: &Map<String, Value>) -> Result<()> {
    if let Some(title) = optional_string(content, "title")? {
        if title.trim().is_empty() {
            return Err(MediaListError::Validation("Title is required.".to_string()));
        }
        entry.title = title;
    }
    if let Some(description) = optional_string(content, "description")? {
        entry.description = description;
    }
    if let Some(raw) = optional_string(content, "type")? {
        entry.media_type = MediaType::parse_lenient(&raw);
    }
    if let Some(year) = optional_i64(content, "releaseYear")? {
        entry.release_year = non_negative("releaseYear", year)?;
    }
    if let Some(genres) = optional_string_list(content, "genres")? {
        entry.genres = genres;
    }
    if let Some(age) = optional_i64(content, "ageRestriction")? {
        entry.age_restriction = non_negative("ageRestriction", age)?;
    }
    Ok(())
}

impl Handler for MediaHandler {
    fn name(&self) -> &'static str {
        "media"
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
