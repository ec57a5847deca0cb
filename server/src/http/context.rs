use actix_web::{
    http::{header, Method, StatusCode},
    HttpRequest, HttpResponse, ResponseError,
};
use serde_json::{Map, Value};
use std::cell::OnceCell;

use crate::error::{MediaListError, Result};
use crate::session::{Session, SessionStore};

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

pub(crate) fn json_response(status: StatusCode, body: &Value) -> HttpResponse {
    HttpResponse::build(status)
        .content_type(JSON_CONTENT_TYPE)
        .body(body.to_string())
}

/// Extracts the token from `Authorization: Bearer <token>`. The scheme is
/// matched case-insensitively; anything else yields `None`.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

fn parse_content(body: &str) -> Result<Map<String, Value>> {
    if body.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(MediaListError::InvalidBody),
    }
}

/// One inbound request and the single response it will get.
pub struct RequestContext {
    method: Method,
    path: String,
    authorization: Option<String>,
    body: String,
    content: Map<String, Value>,
    sessions: SessionStore,
    session: OnceCell<Option<Session>>,
    response: Option<HttpResponse>,
}

impl RequestContext {
    pub fn new(
        method: Method,
        path: impl Into<String>,
        authorization: Option<String>,
        body: &[u8],
        sessions: SessionStore,
    ) -> Result<Self> {
        let body = std::str::from_utf8(body)
            .map_err(|_| MediaListError::InvalidBody)?
            .to_string();
        let content = parse_content(&body)?;

        Ok(Self {
            method,
            path: path.into(),
            authorization,
            body,
            content,
            sessions,
            session: OnceCell::new(),
            response: None,
        })
    }

    pub fn from_request(req: &HttpRequest, body: &[u8], sessions: SessionStore) -> Result<Self> {
        let authorization = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        Self::new(
            req.method().clone(),
            req.path(),
            authorization,
            body,
            sessions,
        )
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn content(&self) -> &Map<String, Value> {
        &self.content
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Session named by the bearer token, resolved on first access and kept
    /// for the rest of the request.
    pub fn session(&self) -> Option<&Session> {
        self.session
            .get_or_init(|| {
                self.authorization
                    .as_deref()
                    .and_then(bearer_token)
                    .and_then(|token| self.sessions.get(token))
            })
            .as_ref()
    }

    pub fn responded(&self) -> bool {
        self.response.is_some()
    }

    /// Writes the response. Only the first call counts; later calls are
    /// logged and dropped.
    pub fn respond(&mut self, status: StatusCode, body: Value) {
        if self.responded() {
            log::warn!(
                "Dropping second response {} for {} {}",
                status.as_u16(),
                self.method,
                self.path
            );
            return;
        }

        log::debug!("Responding {} to {} {}", status.as_u16(), self.method, self.path);
        self.response = Some(json_response(status, &body));
    }

    pub fn respond_error(&mut self, err: &MediaListError) {
        self.respond(err.status_code(), err.body());
    }

    /// Turns an endpoint outcome into a response when it failed.
    pub fn finish(&mut self, outcome: Result<()>) {
        if let Err(err) = outcome {
            self.respond_error(&err);
        }
    }

    pub fn into_response(self) -> Option<HttpResponse> {
        self.response
    }
}
