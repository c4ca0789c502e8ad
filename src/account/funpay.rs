// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! FunPay account client. Reads lot edit forms and posts them back.

use super::{LotAccount, LotFields};
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, COOKIE, SET_COOKIE};
use reqwest::{Client, Response, StatusCode};
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

lazy_static! {
    static ref APP_DATA_RE: Regex =
        Regex::new(r#"data-app-data="([^"]*)""#).unwrap();
    static ref OFFER_FORM_RE: Regex =
        Regex::new(r#"(?i)<form\b[^>]*action="[^"]*offerSave[^"]*"[^>]*>"#).unwrap();
    static ref FORM_END_RE: Regex = Regex::new(r"(?i)</form\s*>").unwrap();
    static ref INPUT_RE: Regex = Regex::new(r"<input\b([^>]*)>").unwrap();
    static ref TEXTAREA_RE: Regex =
        Regex::new(r"(?s)<textarea\b([^>]*)>(.*?)</textarea>").unwrap();
    static ref SELECT_RE: Regex =
        Regex::new(r"(?s)<select\b([^>]*)>(.*?)</select>").unwrap();
    static ref OPTION_RE: Regex = Regex::new(r"<option\b([^>]*)>").unwrap();
    static ref ATTR_RE: Regex = Regex::new(r#"([\w:-]+)(?:\s*=\s*"([^"]*)")?"#).unwrap();
}

/// Session data scraped from the home page.
#[derive(Debug, Clone)]
struct Session {
    csrf_token: String,
    user_id: u64,
    phpsessid: Option<String>,
}

/// Account client authenticated with a `golden_key` cookie.
pub struct FunPayAccount {
    client: Client,
    base_url: String,
    golden_key: String,
    session: RwLock<Option<Session>>,
}

impl FunPayAccount {
    pub fn new(base_url: &str, golden_key: &str, user_agent: &str) -> Result<Self, String> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            golden_key: golden_key.to_string(),
            session: RwLock::new(None),
        })
    }

    /// Fetch the home page and store the CSRF token and user id. Returns the user id.
    pub async fn init(&self) -> Result<u64, String> {
        let response = self
            .client
            .get(format!("{}/", self.base_url))
            .headers(self.cookie_headers(None)?)
            .send()
            .await
            .map_err(|e| format!("Failed to fetch home page: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("Home page returned {}", response.status()));
        }

        let phpsessid = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(|c| c.strip_prefix("PHPSESSID="))
            .map(|c| c.split(';').next().unwrap_or_default().to_string());

        let html = response
            .text()
            .await
            .map_err(|e| format!("Failed to read home page: {}", e))?;
        let (csrf_token, user_id) = parse_app_data(&html)?;
        if user_id == 0 {
            return Err("Not authorized: golden_key is invalid or expired".to_string());
        }

        info!("✅ FunPay account {} initialized", user_id);
        *self.session.write().await = Some(Session {
            csrf_token,
            user_id,
            phpsessid,
        });
        Ok(user_id)
    }

    async fn session(&self) -> Result<Session, String> {
        if let Some(session) = self.session.read().await.clone() {
            return Ok(session);
        }
        self.init().await?;
        self.session
            .read()
            .await
            .clone()
            .ok_or_else(|| "Session is not initialized".to_string())
    }

    fn cookie_headers(&self, session: Option<&Session>) -> Result<HeaderMap, String> {
        let mut cookie = format!("golden_key={}; cookie_prefs=1", self.golden_key);
        if let Some(sid) = session.and_then(|s| s.phpsessid.as_deref()) {
            cookie.push_str(&format!("; PHPSESSID={}", sid));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&cookie).map_err(|e| format!("Invalid cookie: {}", e))?,
        );
        Ok(headers)
    }
}

/// Failure of a single marketplace request.
enum Failure {
    /// The cached session looks expired; worth one retry with a fresh login.
    Session(String),
    Other(String),
}

impl Failure {
    fn into_message(self) -> String {
        match self {
            Failure::Session(e) | Failure::Other(e) => e,
        }
    }
}

impl From<String> for Failure {
    fn from(e: String) -> Self {
        Failure::Other(e)
    }
}

/// Status codes and login redirects that mean the session has to be renewed.
fn check_session(response: &Response) -> Result<(), Failure> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(Failure::Session(format!("Session rejected with {}", status)));
    }
    if response.url().path().starts_with("/account/login") {
        return Err(Failure::Session("Redirected to login page".to_string()));
    }
    Ok(())
}

impl FunPayAccount {
    async fn reset_session(&self) {
        *self.session.write().await = None;
    }

    async fn fetch_lot(&self, lot_id: u64) -> Result<Option<LotFields>, Failure> {
        let session = self.session().await?;
        let response = self
            .client
            .get(format!("{}/lots/offerEdit", self.base_url))
            .query(&[("offer", lot_id)])
            .headers(self.cookie_headers(Some(&session))?)
            .send()
            .await
            .map_err(|e| format!("Failed to fetch lot {}: {}", lot_id, e))?;

        check_session(&response)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(format!("Lot {} page returned {}", lot_id, response.status()).into());
        }

        let html = response
            .text()
            .await
            .map_err(|e| format!("Failed to read lot {}: {}", lot_id, e))?;
        let fields = parse_lot_form(lot_id, &html);
        if fields.is_none() {
            debug!("No edit form for lot {}", lot_id);
        }
        Ok(fields)
    }

    async fn post_lot(&self, fields: &LotFields) -> Result<(), Failure> {
        let session = self.session().await?;

        let mut form = fields.fields.clone();
        form.insert("csrf_token".to_string(), session.csrf_token.clone());
        form.insert("offer_id".to_string(), fields.lot_id.to_string());
        if fields.active {
            form.insert("active".to_string(), "on".to_string());
        } else {
            form.remove("active");
        }

        let mut headers = self.cookie_headers(Some(&session))?;
        headers.insert("x-requested-with", HeaderValue::from_static("XMLHttpRequest"));
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded; charset=UTF-8"),
        );

        let response = self
            .client
            .post(format!("{}/lots/offerSave", self.base_url))
            .headers(headers)
            .form(&form)
            .send()
            .await
            .map_err(|e| format!("Failed to save lot {}: {}", fields.lot_id, e))?;

        check_session(&response)?;
        if !response.status().is_success() {
            return Err(format!(
                "Saving lot {} returned {}",
                fields.lot_id,
                response.status()
            )
            .into());
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| format!("Invalid save response for lot {}: {}", fields.lot_id, e))?;
        if let Some(message) = save_error(&body) {
            warn!("FunPay rejected lot {}: {}", fields.lot_id, message);
            return Err(message.into());
        }

        debug!(
            "Saved lot {} (active={}) for user {}",
            fields.lot_id, fields.active, session.user_id
        );
        Ok(())
    }
}

#[async_trait]
impl LotAccount for FunPayAccount {
    async fn get_lot_fields(&self, lot_id: u64) -> Result<Option<LotFields>, String> {
        match self.fetch_lot(lot_id).await {
            Err(Failure::Session(e)) => {
                warn!("🔑 {}, logging in again", e);
                self.reset_session().await;
                self.fetch_lot(lot_id).await.map_err(Failure::into_message)
            }
            result => result.map_err(Failure::into_message),
        }
    }

    async fn save_lot(&self, fields: &LotFields) -> Result<(), String> {
        match self.post_lot(fields).await {
            Err(Failure::Session(e)) => {
                warn!("🔑 {}, logging in again", e);
                self.reset_session().await;
                self.post_lot(fields).await.map_err(Failure::into_message)
            }
            result => result.map_err(Failure::into_message),
        }
    }
}

fn parse_app_data(html: &str) -> Result<(String, u64), String> {
    let raw = APP_DATA_RE
        .captures(html)
        .and_then(|c| c.get(1))
        .ok_or_else(|| "data-app-data not found on home page".to_string())?;
    let data: serde_json::Value = serde_json::from_str(&unescape(raw.as_str()))
        .map_err(|e| format!("Invalid data-app-data: {}", e))?;

    let csrf_token = data["csrf-token"]
        .as_str()
        .ok_or_else(|| "csrf-token missing from data-app-data".to_string())?
        .to_string();
    let user_id = data["userId"].as_u64().unwrap_or(0);
    Ok((csrf_token, user_id))
}

/// Body of the `offerSave` form, between its opening tag and `</form>`.
fn offer_form_body(html: &str) -> Option<&str> {
    let open = OFFER_FORM_RE.find(html)?;
    let rest = &html[open.end()..];
    let end = FORM_END_RE.find(rest).map(|m| m.start()).unwrap_or(rest.len());
    Some(&rest[..end])
}

/// Parse the lot edit form. `None` when the page has no offer form.
fn parse_lot_form(lot_id: u64, page: &str) -> Option<LotFields> {
    let html = offer_form_body(page)?;

    let mut fields = BTreeMap::new();
    let mut active = false;

    for cap in INPUT_RE.captures_iter(html) {
        let attrs = parse_attrs(&cap[1]);
        let Some(name) = attrs.get("name").cloned() else {
            continue;
        };
        let kind = attrs.get("type").map(String::as_str).unwrap_or("text");
        let checked = attrs.contains_key("checked");

        if name == "active" {
            active = checked;
            continue;
        }
        match kind {
            "submit" | "button" | "image" | "file" => continue,
            "checkbox" | "radio" if !checked => continue,
            "checkbox" | "radio" => {
                let value = attrs.get("value").cloned().unwrap_or_else(|| "on".to_string());
                fields.insert(name, value);
            }
            _ => {
                fields.insert(name, attrs.get("value").cloned().unwrap_or_default());
            }
        }
    }

    for cap in TEXTAREA_RE.captures_iter(html) {
        if let Some(name) = parse_attrs(&cap[1]).remove("name") {
            fields.insert(name, unescape(&cap[2]));
        }
    }

    for cap in SELECT_RE.captures_iter(html) {
        let Some(name) = parse_attrs(&cap[1]).remove("name") else {
            continue;
        };
        let options: Vec<_> = OPTION_RE
            .captures_iter(&cap[2])
            .map(|o| parse_attrs(&o[1]))
            .collect();
        let chosen = options
            .iter()
            .find(|o| o.contains_key("selected"))
            .or_else(|| options.first());
        if let Some(option) = chosen {
            fields.insert(name, option.get("value").cloned().unwrap_or_default());
        }
    }

    fields.remove("csrf_token");
    let mut lot = LotFields::new(lot_id, active);
    lot.fields = fields;
    Some(lot)
}

fn parse_attrs(raw: &str) -> BTreeMap<String, String> {
    ATTR_RE
        .captures_iter(raw)
        .map(|c| {
            let value = c.get(2).map(|v| unescape(v.as_str())).unwrap_or_default();
            (c[1].to_lowercase(), value)
        })
        .collect()
}

/// Error text from an `offerSave` reply, if it reports one.
fn save_error(body: &serde_json::Value) -> Option<String> {
    let failed = match &body["error"] {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_i64() != Some(0),
        serde_json::Value::String(s) => !s.is_empty(),
        _ => true,
    };
    if !failed {
        return None;
    }

    let details = match &body["errors"] {
        serde_json::Value::Object(map) => map
            .values()
            .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
            .collect::<Vec<_>>()
            .join("; "),
        serde_json::Value::Array(items) => items
            .iter()
            .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
            .collect::<Vec<_>>()
            .join("; "),
        _ => String::new(),
    };

    Some(match (&body["error"], details.is_empty()) {
        (serde_json::Value::String(s), true) => s.clone(),
        (_, true) => "FunPay reported an error".to_string(),
        (_, false) => details,
    })
}

fn unescape(s: &str) -> String {
    s.replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
