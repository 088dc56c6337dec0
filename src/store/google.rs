//! Google Sheets backend.
//!
//! Authenticates with a service-account key through the OAuth2 JWT bearer
//! grant, finds spreadsheets by exact title through Drive, and reads and
//! appends on the first worksheet through the Sheets values API.

use std::cell::RefCell;
use std::path::Path;
use std::time::{Duration, Instant};

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::credentials::ServiceAccountKey;
use super::{records_from_rows, SheetClient, StoreError, Worksheet};
use crate::record::{CellValue, Record};

const SCOPES: &str =
    "https://www.googleapis.com/auth/spreadsheets https://www.googleapis.com/auth/drive";
const JWT_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const DRIVE_FILES_API: &str = "https://www.googleapis.com/drive/v3/files";
const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";

const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Refresh the bearer token this long before Google expires it.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    ASSERTION_LIFETIME_SECS as u64
}

#[derive(Debug)]
struct AccessToken {
    value: String,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct DriveFileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

pub struct GoogleSheets {
    /// Credential problems are kept and reported on every store call.
    key: Result<ServiceAccountKey, String>,
    http: Client,
    token: RefCell<Option<AccessToken>>,
}

impl GoogleSheets {
    pub fn new(key: ServiceAccountKey) -> Self {
        Self::with_key(Ok(key))
    }

    /// Load the key file once. A missing or invalid file does not fail here:
    /// every later operation reports it as [`StoreError::Auth`].
    pub fn from_key_file(path: &Path) -> Self {
        let key = ServiceAccountKey::from_file(path).map_err(|e| {
            warn!(error = %e, "service-account credentials unavailable");
            e.to_string()
        });
        Self::with_key(key)
    }

    fn with_key(key: Result<ServiceAccountKey, String>) -> Self {
        Self {
            key,
            http: Client::new(),
            token: RefCell::new(None),
        }
    }

    fn access_token(&self) -> Result<String, StoreError> {
        if let Some(token) = self.token.borrow().as_ref() {
            if Instant::now() + TOKEN_REFRESH_MARGIN < token.expires_at {
                return Ok(token.value.clone());
            }
        }

        let key = self.key.as_ref().map_err(|e| StoreError::Auth(e.clone()))?;
        let assertion = sign_assertion(key, Utc::now().timestamp())?;

        let response = self
            .http
            .post(&key.token_uri)
            .form(&[("grant_type", JWT_GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(StoreError::Auth(format!(
                "token exchange returned {status}: {}",
                api_error_message(&body)
            )));
        }

        let token: TokenResponse = response.json().map_err(transport)?;
        info!(account = %key.client_email, expires_in = token.expires_in, "obtained access token");

        let value = token.access_token.clone();
        *self.token.borrow_mut() = Some(AccessToken {
            value: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        });
        Ok(value)
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, StoreError> {
        let token = self.access_token()?;
        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .query(query)
            .send()
            .map_err(transport)?;
        parse_response(response)
    }

    fn find_spreadsheet(&self, title: &str) -> Result<String, StoreError> {
        let query = drive_title_query(title);
        let list: DriveFileList = self.get_json(
            DRIVE_FILES_API,
            &[
                ("q", query.as_str()),
                ("fields", "files(id)"),
                ("pageSize", "1"),
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true"),
            ],
        )?;
        list.files
            .into_iter()
            .next()
            .map(|f| f.id)
            .ok_or_else(|| StoreError::SheetNotFound(title.to_string()))
    }

    fn first_worksheet_title(&self, spreadsheet_id: &str) -> Result<String, StoreError> {
        let meta: SpreadsheetMeta = self.get_json(
            &format!("{SHEETS_API}/{spreadsheet_id}"),
            &[("fields", "sheets.properties.title")],
        )?;
        meta.sheets
            .into_iter()
            .next()
            .map(|s| s.properties.title)
            .ok_or_else(|| StoreError::Api {
                status: 200,
                message: format!("spreadsheet {spreadsheet_id} has no worksheets"),
            })
    }
}

impl SheetClient for GoogleSheets {
    fn open(&self, title: &str) -> Result<Box<dyn Worksheet + '_>, StoreError> {
        let spreadsheet_id = self.find_spreadsheet(title)?;
        let worksheet = self.first_worksheet_title(&spreadsheet_id)?;
        debug!(%title, %spreadsheet_id, %worksheet, "opened spreadsheet");
        Ok(Box::new(GoogleWorksheet {
            client: self,
            spreadsheet_id,
            range: a1_sheet_range(&worksheet),
        }))
    }

    fn describe(&self) -> String {
        match &self.key {
            Ok(key) => format!("google: {}", key.client_email),
            Err(_) => "google: no credentials".to_string(),
        }
    }
}

struct GoogleWorksheet<'a> {
    client: &'a GoogleSheets,
    spreadsheet_id: String,
    range: String,
}

impl GoogleWorksheet<'_> {
    fn values_url(&self, suffix: &str) -> String {
        format!(
            "{SHEETS_API}/{}/values/{}{suffix}",
            self.spreadsheet_id,
            urlencoding::encode(&self.range)
        )
    }
}

impl Worksheet for GoogleWorksheet<'_> {
    fn append_row(&mut self, values: &[CellValue]) -> Result<(), StoreError> {
        let token = self.client.access_token()?;
        let body = serde_json::json!({
            "values": [values.iter().map(CellValue::to_json).collect::<Vec<_>>()],
        });
        let response = self
            .client
            .http
            .post(self.values_url(":append"))
            .bearer_auth(token)
            .query(&[
                ("valueInputOption", "USER_ENTERED"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&body)
            .send()
            .map_err(transport)?;
        let _: serde_json::Value = parse_response(response)?;
        Ok(())
    }

    fn get_all_records(&self) -> Result<Vec<Record>, StoreError> {
        let range: ValueRange = self.client.get_json(&self.values_url(""), &[])?;
        Ok(records_from_rows(values_to_rows(range.values)))
    }

    fn url(&self) -> Option<String> {
        Some(format!(
            "https://docs.google.com/spreadsheets/d/{}",
            self.spreadsheet_id
        ))
    }
}

fn sign_assertion(key: &ServiceAccountKey, now: i64) -> Result<String, StoreError> {
    let claims = Claims {
        iss: &key.client_email,
        scope: SCOPES,
        aud: &key.token_uri,
        iat: now,
        exp: now + ASSERTION_LIFETIME_SECS,
    };
    let mut header = Header::new(Algorithm::RS256);
    header.kid = key.private_key_id.clone();

    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| StoreError::Auth(format!("invalid private key: {e}")))?;
    encode(&header, &claims, &encoding_key).map_err(|e| StoreError::Auth(e.to_string()))
}

fn transport(err: reqwest::Error) -> StoreError {
    StoreError::Unreachable(err.to_string())
}

fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T, StoreError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(StoreError::Api {
            status: status.as_u16(),
            message: api_error_message(&body),
        });
    }
    response.json().map_err(transport)
}

/// Pull `error.message` (or `error_description`) out of a Google error body.
fn api_error_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| {
            v.pointer("/error/message")
                .or_else(|| v.get("error_description"))
                .and_then(|m| m.as_str())
        })
        .map(str::to_string)
        .unwrap_or_else(|| body.trim().to_string())
}

fn drive_title_query(title: &str) -> String {
    let escaped = title.replace('\\', "\\\\").replace('\'', "\\'");
    format!("name = '{escaped}' and mimeType = '{SPREADSHEET_MIME}' and trashed = false")
}

/// Whole-sheet A1 range, quoting the worksheet title.
fn a1_sheet_range(worksheet: &str) -> String {
    format!("'{}'", worksheet.replace('\'', "''"))
}

fn values_to_rows(values: Vec<Vec<serde_json::Value>>) -> Vec<Vec<String>> {
    values
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|cell| match cell {
                    serde_json::Value::String(s) => s,
                    serde_json::Value::Null => String::new(),
                    serde_json::Value::Bool(true) => "TRUE".to_string(),
                    serde_json::Value::Bool(false) => "FALSE".to_string(),
                    other => other.to_string(),
                })
                .collect()
        })
        .collect()
}
