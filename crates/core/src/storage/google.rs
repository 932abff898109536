use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Response, Url};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::errors::CoreError;
use crate::models::settings::{SheetRef, SpreadsheetRef};
use super::auth::{self, AccessToken, ServiceAccountKey};
use super::backend::{CellValue, Row, SpreadsheetBackend};

const SHEETS_BASE: &str = "https://sheets.googleapis.com/v4";
const DRIVE_FILES: &str = "https://www.googleapis.com/drive/v3/files";
const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";

/// Size given to worksheets the tracker creates.
const NEW_SHEET_ROWS: u32 = 100;
const NEW_SHEET_COLS: u32 = 20;

/// An authenticated Google Sheets session.
///
/// Opened once at the start of a run and passed to every reader and writer;
/// [`SheetsSession::close`] revokes the token at the end. Spreadsheet titles
/// are resolved to ids once and remembered for the session.
pub struct SheetsSession {
    client: Client,
    key: ServiceAccountKey,
    token: Mutex<AccessToken>,
    spreadsheet_ids: Mutex<HashMap<SpreadsheetRef, String>>,
}

impl std::fmt::Debug for SheetsSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetsSession")
            .field("client_email", &self.key.client_email)
            .finish_non_exhaustive()
    }
}

// ── Sheets / Drive API response types ───────────────────────────────

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Row>,
}

#[derive(Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Deserialize)]
struct SheetProperties {
    title: String,
    #[serde(default, rename = "gridProperties")]
    grid: GridProperties,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GridProperties {
    #[serde(default)]
    row_count: usize,
    #[serde(default)]
    column_count: usize,
}

#[derive(Deserialize)]
struct DriveFileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Deserialize)]
struct DriveFile {
    id: String,
    name: String,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl SheetsSession {
    /// Authenticate with a service-account key and open a session.
    pub async fn open(key: ServiceAccountKey, timeout_secs: u64) -> Result<Self, CoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        let token = auth::fetch_access_token(&client, &key).await?;
        info!(client_email = %key.client_email, "connected to Google Sheets");
        Ok(Self {
            client,
            key,
            token: Mutex::new(token),
            spreadsheet_ids: Mutex::new(HashMap::new()),
        })
    }

    /// Read the key file at `path` and open a session with it.
    pub async fn open_from_file(path: &Path, timeout_secs: u64) -> Result<Self, CoreError> {
        let key = ServiceAccountKey::from_file(path)?;
        Self::open(key, timeout_secs).await
    }

    /// End the session. Token revocation is best effort.
    pub async fn close(self) {
        let token = self
            .token
            .into_inner()
            .unwrap_or_else(|e| e.into_inner());
        if let Err(e) = auth::revoke_access_token(&self.client, &token).await {
            warn!(error = %e, "failed to revoke access token");
        } else {
            debug!("access token revoked");
        }
    }

    /// Current bearer token, re-minted when close to expiry.
    async fn bearer(&self) -> Result<String, CoreError> {
        {
            let token = self.token.lock().unwrap_or_else(|e| e.into_inner());
            if token.is_fresh(Utc::now()) {
                return Ok(token.value.clone());
            }
        }
        debug!("refreshing access token");
        let fresh = auth::fetch_access_token(&self.client, &self.key).await?;
        let value = fresh.value.clone();
        *self.token.lock().unwrap_or_else(|e| e.into_inner()) = fresh;
        Ok(value)
    }

    /// Turn a non-2xx response into a `CoreError::Sheets`.
    async fn check(resp: Response) -> Result<Response, CoreError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|b| b.error.message)
            .unwrap_or(body);
        Err(CoreError::Sheets {
            status: status.as_u16(),
            message,
        })
    }

    fn url(segments: &[&str]) -> Result<Url, CoreError> {
        let mut url = Url::parse(SHEETS_BASE)
            .map_err(|e| CoreError::Config(format!("Invalid Sheets URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| CoreError::Config("Sheets URL cannot take a path".into()))?
            .extend(segments);
        Ok(url)
    }

    /// A1 range covering a whole worksheet.
    fn range(worksheet: &str) -> String {
        format!("'{}'", worksheet.replace('\'', "''"))
    }

    /// Resolve a spreadsheet reference to its id (cached per session).
    pub async fn spreadsheet_id(&self, spreadsheet: &SpreadsheetRef) -> Result<String, CoreError> {
        let title = match spreadsheet {
            SpreadsheetRef::Id(id) => return Ok(id.clone()),
            SpreadsheetRef::Title(title) => title,
        };
        {
            let ids = self.spreadsheet_ids.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(id) = ids.get(spreadsheet) {
                return Ok(id.clone());
            }
        }

        let query = format!(
            "name = '{}' and mimeType = '{SPREADSHEET_MIME}' and trashed = false",
            title.replace('\\', "\\\\").replace('\'', "\\'")
        );
        let resp = self
            .client
            .get(DRIVE_FILES)
            .bearer_auth(self.bearer().await?)
            .query(&[
                ("q", query.as_str()),
                ("fields", "files(id,name)"),
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true"),
            ])
            .send()
            .await?;
        let list: DriveFileList = Self::check(resp).await?.json().await?;

        let mut files = list.files.into_iter();
        let file = files
            .next()
            .ok_or_else(|| CoreError::SpreadsheetNotFound(title.clone()))?;
        if files.next().is_some() {
            warn!(title = %title, id = %file.id, "several spreadsheets share this title; using the first");
        }
        debug!(title = %file.name, id = %file.id, "spreadsheet resolved");

        self.spreadsheet_ids
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(spreadsheet.clone(), file.id.clone());
        Ok(file.id)
    }

    /// Properties of the worksheet titled `worksheet`, if it exists.
    async fn worksheet(
        &self,
        spreadsheet_id: &str,
        worksheet: &str,
    ) -> Result<Option<SheetProperties>, CoreError> {
        let url = Self::url(&["spreadsheets", spreadsheet_id])?;
        let resp = self
            .client
            .get(url)
            .bearer_auth(self.bearer().await?)
            .query(&[(
                "fields",
                "sheets.properties(title,gridProperties(rowCount,columnCount))",
            )])
            .send()
            .await?;
        let meta: SpreadsheetMeta = Self::check(resp).await?.json().await?;
        Ok(meta
            .sheets
            .into_iter()
            .map(|s| s.properties)
            .find(|p| p.title == worksheet))
    }

    /// A1 ranges of a `grid_rows` × `grid_cols` worksheet left outside the
    /// `rows` × `cols` block written from A1: the cells right of the block,
    /// then every row below it.
    pub fn leftover_ranges(
        worksheet: &str,
        rows: usize,
        cols: usize,
        grid_rows: usize,
        grid_cols: usize,
    ) -> Vec<String> {
        let sheet = Self::range(worksheet);
        let mut ranges = Vec::new();
        if grid_cols == 0 {
            return ranges;
        }
        let last_col = column_name(grid_cols);
        let last_row = rows.min(grid_rows);
        if last_row > 0 && cols < grid_cols {
            let first_col = column_name(cols + 1);
            ranges.push(format!("{sheet}!{first_col}1:{last_col}{last_row}"));
        }
        if rows < grid_rows {
            ranges.push(format!("{sheet}!A{}:{last_col}{grid_rows}", rows + 1));
        }
        ranges
    }

    async fn batch_clear(&self, spreadsheet_id: &str, ranges: &[String]) -> Result<(), CoreError> {
        if ranges.is_empty() {
            return Ok(());
        }
        let url = Self::url(&["spreadsheets", spreadsheet_id, "values:batchClear"])?;
        let resp = self
            .client
            .post(url)
            .bearer_auth(self.bearer().await?)
            .json(&json!({ "ranges": ranges }))
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }
}

/// Spreadsheet column letters for a 1-based column number (1 → A, 27 → AA).
fn column_name(mut column: usize) -> String {
    let mut letters = Vec::new();
    while column > 0 {
        let rem = (column - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        column = (column - 1) / 26;
    }
    letters.iter().rev().collect()
}

#[async_trait]
impl SpreadsheetBackend for SheetsSession {
    async fn read_rows(&self, sheet: &SheetRef) -> Result<Vec<Row>, CoreError> {
        let id = self.spreadsheet_id(&sheet.spreadsheet).await?;
        if self.worksheet(&id, &sheet.worksheet).await?.is_none() {
            return Err(CoreError::WorksheetNotFound {
                spreadsheet: sheet.spreadsheet.to_string(),
                worksheet: sheet.worksheet.clone(),
            });
        }

        let range = Self::range(&sheet.worksheet);
        let url = Self::url(&["spreadsheets", &id, "values", &range])?;
        let resp = self
            .client
            .get(url)
            .bearer_auth(self.bearer().await?)
            .query(&[
                ("majorDimension", "ROWS"),
                ("valueRenderOption", "UNFORMATTED_VALUE"),
                ("dateTimeRenderOption", "FORMATTED_STRING"),
            ])
            .send()
            .await?;
        let values: ValueRange = Self::check(resp).await?.json().await?;
        debug!(sheet = %sheet, rows = values.values.len(), "rows read");
        Ok(values.values)
    }

    async fn ensure_worksheet(&self, sheet: &SheetRef) -> Result<bool, CoreError> {
        let id = self.spreadsheet_id(&sheet.spreadsheet).await?;
        if self.worksheet(&id, &sheet.worksheet).await?.is_some() {
            return Ok(false);
        }

        let url = Self::url(&["spreadsheets", &format!("{id}:batchUpdate")])?;
        let body = json!({
            "requests": [{
                "addSheet": {
                    "properties": {
                        "title": sheet.worksheet,
                        "gridProperties": {
                            "rowCount": NEW_SHEET_ROWS,
                            "columnCount": NEW_SHEET_COLS,
                        }
                    }
                }
            }]
        });
        let resp = self
            .client
            .post(url)
            .bearer_auth(self.bearer().await?)
            .json(&body)
            .send()
            .await?;
        Self::check(resp).await?;
        info!(sheet = %sheet, "worksheet created");
        Ok(true)
    }

    async fn append_rows(&self, sheet: &SheetRef, rows: &[Row]) -> Result<(), CoreError> {
        if rows.is_empty() {
            return Ok(());
        }
        let id = self.spreadsheet_id(&sheet.spreadsheet).await?;
        let range = Self::range(&sheet.worksheet);
        let url = Self::url(&["spreadsheets", &id, "values", &format!("{range}:append")])?;
        let resp = self
            .client
            .post(url)
            .bearer_auth(self.bearer().await?)
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&json!({ "majorDimension": "ROWS", "values": rows }))
            .send()
            .await?;
        Self::check(resp).await?;
        debug!(sheet = %sheet, rows = rows.len(), "rows appended");
        Ok(())
    }

    async fn overwrite_rows(&self, sheet: &SheetRef, rows: &[Row]) -> Result<(), CoreError> {
        let id = self.spreadsheet_id(&sheet.spreadsheet).await?;
        let grid = self
            .worksheet(&id, &sheet.worksheet)
            .await?
            .ok_or_else(|| CoreError::WorksheetNotFound {
                spreadsheet: sheet.spreadsheet.to_string(),
                worksheet: sheet.worksheet.clone(),
            })?
            .grid;

        // Rows padded to a common width so shorter rows blank out old cells.
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        if !rows.is_empty() {
            let padded: Vec<Row> = rows
                .iter()
                .map(|row| {
                    let mut row = row.clone();
                    row.resize(width, CellValue::blank());
                    row
                })
                .collect();
            let range = format!("{}!A1", Self::range(&sheet.worksheet));
            let url = Self::url(&["spreadsheets", &id, "values", &range])?;
            let resp = self
                .client
                .put(url)
                .bearer_auth(self.bearer().await?)
                .query(&[("valueInputOption", "RAW")])
                .json(&json!({ "range": range, "majorDimension": "ROWS", "values": padded }))
                .send()
                .await?;
            Self::check(resp).await?;
        }

        let leftover = Self::leftover_ranges(
            &sheet.worksheet,
            rows.len(),
            width,
            grid.row_count,
            grid.column_count,
        );
        self.batch_clear(&id, &leftover).await?;
        debug!(sheet = %sheet, rows = rows.len(), cleared = leftover.len(), "worksheet overwritten");
        Ok(())
    }
}
