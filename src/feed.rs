//! Vendor stock feed loading.
//!
//! The vendor publishes its stock sheet as a zipped workbook with a preamble
//! above the header row; `skip_rows` drops those rows before the header is
//! read. A CSV export of the same sheet is accepted as well.

use std::io::{Cursor, Read};
use std::path::PathBuf;

use async_trait::async_trait;
use calamine::{Data, Range, Reader, Xls, Xlsx};
use reqwest::Client;
use zip::ZipArchive;

use crate::error::{Result, SyncError};
use crate::models::FeedRecord;

/// Rows above the header in the vendor's stock workbook
pub const VENDOR_SHEET_SKIP_ROWS: usize = 17;

const CODE_HEADERS: [&str; 2] = ["Код", "code"];
const QUANTITY_HEADERS: [&str; 2] = ["Количество", "quantity"];
const PRICE_HEADERS: [&str; 2] = ["Цена", "price"];

/// Provides the feed rows for one sync run
#[async_trait]
pub trait FeedSource {
    async fn fetch(&self) -> Result<Vec<FeedRecord>>;
}

/// Where a feed is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedLocation {
    File(PathBuf),
    Url(String),
}

impl FeedLocation {
    /// `http://` and `https://` values are URLs, anything else a file path
    pub fn parse(value: &str) -> Self {
        if value.starts_with("http://") || value.starts_with("https://") {
            FeedLocation::Url(value.to_string())
        } else {
            FeedLocation::File(PathBuf::from(value))
        }
    }

    /// True when the location names a `.zip` archive
    pub fn is_archive(&self) -> bool {
        let name = match self {
            FeedLocation::File(path) => path.to_string_lossy().to_lowercase(),
            FeedLocation::Url(url) => url.split(['?', '#']).next().unwrap_or_default().to_lowercase(),
        };
        name.ends_with(".zip")
    }

    /// Reads the raw feed bytes from disk or over HTTP
    pub async fn read(&self, client: &Client) -> Result<Vec<u8>> {
        match self {
            FeedLocation::File(path) => {
                log::info!("Reading stock feed from {}", path.display());
                Ok(std::fs::read(path)?)
            }
            FeedLocation::Url(url) => {
                log::info!("Downloading stock feed from {url}");
                let response = client.get(url).send().await?;
                let status = response.status();
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(SyncError::HttpStatus { status, body });
                }
                Ok(response.bytes().await?.to_vec())
            }
        }
    }
}

/// CSV export of the vendor stock sheet
pub struct CsvFeed {
    location: FeedLocation,
    skip_rows: usize,
    client: Client,
}

impl CsvFeed {
    pub fn new(location: FeedLocation, skip_rows: usize, client: Client) -> Self {
        Self {
            location,
            skip_rows,
            client,
        }
    }
}

#[async_trait]
impl FeedSource for CsvFeed {
    async fn fetch(&self) -> Result<Vec<FeedRecord>> {
        let bytes = self.location.read(&self.client).await?;
        let records = parse_feed(&String::from_utf8_lossy(&bytes), self.skip_rows)?;
        log::info!("Loaded {} feed records", records.len());
        Ok(records)
    }
}

/// Zip archive holding the vendor's `.xls`/`.xlsx` stock workbook
pub struct ZipSheetFeed {
    location: FeedLocation,
    skip_rows: usize,
    entry: Option<String>,
    client: Client,
}

impl ZipSheetFeed {
    pub fn new(location: FeedLocation, skip_rows: usize, client: Client) -> Self {
        Self {
            location,
            skip_rows,
            entry: None,
            client,
        }
    }

    /// Reads this archive entry instead of the first workbook found
    pub fn with_entry(mut self, entry: impl Into<String>) -> Self {
        self.entry = Some(entry.into());
        self
    }
}

#[async_trait]
impl FeedSource for ZipSheetFeed {
    async fn fetch(&self) -> Result<Vec<FeedRecord>> {
        let bytes = self.location.read(&self.client).await?;
        let records = read_archive(bytes, self.entry.as_deref(), self.skip_rows)?;
        log::info!("Loaded {} feed records", records.len());
        Ok(records)
    }
}

/// Unpacks a zipped workbook and parses its first worksheet.
///
/// Without `entry`, the first `.xls` or `.xlsx` member is used.
pub fn read_archive(bytes: Vec<u8>, entry: Option<&str>, skip_rows: usize) -> Result<Vec<FeedRecord>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let name = match entry {
        Some(name) => name.to_string(),
        None => archive
            .file_names()
            .find(|name| is_workbook(name))
            .map(str::to_string)
            .ok_or_else(|| SyncError::FeedLayout("archive contains no workbook".to_string()))?,
    };
    log::debug!("Reading workbook {name} from archive");

    let mut workbook = Vec::new();
    archive.by_name(&name)?.read_to_end(&mut workbook)?;

    let range = if name.to_lowercase().ends_with(".xlsx") {
        first_sheet(Xlsx::new(Cursor::new(workbook)).map_err(calamine::Error::from)?)?
    } else {
        first_sheet(Xls::new(Cursor::new(workbook)).map_err(calamine::Error::from)?)?
    };

    parse_sheet(&range, skip_rows)
}

fn is_workbook(name: &str) -> bool {
    let name = name.to_lowercase();
    name.ends_with(".xls") || name.ends_with(".xlsx")
}

fn first_sheet<R>(mut workbook: R) -> Result<Range<Data>>
where
    R: Reader<Cursor<Vec<u8>>>,
    calamine::Error: From<R::Error>,
{
    match workbook.worksheet_range_at(0) {
        Some(range) => Ok(range.map_err(calamine::Error::from)?),
        None => Err(SyncError::FeedLayout("workbook has no worksheets".to_string())),
    }
}

/// Parses worksheet cells, the header being the row right after `skip_rows`.
///
/// Row numbers are absolute (row 0 is the first sheet row), even when the
/// used range starts further down.
pub fn parse_sheet(range: &Range<Data>, skip_rows: usize) -> Result<Vec<FeedRecord>> {
    let first_row = range.start().map_or(0, |(row, _)| row as usize);
    let mut rows = range.rows().skip(skip_rows.saturating_sub(first_row));

    let header: Vec<String> = rows
        .next()
        .ok_or_else(|| SyncError::FeedLayout(format!("no header row after {skip_rows} rows")))?
        .iter()
        .map(cell_text)
        .collect();
    let code = column(&header, &CODE_HEADERS)?;
    let quantity = column(&header, &QUANTITY_HEADERS)?;
    let price = column(&header, &PRICE_HEADERS)?;

    let mut records = Vec::new();
    for (index, row) in rows.enumerate() {
        let cell = |i: usize| row.get(i).map(cell_text).unwrap_or_default();
        let record = FeedRecord {
            code: cell(code),
            quantity: cell(quantity),
            price: cell(price),
        };
        if record.code.is_empty() {
            log::warn!("Skipping sheet row {} without a code", index + 1);
            continue;
        }
        records.push(record);
    }

    Ok(records)
}

fn column(header: &[String], names: &[&str]) -> Result<usize> {
    header
        .iter()
        .position(|h| names.contains(&h.as_str()))
        .ok_or_else(|| SyncError::FeedLayout(format!("missing column {}", names[0])))
}

/// Cell text as the vendor sheet shows it; whole numbers lose the ".0"
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

/// Parses feed CSV text, skipping `skip_rows` preamble lines first.
///
/// Rows without a code are dropped; other fields are validated only when the
/// row is matched against a marketplace offer.
pub fn parse_feed(text: &str, skip_rows: usize) -> Result<Vec<FeedRecord>> {
    let body = strip_preamble(text.trim_start_matches('\u{feff}'), skip_rows);

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let mut records = Vec::new();
    for (index, result) in reader.deserialize().enumerate() {
        let record: FeedRecord = result?;
        if record.code.is_empty() {
            log::warn!("Skipping feed row {} without a code", index + 1);
            continue;
        }
        records.push(record);
    }

    Ok(records)
}

fn strip_preamble(text: &str, skip_rows: usize) -> &str {
    let mut rest = text;
    for _ in 0..skip_rows {
        match rest.find('\n') {
            Some(pos) => rest = &rest[pos + 1..],
            None => return "",
        }
    }
    rest
}

#[cfg(test)]
#[path = "feed_tests.rs"]
mod tests;
