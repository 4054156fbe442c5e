use anyhow::{Context, Result, anyhow};
use flate2::read::GzDecoder;
use serde::Deserialize;
use std::{borrow::Cow, collections::HashMap, fmt, fs, io::Read, path::Path, time::Instant};

/// Gzipped dataset compiled into the crate, in the shape of OpenWeather's `city.list.json`.
const BUNDLED_CITY_LIST: &[u8] = include_bytes!("../data/city.list.json.gz");

/// OpenWeather's complete city list.
pub const FULL_CITY_LIST_URL: &str = "https://bulk.openweathermap.org/sample/city.list.json.gz";

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// OpenWeather numeric city identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct CityId(pub u64);

impl fmt::Display for CityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One record of the dataset. Extra fields (`state`, `coord`) are ignored.
#[derive(Debug, Deserialize)]
struct CityRecord {
    id: CityId,
    name: String,
    country: String,
}

/// Read-only directory of `"City,Country"` display names.
///
/// Names are kept ordered by their case-folded form, so every name that
/// starts with a given prefix (ignoring case) sits in one contiguous run.
#[derive(Debug, Clone, Default)]
pub struct CityDirectory {
    ids: HashMap<String, CityId>,
    /// `(folded, display)` pairs, sorted.
    sorted: Vec<(String, String)>,
}

impl CityDirectory {
    /// Directory built from the dataset shipped with the crate.
    pub fn bundled() -> Result<Self> {
        Self::from_bytes(BUNDLED_CITY_LIST).context("Failed to parse bundled city list")
    }

    /// Load a dataset file from disk, plain or gzipped.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)
            .with_context(|| format!("Failed to read city list: {}", path.display()))?;

        Self::from_bytes(&bytes)
            .with_context(|| format!("Failed to parse city list: {}", path.display()))
    }

    /// Download a dataset, check that it parses, then store the raw bytes at `dest`.
    pub async fn download(url: &str, dest: &Path) -> Result<Self> {
        tracing::info!(%url, "downloading city list");

        let res = reqwest::get(url)
            .await
            .with_context(|| format!("Failed to download city list from {url}"))?;

        let status = res.status();
        if !status.is_success() {
            return Err(anyhow!("City list download failed with status {status}"));
        }

        let bytes = res.bytes().await.context("Failed to read city list download")?;
        let directory = Self::from_bytes(&bytes).context("Downloaded city list is invalid")?;

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create data directory: {}", parent.display())
            })?;
        }
        fs::write(dest, &bytes)
            .with_context(|| format!("Failed to write city list: {}", dest.display()))?;

        Ok(directory)
    }

    /// Parse a dataset that may be gzip-compressed.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_json(&decompress(bytes)?)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let started = Instant::now();

        let records: Vec<CityRecord> = serde_json::from_slice(bytes)?;

        let mut ids = HashMap::with_capacity(records.len());
        for record in records {
            // Single-letter names are noise in the upstream list.
            if record.name.chars().count() <= 1 {
                continue;
            }
            ids.insert(format!("{},{}", record.name, record.country), record.id);
        }

        let mut sorted: Vec<(String, String)> =
            ids.keys().map(|name| (name.to_lowercase(), name.clone())).collect();
        sorted.sort_unstable();

        tracing::debug!(
            cities = sorted.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "city list loaded"
        );

        Ok(Self { ids, sorted })
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    pub fn id_of(&self, display_name: &str) -> Option<CityId> {
        self.ids.get(display_name).copied()
    }

    /// Case-insensitive "starts with" search, capped at `limit` results.
    pub fn search(&self, prefix: &str, limit: usize) -> Vec<String> {
        if prefix.is_empty() || limit == 0 {
            return Vec::new();
        }

        let folded = prefix.to_lowercase();
        let first = self.sorted.partition_point(|(key, _)| key.as_str() < folded.as_str());

        self.sorted[first..]
            .iter()
            .take_while(|(key, _)| key.starts_with(&folded))
            .take(limit)
            .map(|(_, display)| display.clone())
            .collect()
    }
}

fn decompress(bytes: &[u8]) -> Result<Cow<'_, [u8]>> {
    if !bytes.starts_with(&GZIP_MAGIC) {
        return Ok(Cow::Borrowed(bytes));
    }

    let mut json = Vec::new();
    GzDecoder::new(bytes).read_to_end(&mut json).context("Failed to decompress city list")?;
    Ok(Cow::Owned(json))
}
