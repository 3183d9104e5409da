use std::borrow::Cow;
use std::io::ErrorKind;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use compio::fs;
use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use tracing::debug;

pub const SETTINGS_FILE_NAME: &str = "folderbot.yaml";

const DEFAULT_STORE_DIRECTORY: &str = ".folderbot/trees";
const DEFAULT_COMPRESSION_LEVEL: i32 = 3;
const COMPRESSION_LEVELS: RangeInclusive<i64> = 1..=22;
const DEFAULT_LS_COLUMNS: usize = 4;

type Mapping<'a> = LinkedHashMap<Yaml<'a>, Yaml<'a>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    /// Snapshot directory, relative to the root directory unless absolute.
    pub directory: PathBuf,
    pub compression_level: i32,
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            directory: PathBuf::from(DEFAULT_STORE_DIRECTORY),
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingSettings {
    pub columns: usize,
}

impl Default for ListingSettings {
    fn default() -> Self {
        ListingSettings {
            columns: DEFAULT_LS_COLUMNS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub store: StoreSettings,
    pub ls: ListingSettings,
}

impl Settings {
    /// Reads `folderbot.yaml` from `root`, falling back to defaults when it does not exist.
    pub async fn read(root: &Path) -> Result<Self, SettingsError> {
        Self::from_path(root.join(SETTINGS_FILE_NAME)).await
    }

    pub async fn from_path(path: PathBuf) -> Result<Self, SettingsError> {
        debug!("Reading settings from {}", path.display());
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("No settings file found, using defaults");
                return Ok(Self::default());
            }
            Err(err) => return Err(err).context(ReadSnafu { path: path.clone() }),
        };

        let contents = String::from_utf8(bytes).context(EncodingSnafu { path })?;
        contents.as_str().try_into()
    }

    fn store_from_yaml(section: &Mapping<'_>) -> Result<StoreSettings, SettingsError> {
        let mut store = StoreSettings::default();

        if let Some(value) = section.get(&key("directory")) {
            let directory = value.as_str().context(InvalidValueSnafu {
                key: "store.directory",
                expected: "a string",
            })?;
            store.directory = PathBuf::from(directory);
        }

        if let Some(value) = section.get(&key("compression_level")) {
            let level = value.as_integer().context(InvalidValueSnafu {
                key: "store.compression_level",
                expected: "an integer",
            })?;
            ensure!(
                COMPRESSION_LEVELS.contains(&level),
                OutOfRangeSnafu {
                    key: "store.compression_level",
                    value: level,
                    range: format!("{}..={}", COMPRESSION_LEVELS.start(), COMPRESSION_LEVELS.end()),
                }
            );
            store.compression_level = level as i32;
        }

        Ok(store)
    }

    fn listing_from_yaml(section: &Mapping<'_>) -> Result<ListingSettings, SettingsError> {
        let mut ls = ListingSettings::default();

        if let Some(value) = section.get(&key("columns")) {
            let columns = value.as_integer().context(InvalidValueSnafu {
                key: "ls.columns",
                expected: "an integer",
            })?;
            ls.columns = usize::try_from(columns)
                .ok()
                .filter(|columns| *columns > 0)
                .context(OutOfRangeSnafu {
                    key: "ls.columns",
                    value: columns,
                    range: "1 or more",
                })?;
        }

        Ok(ls)
    }
}

impl TryFrom<&str> for Settings {
    type Error = SettingsError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let documents = Yaml::load_from_str(contents).context(ParseSnafu)?;
        let Some(document) = documents.first() else {
            return Ok(Self::default());
        };
        if is_null(document) {
            return Ok(Self::default());
        }

        let top_level = document.as_mapping().context(TopLevelNotMapSnafu)?;

        let store = match section(top_level, "store")? {
            Some(store) => Self::store_from_yaml(store)?,
            None => StoreSettings::default(),
        };
        let ls = match section(top_level, "ls")? {
            Some(ls) => Self::listing_from_yaml(ls)?,
            None => ListingSettings::default(),
        };

        Ok(Settings { store, ls })
    }
}

fn key(name: &'static str) -> Yaml<'static> {
    Yaml::Value(Scalar::String(Cow::Borrowed(name)))
}

fn is_null(value: &Yaml<'_>) -> bool {
    matches!(value, Yaml::Value(Scalar::Null))
}

/// A missing or empty section counts as absent.
fn section<'m, 'a>(
    top_level: &'m Mapping<'a>,
    name: &'static str,
) -> Result<Option<&'m Mapping<'a>>, SettingsError> {
    match top_level.get(&key(name)) {
        None => Ok(None),
        Some(value) if is_null(value) => Ok(None),
        Some(value) => value
            .as_mapping()
            .map(Some)
            .context(SectionNotMapSnafu { section: name }),
    }
}

#[derive(Debug, Snafu)]
pub enum SettingsError {
    #[snafu(display("Failed to read the settings file: {}", path.display()))]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Settings file {} is not valid UTF-8", path.display()))]
    EncodingError {
        path: PathBuf,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Failed to parse the settings file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Top level of settings should be a map"))]
    TopLevelNotMap,
    #[snafu(display("Settings section '{section}' should be a map"))]
    SectionNotMap { section: String },
    #[snafu(display("Setting '{key}' should be {expected}"))]
    InvalidValueError { key: String, expected: String },
    #[snafu(display("Setting '{key}' is {value}, allowed: {range}"))]
    OutOfRangeError {
        key: String,
        value: i64,
        range: String,
    },
}
