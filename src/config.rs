//! Configuration file handling.
//!
//! The generator reads a YAML document with one file name glob per statement format and a
//! `groups` section mapping categories to description substrings. The downloader reads its own
//! YAML document with the MyAmeria credentials and the accounts to fetch. Both are read with the
//! `config` crate, which may lower-case keys, so keys are looked up without regard to case.

use crate::format::Format;
use crate::model::CategoryGroups;
use crate::{utils, Result};
use anyhow::{anyhow, Context};
use chrono::NaiveDate;
use config::{Environment, File, FileFormat, Map, Value};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Prefix of environment variables overriding downloader settings, e.g.
/// `BANKSTMT__MY_AMERIA__AUTH_TOKEN`.
const ENV_PREFIX: &str = "BANKSTMT";
const ENV_SEPARATOR: &str = "__";
const GROUPS: &str = "groups";
const SUBSTRINGS: &str = "substrings";

/// Resolves `path` as given, or relative to the parent of the current directory when it does not
/// exist there. This lets the tools run from the workspace root or from a subdirectory.
pub fn resolve_path(path: &Path) -> Result<PathBuf> {
    resolve_in(Path::new(""), path)
}

/// Like [`resolve_path`] with relative paths looked up from `dir`. The returned path is relative
/// to `dir` when `path` is.
fn resolve_in(dir: &Path, path: &Path) -> Result<PathBuf> {
    let mut candidates = vec![path.to_path_buf()];
    if path.is_relative() {
        candidates.push(Path::new("..").join(path));
    }
    candidates
        .into_iter()
        .find(|candidate| dir.join(candidate).is_file())
        .ok_or_else(|| anyhow!("The config file is missing '{}'", path.display()))
}

fn file_format(path: &Path) -> FileFormat {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => FileFormat::Json,
        Some("toml") => FileFormat::Toml,
        _ => FileFormat::Yaml,
    }
}

/// Finds `key` in a table ignoring ASCII case.
fn lookup<'a>(table: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    table.get(key).or_else(|| {
        table
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    })
}

/// The generator configuration: where statements go, how they are named and how transaction
/// descriptions look.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementsConfig {
    folder: PathBuf,
    globs: Vec<(Format, String)>,
    groups: CategoryGroups,
}

impl StatementsConfig {
    /// Loads the configuration file at `path`. Generated statements go into the folder containing
    /// the file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = resolve_path(path.as_ref())?;
        let text = utils::read(&path).await?;
        let folder = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        debug!("Loading statements config from {}", path.display());
        Self::parse(&text, file_format(&path), folder)
            .with_context(|| format!("Unable to load config from {}", path.display()))
    }

    /// Parses a YAML document. Used when the text does not come from a file.
    pub fn from_yaml(text: &str, folder: impl Into<PathBuf>) -> Result<Self> {
        Self::parse(text, FileFormat::Yaml, folder.into())
    }

    fn parse(text: &str, format: FileFormat, folder: PathBuf) -> Result<Self> {
        let root: Map<String, Value> = config::Config::builder()
            .add_source(File::from_str(text, format))
            .build()
            .context("Unable to parse the config")?
            .try_deserialize()
            .context("The config must be a mapping")?;

        let mut globs = Vec::new();
        for format in Format::ALL {
            if let Some(value) = lookup(&root, format.glob_key()) {
                let glob = value
                    .clone()
                    .into_string()
                    .with_context(|| format!("'{}' must be a string", format.glob_key()))?;
                globs.push((format, glob));
            }
        }

        let groups = match lookup(&root, GROUPS) {
            Some(value) => parse_groups(value.clone())?,
            None => CategoryGroups::default(),
        };
        Ok(Self {
            folder,
            globs,
            groups,
        })
    }

    /// The directory generated statements are written to.
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// The file name glob configured for `format`.
    pub fn glob(&self, format: Format) -> Result<&str> {
        self.globs
            .iter()
            .find(|(f, _)| *f == format)
            .map(|(_, g)| g.as_str())
            .ok_or_else(|| anyhow!("'{}' wasn't found in config.", format.glob_key()))
    }

    /// The file name for a task: the format's glob with `*` replaced by `_<suffix>_`.
    pub fn file_name(&self, format: Format, suffix: &str) -> Result<String> {
        Ok(self.glob(format)?.replace('*', &format!("_{suffix}_")))
    }

    pub fn groups(&self) -> &CategoryGroups {
        &self.groups
    }

    /// The description substrings for `category`.
    pub fn substrings(&self, category: &str) -> Option<&[String]> {
        self.groups.get(category)
    }
}

/// Reads `{<category>: {substrings: [..]}}`. Categories without substrings are skipped.
fn parse_groups(value: Value) -> Result<CategoryGroups> {
    let table = value
        .into_table()
        .context("'groups' must be a mapping of categories")?;
    let mut groups = Vec::new();
    for (category, entry) in table {
        let entry = entry
            .into_table()
            .with_context(|| format!("Group '{category}' must be a mapping"))?;
        let Some(substrings) = lookup(&entry, SUBSTRINGS) else {
            continue;
        };
        let substrings = substrings
            .clone()
            .into_array()
            .with_context(|| format!("Substrings of '{category}' must be a list"))?
            .into_iter()
            .map(|v| v.into_string())
            .collect::<std::result::Result<Vec<String>, _>>()
            .with_context(|| format!("Substrings of '{category}' must be strings"))?;
        groups.push((category, substrings));
    }
    Ok(CategoryGroups::new(groups))
}

/// Whether a MyAmeria statement is for a card or an account.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Card,
    Account,
}

serde_plain::derive_display_from_serialize!(AccountKind);

/// One MyAmeria account or card to download a statement for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AccountKind,
    pub account_number: String,
    pub inner_account_number: String,
    /// Where to save the statement, relative to the config folder.
    pub path: PathBuf,
    #[serde(
        rename = "since-DD-MM-YYYY",
        alias = "since-dd-mm-yyyy",
        with = "dmy_dashes"
    )]
    pub since: NaiveDate,
}

/// The `my_ameria` section of the downloader config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MyAmeriaConfig {
    /// Where to write the canonical CSV of the history, relative to the config folder.
    pub history_path: PathBuf,
    pub auth_token: String,
    pub client_id: String,
    #[serde(
        rename = "since-DD-MM-YYYY",
        alias = "since-dd-mm-yyyy",
        with = "dmy_dashes"
    )]
    pub since: NaiveDate,
    #[serde(default)]
    pub accounts: Vec<AccountEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct DownloaderFile {
    my_ameria: MyAmeriaConfig,
}

/// The downloader configuration. Values may be overridden with `BANKSTMT__`-prefixed environment
/// variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloaderConfig {
    folder: PathBuf,
    my_ameria: MyAmeriaConfig,
}

impl DownloaderConfig {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = resolve_path(path.as_ref())?;
        let text = utils::read(&path).await?;
        let folder = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        debug!("Loading downloader config from {}", path.display());
        Self::parse(&text, file_format(&path), folder, Some(Environment::with_prefix(ENV_PREFIX)))
            .with_context(|| format!("Unable to load config from {}", path.display()))
    }

    /// Parses a YAML document without environment overrides.
    pub fn from_yaml(text: &str, folder: impl Into<PathBuf>) -> Result<Self> {
        Self::parse(text, FileFormat::Yaml, folder.into(), None)
    }

    fn parse(
        text: &str,
        format: FileFormat,
        folder: PathBuf,
        env: Option<Environment>,
    ) -> Result<Self> {
        let mut builder = config::Config::builder().add_source(File::from_str(text, format));
        if let Some(env) = env {
            builder = builder.add_source(env.separator(ENV_SEPARATOR));
        }
        let file: DownloaderFile = builder
            .build()
            .context("Unable to parse the config")?
            .try_deserialize()
            .context("Invalid downloader config")?;
        Ok(Self {
            folder,
            my_ameria: file.my_ameria,
        })
    }

    pub fn my_ameria(&self) -> &MyAmeriaConfig {
        &self.my_ameria
    }

    /// The history CSV path, resolved against the config folder.
    pub fn history_path(&self) -> PathBuf {
        self.folder.join(&self.my_ameria.history_path)
    }

    /// A statement path, resolved against the config folder.
    pub fn statement_path(&self, account: &AccountEntry) -> PathBuf {
        self.folder.join(&account.path)
    }
}

/// `DD-MM-YYYY` dates.
mod dmy_dashes {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%d-%m-%Y";

    pub fn serialize<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&date.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let s = String::deserialize(d)?;
        NaiveDate::parse_from_str(s.trim(), FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DEMO: &str = r#"
inecobankStatementXmlFilesGlob: "inecobank/inecobank*.xml"
ameriaCsvFilesGlob: "ameria*.csv"
groups:
  Groceries:
    substrings: ["SAS", "YEREVAN CITY"]
  Salary:
    substrings:
      - SALARY
  Ignored:
    other: 1
"#;

    #[test]
    fn test_statements_config() {
        let config = StatementsConfig::from_yaml(DEMO, "/tmp/x").unwrap();
        assert_eq!(config.folder(), Path::new("/tmp/x"));
        assert_eq!(
            config.glob(Format::InecobankXml).unwrap(),
            "inecobank/inecobank*.xml"
        );
        assert_eq!(
            config
                .file_name(Format::AmeriaCsv, "EVERYDAY_AMD_365")
                .unwrap(),
            "ameria_EVERYDAY_AMD_365_.csv"
        );
        let err = config.glob(Format::GenericCsv).unwrap_err();
        assert_eq!(err.to_string(), "'genericCsvFilesGlob' wasn't found in config.");

        assert_eq!(config.groups().len(), 2);
        assert_eq!(config.substrings("Groceries").unwrap()[1], "YEREVAN CITY");
        assert_eq!(config.substrings("salary").unwrap(), &["SALARY".to_string()]);
        assert!(config.substrings("Ignored").is_none());
    }

    #[test]
    fn test_statements_config_without_groups() {
        let config = StatementsConfig::from_yaml("ameriaCsvFilesGlob: a*.csv\n", ".").unwrap();
        assert!(config.groups().is_empty());
    }

    #[tokio::test]
    async fn test_statements_config_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config-demo.yaml");
        utils::write(&path, DEMO).await.unwrap();
        let config = StatementsConfig::load(&path).await.unwrap();
        assert_eq!(config.folder(), dir.path());
        assert!(StatementsConfig::load(dir.path().join("missing.yaml"))
            .await
            .is_err());
    }

    const DOWNLOADER: &str = r#"
my_ameria:
  history_path: out/history.csv
  auth_token: "Bearer abc"
  client_id: "42"
  since-DD-MM-YYYY: "01-02-2024"
  accounts:
    - name: Main card
      type: card
      account_number: "2470000000000001"
      inner_account_number: "123"
      path: out/card.xls
      since-DD-MM-YYYY: "15-03-2024"
"#;

    #[test]
    fn test_downloader_config() {
        let config = DownloaderConfig::from_yaml(DOWNLOADER, "/data").unwrap();
        let my = config.my_ameria();
        assert_eq!(my.auth_token, "Bearer abc");
        assert_eq!(my.client_id, "42");
        assert_eq!(my.since, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(config.history_path(), PathBuf::from("/data/out/history.csv"));
        assert_eq!(my.accounts.len(), 1);
        let account = &my.accounts[0];
        assert_eq!(account.kind, AccountKind::Card);
        assert_eq!(account.kind.to_string(), "card");
        assert_eq!(account.since, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(
            config.statement_path(account),
            PathBuf::from("/data/out/card.xls")
        );
    }

    #[test]
    fn test_downloader_config_env_overrides() {
        let mut vars = Map::new();
        vars.insert(
            "BANKSTMT__MY_AMERIA__AUTH_TOKEN".to_string(),
            "Bearer env".to_string(),
        );
        vars.insert("OTHER__MY_AMERIA__CLIENT_ID".to_string(), "7".to_string());
        let env = Environment::with_prefix(ENV_PREFIX).source(Some(vars));
        let config =
            DownloaderConfig::parse(DOWNLOADER, FileFormat::Yaml, PathBuf::from("."), Some(env))
                .unwrap();
        assert_eq!(config.my_ameria().auth_token, "Bearer env");
        assert_eq!(config.my_ameria().client_id, "42");
    }

    #[test]
    fn test_resolve_path_falls_back_to_parent() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("sub");
        std::fs::create_dir(&sub).unwrap();
        std::fs::write(dir.path().join("config-demo.yaml"), DEMO).unwrap();
        std::fs::write(sub.join("local.yaml"), DEMO).unwrap();

        assert_eq!(
            resolve_in(&sub, Path::new("config-demo.yaml")).unwrap(),
            PathBuf::from("../config-demo.yaml")
        );
        assert_eq!(
            resolve_in(&sub, Path::new("local.yaml")).unwrap(),
            PathBuf::from("local.yaml")
        );
        let err = resolve_in(&sub, Path::new("missing.yaml")).unwrap_err();
        assert_eq!(err.to_string(), "The config file is missing 'missing.yaml'");

        let absolute = dir.path().join("config-demo.yaml");
        assert_eq!(resolve_path(&absolute).unwrap(), absolute);
    }

    #[test]
    fn test_downloader_config_requires_credentials() {
        let text = "my_ameria:\n  history_path: h.csv\n  since-DD-MM-YYYY: 01-01-2024\n";
        assert!(DownloaderConfig::from_yaml(text, ".").is_err());
    }
}
