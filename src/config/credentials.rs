//! API credentials loaded from a `.env` file.
//!
//! The file is read once, at startup, and the resulting [`Credentials`] are
//! passed explicitly to the components that need them. Variables already set
//! in the process environment take precedence over the file.

use crate::error::{QuizcastError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable holding the speech API key.
pub const ELEVENLABS_API_KEY: &str = "ELEVENLABS_API_KEY";
/// Environment variable holding the completion API key.
pub const ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";

/// The credentials the pipeline knows about, in report order.
pub const REQUIRED_KEYS: [&str; 2] = [ELEVENLABS_API_KEY, ANTHROPIC_API_KEY];

/// Resolved API credentials.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub elevenlabs_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
}

impl Credentials {
    /// Load credentials from the given env file, overlaid by the process environment.
    ///
    /// A missing file is not an error here; absence is reported when a key is required.
    pub fn load(env_file: &Path) -> Result<Self> {
        let file_values = read_env_file(env_file)?;
        Ok(Self::resolve(&file_values, |key| std::env::var(key).ok()))
    }

    /// Pick each key from `env` first, then `file_values`. Blank values count as unset.
    fn resolve(file_values: &HashMap<String, String>, env: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |v: &String| !v.trim().is_empty();
        let lookup = |key: &str| {
            env(key)
                .filter(non_blank)
                .or_else(|| file_values.get(key).cloned().filter(non_blank))
        };

        Self {
            elevenlabs_api_key: lookup(ELEVENLABS_API_KEY),
            anthropic_api_key: lookup(ANTHROPIC_API_KEY),
        }
    }

    /// The completion API key, or a configuration error.
    pub fn require_anthropic(&self) -> Result<&str> {
        self.anthropic_api_key
            .as_deref()
            .ok_or_else(|| QuizcastError::MissingCredential(ANTHROPIC_API_KEY.to_string()))
    }

    /// The speech API key, or a configuration error.
    pub fn require_elevenlabs(&self) -> Result<&str> {
        self.elevenlabs_api_key
            .as_deref()
            .ok_or_else(|| QuizcastError::MissingCredential(ELEVENLABS_API_KEY.to_string()))
    }

    fn get(&self, key: &str) -> Option<&str> {
        match key {
            ELEVENLABS_API_KEY => self.elevenlabs_api_key.as_deref(),
            ANTHROPIC_API_KEY => self.anthropic_api_key.as_deref(),
            _ => None,
        }
    }
}

/// Parse the env file into a map. Returns an empty map when the file does not exist.
fn read_env_file(path: &Path) -> Result<HashMap<String, String>> {
    if !path.exists() {
        debug!("No env file at {}", path.display());
        return Ok(HashMap::new());
    }

    let iter = dotenvy::from_path_iter(path)
        .map_err(|e| QuizcastError::Config(format!("Cannot read {}: {}", path.display(), e)))?;

    let mut values = HashMap::new();
    for item in iter {
        match item {
            Ok((key, value)) => {
                values.insert(key, value);
            }
            Err(e) => warn!("Skipping malformed line in {}: {}", path.display(), e),
        }
    }
    Ok(values)
}

/// Presence report for a single credential.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyStatus {
    pub name: String,
    pub length: Option<usize>,
    pub preview: Option<String>,
}

impl KeyStatus {
    pub fn is_present(&self) -> bool {
        self.length.is_some()
    }
}

/// Everything the environment check prints.
#[derive(Debug, Clone)]
pub struct EnvReport {
    pub env_file: PathBuf,
    pub file_found: bool,
    /// Each `KEY=value` line of the file with the value replaced by asterisks.
    pub masked_lines: Vec<String>,
    pub keys: Vec<KeyStatus>,
}

impl EnvReport {
    /// Inspect the env file and the resolved credentials.
    pub fn inspect(env_file: &Path, credentials: &Credentials) -> Self {
        let contents = std::fs::read_to_string(env_file).ok();
        let masked_lines = contents
            .as_deref()
            .map(|c| c.lines().filter_map(mask_line).collect())
            .unwrap_or_default();

        let keys = REQUIRED_KEYS
            .iter()
            .map(|name| {
                let value = credentials.get(name);
                KeyStatus {
                    name: name.to_string(),
                    length: value.map(|v| v.chars().count()),
                    preview: value.map(|v| v.chars().take(4).collect()),
                }
            })
            .collect();

        Self {
            env_file: env_file.to_path_buf(),
            file_found: contents.is_some(),
            masked_lines,
            keys,
        }
    }

    /// True when every required key is present.
    pub fn all_present(&self) -> bool {
        self.keys.iter().all(KeyStatus::is_present)
    }
}

/// Mask the value half of a `KEY=value` line. Lines without `=` are dropped.
fn mask_line(line: &str) -> Option<String> {
    let (key, value) = line.trim().split_once('=')?;
    Some(format!("{}=[{}]", key, "*".repeat(value.chars().count())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_line() {
        assert_eq!(mask_line("KEY=abcd"), Some("KEY=[****]".to_string()));
        assert_eq!(mask_line("# comment"), None);
        assert_eq!(mask_line("EMPTY="), Some("EMPTY=[]".to_string()));
    }

    #[test]
    fn test_missing_file_gives_empty_map() {
        let dir = tempfile::tempdir().unwrap();
        let values = read_env_file(&dir.path().join("absent.env")).unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn test_report_previews_and_masks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "SOME_KEY=sk-test-value\nOTHER=xy\n").unwrap();

        let credentials = Credentials {
            elevenlabs_api_key: Some("el-123456".into()),
            anthropic_api_key: None,
        };
        let report = EnvReport::inspect(&path, &credentials);

        assert!(report.file_found);
        assert_eq!(report.masked_lines, vec!["SOME_KEY=[*************]", "OTHER=[**]"]);
        assert_eq!(report.keys[0].name, ELEVENLABS_API_KEY);
        assert_eq!(report.keys[0].length, Some(9));
        assert_eq!(report.keys[0].preview.as_deref(), Some("el-1"));
        assert!(!report.keys[1].is_present());
        assert!(!report.all_present());
    }

    #[test]
    fn test_process_env_wins_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(
            &path,
            "ELEVENLABS_API_KEY=el-from-file\nANTHROPIC_API_KEY=sk-ant-from-file\n",
        )
        .unwrap();
        let file_values = read_env_file(&path).unwrap();

        let credentials = Credentials::resolve(&file_values, |key| {
            (key == ANTHROPIC_API_KEY).then(|| "sk-ant-from-env".to_string())
        });

        assert_eq!(credentials.anthropic_api_key.as_deref(), Some("sk-ant-from-env"));
        assert_eq!(credentials.elevenlabs_api_key.as_deref(), Some("el-from-file"));
    }

    #[test]
    fn test_blank_values_are_unset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "ELEVENLABS_API_KEY=\nANTHROPIC_API_KEY=sk-ant-from-file\n").unwrap();
        let file_values = read_env_file(&path).unwrap();

        let credentials = Credentials::resolve(&file_values, |key| {
            (key == ANTHROPIC_API_KEY).then(|| "   ".to_string())
        });

        assert_eq!(credentials.elevenlabs_api_key, None);
        assert_eq!(credentials.anthropic_api_key.as_deref(), Some("sk-ant-from-file"));
        assert!(credentials.require_elevenlabs().is_err());
    }

    #[test]
    fn test_load_reads_env_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "ELEVENLABS_API_KEY=el-from-file\n").unwrap();

        let credentials = Credentials::load(&path).unwrap();
        if std::env::var(ELEVENLABS_API_KEY).map_or(true, |v| v.trim().is_empty()) {
            assert_eq!(credentials.elevenlabs_api_key.as_deref(), Some("el-from-file"));
        }
    }

    #[test]
    fn test_require_reports_missing_key() {
        let credentials = Credentials::default();
        let err = credentials.require_anthropic().unwrap_err();
        assert!(matches!(err, QuizcastError::MissingCredential(k) if k == ANTHROPIC_API_KEY));
    }

    #[test]
    fn test_reads_keys_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "QUIZCAST_TEST_ONLY_KEY=from-file\n").unwrap();

        let values = read_env_file(&path).unwrap();
        assert_eq!(values.get("QUIZCAST_TEST_ONLY_KEY").map(String::as_str), Some("from-file"));
    }
}
