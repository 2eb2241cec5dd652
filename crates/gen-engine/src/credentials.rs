//! `FAL_KEY` lookup: process environment, `./.env`, then `~/.gen-cli/.env`.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{GenError, Result};

pub const API_KEY_VAR: &str = "FAL_KEY";
pub const CONFIG_DIR_NAME: &str = ".gen-cli";

/// `~/.gen-cli`, created on first use. `None` when there is no home
/// directory or it cannot be created.
pub fn config_dir() -> Option<PathBuf> {
    let dir = dirs::home_dir()?.join(CONFIG_DIR_NAME);
    fs::create_dir_all(&dir).ok()?;
    Some(dir)
}

pub fn resolve_api_key() -> Result<String> {
    let mut dotenv_paths = vec![PathBuf::from(".env")];
    if let Some(dir) = config_dir() {
        dotenv_paths.push(dir.join(".env"));
    }
    resolve_api_key_from(env::var(API_KEY_VAR).ok(), &dotenv_paths)
}

/// First non-empty key wins: `env_value`, then each dotenv file in order.
pub fn resolve_api_key_from(env_value: Option<String>, dotenv_paths: &[PathBuf]) -> Result<String> {
    if let Some(key) = non_empty(env_value) {
        return Ok(key);
    }
    for path in dotenv_paths {
        let mut vars = parse_dotenv(path);
        if let Some(key) = non_empty(vars.remove(API_KEY_VAR)) {
            tracing::debug!(path = %path.display(), "loaded {API_KEY_VAR} from dotenv");
            return Ok(key);
        }
    }
    Err(GenError::MissingCredential)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Missing or unreadable files yield an empty map.
pub fn parse_dotenv(path: &Path) -> HashMap<String, String> {
    let content = fs::read_to_string(path).unwrap_or_default();
    let mut vars = HashMap::new();
    for raw_line in content.lines() {
        let mut line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(stripped) = line.strip_prefix("export ") {
            line = stripped.trim();
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        let value = value.trim();
        let value = strip_matching_quotes(value).unwrap_or(value);
        vars.insert(key.to_string(), value.to_string());
    }
    vars
}

fn strip_matching_quotes(value: &str) -> Option<&str> {
    ['"', '\''].into_iter().find_map(|quote| {
        value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
    })
}
