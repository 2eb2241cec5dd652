use std::fs;
use std::path::{Path, PathBuf};

use gen_contracts::request::OutputFormat;
use reqwest::blocking::Client as HttpClient;

use crate::credentials::config_dir;
use crate::error::{GenError, Result};

pub fn generated_file_name(format: OutputFormat, timestamp: i64) -> String {
    format!("generated_{timestamp}.{}", format.as_str())
}

/// Where to save the result: `output` verbatim, a generated name inside
/// `output` when it is an existing directory, or `~/.gen-cli/output/`.
pub fn resolve_output_path(output: Option<&Path>, format: OutputFormat) -> PathBuf {
    let timestamp = chrono::Utc::now().timestamp();
    let default_dir = config_dir().map(|dir| dir.join("output"));
    resolve_output_path_in(output, format, default_dir.as_deref(), timestamp)
}

pub fn resolve_output_path_in(
    output: Option<&Path>,
    format: OutputFormat,
    default_dir: Option<&Path>,
    timestamp: i64,
) -> PathBuf {
    let file_name = generated_file_name(format, timestamp);
    match output {
        Some(path) if path.is_dir() => path.join(file_name),
        Some(path) => path.to_path_buf(),
        None => match default_dir {
            Some(dir) if fs::create_dir_all(dir).is_ok() => dir.join(file_name),
            _ => PathBuf::from(file_name),
        },
    }
}

pub fn download_image(http: &HttpClient, url: &str, path: &Path) -> Result<()> {
    let response = http.get(url).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(GenError::Download {
            status: status.as_u16(),
        });
    }
    let bytes = response.bytes()?;
    fs::write(path, &bytes).map_err(|source| GenError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "saved image");
    Ok(())
}
