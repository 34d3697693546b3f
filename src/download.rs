//! Hugging Face Hub model downloads.
//!
//! Fetches a repository's ONNX model file plus tokenizer side files. An API
//! key (for gated repositories) comes from the CLI flag or the `HF_API_KEY`
//! environment variable.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;

/// Environment variable consulted when no API key flag is given.
pub const API_KEY_ENV: &str = "HF_API_KEY";

const DEFAULT_ENDPOINT: &str = "https://huggingface.co";

/// Tokenizer side files downloaded alongside the model when present.
const TOKENIZER_FILES: [&str; 3] = [
    "tokenizer.json",
    "tokenizer_config.json",
    "special_tokens_map.json",
];

/// Errors from hub downloads.
#[derive(thiserror::Error, Debug)]
pub enum HubError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("hub request failed: {0}")]
    Request(String),

    #[error("no ONNX model file in repository '{0}'")]
    NoModelFile(String),
}

#[derive(Debug, Deserialize)]
struct RepoInfo {
    #[serde(default)]
    siblings: Vec<Sibling>,
}

#[derive(Debug, Deserialize)]
struct Sibling {
    rfilename: String,
}

/// Paths to the downloaded model and tokenizer files.
#[derive(Debug)]
pub struct DownloadResult {
    pub model_path: PathBuf,
    pub tokenizer_paths: Vec<PathBuf>,
}

/// Client for the Hugging Face model hub.
pub struct HubClient {
    api_key: Option<String>,
    endpoint: String,
}

impl HubClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_endpoint(api_key, DEFAULT_ENDPOINT)
    }

    pub fn with_endpoint(api_key: Option<String>, endpoint: &str) -> Self {
        Self {
            api_key,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    /// Download a model repository's ONNX file and tokenizer side files into
    /// `destination`.
    pub fn download(
        &self,
        model_id: &str,
        destination: &Path,
    ) -> Result<DownloadResult, HubError> {
        let info = self.repo_info(model_id)?;
        let files: Vec<&str> = info.siblings.iter().map(|s| s.rfilename.as_str()).collect();

        let model_file = select_model_file(&files)
            .ok_or_else(|| HubError::NoModelFile(model_id.to_string()))?;
        tracing::info!("downloading '{}' from {}", model_file, model_id);

        fs::create_dir_all(destination)?;
        let model_path = self.fetch_file(model_id, model_file, destination)?;

        let mut tokenizer_paths = Vec::new();
        for name in TOKENIZER_FILES {
            if files.contains(&name) {
                tokenizer_paths.push(self.fetch_file(model_id, name, destination)?);
            }
        }

        Ok(DownloadResult {
            model_path,
            tokenizer_paths,
        })
    }

    fn repo_info(&self, model_id: &str) -> Result<RepoInfo, HubError> {
        let url = format!("{}/api/models/{}", self.endpoint, model_id);
        let response = self
            .request(&url)
            .call()
            .map_err(|e| HubError::Request(e.to_string()))?;
        Ok(response.into_json()?)
    }

    fn request(&self, url: &str) -> ureq::Request {
        let mut req = ureq::get(url);
        if let Some(key) = &self.api_key {
            req = req.set("Authorization", &format!("Bearer {key}"));
        }
        req
    }

    fn fetch_file(
        &self,
        model_id: &str,
        file: &str,
        destination: &Path,
    ) -> Result<PathBuf, HubError> {
        let url = format!("{}/{}/resolve/main/{}", self.endpoint, model_id, file);
        let response = self
            .request(&url)
            .call()
            .map_err(|e| HubError::Request(e.to_string()))?;

        let total: u64 = response
            .header("Content-Length")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        let pb = if total > 0 {
            let pb = ProgressBar::new(total);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
                    .unwrap()
                    .progress_chars("#>-"),
            );
            pb
        } else {
            ProgressBar::new_spinner()
        };
        pb.set_message(file.to_string());

        let path = destination.join(file);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut reader = response.into_reader();
        let mut out = File::create(&path)?;
        let mut buf = [0u8; 64 * 1024];
        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            out.write_all(&buf[..n])?;
            pb.inc(n as u64);
        }
        pb.finish_and_clear();

        Ok(path)
    }
}

/// Pick the model file from a repository listing: `model.onnx` when present,
/// otherwise the first `.onnx` sibling.
pub fn select_model_file<'a>(files: &[&'a str]) -> Option<&'a str> {
    if files.contains(&"model.onnx") {
        return Some("model.onnx");
    }
    files.iter().copied().find(|f| f.ends_with(".onnx"))
}
