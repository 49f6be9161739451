// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `cfbotd` configuration: a TOML file for the durable parts, environment
//! variables layered on top for the knobs operators flip per-deployment
//! (mirroring the teacher's `daemon::env` convention of env-first, constant
//! fallback).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// `LOCAL_PATCH_BURNER_DIR` in the original: the per-branch working root.
/// Each Branch gets `{base_dir}/{branch_id}/work` and
/// `{base_dir}/{branch_id}/postgres`; `{base_dir}/template/postgres` is the
/// shared template clone the Applier copies from on every attempt.
fn default_base_dir() -> PathBuf {
    PathBuf::from("/var/lib/cfbotd/burner")
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("/var/lib/cfbotd/data")
}

fn default_socket_path() -> PathBuf {
    PathBuf::from("/var/lib/cfbotd/cfbotd.sock")
}

fn default_template_dir() -> PathBuf {
    PathBuf::from("/var/lib/cfbotd/burner/template/postgres")
}

fn default_apply_script_path() -> PathBuf {
    PathBuf::from("/var/lib/cfbotd/apply-one-patch.sh")
}

fn default_attachments_dir() -> PathBuf {
    PathBuf::from("/var/lib/cfbotd/attachments")
}

fn default_file_fetch_url_base() -> String {
    "https://commitfest.postgresql.org/attachment/".to_string()
}

const fn default_tick_interval_ms() -> u64 {
    5_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_socket_path")]
    pub socket_path: PathBuf,

    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    #[serde(default = "default_template_dir")]
    pub template_dir: PathBuf,

    #[serde(default = "default_apply_script_path")]
    pub apply_script_path: PathBuf,

    #[serde(default = "default_attachments_dir")]
    pub attachments_dir: PathBuf,

    #[serde(default = "default_file_fetch_url_base")]
    pub file_fetch_url_base: String,

    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            socket_path: default_socket_path(),
            base_dir: default_base_dir(),
            template_dir: default_template_dir(),
            apply_script_path: default_apply_script_path(),
            attachments_dir: default_attachments_dir(),
            file_fetch_url_base: default_file_fetch_url_base(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl Config {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn lock_path(&self) -> PathBuf {
        self.data_dir.join("cfbotd.lock")
    }

    /// Loads `path` as TOML if it exists, falling back to defaults
    /// otherwise, then applies environment overrides on top.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        let mut config = match path {
            Some(path) if path.exists() => {
                let body = std::fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
                toml::from_str(&body).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?
            }
            _ => Config::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("CFBOTD_DATA_DIR") {
            self.data_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("CFBOTD_SOCKET_PATH") {
            self.socket_path = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("LOCAL_PATCH_BURNER_DIR") {
            self.base_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("CFBOTD_TEMPLATE_DIR") {
            self.template_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("CFBOTD_APPLY_SCRIPT_PATH") {
            self.apply_script_path = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("CFBOTD_ATTACHMENTS_DIR") {
            self.attachments_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("FILE_FETCH_URL_BASE") {
            self.file_fetch_url_base = v;
        }
        if let Some(ms) = std::env::var("CFBOTD_TICK_INTERVAL_MS").ok().and_then(|s| s.parse::<u64>().ok()) {
            self.tick_interval_ms = ms;
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    Read(PathBuf, std::io::Error),
    #[error("failed to parse config file {0}: {1}")]
    Parse(PathBuf, toml::de::Error),
}
