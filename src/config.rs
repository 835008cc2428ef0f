//! Host configuration, read from `SKETCHBOARD_*` environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;
use std::str::FromStr;

use crate::error::HostError;

pub const DEFAULT_COMMENTS_PATH: &str = "comments.json";
pub const DEFAULT_VIEWPORT_WIDTH: f64 = 800.0;
pub const DEFAULT_VIEWPORT_HEIGHT: f64 = 600.0;

#[derive(Debug, Clone, PartialEq)]
pub struct HostConfig {
    /// Event script to replay.
    pub script_path: PathBuf,
    /// Optional starting board: a JSON array of elements.
    pub board_path: Option<PathBuf>,
    /// JSON file backing the comment store.
    pub comments_path: PathBuf,
    pub viewport_width: f64,
    pub viewport_height: f64,
}

impl HostConfig {
    /// Build config from environment variables.
    ///
    /// Required:
    /// - `SKETCHBOARD_SCRIPT`
    ///
    /// Optional:
    /// - `SKETCHBOARD_BOARD`
    /// - `SKETCHBOARD_COMMENTS` (default `comments.json`)
    /// - `SKETCHBOARD_VIEWPORT_WIDTH` (default 800)
    /// - `SKETCHBOARD_VIEWPORT_HEIGHT` (default 600)
    ///
    /// # Errors
    ///
    /// Returns [`HostError::MissingEnv`] when `SKETCHBOARD_SCRIPT` is unset or empty.
    pub fn from_env() -> Result<Self, HostError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`HostConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, HostError> {
        let present = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let script_path = present("SKETCHBOARD_SCRIPT").ok_or(HostError::MissingEnv("SKETCHBOARD_SCRIPT"))?;
        let board_path = present("SKETCHBOARD_BOARD").map(PathBuf::from);
        let comments_path = present("SKETCHBOARD_COMMENTS").unwrap_or_else(|| DEFAULT_COMMENTS_PATH.to_owned());

        Ok(Self {
            script_path: PathBuf::from(script_path),
            board_path,
            comments_path: PathBuf::from(comments_path),
            viewport_width: viewport_extent(present("SKETCHBOARD_VIEWPORT_WIDTH"), DEFAULT_VIEWPORT_WIDTH),
            viewport_height: viewport_extent(present("SKETCHBOARD_VIEWPORT_HEIGHT"), DEFAULT_VIEWPORT_HEIGHT),
        })
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

fn viewport_extent(raw: Option<String>, default: f64) -> f64 {
    let value: f64 = parse_or(raw, default);
    if value.is_finite() && value > 0.0 { value } else { default }
}
