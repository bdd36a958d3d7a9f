//! Configuration and the recording/video-file metadata the Process
//! Supervisor resolves at promotion time.

use crate::error::ConfigError;
use crate::profile::EncodeProfile;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// `{concurrentEncodeNum, ffmpeg, encode}` plus the parent-directory table
/// this crate's default `VideoUtil` implementation resolves `parentDir`
/// names against.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    pub concurrent_encode_num: i64,
    pub ffmpeg: String,
    pub encode: Vec<EncodeProfile>,
    #[serde(default)]
    pub parent_dirs: HashMap<String, String>,
}

impl Configuration {
    /// Load and validate configuration from a JSON file.
    ///
    /// Validation beyond deserialization: encode profile names must be
    /// unique (a duplicate would make `EncodeCommandIsNotFound` resolution
    /// ambiguous).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Configuration =
            serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = std::collections::HashSet::new();
        for profile in &self.encode {
            if !seen.insert(profile.name.as_str()) {
                return Err(ConfigError::DuplicateProfileName(profile.name.clone()));
            }
        }
        Ok(())
    }

    /// Find the encode profile whose `name` equals `mode`, if any.
    pub fn find_profile(&self, mode: &str) -> Option<&EncodeProfile> {
        self.encode.iter().find(|p| p.name == mode)
    }
}

/// Recording metadata looked up by `recordedId`. Most fields are optional
/// and become empty-string environment variables (§4.6 step 4) when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedMetadata {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    pub extended: Option<String>,
    pub video_type: Option<String>,
    pub video_resolution: Option<String>,
    pub video_stream_content: Option<u32>,
    pub video_component_type: Option<u32>,
    pub audio_sampling_rate: Option<u32>,
    pub audio_component_type: Option<u32>,
    pub channel_id: Option<u64>,
    pub genre1: Option<u32>,
    pub genre2: Option<u32>,
    pub genre3: Option<u32>,
    pub sub_genre1: Option<u32>,
    pub sub_genre2: Option<u32>,
    pub sub_genre3: Option<u32>,
    /// Source duration in seconds, used to compute the deadline.
    pub duration: f64,
}

/// Video file metadata looked up by `sourceVideoFileId`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoFileRecord {
    pub id: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str) -> EncodeProfile {
        EncodeProfile {
            name: name.to_string(),
            cmd: "$FFMPEG -i $INPUT $OUTPUT".to_string(),
            suffix: Some(".mp4".to_string()),
            rate: None,
        }
    }

    #[test]
    fn find_profile_matches_by_name() {
        let config = Configuration {
            concurrent_encode_num: 2,
            ffmpeg: "/usr/bin/ffmpeg".into(),
            encode: vec![profile("h264"), profile("hevc")],
            parent_dirs: HashMap::new(),
        };
        assert!(config.find_profile("hevc").is_some());
        assert!(config.find_profile("av1").is_none());
    }

    #[test]
    fn deserializes_camel_case_json() {
        let json = r#"{
            "concurrentEncodeNum": 1,
            "ffmpeg": "/usr/bin/ffmpeg",
            "encode": [{"name": "h264", "cmd": "x", "suffix": ".mp4", "rate": 2.0}],
            "parentDirs": {"recorded": "/var/recorded"}
        }"#;
        let config: Configuration = serde_json::from_str(json).unwrap();
        assert_eq!(config.concurrent_encode_num, 1);
        assert_eq!(config.parent_dirs.get("recorded").unwrap(), "/var/recorded");
    }
}
