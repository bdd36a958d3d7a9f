//! Process Supervisor spawn phase (§4.6 step 4): build the encoder's
//! environment and hand the job to the [`ProcessManager`] collaborator.

use crate::collaborators::{ProcessManager, SpawnSpec, SpawnedChild};
use crate::resolve::Resolution;
use encode_types::{priority, JobRequest, PromotionError, RecordedMetadata};
use std::collections::HashMap;

/// Build the byte-exact environment contract described in §4.6 step 4.
/// Absent optional metadata and a null output both become empty strings,
/// never an omitted key.
pub fn build_env(
    request: &JobRequest,
    recorded: &RecordedMetadata,
    resolution: &Resolution,
    ffmpeg: &str,
) -> HashMap<String, String> {
    fn opt_num<T: ToString>(value: Option<T>) -> String {
        value.map(|v| v.to_string()).unwrap_or_default()
    }
    fn opt_str(value: &Option<String>) -> String {
        value.clone().unwrap_or_default()
    }

    let output = resolution
        .output
        .as_ref()
        .map(|o| o.full_path.display().to_string())
        .unwrap_or_default();

    let mut env = HashMap::new();
    env.insert("PATH".to_string(), std::env::var("PATH").unwrap_or_default());
    env.insert("RECORDEDID".to_string(), recorded.id.to_string());
    env.insert("INPUT".to_string(), resolution.input_path.display().to_string());
    env.insert("OUTPUT".to_string(), output);
    env.insert("DIR".to_string(), opt_str(&request.directory));
    env.insert("FFMPEG".to_string(), ffmpeg.to_string());
    env.insert("NAME".to_string(), recorded.name.clone());
    env.insert("DESCRIPTION".to_string(), opt_str(&recorded.description));
    env.insert("EXTENDED".to_string(), opt_str(&recorded.extended));
    env.insert("VIDEOTYPE".to_string(), opt_str(&recorded.video_type));
    env.insert("VIDEORESOLUTION".to_string(), opt_str(&recorded.video_resolution));
    env.insert("VIDEOSTREAMCONTENT".to_string(), opt_num(recorded.video_stream_content));
    env.insert("VIDEOCOMPONENTTYPE".to_string(), opt_num(recorded.video_component_type));
    env.insert("AUDIOSAMPLINGRATE".to_string(), opt_num(recorded.audio_sampling_rate));
    env.insert("AUDIOCOMPONENTTYPE".to_string(), opt_num(recorded.audio_component_type));
    env.insert("CHANNELID".to_string(), opt_num(recorded.channel_id));
    env.insert("GENRE1".to_string(), opt_num(recorded.genre1));
    env.insert("GENRE2".to_string(), opt_num(recorded.genre2));
    env.insert("GENRE3".to_string(), opt_num(recorded.genre3));
    env.insert("SUBGENRE1".to_string(), opt_num(recorded.sub_genre1));
    env.insert("SUBGENRE2".to_string(), opt_num(recorded.sub_genre2));
    env.insert("SUBGENRE3".to_string(), opt_num(recorded.sub_genre3));
    env
}

/// Spawn the resolved job through `process_manager`, wrapping any spawn
/// failure as [`PromotionError::SpawnFailed`].
pub async fn spawn(
    process_manager: &dyn ProcessManager,
    job_id: encode_types::JobId,
    resolution: &Resolution,
    env: HashMap<String, String>,
) -> Result<SpawnedChild, PromotionError> {
    let output = resolution
        .output
        .as_ref()
        .map(|o| o.full_path.display().to_string())
        .unwrap_or_default();

    let spec = SpawnSpec {
        input: resolution.input_path.display().to_string(),
        output,
        cmd: resolution.profile.cmd.clone(),
        priority: priority::ENCODE,
        env,
    };

    process_manager
        .create(spec)
        .await
        .map_err(|source| PromotionError::SpawnFailed { job_id, source })
}
