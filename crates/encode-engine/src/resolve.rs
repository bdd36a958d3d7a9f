//! Process Supervisor resolution phase (§4.6 steps 1-3): turn a promoted
//! [`JobRequest`] into everything `spawn` needs — input path, encoder
//! profile, and output path — without touching the Wait Queue, Running Set,
//! or gate.

use crate::collaborators::Collaborators;
use encode_types::{Configuration, EncodeError, EncodeProfile, JobRequest, RecordedMetadata};
use std::path::{Path, PathBuf};

/// Bounded number of `(n)` suffixes tried before giving up on a free output
/// filename (§4.6 step 3, §9 "Filename collision loop").
const MAX_FILENAME_COLLISION_ATTEMPTS: u32 = 50;

/// Everything resolved about where the output lands, absent when the
/// profile has no `suffix` (the encoder writes nothing this manager tracks).
#[derive(Debug, Clone)]
pub struct ResolvedOutput {
    pub full_path: PathBuf,
    /// `directory/basename`, or just `basename` if no `directory` was given.
    pub relative_file_path: String,
    pub parent_dir_name: String,
}

/// The outcome of steps 1-3, ready to hand to [`crate::spawn::spawn`].
#[derive(Debug, Clone)]
pub struct Resolution {
    pub profile: EncodeProfile,
    pub input_path: PathBuf,
    pub output: Option<ResolvedOutput>,
    pub recorded: RecordedMetadata,
}

impl Resolution {
    /// Source duration in seconds, used to compute the deadline.
    pub fn duration_seconds(&self) -> f64 {
        self.recorded.duration
    }
}

/// Run steps 1-3 of the Process Supervisor against a job's request.
pub async fn resolve(
    collaborators: &Collaborators<'_>,
    request: &JobRequest,
    config: &Configuration,
) -> Result<Resolution, EncodeError> {
    let recorded = collaborators
        .recorded_store
        .find_id(request.recorded_id)
        .await
        .ok_or(EncodeError::RecordedIsNotFound(request.recorded_id))?;

    collaborators
        .video_file_store
        .find_id(request.source_video_file_id)
        .await
        .ok_or(EncodeError::VideoFileIdIsNotFound(request.source_video_file_id))?;

    let input_path_str = collaborators
        .video_util
        .get_full_file_path(request.source_video_file_id)
        .await
        .ok_or(EncodeError::VideoPathIsNotFound(request.source_video_file_id))?;
    let input_path = PathBuf::from(input_path_str);
    collaborators.fs_util.stat(&input_path).await?;

    let profile = config
        .find_profile(&request.mode)
        .cloned()
        .ok_or_else(|| EncodeError::EncodeCommandIsNotFound(request.mode.clone()))?;

    let output = match &profile.suffix {
        None => None,
        Some(suffix) => Some(
            resolve_output(collaborators, request, &input_path, suffix).await?,
        ),
    };

    Ok(Resolution {
        profile,
        input_path,
        output,
        recorded,
    })
}

async fn resolve_output(
    collaborators: &Collaborators<'_>,
    request: &JobRequest,
    input_path: &Path,
    suffix: &str,
) -> Result<ResolvedOutput, EncodeError> {
    let parent_dir_path = collaborators
        .video_util
        .get_parent_dir_path(&request.parent_dir)
        .await
        .ok_or_else(|| EncodeError::ParentDirIsNotFound(request.parent_dir.clone()))?;
    let mut output_dir = PathBuf::from(&parent_dir_path);
    if let Some(sub) = &request.directory {
        output_dir.push(sub);
    }
    if collaborators.fs_util.stat(&output_dir).await.is_err() {
        collaborators.fs_util.mkdir_recursive(&output_dir).await?;
    }

    let stem = input_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut candidate = output_dir.join(format!("{stem}{suffix}"));
    let mut attempt = 0u32;
    while collaborators.fs_util.stat(&candidate).await.is_ok() {
        attempt += 1;
        if attempt > MAX_FILENAME_COLLISION_ATTEMPTS {
            return Err(EncodeError::GetFilePathError(stem));
        }
        candidate = output_dir.join(format!("{stem}({attempt}){suffix}"));
    }

    let basename = candidate
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let relative_file_path = match &request.directory {
        Some(sub) => format!("{sub}/{basename}"),
        None => basename,
    };

    Ok(ResolvedOutput {
        full_path: candidate,
        relative_file_path,
        parent_dir_name: request.parent_dir.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{FsUtil, ProcessManager, RecordedStore, SpawnSpec, SpawnedChild, VideoFileStore, VideoUtil};
    use async_trait::async_trait;
    use encode_types::{EncodeProfile, RecordedMetadata, VideoFileRecord};
    use std::collections::HashSet;
    use std::sync::Mutex;

    struct FakeRecordedStore;
    #[async_trait]
    impl RecordedStore for FakeRecordedStore {
        async fn find_id(&self, recorded_id: u64) -> Option<RecordedMetadata> {
            if recorded_id == 404 {
                return None;
            }
            Some(RecordedMetadata {
                id: recorded_id,
                name: "show".into(),
                description: None,
                extended: None,
                video_type: None,
                video_resolution: None,
                video_stream_content: None,
                video_component_type: None,
                audio_sampling_rate: None,
                audio_component_type: None,
                channel_id: None,
                genre1: None,
                genre2: None,
                genre3: None,
                sub_genre1: None,
                sub_genre2: None,
                sub_genre3: None,
                duration: 60.0,
            })
        }
    }

    struct FakeVideoFileStore;
    #[async_trait]
    impl VideoFileStore for FakeVideoFileStore {
        async fn find_id(&self, video_file_id: u64) -> Option<VideoFileRecord> {
            if video_file_id == 999 {
                return None;
            }
            Some(VideoFileRecord { id: video_file_id })
        }
    }

    struct FakeVideoUtil;
    #[async_trait]
    impl VideoUtil for FakeVideoUtil {
        async fn get_full_file_path(&self, video_file_id: u64) -> Option<String> {
            Some(format!("/media/in/{video_file_id}.ts"))
        }
        async fn get_parent_dir_path(&self, parent_dir: &str) -> Option<String> {
            if parent_dir == "missing" {
                return None;
            }
            Some(format!("/media/out/{parent_dir}"))
        }
    }

    #[derive(Default)]
    struct FakeFsUtil {
        existing: Mutex<HashSet<String>>,
    }
    #[async_trait]
    impl FsUtil for FakeFsUtil {
        async fn stat(&self, path: &Path) -> std::io::Result<()> {
            if self.existing.lock().unwrap().contains(&path.display().to_string()) {
                Ok(())
            } else {
                Err(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"))
            }
        }
        async fn mkdir_recursive(&self, path: &Path) -> std::io::Result<()> {
            self.existing.lock().unwrap().insert(path.display().to_string());
            Ok(())
        }
        async fn unlink(&self, path: &Path) -> std::io::Result<()> {
            self.existing.lock().unwrap().remove(&path.display().to_string());
            Ok(())
        }
    }

    struct UnusedProcessManager;
    #[async_trait]
    impl ProcessManager for UnusedProcessManager {
        async fn create(&self, _spec: SpawnSpec) -> std::io::Result<SpawnedChild> {
            unreachable!("resolve() never spawns")
        }
    }

    fn config() -> Configuration {
        Configuration {
            concurrent_encode_num: 1,
            ffmpeg: "/usr/bin/ffmpeg".into(),
            encode: vec![EncodeProfile {
                name: "h264".into(),
                cmd: "$FFMPEG -i $INPUT $OUTPUT".into(),
                suffix: Some(".mp4".into()),
                rate: None,
            }],
            parent_dirs: Default::default(),
        }
    }

    fn request() -> JobRequest {
        JobRequest {
            recorded_id: 1,
            source_video_file_id: 1,
            mode: "h264".into(),
            parent_dir: "default".into(),
            directory: None,
            remove_original: true,
        }
    }

    fn collaborators<'a>(
        recorded: &'a FakeRecordedStore,
        video_files: &'a FakeVideoFileStore,
        video_util: &'a FakeVideoUtil,
        fs: &'a FakeFsUtil,
        pm: &'a UnusedProcessManager,
    ) -> Collaborators<'a> {
        Collaborators {
            recorded_store: recorded,
            video_file_store: video_files,
            video_util,
            fs_util: fs,
            process_manager: pm,
        }
    }

    // Pre-mark the input file as existing so `stat` on it succeeds.
    fn fs_with_input() -> FakeFsUtil {
        let fs = FakeFsUtil::default();
        fs.existing.lock().unwrap().insert("/media/in/1.ts".to_string());
        fs
    }

    #[tokio::test]
    async fn resolves_profile_and_output_for_a_happy_path_job() {
        let recorded = FakeRecordedStore;
        let video_files = FakeVideoFileStore;
        let video_util = FakeVideoUtil;
        let fs = fs_with_input();
        let pm = UnusedProcessManager;
        let c = collaborators(&recorded, &video_files, &video_util, &fs, &pm);

        let resolution = resolve(&c, &request(), &config()).await.unwrap();
        assert_eq!(resolution.profile.name, "h264");
        assert_eq!(resolution.duration_seconds(), 60.0);
        let output = resolution.output.unwrap();
        assert_eq!(output.full_path, PathBuf::from("/media/out/default/1.mp4"));
        assert_eq!(output.relative_file_path, "1.mp4");
    }

    #[tokio::test]
    async fn missing_recorded_metadata_fails_resolution() {
        let recorded = FakeRecordedStore;
        let video_files = FakeVideoFileStore;
        let video_util = FakeVideoUtil;
        let fs = fs_with_input();
        let pm = UnusedProcessManager;
        let c = collaborators(&recorded, &video_files, &video_util, &fs, &pm);

        let mut req = request();
        req.recorded_id = 404;
        let err = resolve(&c, &req, &config()).await.unwrap_err();
        assert!(matches!(err, EncodeError::RecordedIsNotFound(404)));
    }

    #[tokio::test]
    async fn unknown_mode_fails_with_encode_command_not_found() {
        let recorded = FakeRecordedStore;
        let video_files = FakeVideoFileStore;
        let video_util = FakeVideoUtil;
        let fs = fs_with_input();
        let pm = UnusedProcessManager;
        let c = collaborators(&recorded, &video_files, &video_util, &fs, &pm);

        let mut req = request();
        req.mode = "av1".into();
        let err = resolve(&c, &req, &config()).await.unwrap_err();
        assert!(matches!(err, EncodeError::EncodeCommandIsNotFound(m) if m == "av1"));
    }

    #[tokio::test]
    async fn filename_collision_appends_numeric_suffix() {
        let recorded = FakeRecordedStore;
        let video_files = FakeVideoFileStore;
        let video_util = FakeVideoUtil;
        let fs = fs_with_input();
        fs.existing
            .lock()
            .unwrap()
            .insert("/media/out/default/1.mp4".to_string());
        let pm = UnusedProcessManager;
        let c = collaborators(&recorded, &video_files, &video_util, &fs, &pm);

        let resolution = resolve(&c, &request(), &config()).await.unwrap();
        let output = resolution.output.unwrap();
        assert_eq!(
            output.full_path,
            PathBuf::from("/media/out/default/1(1).mp4")
        );
    }

    #[tokio::test]
    async fn missing_parent_dir_fails_with_parent_dir_not_found() {
        let recorded = FakeRecordedStore;
        let video_files = FakeVideoFileStore;
        let video_util = FakeVideoUtil;
        let fs = fs_with_input();
        let pm = UnusedProcessManager;
        let c = collaborators(&recorded, &video_files, &video_util, &fs, &pm);

        let mut req = request();
        req.parent_dir = "missing".into();
        let err = resolve(&c, &req, &config()).await.unwrap_err();
        assert!(matches!(err, EncodeError::ParentDirIsNotFound(d) if d == "missing"));
    }
}
