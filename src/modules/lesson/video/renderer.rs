/// Animation rendering and audio muxing via external processes.
use crate::log_debug;
use crate::shared::errors::{AppError, AppResult};
use async_trait::async_trait;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use uuid::Uuid;

const RENDER_TIMEOUT: Duration = Duration::from_secs(300);
const MERGE_TIMEOUT: Duration = Duration::from_secs(60);

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnimationRenderer: Send + Sync {
    /// Render an animation program to a silent mp4 and return its path.
    /// The returned file stands alone; the renderer owns the cleanup of
    /// its working tree.
    async fn render(&self, program: &str) -> AppResult<PathBuf>;

    /// Mux a narration track onto a rendered video, writing `output`.
    async fn merge_audio(&self, video: &Path, audio: &Path, output: &Path) -> AppResult<()>;
}

/// Renders scenes with the `manim` CLI and muxes audio with `ffmpeg`.
///
/// Both invocations are bounded: the wait is capped by a timeout and the
/// child is killed when the timed-out future is dropped, so an expired
/// render cannot keep burning CPU.
pub struct ManimRenderer {
    render_timeout: Duration,
    merge_timeout: Duration,
    manim_bin: String,
    ffmpeg_bin: String,
    scratch_root: PathBuf,
}

impl ManimRenderer {
    pub fn new() -> Self {
        Self {
            render_timeout: RENDER_TIMEOUT,
            merge_timeout: MERGE_TIMEOUT,
            manim_bin: env::var("MANIM_BIN").unwrap_or_else(|_| "manim".into()),
            ffmpeg_bin: env::var("FFMPEG_BIN").unwrap_or_else(|_| "ffmpeg".into()),
            scratch_root: env::temp_dir(),
        }
    }

    #[cfg(test)]
    fn with_binaries(manim_bin: &str, ffmpeg_bin: &str, scratch_root: PathBuf) -> Self {
        Self {
            render_timeout: RENDER_TIMEOUT,
            merge_timeout: MERGE_TIMEOUT,
            manim_bin: manim_bin.to_string(),
            ffmpeg_bin: ffmpeg_bin.to_string(),
            scratch_root,
        }
    }

    async fn render_scene(&self, scratch: &Path, program: &str) -> AppResult<PathBuf> {
        let scene_path = scratch.join("scene.py");
        tokio::fs::write(&scene_path, program).await?;

        let media_dir = scratch.join("media");

        log_debug!("Rendering animation in {}", scratch.display());

        let output = tokio::time::timeout(
            self.render_timeout,
            Command::new(&self.manim_bin)
                .arg("-ql")
                .arg("--format=mp4")
                .arg("--media_dir")
                .arg(&media_dir)
                .arg(&scene_path)
                .arg("LessonScene")
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| {
            AppError::Timeout(format!(
                "Animation render exceeded {} seconds",
                self.render_timeout.as_secs()
            ))
        })??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::ExternalServiceError(format!(
                "Animation render failed: {}",
                stderr.trim()
            )));
        }

        let found = Self::find_rendered_mp4(&media_dir).await?;

        // Move the mp4 out of the working tree before it is deleted.
        let rendered = self.scratch_root.join(format!("rendered-{}.mp4", Uuid::new_v4()));
        tokio::fs::rename(&found, &rendered).await?;

        Ok(rendered)
    }

    /// Locate the mp4 manim wrote under its media dir. The exact quality
    /// subdirectory depends on the manim version, so walk the tree. A
    /// missing or empty tree means the renderer produced nothing.
    async fn find_rendered_mp4(root: &Path) -> AppResult<PathBuf> {
        let mut dirs = vec![root.to_path_buf()];

        while let Some(dir) = dirs.pop() {
            let Ok(mut entries) = tokio::fs::read_dir(&dir).await else {
                continue;
            };
            while let Ok(Some(entry)) = entries.next_entry().await {
                let path = entry.path();
                if path.is_dir() {
                    dirs.push(path);
                } else if path.extension().is_some_and(|ext| ext == "mp4") {
                    return Ok(path);
                }
            }
        }

        Err(AppError::ExternalServiceError(
            "Renderer produced no mp4 output".to_string(),
        ))
    }
}

impl Default for ManimRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnimationRenderer for ManimRenderer {
    async fn render(&self, program: &str) -> AppResult<PathBuf> {
        let scratch = self.scratch_root.join(format!("render-{}", Uuid::new_v4()));
        tokio::fs::create_dir_all(&scratch).await?;

        let outcome = self.render_scene(&scratch, program).await;

        // The scene source and manim's media tree go regardless of the
        // outcome.
        let _ = tokio::fs::remove_dir_all(&scratch).await;

        outcome
    }

    async fn merge_audio(&self, video: &Path, audio: &Path, output: &Path) -> AppResult<()> {
        let result = tokio::time::timeout(
            self.merge_timeout,
            Command::new(&self.ffmpeg_bin)
                .arg("-y")
                .arg("-i")
                .arg(video)
                .arg("-i")
                .arg(audio)
                .arg("-c:v")
                .arg("copy")
                .arg("-c:a")
                .arg("aac")
                .arg("-shortest")
                .arg(output)
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| {
            AppError::Timeout(format!(
                "Audio merge exceeded {} seconds",
                self.merge_timeout.as_secs()
            ))
        })??;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(AppError::ExternalServiceError(format!(
                "Audio merge failed: {}",
                stderr.trim()
            )));
        }

        Ok(())
    }
}
