/// Narrated video generation for a lesson.
///
/// Stages run in order: narration script, animation program, render,
/// speech synthesis, audio mux. Every substep failure fails the whole
/// generation except the final mux, which falls back to publishing the
/// silent render so the lesson still gets a video.
use crate::log_warn;
use crate::modules::lesson::video::renderer::AnimationRenderer;
use crate::modules::pipeline::parse::strip_code_fences;
use crate::modules::pipeline::prompts;
use crate::modules::provider::llm::CompletionClient;
use crate::modules::provider::speech::SpeechSynthesizer;
use crate::shared::errors::AppResult;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

const DEFAULT_OUTPUT_DIR: &str = "videos";
const NARRATION_MAX_TOKENS: u32 = 2048;
const PROGRAM_MAX_TOKENS: u32 = 4096;

pub struct VideoGenerator {
    llm: Arc<dyn CompletionClient>,
    speech: Arc<dyn SpeechSynthesizer>,
    renderer: Arc<dyn AnimationRenderer>,
    output_dir: PathBuf,
}

impl VideoGenerator {
    pub fn new(
        llm: Arc<dyn CompletionClient>,
        speech: Arc<dyn SpeechSynthesizer>,
        renderer: Arc<dyn AnimationRenderer>,
    ) -> Self {
        let output_dir = env::var("VIDEO_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_OUTPUT_DIR));

        Self::with_output_dir(llm, speech, renderer, output_dir)
    }

    pub fn with_output_dir(
        llm: Arc<dyn CompletionClient>,
        speech: Arc<dyn SpeechSynthesizer>,
        renderer: Arc<dyn AnimationRenderer>,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            llm,
            speech,
            renderer,
            output_dir,
        }
    }

    /// Run the full generation for one lesson and return the published
    /// video path, addressable by (course, module index).
    pub async fn generate(
        &self,
        course_id: Uuid,
        module_index: i32,
        module_name: &str,
        lesson_content: &str,
    ) -> AppResult<String> {
        let narration = self
            .llm
            .complete(
                &prompts::narration_script(module_name, lesson_content),
                NARRATION_MAX_TOKENS,
            )
            .await?;
        let narration = narration.trim().to_string();

        let program = self
            .llm
            .complete(
                &prompts::animation_program(module_name, lesson_content, &narration),
                PROGRAM_MAX_TOKENS,
            )
            .await?;
        let program = strip_code_fences(&program);

        let rendered = self.renderer.render(&program).await?;

        // Narration audio is mandatory; only the mux may degrade to the
        // silent render.
        let audio = match self.speech.synthesize(&narration).await {
            Ok(audio) => audio,
            Err(e) => {
                let _ = tokio::fs::remove_file(&rendered).await;
                return Err(e);
            }
        };

        let course_dir = self.output_dir.join(course_id.to_string());
        tokio::fs::create_dir_all(&course_dir).await?;
        let final_path = course_dir.join(format!("{}.mp4", module_index));

        if let Err(e) = self
            .renderer
            .merge_audio(&rendered, &audio, &final_path)
            .await
        {
            log_warn!(
                "Audio merge failed for course {} module {}, publishing silent video: {}",
                course_id,
                module_index,
                e
            );
            tokio::fs::copy(&rendered, &final_path).await?;
        }

        let _ = tokio::fs::remove_file(&audio).await;
        let _ = tokio::fs::remove_file(&rendered).await;

        Ok(final_path.to_string_lossy().into_owned())
    }
}
