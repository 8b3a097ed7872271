//! Resume scoring — pluggable, trait-based analyzer of resume text vs a job description.
//!
//! Default: `LlmResumeScorer` (delegates to the AI gateway through `LlmClient`).
//! `AppState` holds an `Arc<dyn ResumeScorer>`, so tests can inject a fake.

use async_trait::async_trait;

use crate::analysis::models::ResumeAnalysis;
use crate::analysis::prompts::{
    ANALYSIS_PROMPT_TEMPLATE, ANALYSIS_SYSTEM_TEMPLATE, ANALYSIS_TEMPERATURE,
};
use crate::errors::AppError;
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::llm_client::LlmClient;

/// The scorer trait. Implement this to swap backends without touching
/// the endpoint, handler, or caller code.
#[async_trait]
pub trait ResumeScorer: Send + Sync {
    async fn analyze(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<ResumeAnalysis, AppError>;
}

/// Scores through the language model gateway.
pub struct LlmResumeScorer(pub LlmClient);

#[async_trait]
impl ResumeScorer for LlmResumeScorer {
    async fn analyze(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<ResumeAnalysis, AppError> {
        let system = build_system_prompt();
        let prompt = build_user_prompt(resume_text, job_description);
        let analysis = self
            .0
            .call_json::<ResumeAnalysis>(&prompt, &system, ANALYSIS_TEMPERATURE)
            .await?;
        Ok(analysis)
    }
}

fn build_system_prompt() -> String {
    ANALYSIS_SYSTEM_TEMPLATE.replace("{json_only}", JSON_ONLY_INSTRUCTION)
}

fn build_user_prompt(resume_text: &str, job_description: &str) -> String {
    ANALYSIS_PROMPT_TEMPLATE
        .replace("{jd_text}", job_description)
        .replace("{resume_text}", resume_text)
}
