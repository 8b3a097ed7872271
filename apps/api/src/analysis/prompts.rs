// All LLM prompt constants for resume analysis.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Sampling temperature for analysis calls. Low, so repeated runs score alike.
pub const ANALYSIS_TEMPERATURE: f32 = 0.3;

/// System prompt for resume-vs-JD analysis. Replace `{json_only}` before sending.
pub const ANALYSIS_SYSTEM_TEMPLATE: &str = r#"You are an expert resume analyst and ATS (Applicant Tracking System) specialist. Analyze the provided resume text against the job description and return a structured JSON response.

You MUST respond with ONLY valid JSON matching this exact schema:
{
  "matchScore": <number 0-100>,
  "atsScore": <number 0-100>,
  "matchedSkills": ["skill1", "skill2", ...],
  "missingSkills": ["skill1", "skill2", ...],
  "keywords": [
    {"keyword": "string", "inResume": boolean, "inJD": boolean, "importance": "high"|"medium"|"low"}
  ],
  "suggestions": [
    {"title": "string", "description": "string", "example": "optional string with a rewritten bullet point or suggestion"}
  ],
  "atsTips": ["tip1", "tip2", ...]
}

Guidelines:
- matchScore: Overall match percentage based on skills, experience, and keyword alignment
- atsScore: How well the resume would pass through ATS systems (formatting, keywords, structure)
- matchedSkills: Skills/technologies found in BOTH the resume and JD
- missingSkills: Important skills in the JD that are NOT in the resume
- keywords: Top 10-15 most important keywords from the JD with their presence status
- suggestions: 3-6 actionable improvements, each with a specific example or rewritten bullet point
- atsTips: 3-5 ATS-specific formatting/content tips

Be thorough and specific. {json_only}"#;

/// User prompt. Replace `{resume_text}` and `{jd_text}` before sending.
pub const ANALYSIS_PROMPT_TEMPLATE: &str = "RESUME TEXT:\n{resume_text}\n\nJOB DESCRIPTION:\n{jd_text}";
