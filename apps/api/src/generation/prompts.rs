// Prompt templates for the AI proxy endpoints.
// `{profile}` and `{description}` are substituted before sending.

use crate::llm_client::GenerationParams;

pub const WRITER_SYSTEM: &str = "You are an expert career writer. \
    Respond with the requested document text only. \
    Do NOT include explanations, citations or markdown code fences.";

/// Used when the caller sends no candidate profile.
pub const DEFAULT_PROFILE: &str = "No candidate profile was provided. \
    Keep candidate-specific claims general.";

pub const COVER_LETTER_TEMPLATE: &str = r#"Write a concise, friendly, one-page cover letter that:
- Connects the candidate's background to the employer's mission
- Maps the core requirements in the job description to examples from the candidate's experience
- Emphasizes quick learning and adaptability
- Ends with enthusiasm for next steps and an interview request

Candidate:
{profile}

Job Description:
{description}

Output only the final letter text."#;

pub const RESUME_TEMPLATE: &str = r#"Generate a targeted, one-page plain-text resume for the candidate,
tailored to the job description. Use concise bullet points with measurable impact
where possible. Do not include a contact details header; start at the SUMMARY.

Candidate:
{profile}

Job Description:
{description}

Sections:
- SUMMARY (2-3 lines)
- CORE SKILLS (comma-separated)
- EXPERIENCE (2-3 roles or projects, 3-5 bullets each aligned to the job description)
- EDUCATION

Output only the resume text."#;

pub const COVER_LETTER_PARAMS: GenerationParams = GenerationParams {
    max_tokens: 600,
    temperature: 0.6,
};

pub const RESUME_PARAMS: GenerationParams = GenerationParams {
    max_tokens: 700,
    temperature: 0.5,
};

pub fn fill_template(template: &str, description: &str, profile: Option<&str>) -> String {
    let profile = profile
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or(DEFAULT_PROFILE);

    // Single pass over the template: substituted text is never rescanned.
    let mut out = String::with_capacity(template.len() + profile.len() + description.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        if let Some(after) = tail.strip_prefix("{profile}") {
            out.push_str(profile);
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{description}") {
            out.push_str(description);
            rest = after;
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}
