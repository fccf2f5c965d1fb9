// src/scoring/prompts.rs
use crate::types::JobPosting;
use crate::utils::truncate_chars;

const MATCH_RESUME_CHARS: usize = 2000;
const REVIEW_RESUME_CHARS: usize = 3000;

pub fn match_prompt(resume_text: &str, job: &JobPosting) -> String {
    let description = if job.description.trim().is_empty() {
        String::new()
    } else {
        format!("Description: {}\n", job.description)
    };

    format!(
        r#"Resume:
{resume}

Job Details:
Title: {title}
Company: {company}
Location: {location}
{description}
Task: Evaluate how well this candidate's profile matches the job.

Please provide:
1. A numerical match score (0-100)
2. 3-5 key strengths that make this candidate suitable
3. 1-2 potential gaps in the candidate's profile
4. 2-3 specific suggestions to improve candidacy for this role

Format your response as:
Score: [number]
Strengths: [bullet points]
Gaps: [bullet points]
Suggestions: [bullet points]"#,
        resume = truncate_chars(resume_text, MATCH_RESUME_CHARS),
        title = job.title,
        company = job.company,
        location = job.location,
        description = description,
    )
}

pub fn review_prompt(resume_text: &str, keywords: &[String]) -> String {
    format!(
        r#"Resume:
{resume}

Job Keywords: {keywords}

Task: Provide specific suggestions to improve this resume for jobs related to the keywords.

Please provide:
1. 3-5 specific improvements to make the resume more effective
2. 2-3 skills or experiences that should be highlighted more prominently
3. Any formatting or structure suggestions

Format your response as:
Improvements:
- [improvement 1]
- [improvement 2]...

Skills to Highlight:
- [skill 1]
- [skill 2]...

Formatting Suggestions:
- [suggestion 1]
- [suggestion 2]..."#,
        resume = truncate_chars(resume_text, REVIEW_RESUME_CHARS),
        keywords = keywords.join(", "),
    )
}
