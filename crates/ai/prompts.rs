use crate::domain::value_objects::preferences::UserPreferences;

pub const JSON_ONLY_SYSTEM: &str =
    "You are a career coach. Reply with a single JSON object and nothing else.";

pub struct JobContext<'a> {
    pub job_title: &'a str,
    pub company_name: &'a str,
    pub location: Option<&'a str>,
    pub description: &'a str,
}

fn list(items: &[String]) -> String {
    let items: Vec<&str> = items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}

pub fn match_analysis(job: &JobContext<'_>, preferences: &UserPreferences) -> String {
    format!(
        "Score how well this job fits the candidate.\n\n\
         Job title: {title}\n\
         Company: {company}\n\
         Location: {location}\n\
         Description:\n{description}\n\n\
         Candidate preferences:\n\
         - Core values: {values}\n\
         - Deal breakers: {deal_breakers}\n\
         - Preferred locations: {locations}\n\
         - Preferred company sizes: {sizes}\n\
         - Preferred industries: {industries}\n\n\
         Respond with JSON of this exact shape, all scores integers from 0 to 100:\n\
         {{\"match_score\": 0, \"category_scores\": {{\"values_alignment\": 0, \
         \"deal_breakers\": 0, \"location_fit\": 0, \"company_fit\": 0}}, \
         \"strengths\": [\"...\"], \"concerns\": [\"...\"], \"recommendations\": [\"...\"], \
         \"interview_question\": \"...\", \"summary\": \"...\"}}",
        title = job.job_title,
        company = job.company_name,
        location = job.location.unwrap_or("not specified"),
        description = job.description,
        values = list(&preferences.core_values),
        deal_breakers = list(&preferences.deal_breakers),
        locations = list(&preferences.preferred_locations),
        sizes = list(&preferences.preferred_company_sizes),
        industries = list(&preferences.preferred_industries),
    )
}

pub fn interview_questions(job: &JobContext<'_>, company_summary: Option<&str>) -> String {
    format!(
        "Prepare interview questions for this role.\n\n\
         Job title: {title}\n\
         Company: {company}\n\
         Company notes: {summary}\n\
         Description:\n{description}\n\n\
         Respond with JSON of this exact shape:\n\
         {{\"behavioral\": [{{\"question\": \"...\", \"tip\": \"...\"}}], \
         \"technical\": [{{\"question\": \"...\", \"tip\": \"...\"}}], \
         \"company_specific\": [{{\"question\": \"...\", \"tip\": \"...\"}}], \
         \"questions_to_ask\": [\"...\"]}}\n\
         Give 3 to 5 questions per category.",
        title = job.job_title,
        company = job.company_name,
        summary = company_summary.unwrap_or("none"),
        description = if job.description.trim().is_empty() {
            "not provided"
        } else {
            job.description
        },
    )
}

pub fn answer_feedback(job_title: &str, company_name: &str, question: &str, answer: &str) -> String {
    format!(
        "A candidate for the {job_title} role at {company_name} practiced this interview question.\n\n\
         Question: {question}\n\
         Answer: {answer}\n\n\
         Respond with JSON of this exact shape, score an integer from 0 to 10:\n\
         {{\"score\": 0, \"strengths\": [\"...\"], \"improvements\": [\"...\"], \
         \"suggested_answer\": \"...\"}}"
    )
}
