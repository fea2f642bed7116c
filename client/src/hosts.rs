use std::env;

/// Account API base URL from `CAMPUS_API_BASE_URL`, if configured.
pub fn api_base_url() -> Option<String> {
    non_empty_env("CAMPUS_API_BASE_URL")
}

/// Content-generation service base URL from `CAMPUS_TUTOR_BASE_URL`, if
/// configured. Without it, study notes and quizzes come from the local
/// fallback bank.
pub fn tutor_base_url() -> Option<String> {
    non_empty_env("CAMPUS_TUTOR_BASE_URL")
}

fn non_empty_env(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.trim_end_matches('/').to_string())
            }
        }
        Err(_) => None,
    }
}
