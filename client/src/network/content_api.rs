//! Blocking HTTP adapter for the external content-generation service.
//!
//! The service is treated as unreliable by contract: any error here simply
//! routes callers to the local fallback question bank.

use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use reqwest::blocking::Client;
use serde::Serialize;

use campus_core::learning::ContentService;
use campus_core::types::Question;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Serialize)]
struct GenerationRequest<'a> {
    course: &'a str,
    topic: &'a str,
    level: u32,
}

/// Client for the campus tutor service.
pub struct CampusTutorApi {
    base_url: String,
}

impl CampusTutorApi {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn post(&self, path: &str, body: &GenerationRequest<'_>) -> Result<reqwest::blocking::Response> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| anyhow!("failed to build HTTP client: {err}"))?;
        let resp = client
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .map_err(|err| anyhow!("tutor request failed: {err}"))?;
        if !resp.status().is_success() {
            bail!("tutor request failed with status {}", resp.status());
        }
        Ok(resp)
    }
}

impl ContentService for CampusTutorApi {
    fn generate_quiz(&self, course_name: &str, topic: &str, level: u32) -> Result<Vec<Question>> {
        let resp = self.post(
            "/quiz",
            &GenerationRequest {
                course: course_name,
                topic,
                level,
            },
        )?;
        let questions: Vec<Question> = resp
            .json()
            .map_err(|err| anyhow!("malformed quiz response: {err}"))?;
        Ok(questions)
    }

    fn generate_study_note(&self, course_name: &str, topic: &str, level: u32) -> Result<String> {
        #[derive(serde::Deserialize)]
        struct NoteResponse {
            text: String,
        }

        let resp = self.post(
            "/note",
            &GenerationRequest {
                course: course_name,
                topic,
                level,
            },
        )?;
        let note: NoteResponse = resp
            .json()
            .map_err(|err| anyhow!("malformed note response: {err}"))?;
        Ok(note.text)
    }
}
