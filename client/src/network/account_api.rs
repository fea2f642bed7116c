//! Blocking HTTP adapter for the external identity & profile store.

use std::time::Duration;

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use campus_core::accounts::{AuthApi, AuthError, AuthSuccess, ProfileStore};
use campus_core::types::{ProfilePatch, UserProfile};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
struct SignupRequest<'a> {
    name: &'a str,
    password_hash: Option<String>,
    color: &'a str,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    name: &'a str,
    password_hash: String,
}

#[derive(Serialize)]
struct ResumeRequest<'a> {
    token: &'a str,
}

#[derive(Deserialize)]
struct AuthResponse {
    token: String,
    profile: UserProfile,
}

#[derive(Serialize)]
struct BatchRequest<'a> {
    ids: &'a [String],
}

/// Hashes a password into Argon2 PHC format using a deterministic salt
/// derived from the username, so the raw password never leaves the process.
fn hash_password(username: &str, password: &str) -> Result<String, String> {
    let username_lc = username.trim().to_lowercase();
    let salt_seed = format!("campus:{}", username_lc);
    let salt = SaltString::b64_encode(salt_seed.as_bytes())
        .map_err(|err| format!("Failed to encode password salt: {err}"))?;
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| format!("Failed to hash password: {err}"))?
        .to_string();
    Ok(password_hash)
}

/// Client for the campus account service.
pub struct CampusAccountApi {
    base_url: String,
}

impl CampusAccountApi {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn client(&self) -> Result<Client, String> {
        Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| format!("Failed to build HTTP client: {err}"))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn auth_status_error(status: StatusCode) -> AuthError {
        let message = match status {
            StatusCode::BAD_REQUEST => "INVALID REQUEST",
            StatusCode::UNAUTHORIZED => "INVALID CREDENTIALS",
            StatusCode::NOT_FOUND => "ACCOUNT NOT FOUND",
            StatusCode::CONFLICT => "NAME TAKEN",
            StatusCode::INTERNAL_SERVER_ERROR => "SERVER ERROR",
            _ => "LOGIN FAILED",
        };
        AuthError::new(message)
    }

    fn post_auth<T: Serialize>(&self, path: &str, body: &T) -> Result<AuthSuccess, AuthError> {
        let client = self.client().map_err(|e| AuthError::normalized(&e))?;
        let resp = client
            .post(self.url(path))
            .json(body)
            .send()
            .map_err(|err| AuthError::normalized(&format!("network: {err}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Self::auth_status_error(status));
        }

        let body: AuthResponse = resp
            .json()
            .map_err(|_| AuthError::new("MALFORMED RESPONSE"))?;
        if body.token.trim().is_empty() {
            return Err(AuthError::new("LOGIN FAILED"));
        }
        Ok(AuthSuccess {
            token: body.token,
            profile: body.profile,
        })
    }
}

impl AuthApi for CampusAccountApi {
    fn signup(
        &self,
        name: &str,
        password: Option<&str>,
        color: &str,
    ) -> Result<AuthSuccess, AuthError> {
        let password_hash = match password {
            Some(password) => {
                Some(hash_password(name, password).map_err(|e| AuthError::normalized(&e))?)
            }
            None => None,
        };
        self.post_auth(
            "/signup",
            &SignupRequest {
                name,
                password_hash,
                color,
            },
        )
    }

    fn login(&self, name: &str, password: &str) -> Result<AuthSuccess, AuthError> {
        let password_hash =
            hash_password(name, password).map_err(|e| AuthError::normalized(&e))?;
        self.post_auth("/login", &LoginRequest { name, password_hash })
    }

    fn resume(&self, token: &str) -> Result<AuthSuccess, AuthError> {
        self.post_auth("/session/resume", &ResumeRequest { token })
    }
}

impl ProfileStore for CampusAccountApi {
    fn profile(&self, id: &str) -> anyhow::Result<Option<UserProfile>> {
        let client = self.client().map_err(anyhow::Error::msg)?;
        let resp = client
            .get(self.url(&format!("/profiles/{id}")))
            .send()
            .map_err(|err| anyhow::anyhow!("profile request failed: {err}"))?;

        match resp.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let profile: UserProfile = resp
                    .json()
                    .map_err(|err| anyhow::anyhow!("malformed profile response: {err}"))?;
                Ok(Some(profile))
            }
            status => anyhow::bail!("profile request failed with status {status}"),
        }
    }

    fn profiles(&self, ids: &[String]) -> anyhow::Result<Vec<UserProfile>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let client = self.client().map_err(anyhow::Error::msg)?;
        let resp = client
            .post(self.url("/profiles/batch"))
            .json(&BatchRequest { ids })
            .send()
            .map_err(|err| anyhow::anyhow!("batch profile request failed: {err}"))?;

        if !resp.status().is_success() {
            anyhow::bail!("batch profile request failed with status {}", resp.status());
        }
        let profiles: Vec<UserProfile> = resp
            .json()
            .map_err(|err| anyhow::anyhow!("malformed batch response: {err}"))?;
        // The store may hand back partial garbage; keep only usable entries.
        Ok(profiles
            .into_iter()
            .filter(|p| !p.id.is_empty() && !p.name.is_empty())
            .collect())
    }

    fn update_profile(&self, id: &str, patch: ProfilePatch) -> anyhow::Result<()> {
        let mut body = serde_json::Map::new();
        if let Some(bio) = &patch.bio {
            body.insert("bio".into(), bio.clone().into());
        }
        if let Some(major) = &patch.major {
            body.insert("major".into(), major.clone().into());
        }
        if let Some(year) = &patch.year {
            body.insert("year".into(), year.clone().into());
        }
        if let Some(courses) = &patch.enrolled_courses {
            body.insert(
                "enrolled_courses".into(),
                serde_json::to_value(courses)?,
            );
        }
        if let Some(hat) = &patch.hat {
            body.insert("hat".into(), serde_json::to_value(hat)?);
        }
        if let Some(glasses) = &patch.glasses {
            body.insert("glasses".into(), serde_json::to_value(glasses)?);
        }
        if let Some(color) = &patch.color {
            body.insert("color".into(), color.clone().into());
        }
        if let Some(dorm) = &patch.dorm_config {
            body.insert("dorm_config".into(), serde_json::to_value(dorm)?);
        }
        if let Some(xp) = patch.xp {
            body.insert("xp".into(), xp.into());
        }
        if let Some(level) = patch.level {
            body.insert("level".into(), level.into());
        }
        if body.is_empty() {
            return Ok(());
        }

        let client = self.client().map_err(anyhow::Error::msg)?;
        let resp = client
            .patch(self.url(&format!("/profiles/{id}")))
            .json(&body)
            .send()
            .map_err(|err| anyhow::anyhow!("profile update failed: {err}"))?;
        if !resp.status().is_success() {
            anyhow::bail!("profile update failed with status {}", resp.status());
        }
        Ok(())
    }

    fn add_friend(&self, id: &str, friend_id: &str) -> anyhow::Result<()> {
        let client = self.client().map_err(anyhow::Error::msg)?;
        // PUT makes retries harmless: the server treats a repeat as a no-op.
        let resp = client
            .put(self.url(&format!("/profiles/{id}/friends/{friend_id}")))
            .send()
            .map_err(|err| anyhow::anyhow!("friend request failed: {err}"))?;
        if !resp.status().is_success() {
            anyhow::bail!("friend request failed with status {}", resp.status());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_is_deterministic_per_user() {
        let a = hash_password("Waddles", "hunter2").unwrap();
        let b = hash_password("waddles ", "hunter2").unwrap();
        assert_eq!(a, b, "salt derives from the normalized username");

        let other = hash_password("Pingu", "hunter2").unwrap();
        assert_ne!(a, other);
        assert!(a.starts_with("$argon2"));
    }

    #[test]
    fn status_codes_map_to_normalized_phrases() {
        assert_eq!(
            CampusAccountApi::auth_status_error(StatusCode::UNAUTHORIZED).message,
            "INVALID CREDENTIALS"
        );
        assert_eq!(
            CampusAccountApi::auth_status_error(StatusCode::CONFLICT).message,
            "NAME TAKEN"
        );
        assert_eq!(
            CampusAccountApi::auth_status_error(StatusCode::BAD_GATEWAY).message,
            "LOGIN FAILED"
        );
    }
}
