//! Identity & profile store contracts, plus the in-process directory used for
//! offline play and tests.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use anyhow::Result;
use rand::Rng;

use crate::types::{course_by_id, courses_in, Course, Department, ProfilePatch, UserProfile};

/// Authentication failure with a normalized, user-readable message: a short
/// uppercase phrase, never a provider error code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthError {
    pub message: String,
}

impl AuthError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Maps raw provider/service error text onto a short uppercase phrase.
    pub fn normalized(raw: &str) -> Self {
        let lowered = raw.to_lowercase();
        let message = if lowered.contains("password") || lowered.contains("credential") {
            "INVALID CREDENTIALS"
        } else if lowered.contains("not found") || lowered.contains("no such user") {
            "ACCOUNT NOT FOUND"
        } else if lowered.contains("exists") || lowered.contains("in use") || lowered.contains("taken")
        {
            "NAME TAKEN"
        } else if lowered.contains("network") || lowered.contains("timed out") || lowered.contains("connect")
        {
            "SERVICE UNAVAILABLE"
        } else if lowered.contains("token") || lowered.contains("session") || lowered.contains("expired")
        {
            "SESSION EXPIRED"
        } else {
            "LOGIN FAILED"
        };
        Self::new(message)
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for AuthError {}

/// A successful authentication: an opaque session token plus the profile.
#[derive(Debug, Clone)]
pub struct AuthSuccess {
    pub token: String,
    pub profile: UserProfile,
}

/// External identity service: guest/account creation, login, session resume.
pub trait AuthApi: Send + Sync {
    /// Creates a guest (no password) or a named account, with an initial
    /// avatar color.
    fn signup(&self, name: &str, password: Option<&str>, color: &str)
        -> Result<AuthSuccess, AuthError>;

    fn login(&self, name: &str, password: &str) -> Result<AuthSuccess, AuthError>;

    /// Resumes a previous session from a retained identity token.
    fn resume(&self, token: &str) -> Result<AuthSuccess, AuthError>;
}

/// External profile document store.
pub trait ProfileStore: Send + Sync {
    fn profile(&self, id: &str) -> Result<Option<UserProfile>>;

    fn profiles(&self, ids: &[String]) -> Result<Vec<UserProfile>>;

    fn update_profile(&self, id: &str, patch: ProfilePatch) -> Result<()>;

    /// Adds `friend_id` to `id`'s friend list. Re-sending the same friend-add
    /// is a no-op, not a duplicate.
    fn add_friend(&self, id: &str, friend_id: &str) -> Result<()>;
}

/// Department each major maps to for default course enrollment. Kept as
/// configuration so deployments can override it without touching logic.
#[derive(Debug, Clone)]
pub struct EnrollmentDefaults {
    pub by_major: Vec<(&'static str, Department)>,
    /// Course ids enrolled when the major has no department mapping.
    pub fallback_courses: Vec<&'static str>,
    /// Courses taken from the mapped department, in catalog order.
    pub per_department: usize,
}

impl Default for EnrollmentDefaults {
    fn default() -> Self {
        Self {
            by_major: vec![
                ("Computer Science", Department::Cs),
                ("Mathematics", Department::Math),
                ("Fine Arts", Department::Art),
                ("History", Department::History),
            ],
            fallback_courses: vec!["cs_web", "math_calc1"],
            per_department: 2,
        }
    }
}

impl EnrollmentDefaults {
    /// Default enrollment for a freshly created account: the mapped
    /// department's first courses (or the fallback pair) plus one random
    /// elective.
    pub fn courses_for<R: Rng>(&self, major: &str, rng: &mut R) -> Vec<String> {
        let mut enrolled: Vec<String> = match self
            .by_major
            .iter()
            .find(|(m, _)| *m == major)
            .map(|(_, d)| *d)
        {
            Some(dept) => courses_in(dept)
                .take(self.per_department)
                .map(|c: &Course| c.id.to_string())
                .collect(),
            None => self
                .fallback_courses
                .iter()
                .filter(|id| course_by_id(id).is_some())
                .map(|id| id.to_string())
                .collect(),
        };

        let catalog = crate::types::COURSE_CATALOG;
        let elective = catalog[rng.gen_range(0..catalog.len())].id.to_string();
        if !enrolled.contains(&elective) {
            enrolled.push(elective);
        }
        enrolled
    }
}

const MAJORS: &[&str] = &[
    "Computer Science",
    "Fine Arts",
    "History",
    "Mathematics",
    "Physics",
    "Biology",
    "Literature",
];
const YEARS: &[&str] = &["Freshman", "Sophomore", "Junior", "Senior"];

struct DirectoryInner {
    profiles: HashMap<String, UserProfile>,
    passwords: HashMap<String, String>,
    tokens: HashMap<String, String>,
    next_id: u64,
}

/// In-process identity & profile store. Stands in for the external service
/// when no account server is configured, and doubles as the test fixture.
pub struct LocalDirectory {
    inner: Mutex<DirectoryInner>,
    enrollment: EnrollmentDefaults,
}

impl Default for LocalDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalDirectory {
    pub fn new() -> Self {
        Self::with_defaults(EnrollmentDefaults::default())
    }

    pub fn with_defaults(enrollment: EnrollmentDefaults) -> Self {
        Self {
            inner: Mutex::new(DirectoryInner {
                profiles: HashMap::new(),
                passwords: HashMap::new(),
                tokens: HashMap::new(),
                next_id: 0,
            }),
            enrollment,
        }
    }

    fn issue_token(inner: &mut DirectoryInner, user_id: &str) -> String {
        let token = format!("token-{}-{}", user_id, inner.tokens.len() + 1);
        inner.tokens.insert(token.clone(), user_id.to_string());
        token
    }
}

impl AuthApi for LocalDirectory {
    fn signup(
        &self,
        name: &str,
        password: Option<&str>,
        color: &str,
    ) -> Result<AuthSuccess, AuthError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthError::new("NAME REQUIRED"));
        }

        let mut inner = self.inner.lock().expect("directory mutex");
        if password.is_some()
            && inner
                .profiles
                .values()
                .any(|p| p.name.eq_ignore_ascii_case(name))
        {
            return Err(AuthError::normalized("account already exists"));
        }

        inner.next_id += 1;
        let id = format!("user-{}", inner.next_id);

        let mut rng = rand::thread_rng();
        let major = MAJORS[rng.gen_range(0..MAJORS.len())].to_string();
        let year = YEARS[rng.gen_range(0..YEARS.len())].to_string();
        let enrolled_courses = self.enrollment.courses_for(&major, &mut rng);

        let profile = UserProfile {
            id: id.clone(),
            name: name.to_string(),
            major,
            year,
            bio: "Just started my journey at Birdie Campus!".to_string(),
            enrolled_courses,
            friends: vec![],
            xp: 0,
            level: 1,
            hat: None,
            glasses: None,
            color: Some(color.to_string()),
            dorm_config: None,
        };

        inner.profiles.insert(id.clone(), profile.clone());
        if let Some(password) = password {
            inner
                .passwords
                .insert(name.to_lowercase(), password.to_string());
        }
        let token = Self::issue_token(&mut inner, &id);

        Ok(AuthSuccess { token, profile })
    }

    fn login(&self, name: &str, password: &str) -> Result<AuthSuccess, AuthError> {
        let mut inner = self.inner.lock().expect("directory mutex");

        match inner.passwords.get(&name.trim().to_lowercase()) {
            Some(stored) if stored == password => {}
            Some(_) => return Err(AuthError::normalized("wrong password")),
            None => return Err(AuthError::normalized("account not found")),
        }

        let profile = inner
            .profiles
            .values()
            .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
            .cloned()
            .ok_or_else(|| AuthError::normalized("account not found"))?;

        let token = Self::issue_token(&mut inner, &profile.id);
        Ok(AuthSuccess { token, profile })
    }

    fn resume(&self, token: &str) -> Result<AuthSuccess, AuthError> {
        let mut inner = self.inner.lock().expect("directory mutex");
        let user_id = inner
            .tokens
            .get(token)
            .cloned()
            .ok_or_else(|| AuthError::normalized("session expired"))?;

        let profile = inner.profiles.get_mut(&user_id).ok_or_else(|| {
            AuthError::normalized("account not found")
        })?;

        // Backfill progression fields for accounts created before they
        // existed.
        if profile.level == 0 {
            profile.level = 1;
        }
        if profile.enrolled_courses.is_empty() {
            profile.enrolled_courses = vec!["cs_web".to_string()];
        }
        let profile = profile.clone();

        Ok(AuthSuccess {
            token: token.to_string(),
            profile,
        })
    }
}

impl ProfileStore for LocalDirectory {
    fn profile(&self, id: &str) -> Result<Option<UserProfile>> {
        let inner = self.inner.lock().expect("directory mutex");
        Ok(inner.profiles.get(id).cloned())
    }

    fn profiles(&self, ids: &[String]) -> Result<Vec<UserProfile>> {
        let inner = self.inner.lock().expect("directory mutex");
        Ok(ids
            .iter()
            .filter_map(|id| inner.profiles.get(id))
            .filter(|p| !p.id.is_empty() && !p.name.is_empty())
            .cloned()
            .collect())
    }

    fn update_profile(&self, id: &str, patch: ProfilePatch) -> Result<()> {
        let mut inner = self.inner.lock().expect("directory mutex");
        if let Some(profile) = inner.profiles.get_mut(id) {
            patch.apply(profile);
        }
        Ok(())
    }

    fn add_friend(&self, id: &str, friend_id: &str) -> Result<()> {
        let mut inner = self.inner.lock().expect("directory mutex");
        if let Some(profile) = inner.profiles.get_mut(id) {
            if !profile.friends.iter().any(|f| f == friend_id) {
                profile.friends.push(friend_id.to_string());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signup_assigns_defaults_and_courses() {
        let directory = LocalDirectory::new();
        let auth = directory.signup("Waddles", None, "#3b82f6").unwrap();

        assert_eq!(auth.profile.name, "Waddles");
        assert_eq!(auth.profile.xp, 0);
        assert_eq!(auth.profile.level, 1);
        assert!(!auth.profile.enrolled_courses.is_empty());
        assert!(auth
            .profile
            .enrolled_courses
            .iter()
            .all(|id| course_by_id(id).is_some()));
        assert!(MAJORS.contains(&auth.profile.major.as_str()));
        assert!(YEARS.contains(&auth.profile.year.as_str()));
    }

    #[test]
    fn login_and_resume_round_trip() {
        let directory = LocalDirectory::new();
        let created = directory
            .signup("Waddles", Some("hunter2"), "#3b82f6")
            .unwrap();

        let logged_in = directory.login("Waddles", "hunter2").unwrap();
        assert_eq!(logged_in.profile.id, created.profile.id);

        let resumed = directory.resume(&logged_in.token).unwrap();
        assert_eq!(resumed.profile.id, created.profile.id);
    }

    #[test]
    fn auth_failures_use_normalized_phrases() {
        let directory = LocalDirectory::new();
        directory
            .signup("Waddles", Some("hunter2"), "#3b82f6")
            .unwrap();

        let err = directory.login("Waddles", "wrong").unwrap_err();
        assert_eq!(err.message, "INVALID CREDENTIALS");

        let err = directory.login("Nobody", "pw").unwrap_err();
        assert_eq!(err.message, "ACCOUNT NOT FOUND");

        let err = directory
            .signup("Waddles", Some("again"), "#fff")
            .unwrap_err();
        assert_eq!(err.message, "NAME TAKEN");

        let err = directory.resume("bogus-token").unwrap_err();
        assert_eq!(err.message, "SESSION EXPIRED");
    }

    #[test]
    fn friend_add_is_idempotent() {
        let directory = LocalDirectory::new();
        let a = directory.signup("A", None, "#fff").unwrap().profile;
        let b = directory.signup("B", None, "#fff").unwrap().profile;

        directory.add_friend(&a.id, &b.id).unwrap();
        directory.add_friend(&a.id, &b.id).unwrap();
        directory.add_friend(&a.id, &b.id).unwrap();

        let friends = directory.profile(&a.id).unwrap().unwrap().friends;
        assert_eq!(friends, vec![b.id]);
    }

    #[test]
    fn batch_profile_fetch_skips_unknown_ids() {
        let directory = LocalDirectory::new();
        let a = directory.signup("A", None, "#fff").unwrap().profile;

        let got = directory
            .profiles(&[a.id.clone(), "missing".to_string()])
            .unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].id, a.id);
    }

    #[test]
    fn enrollment_defaults_follow_major_mapping() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let defaults = EnrollmentDefaults::default();
        let mut rng = StdRng::seed_from_u64(1);

        let cs = defaults.courses_for("Computer Science", &mut rng);
        assert!(cs.contains(&"cs_web".to_string()));
        assert!(cs.contains(&"cs_dsa".to_string()));

        let other = defaults.courses_for("Physics", &mut rng);
        assert!(other.contains(&"cs_web".to_string()));
        assert!(other.contains(&"math_calc1".to_string()));
    }

    #[test]
    fn profile_updates_apply_partially() {
        let directory = LocalDirectory::new();
        let a = directory.signup("A", None, "#fff").unwrap().profile;

        directory
            .update_profile(
                &a.id,
                ProfilePatch {
                    bio: Some("New bio".to_string()),
                    xp: Some(250),
                    level: Some(3),
                    ..ProfilePatch::default()
                },
            )
            .unwrap();

        let updated = directory.profile(&a.id).unwrap().unwrap();
        assert_eq!(updated.bio, "New bio");
        assert_eq!(updated.xp, 250);
        assert_eq!(updated.level, 3);
        assert_eq!(updated.major, a.major, "untouched fields survive");
    }
}
