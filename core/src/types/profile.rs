use serde::{Deserialize, Serialize};

/// Customization of a player's private dorm room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DormConfig {
    pub floor_color: String,
    pub bed_color: String,
}

impl Default for DormConfig {
    fn default() -> Self {
        Self {
            floor_color: "#fef3c7".to_string(),
            bed_color: "#3b82f6".to_string(),
        }
    }
}

/// Persistent student profile held by the identity store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub major: String,
    pub year: String,
    pub bio: String,
    #[serde(default)]
    pub enrolled_courses: Vec<String>,
    #[serde(default)]
    pub friends: Vec<String>,
    #[serde(default)]
    pub xp: i64,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub hat: Option<String>,
    #[serde(default)]
    pub glasses: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub dorm_config: Option<DormConfig>,
}

fn default_level() -> u32 {
    1
}

/// Partial profile update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub bio: Option<String>,
    pub major: Option<String>,
    pub year: Option<String>,
    pub enrolled_courses: Option<Vec<String>>,
    pub hat: Option<Option<String>>,
    pub glasses: Option<Option<String>>,
    pub color: Option<String>,
    pub dorm_config: Option<DormConfig>,
    pub xp: Option<i64>,
    pub level: Option<u32>,
}

impl ProfilePatch {
    /// Applies this patch to `profile` in place.
    pub fn apply(&self, profile: &mut UserProfile) {
        if let Some(bio) = &self.bio {
            profile.bio = bio.clone();
        }
        if let Some(major) = &self.major {
            profile.major = major.clone();
        }
        if let Some(year) = &self.year {
            profile.year = year.clone();
        }
        if let Some(courses) = &self.enrolled_courses {
            profile.enrolled_courses = courses.clone();
        }
        if let Some(hat) = &self.hat {
            profile.hat = hat.clone();
        }
        if let Some(glasses) = &self.glasses {
            profile.glasses = glasses.clone();
        }
        if let Some(color) = &self.color {
            profile.color = Some(color.clone());
        }
        if let Some(dorm) = &self.dorm_config {
            profile.dorm_config = Some(dorm.clone());
        }
        if let Some(xp) = self.xp {
            profile.xp = xp;
        }
        if let Some(level) = self.level {
            profile.level = level;
        }
    }
}
