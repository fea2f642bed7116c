use std::sync::Arc;

use anyhow::{Context, Result};

use campus_core::accounts::{AuthApi, LocalDirectory, ProfileStore};
use campus_core::catalog::RoomCatalog;
use campus_core::learning::{ContentService, OfflineContent};
use campus_core::sync::{MemoryRoomStore, RoomStore, RoomSync};
use campus_core::types::UserProfile;

use crate::network::account_api::CampusAccountApi;
use crate::network::content_api::CampusTutorApi;
use crate::preferences::Preferences;

/// Collaborator services, injected once at startup so scenes and tests can
/// swap implementations freely.
pub struct Services {
    pub auth: Arc<dyn AuthApi>,
    pub profiles: Arc<dyn ProfileStore>,
    pub content: Arc<dyn ContentService>,
    pub room_store: Arc<dyn RoomStore>,
    /// Present when running against the in-process store; drives the campus
    /// bots so offline rooms aren't empty.
    pub offline_store: Option<Arc<MemoryRoomStore>>,
}

impl Services {
    /// Wires services against the account server when `CAMPUS_API_BASE_URL`
    /// is set, otherwise fully in-process.
    fn from_environment() -> Self {
        let offline_store = Arc::new(MemoryRoomStore::new());

        let content: Arc<dyn ContentService> = match crate::hosts::tutor_base_url() {
            Some(base_url) => {
                log::info!("using tutor service at {base_url}");
                Arc::new(CampusTutorApi::new(base_url))
            }
            None => Arc::new(OfflineContent),
        };

        match crate::hosts::api_base_url() {
            Some(base_url) => {
                log::info!("using account API at {base_url}");
                let api = Arc::new(CampusAccountApi::new(base_url));
                Self {
                    auth: api.clone(),
                    profiles: api,
                    content,
                    room_store: offline_store.clone(),
                    offline_store: Some(offline_store),
                }
            }
            None => {
                log::info!("no account API configured; running fully offline");
                let directory = Arc::new(LocalDirectory::new());
                Self {
                    auth: directory.clone(),
                    profiles: directory,
                    content,
                    room_store: offline_store.clone(),
                    offline_store: Some(offline_store),
                }
            }
        }
    }
}

/// An authenticated session: the retained identity token plus the profile.
pub struct Session {
    pub token: String,
    pub profile: UserProfile,
}

/// Central application state threaded through every scene.
pub struct AppState {
    pub services: Services,
    pub catalog: RoomCatalog,
    pub preferences: Preferences,
    pub session: Option<Session>,
    pub sync: Option<RoomSync>,
    /// Most recent surfaced error, shown as a banner until dismissed.
    pub last_error: Option<String>,
}

impl AppState {
    pub fn new() -> Result<Self> {
        let catalog = RoomCatalog::new().context("room catalog failed validation")?;
        let preferences = Preferences::load();

        Ok(Self {
            services: Services::from_environment(),
            catalog,
            preferences,
            session: None,
            sync: None,
            last_error: None,
        })
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.session.as_ref().map(|s| &s.profile)
    }

    pub fn player_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.profile.id.as_str())
    }
}
