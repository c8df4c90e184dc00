use serde::{Deserialize, Serialize};

pub const PATCHES_PATH: &str = "/api/patches";
pub const REORDER_PATH: &str = "/api/patches/reorder";
pub const SETTINGS_PATH: &str = "/api/settings";

/// Patches the device keeps in its EEPROM table.
pub const MAX_PATCHES: usize = 10;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Patch {
    pub name: String,
    pub tempo: i32,
}

impl Patch {
    pub fn new(name: impl Into<String>, tempo: i32) -> Self {
        Self {
            name: name.into(),
            tempo,
        }
    }

    /// Empty-name slots are kept on the device but never shown.
    pub fn is_blank(&self) -> bool {
        self.name.is_empty()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Settings {
    pub brightness: u8,
    #[serde(
        rename = "liveGigMode",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub live_gig_mode: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UpdateRequest {
    pub index: usize,
    pub patch: Patch,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteRequest {
    pub index: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReorderRequest {
    pub patches: Vec<Patch>,
}

/// Body the device sends with a non-2xx status, e.g. `{"error":"Invalid patch index"}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}
