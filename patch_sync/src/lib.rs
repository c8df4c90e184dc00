mod actor;
mod config;
mod error;
mod http;
mod manager;
mod model;
mod notify;
mod protocol;
mod remote;
mod reorder;
mod state;

pub use crate::actor::PatchConsole;
pub use crate::config::{parse_base_url, ConsoleConfig};
pub use crate::error::{RemoteError, SyncError, ValidationError};
pub use crate::http::HttpRemote;
pub use crate::manager::{CollectionManager, Confirm, DELETE_PROMPT};
pub use crate::model::{
    validate, validate_name, validate_settings, validate_tempo, FieldEdit, BRIGHTNESS_MAX,
    NAME_MAX_LEN, TEMPO_MAX, TEMPO_MIN,
};
pub use crate::notify::{
    ChannelSink, NoticeKind, Notification, NotificationSink, TracingSink, TransientStatus,
};
pub use crate::protocol::{Patch, Settings, MAX_PATCHES};
pub use crate::remote::PatchRemote;
pub use crate::reorder::{move_item, plan_move, DragSession, DragState, RawMove};
pub use crate::state::{Checkpoint, Entry, PatchId, PatchList, Snapshot};
