pub use metronome_protocol::{
    DeleteRequest, ErrorBody, Patch, ReorderRequest, Settings, UpdateRequest, MAX_PATCHES,
    PATCHES_PATH, REORDER_PATH, SETTINGS_PATH,
};
