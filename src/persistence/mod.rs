pub mod files;
pub mod settings;
pub mod store;

pub use files::{
    atomic_write, data_file, ensure_daybook_dir, export_file, get_daybook_dir,
    init_local_daybook, settings_file,
};
pub use settings::{load_settings, save_settings, Settings};
pub use store::{JsonStore, MemoryStore, Snapshot, Store, StoreError, SNAPSHOT_VERSION};
