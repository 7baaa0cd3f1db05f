pub mod client;
pub mod infer;
pub mod model;
pub mod repair;
pub mod scan;
pub mod session;

pub use client::{ApiError, ApiResult, DriveClient, ListQuery, DEFAULT_API_BASE};
pub use infer::{infer_mime, known_extension, InferenceError};
pub use model::{
    EntryPage, RemoteEntry, RepairOutcome, RepairSummary, DEFAULT_PAGE_SIZE, GENERIC_BINARY_MIME,
    MAX_REPAIR_SIZE_BYTES,
};
pub use repair::{prefilter_entries, run_repair, RepairOptions};
pub use scan::scan_catalog;
pub use session::{acquire_session, Session, StoredToken, DRIVE_SCOPE};
