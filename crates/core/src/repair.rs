use tracing::{info, warn};

use crate::client::DriveClient;
use crate::infer::{infer_mime, known_extension, InferenceError};
use crate::model::{RemoteEntry, RepairOutcome, RepairSummary, MAX_REPAIR_SIZE_BYTES};

#[derive(Debug, Clone)]
pub struct RepairOptions {
    pub max_size_bytes: u64,
    pub dry_run: bool,
}

impl Default for RepairOptions {
    fn default() -> Self {
        Self {
            max_size_bytes: MAX_REPAIR_SIZE_BYTES,
            dry_run: false,
        }
    }
}

// Fast local pre-filter over the scanned catalog; the repair loop
// re-validates every entry. Membership only: extensions that map to the
// generic type still pass and are logged by the repair loop.
pub fn prefilter_entries(entries: Vec<RemoteEntry>, options: &RepairOptions) -> Vec<RemoteEntry> {
    entries
        .into_iter()
        .filter(|entry| {
            entry.size <= options.max_size_bytes
                && entry.file_extension.as_deref().is_some_and(known_extension)
        })
        .collect()
}

pub fn run_repair(
    client: &DriveClient,
    entries: &[RemoteEntry],
    options: &RepairOptions,
) -> RepairSummary {
    let mut summary = RepairSummary {
        considered: entries.len() as u64,
        ..Default::default()
    };

    for entry in entries {
        summary.record(repair_entry(client, entry, options));
    }

    info!(
        "corrected {} out of {} entries",
        summary.corrected, summary.considered
    );
    summary
}

fn repair_entry(
    client: &DriveClient,
    entry: &RemoteEntry,
    options: &RepairOptions,
) -> RepairOutcome {
    let extension = entry.file_extension.as_deref().unwrap_or("");
    let mime_type = match infer_mime(extension) {
        Ok(mime) => mime,
        Err(err) => {
            warn!("skipping {} ({}): {}", entry.name, entry.id, err);
            return match err {
                InferenceError::UnknownExtension(_) => RepairOutcome::SkippedUnknownExtension,
                InferenceError::GenericMapping(_) => RepairOutcome::SkippedGenericMapping,
            };
        }
    };

    if entry.size > options.max_size_bytes {
        warn!(
            "skipping {} ({}): {} bytes exceeds the {} byte limit",
            entry.name, entry.id, entry.size, options.max_size_bytes
        );
        return RepairOutcome::SkippedTooLarge;
    }

    if options.dry_run {
        info!(
            "dry run: would copy {} ({}) with type {}",
            entry.name, entry.id, mime_type
        );
        return RepairOutcome::Corrected;
    }

    let copy = match client.copy_with_mime(&entry.id, &mime_type) {
        Ok(copy) => copy,
        Err(err) => {
            warn!("failed to copy {} ({}): {}", entry.name, entry.id, err);
            return RepairOutcome::FailedCopy;
        }
    };
    info!(
        "copied {} ({}) to {} with type {}",
        entry.name, entry.id, copy.id, mime_type
    );

    // The corrected copy exists either way; a failed trash leaves the
    // mistyped original in place for manual cleanup.
    if let Err(err) = client.trash(&entry.id) {
        warn!(
            "failed to trash original {} ({}): {}",
            entry.name, entry.id, err
        );
        return RepairOutcome::CorrectedTrashFailed;
    }

    RepairOutcome::Corrected
}
