use serde::{Deserialize, Deserializer, Serialize};

pub const GENERIC_BINARY_MIME: &str = "application/octet-stream";

// 900 MiB hard ceiling on entries eligible for server-side copy.
pub const MAX_REPAIR_SIZE_BYTES: u64 = 943_718_400;

pub const DEFAULT_PAGE_SIZE: u32 = 1000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RemoteEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub file_extension: Option<String>,
    #[serde(default, deserialize_with = "size_from_wire")]
    pub size: u64,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EntryPage {
    #[serde(default)]
    pub files: Vec<RemoteEntry>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

// Drive serializes int64 fields as decimal strings; entries without binary
// content omit the field entirely.
fn size_from_wire<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum WireSize {
        Text(String),
        Number(u64),
    }

    match Option::<WireSize>::deserialize(deserializer)? {
        None => Ok(0),
        Some(WireSize::Number(value)) => Ok(value),
        Some(WireSize::Text(text)) => text.parse().map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairOutcome {
    Corrected,
    CorrectedTrashFailed,
    SkippedUnknownExtension,
    SkippedGenericMapping,
    SkippedTooLarge,
    FailedCopy,
}

#[derive(Debug, Clone, Serialize, Default, PartialEq, Eq)]
pub struct RepairSummary {
    pub considered: u64,
    pub corrected: u64,
    pub skipped_unknown_extension: u64,
    pub skipped_generic_mapping: u64,
    pub skipped_too_large: u64,
    pub failed_copies: u64,
    pub failed_trash_updates: u64,
}

impl RepairSummary {
    pub fn record(&mut self, outcome: RepairOutcome) {
        match outcome {
            RepairOutcome::Corrected => self.corrected += 1,
            RepairOutcome::CorrectedTrashFailed => {
                self.corrected += 1;
                self.failed_trash_updates += 1;
            }
            RepairOutcome::SkippedUnknownExtension => self.skipped_unknown_extension += 1,
            RepairOutcome::SkippedGenericMapping => self.skipped_generic_mapping += 1,
            RepairOutcome::SkippedTooLarge => self.skipped_too_large += 1,
            RepairOutcome::FailedCopy => self.failed_copies += 1,
        }
    }

    pub fn skipped(&self) -> u64 {
        self.skipped_unknown_extension + self.skipped_generic_mapping + self.skipped_too_large
    }
}
