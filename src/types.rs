//! Domain model for the client portal dashboard.
//!
//! Everything here mirrors the JSON the portal backend emits: camelCase
//! field names, `#[serde(default)]` on fields older backends may omit.
//! A snapshot is one internally consistent generation of a project's
//! state: it is replaced wholesale on fetch, never merged field-by-field.

use serde::{Deserialize, Serialize};

// =============================================================================
// Project
// =============================================================================

/// Lifecycle status of a project engagement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Onboarding,
    Active,
    Review,
    Completed,
    OnHold,
}

impl ProjectStatus {
    /// Human-readable label shown in the dashboard header.
    pub fn label(&self) -> &'static str {
        match self {
            ProjectStatus::Onboarding => "Getting Started",
            ProjectStatus::Active => "In Progress",
            ProjectStatus::Review => "In Review",
            ProjectStatus::Completed => "Completed",
            ProjectStatus::OnHold => "On Hold",
        }
    }
}

/// Root aggregate: one client project as the portal backend describes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: u64,
    pub name: String,
    /// Package tier the client purchased (e.g. "Launch", "Growth").
    #[serde(default)]
    pub package_tier: String,
    pub status: ProjectStatus,
    /// Overall completion, 0–100.
    pub progress: u8,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub estimated_end_date: String,
    #[serde(default)]
    pub manager_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub preview_enabled: bool,
}

impl Project {
    /// Display string for the status badge.
    pub fn status_label(&self) -> &'static str {
        self.status.label()
    }

    /// Progress clamped into the displayable 0–100 range.
    pub fn progress_percent(&self) -> u8 {
        self.progress.min(100)
    }
}

// =============================================================================
// Milestones
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneStatus {
    Pending,
    Current,
    Done,
}

/// One step of the project timeline. Order within the snapshot is the
/// rendering order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: u64,
    pub title: String,
    pub status: MilestoneStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_label: Option<String>,
}

/// Where the timeline cursor sits for a well-formed or malformed milestone
/// sequence.
///
/// The backend is supposed to keep exactly one milestone `current`; the
/// client does not reject snapshots that violate that. This resolves the
/// display deterministically: the first `current` milestone wins, a sequence
/// with none falls back to the first `pending` one, and a sequence with
/// neither renders as fully complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelinePosition {
    /// Index of the milestone the timeline cursor points at.
    At(usize),
    /// Every milestone is done (or the sequence is empty).
    Complete,
}

pub fn timeline_position(milestones: &[Milestone]) -> TimelinePosition {
    if let Some(idx) = milestones
        .iter()
        .position(|m| m.status == MilestoneStatus::Current)
    {
        return TimelinePosition::At(idx);
    }
    match milestones
        .iter()
        .position(|m| m.status == MilestoneStatus::Pending)
    {
        Some(idx) => TimelinePosition::At(idx),
        None => TimelinePosition::Complete,
    }
}

// =============================================================================
// Messages
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SenderType {
    Client,
    Admin,
}

/// One thread message, newest-first in the snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: u64,
    pub sender_name: String,
    pub sender: SenderType,
    pub text: String,
    /// Pre-formatted display time from the backend (e.g. "Today, 2:14 PM").
    #[serde(default)]
    pub sent_at_label: String,
    #[serde(default)]
    pub unread: bool,
}

// =============================================================================
// Files
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileCategory {
    Image,
    Pdf,
    Doc,
    Archive,
    Other,
}

impl FileCategory {
    /// Classify by file extension when the backend omits the category.
    pub fn from_name(name: &str) -> Self {
        let ext = name.rsplit('.').next().unwrap_or("").to_ascii_lowercase();
        match ext.as_str() {
            "png" | "jpg" | "jpeg" | "gif" | "webp" | "svg" => FileCategory::Image,
            "pdf" => FileCategory::Pdf,
            "doc" | "docx" | "txt" | "md" | "pages" => FileCategory::Doc,
            "zip" | "rar" | "7z" | "tar" | "gz" => FileCategory::Archive,
            _ => FileCategory::Other,
        }
    }
}

fn default_file_category() -> FileCategory {
    FileCategory::Other
}

/// A delivered or uploaded file. The client never deletes or mutates these;
/// new entries appear via refetch after an upload batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileAsset {
    pub id: u64,
    pub name: String,
    /// Human-readable size from the backend (e.g. "2.4 MB").
    #[serde(default)]
    pub size_label: String,
    #[serde(default)]
    pub uploaded_at_label: String,
    #[serde(default = "default_file_category")]
    pub category: FileCategory,
}

// =============================================================================
// Approvals
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalType {
    Design,
    Content,
    Final,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    ChangesRequested,
}

/// A deliverable awaiting (or past) the client's sign-off.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Approval {
    pub id: u64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub kind: ApprovalType,
    pub status: ApprovalStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone_title: Option<String>,
    #[serde(default)]
    pub created_at_label: String,
    /// Set by the backend when the approval is granted. The client never
    /// fabricates this; it refetches after approving.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

// =============================================================================
// Snapshot
// =============================================================================

/// The full state of one project as last retrieved from the portal service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSnapshot {
    pub project: Project,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub files: Vec<FileAsset>,
    #[serde(default)]
    pub approvals: Vec<Approval>,
    /// Unread badge count for the header. Must equal the number of messages
    /// with `unread == true` within this snapshot.
    #[serde(default)]
    pub unread_count: u32,
}

impl ProjectSnapshot {
    /// Number of messages flagged unread in this snapshot.
    pub fn unread_messages(&self) -> u32 {
        self.messages.iter().filter(|m| m.unread).count() as u32
    }

    /// Whether the header badge agrees with the per-message flags.
    pub fn unread_count_consistent(&self) -> bool {
        self.unread_count == self.unread_messages()
    }

    pub fn approval(&self, id: u64) -> Option<&Approval> {
        self.approvals.iter().find(|a| a.id == id)
    }
}
