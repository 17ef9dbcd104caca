use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Dimensions of the live capture surface, in pixels or device-independent
/// units. Re-supplied whenever the surface changes (e.g. orientation).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSize {
    pub width: f32,
    pub height: f32,
}

impl ViewportSize {
    pub fn new(width: f32, height: f32) -> Self {
        ViewportSize { width, height }
    }
}

/// A rectangle the document should be framed inside, expressed as
/// percentages of the viewport. All fields are in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRegion {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// One raw frame handed to the frame-processing context by the imaging
/// subsystem.
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    /// Raw pixel data in whatever layout the camera delivers.
    pub data: Vec<u8>,
}

/// The result of one successful capture. Ownership transfers to the
/// application context the moment it is delivered; the frame-processing
/// path retains no reference.
#[derive(Debug, Clone)]
pub struct CaptureArtifact {
    pub image_data: Vec<u8>,
    pub storage_path: String,
    pub captured_at: DateTime<Utc>,
}

/// Which of the two required captures an artifact belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentSlot {
    Ktp,
    Face,
}

impl DocumentSlot {
    pub const ALL: [DocumentSlot; 2] = [DocumentSlot::Ktp, DocumentSlot::Face];

    /// Human-facing label for notices and reports.
    pub fn label(&self) -> &'static str {
        match self {
            DocumentSlot::Ktp => "KTP",
            DocumentSlot::Face => "portrait photo",
        }
    }

}

/// Outcome of a completed slot analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotVerdict {
    Valid,
    Invalid,
}

/// Lifecycle of a document slot. A slot enters `Pending` at most once per
/// processed-flag cycle and always leaves it, either through a completed
/// analysis or through an explicit reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SlotState {
    #[default]
    Empty,
    Pending,
    Resolved(SlotVerdict),
}

impl SlotState {
    pub fn is_valid(&self) -> bool {
        matches!(self, SlotState::Resolved(SlotVerdict::Valid))
    }
}

/// Aggregated validation signals for the session. Mutated only by the
/// validation pipeline on the application context; persisted through the
/// slot store so it survives restarts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationState {
    pub is_ktp_valid: bool,
    pub is_ktp_face_valid: bool,
    pub is_face_valid: bool,
    pub ktp_number: String,
}

/// A user-facing failure notice produced when a collaborator call fails
/// while analyzing a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotNotice {
    pub slot: DocumentSlot,
    pub message: String,
}

/// The precise reason a document-level submission is currently blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionBlocker {
    MissingKtp,
    MissingFace,
    KtpInvalid,
}

impl SubmissionBlocker {
    pub fn message(&self) -> &'static str {
        match self {
            SubmissionBlocker::MissingKtp => "Take the KTP photo first",
            SubmissionBlocker::MissingFace => "Take the portrait photo first",
            SubmissionBlocker::KtpInvalid => {
                "The KTP photo could not be read properly, please retake it"
            }
        }
    }
}

/// Snapshot of the camera subsystem state the session cares about. The
/// device itself is an external collaborator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CameraControl {
    pub has_permission: bool,
    pub is_active: bool,
    pub torch_on: bool,
}
