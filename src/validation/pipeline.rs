// Per-slot validation state machine: Empty -> Pending -> {Valid, Invalid}.
//
// All state here is owned by the application context. The begin/run/complete
// split keeps the collaborator calls outside any mutable borrow of the
// pipeline, and lets completions be checked against the generation they
// started under so a reset during analysis cannot be overwritten by a stale
// result.

use std::sync::Arc;

use crate::models::{
    CaptureArtifact, DocumentSlot, SlotNotice, SlotState, SlotVerdict, SubmissionBlocker,
    ValidationState,
};
use crate::processing::{FaceDetector, FieldExtractor, LandmarkMode, TextRecognizer};
use crate::storage::SlotStore;
use crate::utils::Result;

const KEY_STATE: &str = "validation_state";
const KEY_KTP_PATH: &str = "ktp_path";
const KEY_FACE_PATH: &str = "face_path";

#[derive(Debug, Default)]
struct SlotRecord {
    state: SlotState,
    processed: bool,
    generation: u64,
    artifact_path: Option<String>,
}

/// Ticket for an analysis in flight, carrying the generation it started
/// under. Produced by `begin`, consumed by `complete`.
pub struct PendingAnalysis {
    slot: DocumentSlot,
    generation: u64,
    artifact: CaptureArtifact,
}

impl PendingAnalysis {
    pub fn slot(&self) -> DocumentSlot {
        self.slot
    }

    pub fn artifact(&self) -> &CaptureArtifact {
        &self.artifact
    }
}

/// What the collaborators reported for one slot analysis.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotAnalysis {
    Ktp {
        nik: Option<String>,
        face_present: bool,
    },
    Face {
        face_present: bool,
    },
}

pub struct ValidationPipeline {
    recognizer: Arc<dyn TextRecognizer>,
    face_detector: Arc<dyn FaceDetector>,
    store: Arc<dyn SlotStore>,
    state: ValidationState,
    ktp: SlotRecord,
    face: SlotRecord,
    notices: Vec<SlotNotice>,
}

impl ValidationPipeline {
    /// Build a pipeline, restoring any persisted snapshot from the store.
    pub fn new(
        recognizer: Arc<dyn TextRecognizer>,
        face_detector: Arc<dyn FaceDetector>,
        store: Arc<dyn SlotStore>,
    ) -> Self {
        let mut pipeline = ValidationPipeline {
            recognizer,
            face_detector,
            store,
            state: ValidationState::default(),
            ktp: SlotRecord::default(),
            face: SlotRecord::default(),
            notices: Vec::new(),
        };
        pipeline.restore();
        pipeline
    }

    fn record(&self, slot: DocumentSlot) -> &SlotRecord {
        match slot {
            DocumentSlot::Ktp => &self.ktp,
            DocumentSlot::Face => &self.face,
        }
    }

    fn record_mut(&mut self, slot: DocumentSlot) -> &mut SlotRecord {
        match slot {
            DocumentSlot::Ktp => &mut self.ktp,
            DocumentSlot::Face => &mut self.face,
        }
    }

    /// Accept a newly-arrived artifact for a slot.
    ///
    /// The processed flag is set synchronously, before any analysis runs,
    /// so a second arrival for the same slot is dropped rather than
    /// re-entering Pending. Returns None when the slot already holds a
    /// processed artifact.
    pub fn begin(&mut self, slot: DocumentSlot, artifact: CaptureArtifact) -> Option<PendingAnalysis> {
        let record = self.record_mut(slot);
        if record.processed {
            log::debug!("{} slot already processed, dropping artifact", slot.label());
            return None;
        }
        record.processed = true;
        record.state = SlotState::Pending;
        record.artifact_path = Some(artifact.storage_path.clone());
        let generation = record.generation;
        log::info!("{} slot entering analysis", slot.label());
        Some(PendingAnalysis {
            slot,
            generation,
            artifact,
        })
    }

    /// Run the collaborator analyses for a pending artifact.
    ///
    /// For the KTP slot, text recognition and face detection are issued
    /// concurrently and both awaited; neither result alone resolves the
    /// slot. For the face slot, face detection only.
    pub async fn run(&self, pending: &PendingAnalysis) -> Result<SlotAnalysis> {
        match pending.slot {
            DocumentSlot::Ktp => {
                let (text, faces) = tokio::join!(
                    self.recognizer.recognize(&pending.artifact),
                    self.face_detector.detect(&pending.artifact, LandmarkMode::All),
                );
                let text = text?;
                let faces = faces?;
                let nik = FieldExtractor::extract_identity_number(&text.text);
                Ok(SlotAnalysis::Ktp {
                    nik,
                    face_present: !faces.is_empty(),
                })
            }
            DocumentSlot::Face => {
                let faces = self
                    .face_detector
                    .detect(&pending.artifact, LandmarkMode::All)
                    .await?;
                Ok(SlotAnalysis::Face {
                    face_present: !faces.is_empty(),
                })
            }
        }
    }

    /// Apply a finished analysis to the slot it belongs to.
    ///
    /// A completion whose generation no longer matches the slot's is stale
    /// (the slot was reset while the analysis was in flight) and is
    /// discarded. A collaborator failure resolves the slot to Invalid and
    /// queues a user-facing notice naming the slot; there is no automatic
    /// retry.
    pub fn complete(
        &mut self,
        pending: PendingAnalysis,
        analysis: Result<SlotAnalysis>,
    ) -> Option<SlotVerdict> {
        let slot = pending.slot;
        if self.record(slot).generation != pending.generation {
            log::debug!("discarding stale analysis for {} slot", slot.label());
            return None;
        }

        let verdict = match analysis {
            Ok(SlotAnalysis::Ktp { nik, face_present }) => {
                self.state.is_ktp_valid = nik.is_some();
                self.state.is_ktp_face_valid = face_present;
                self.state.ktp_number = nik.unwrap_or_default();
                if self.state.is_ktp_valid && self.state.is_ktp_face_valid {
                    SlotVerdict::Valid
                } else {
                    SlotVerdict::Invalid
                }
            }
            Ok(SlotAnalysis::Face { face_present }) => {
                self.state.is_face_valid = face_present;
                if face_present {
                    SlotVerdict::Valid
                } else {
                    SlotVerdict::Invalid
                }
            }
            Err(err) => {
                log::warn!("analysis failed for {} slot: {}", slot.label(), err);
                self.notices.push(SlotNotice {
                    slot,
                    message: format!("Failed to read {}", slot.label()),
                });
                SlotVerdict::Invalid
            }
        };

        self.record_mut(slot).state = SlotState::Resolved(verdict);
        log::info!("{} slot resolved {:?}", slot.label(), verdict);
        self.persist();
        Some(verdict)
    }

    /// Convenience path: begin, run and complete in one call. Returns None
    /// when the artifact was dropped (slot already processed) or the
    /// completion was stale.
    pub async fn process(
        &mut self,
        slot: DocumentSlot,
        artifact: CaptureArtifact,
    ) -> Option<SlotVerdict> {
        let pending = self.begin(slot, artifact)?;
        let analysis = self.run(&pending).await;
        self.complete(pending, analysis)
    }

    /// Return a slot to Empty so the user can retake the photo. Bumps the
    /// slot's generation so an analysis still in flight completes into
    /// nothing.
    pub fn reset(&mut self, slot: DocumentSlot) {
        let record = self.record_mut(slot);
        record.state = SlotState::Empty;
        record.processed = false;
        record.artifact_path = None;
        record.generation += 1;
        match slot {
            DocumentSlot::Ktp => {
                self.state.is_ktp_valid = false;
                self.state.is_ktp_face_valid = false;
                self.state.ktp_number.clear();
            }
            DocumentSlot::Face => {
                self.state.is_face_valid = false;
            }
        }
        log::info!("{} slot reset", slot.label());
        self.persist();
    }

    /// Reset both slots and the persisted snapshot.
    pub fn clear(&mut self) {
        for slot in DocumentSlot::ALL {
            self.reset(slot);
        }
        self.notices.clear();
    }

    pub fn state(&self) -> &ValidationState {
        &self.state
    }

    pub fn slot_state(&self, slot: DocumentSlot) -> SlotState {
        self.record(slot).state
    }

    pub fn artifact_path(&self, slot: DocumentSlot) -> Option<&str> {
        self.record(slot).artifact_path.as_deref()
    }

    /// Drain the queued user-facing failure notices.
    pub fn drain_notices(&mut self) -> Vec<SlotNotice> {
        std::mem::take(&mut self.notices)
    }

    /// The precise reason submission is blocked, in the order the flow
    /// checks them: KTP photo missing, portrait missing, KTP unreadable.
    /// Face-slot validity is computed and exposed but deliberately not
    /// gated here.
    pub fn submission_blocker(&self) -> Option<SubmissionBlocker> {
        if self.ktp.artifact_path.is_none() {
            Some(SubmissionBlocker::MissingKtp)
        } else if self.face.artifact_path.is_none() {
            Some(SubmissionBlocker::MissingFace)
        } else if !self.ktp.state.is_valid() {
            Some(SubmissionBlocker::KtpInvalid)
        } else {
            None
        }
    }

    pub fn can_submit(&self) -> bool {
        self.submission_blocker().is_none()
    }

    // Persistence is best-effort: a storage failure is logged and the
    // in-memory state stays authoritative for the session.
    fn persist(&self) {
        let result = self.try_persist();
        if let Err(err) = result {
            log::warn!("failed to persist validation snapshot: {}", err);
        }
    }

    fn try_persist(&self) -> Result<()> {
        let snapshot = serde_json::to_string(&self.state)
            .map_err(|e| crate::utils::CaptureError::Storage(e.to_string()))?;
        self.store.put(KEY_STATE, &snapshot)?;
        for (key, record) in [(KEY_KTP_PATH, &self.ktp), (KEY_FACE_PATH, &self.face)] {
            match &record.artifact_path {
                Some(path) => self.store.put(key, path)?,
                None => self.store.remove(key)?,
            }
        }
        Ok(())
    }

    fn restore(&mut self) {
        match self.store.get(KEY_STATE) {
            Ok(Some(raw)) => match serde_json::from_str::<ValidationState>(&raw) {
                Ok(state) => self.state = state,
                Err(err) => log::warn!("ignoring corrupt validation snapshot: {}", err),
            },
            Ok(None) => {}
            Err(err) => log::warn!("could not read validation snapshot: {}", err),
        }

        for (key, slot) in [(KEY_KTP_PATH, DocumentSlot::Ktp), (KEY_FACE_PATH, DocumentSlot::Face)]
        {
            match self.store.get(key) {
                Ok(Some(path)) => {
                    let valid = match slot {
                        DocumentSlot::Ktp => {
                            self.state.is_ktp_valid && self.state.is_ktp_face_valid
                        }
                        DocumentSlot::Face => self.state.is_face_valid,
                    };
                    let verdict = if valid {
                        SlotVerdict::Valid
                    } else {
                        SlotVerdict::Invalid
                    };
                    let record = self.record_mut(slot);
                    record.processed = true;
                    record.artifact_path = Some(path);
                    record.state = SlotState::Resolved(verdict);
                }
                Ok(None) => {}
                Err(err) => log::warn!("could not read {} slot entry: {}", slot.label(), err),
            }
        }
    }
}
