// Demo driver for the capture and validation pipeline. Simulates the live
// camera feed with canned collaborators and prints a detailed report.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use clap::Parser;

use ktp_capture::models::{
    CameraFrame, CaptureArtifact, CropRegion, DocumentSlot, ViewportSize,
};
use ktp_capture::processing::{
    CropOutcome, DetectedFace, FaceDetector, FrameCropper, LandmarkMode, RecognizedText,
    TextRecognizer,
};
use ktp_capture::storage::{JsonFileStore, MemoryStore, SlotStore};
use ktp_capture::utils::Result;
use ktp_capture::{CaptureSession, ValidationPipeline};

#[derive(Parser)]
#[command(about = "Simulate a KTP + portrait capture session")]
struct Args {
    /// Viewport width in pixels
    #[arg(long, default_value_t = 1080.0)]
    width: f32,

    /// Viewport height in pixels
    #[arg(long, default_value_t = 2400.0)]
    height: f32,

    /// Simulated camera frames per capture
    #[arg(long, default_value_t = 30)]
    frames: u32,

    /// Recognized text fed to the NIK extractor for the KTP slot
    #[arg(
        long,
        default_value = "PROVINSI JAWA BARAT\nNIK : 3201010101990001\nNama: BUDI SANTOSO"
    )]
    ktp_text: String,

    /// Detected faces reported for each capture
    #[arg(long, default_value_t = 1)]
    faces: usize,

    /// Persist the session snapshot to this JSON file instead of memory
    #[arg(long)]
    store: Option<PathBuf>,
}

struct DemoCropper {
    captures: AtomicUsize,
}

impl FrameCropper for DemoCropper {
    fn crop(&self, _frame: &CameraFrame, _region: &CropRegion) -> CropOutcome {
        let n = self.captures.fetch_add(1, Ordering::SeqCst);
        CropOutcome {
            base64_data: Some(BASE64.encode(format!("demo-image-{}", n))),
            file_path: Some(format!("/tmp/ktp-capture/demo-{}.png", n)),
        }
    }
}

struct DemoRecognizer {
    text: String,
}

#[async_trait]
impl TextRecognizer for DemoRecognizer {
    async fn recognize(&self, _image: &CaptureArtifact) -> Result<RecognizedText> {
        Ok(RecognizedText {
            text: self.text.clone(),
        })
    }
}

struct DemoFaceDetector {
    faces: usize,
}

#[async_trait]
impl FaceDetector for DemoFaceDetector {
    async fn detect(
        &self,
        _image: &CaptureArtifact,
        _landmark_mode: LandmarkMode,
    ) -> Result<Vec<DetectedFace>> {
        Ok(vec![
            DetectedFace {
                left: 24.0,
                top: 32.0,
                width: 160.0,
                height: 160.0,
            };
            self.faces
        ])
    }
}

fn print_report(session: &CaptureSession, pipeline: &ValidationPipeline) {
    let region = session.crop_region();
    let state = pipeline.state();

    println!("\n===============================================");
    println!("        KTP CAPTURE VALIDATION REPORT");
    println!("===============================================\n");

    println!("CROP REGION:");
    println!(
        "  left={}% top={}% width={}% height={}%",
        region.left, region.top, region.width, region.height
    );

    println!("\nVALIDATION STEPS:");
    println!(
        "  1. NIK Extraction: {}",
        if state.is_ktp_valid { "PASSED" } else { "FAILED" }
    );
    println!(
        "  2. KTP Face Presence: {}",
        if state.is_ktp_face_valid {
            "PASSED"
        } else {
            "FAILED"
        }
    );
    println!(
        "  3. Portrait Face Presence: {}",
        if state.is_face_valid { "PASSED" } else { "FAILED" }
    );

    println!("\nEXTRACTED FIELDS:");
    println!(
        "  NIK: {}",
        if state.ktp_number.is_empty() {
            "(not found)"
        } else {
            &state.ktp_number
        }
    );

    println!("\nSUBMISSION:");
    match pipeline.submission_blocker() {
        None => println!("  READY"),
        Some(blocker) => println!("  BLOCKED: {}", blocker.message()),
    }
    println!();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let store: Arc<dyn SlotStore> = match &args.store {
        Some(path) => Arc::new(JsonFileStore::open(path)?),
        None => Arc::new(MemoryStore::new()),
    };

    let mut session = CaptureSession::new(ViewportSize::new(args.width, args.height))?;
    session.grant_permission();

    let mut pipeline = ValidationPipeline::new(
        Arc::new(DemoRecognizer {
            text: args.ktp_text.clone(),
        }),
        Arc::new(DemoFaceDetector { faces: args.faces }),
        store,
    );

    let cropper = DemoCropper {
        captures: AtomicUsize::new(0),
    };
    let frame = CameraFrame {
        width: 1920,
        height: 1080,
        data: vec![0; 1920 * 1080 * 3 / 2],
    };

    for slot in DocumentSlot::ALL {
        session.start_capture(slot)?;
        session.trigger();
        for _ in 0..args.frames {
            session.process_frame(&frame, &cropper);
        }
        match session.next_capture().await {
            Some((slot, artifact)) => {
                log::info!(
                    "captured {} bytes for {} slot at {}",
                    artifact.image_data.len(),
                    slot.label(),
                    artifact.storage_path
                );
                pipeline.process(slot, artifact).await;
            }
            None => {
                log::warn!("no capture delivered for {} slot", slot.label());
            }
        }
        for notice in pipeline.drain_notices() {
            eprintln!("NOTICE: {}", notice.message);
        }
    }

    print_report(&session, &pipeline);
    Ok(())
}
