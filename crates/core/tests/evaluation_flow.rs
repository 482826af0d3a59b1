use std::collections::HashMap;
use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;
use std::time::Duration;

use ndarray::{array, Array2};
use tempfile::TempDir;

use wider_eval_core::detection::domain::face_detector::FaceDetector;
use wider_eval_core::evaluation::eval_logger::NullEvalLogger;
use wider_eval_core::evaluation::evaluate_runtime_use_case::EvaluateRuntimeUseCase;
use wider_eval_core::remote::domain::object_store::ObjectStore;
use wider_eval_core::remote::infrastructure::fs_object_store::FsObjectStore;
use wider_eval_core::shared::error::{BoxError, EvalError};
use wider_eval_core::shared::frame::Frame;
use wider_eval_core::sink::domain::artifact::{ArtifactEntry, ZIP_ENTRY_NAME};
use wider_eval_core::sink::domain::result_sink::SinkReport;
use wider_eval_core::sink::infrastructure::local_verifier::LocalVerifier;
use wider_eval_core::sink::infrastructure::remote_uploader::RemoteUploader;
use wider_eval_core::source::infrastructure::catalog_image_source::CatalogImageSource;
use wider_eval_core::source::infrastructure::local_image_source::LocalImageSource;

/// Reports one face covering the whole frame after a fixed delay.
struct WholeFrameDetector {
    delay: Duration,
}

impl FaceDetector for WholeFrameDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Array2<f32>, BoxError> {
        std::thread::sleep(self.delay);
        Ok(array![[
            0.0,
            0.0,
            frame.width() as f32,
            frame.height() as f32,
            0.99
        ]])
    }
}

fn detector(delay_ms: u64) -> impl FnOnce() -> Result<Box<dyn FaceDetector>, BoxError> {
    move || {
        Ok(Box::new(WholeFrameDetector {
            delay: Duration::from_millis(delay_ms),
        }) as Box<dyn FaceDetector>)
    }
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([90, 120, 200]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

fn write_local_set(dir: &Path) {
    fs::create_dir_all(dir.join("images")).unwrap();
    fs::write(dir.join("images/img1.png"), png(64, 48)).unwrap();
    fs::write(dir.join("images/img2.png"), png(32, 32)).unwrap();
    fs::write(dir.join("list.txt"), "img1.png\n\nimg2.png\n").unwrap();
}

#[test]
fn local_run_is_verified_against_ground_truth() {
    let tmp = TempDir::new().unwrap();
    write_local_set(tmp.path());
    let gt = tmp.path().join("gt.json");
    fs::write(&gt, r#"{"img1.png": [[0, 0, 64, 48]], "img2.png": [[0, 0, 32, 32]]}"#).unwrap();

    let source = LocalImageSource::new(tmp.path().join("list.txt"), tmp.path().join("images"));
    let verifier = LocalVerifier::from_file(&gt).unwrap();
    let mut uc = EvaluateRuntimeUseCase::new(
        Box::new(source),
        Box::new(verifier),
        Box::new(NullEvalLogger),
    );

    let SinkReport::Verified(report) = uc.execute(detector(10)).unwrap() else {
        panic!("expected verification report");
    };
    assert_eq!(report.images, 2);
    assert!(report.total_runtime >= Duration::from_millis(20));
    assert!(report.images_per_second > 0.0);
    assert!(report.images_per_second <= 100.0);
}

#[test]
fn local_run_missing_ground_truth_image_fails() {
    let tmp = TempDir::new().unwrap();
    write_local_set(tmp.path());
    let gt = tmp.path().join("gt.json");
    fs::write(&gt, r#"{"img1.png": [], "img9.png": []}"#).unwrap();

    let source = LocalImageSource::new(tmp.path().join("list.txt"), tmp.path().join("images"));
    let mut uc = EvaluateRuntimeUseCase::new(
        Box::new(source),
        Box::new(LocalVerifier::from_file(&gt).unwrap()),
        Box::new(NullEvalLogger),
    );

    let err = uc.execute(detector(0)).unwrap_err();
    assert!(matches!(err, EvalError::MissingGroundTruth { ref id } if id == "img9.png"));
}

#[test]
fn local_run_respects_image_cap() {
    let tmp = TempDir::new().unwrap();
    write_local_set(tmp.path());
    let source = LocalImageSource::new(tmp.path().join("list.txt"), tmp.path().join("images"))
        .with_limit(Some(1));
    let mut uc = EvaluateRuntimeUseCase::new(
        Box::new(source),
        Box::new(LocalVerifier::new(Default::default())),
        Box::new(NullEvalLogger),
    );

    let output = uc.collect(detector(0)).unwrap();
    assert_eq!(output.ids().collect::<Vec<_>>(), vec!["img1.png"]);
}

#[test]
fn catalog_run_uploads_artifact_to_store() {
    let tmp = TempDir::new().unwrap();
    let store_root = tmp.path().join("store");
    let catalog = FsObjectStore::new(&store_root);
    catalog
        .put("wider", "image_list.txt", b"a.png\nb.png\n".to_vec())
        .unwrap();
    catalog.put("wider", "images/a.png", png(20, 10)).unwrap();
    catalog.put("wider", "images/b.png", png(8, 8)).unwrap();

    let source = CatalogImageSource::new(
        Box::new(FsObjectStore::new(&store_root)),
        "wider",
        "image_list.txt",
        "images",
    );
    let uploader = RemoteUploader::new(
        Box::new(FsObjectStore::new(&store_root)),
        "results",
        "outputs",
        "job-1",
    )
    .with_staging_dir(tmp.path().join("staging"));

    let mut uc = EvaluateRuntimeUseCase::new(
        Box::new(source),
        Box::new(uploader),
        Box::new(NullEvalLogger),
    );
    let SinkReport::Uploaded(receipt) = uc.execute(detector(0)).unwrap() else {
        panic!("expected upload receipt");
    };
    assert_eq!(receipt.key, "outputs/job-1.zip");

    let zipped = fs::read(store_root.join("results/outputs/job-1.zip")).unwrap();
    let mut archive = zip::ZipArchive::new(Cursor::new(zipped)).unwrap();
    assert_eq!(archive.len(), 1);
    let mut json = String::new();
    archive
        .by_name(ZIP_ENTRY_NAME)
        .unwrap()
        .read_to_string(&mut json)
        .unwrap();
    let artifact: HashMap<String, ArtifactEntry> = serde_json::from_str(&json).unwrap();

    assert_eq!(artifact.len(), 2);
    assert_eq!(artifact["a.png"].boxes, vec![vec![0.0, 0.0, 20.0, 10.0, 0.99]]);
    assert_eq!(artifact["b.png"].boxes[0][2], 8.0);
    assert!(artifact["a.png"].runtime >= 0.0);
    assert!(json.find("a.png").unwrap() < json.find("b.png").unwrap());
}

#[test]
fn catalog_run_with_missing_object_uploads_nothing() {
    let tmp = TempDir::new().unwrap();
    let store_root = tmp.path().join("store");
    let catalog = FsObjectStore::new(&store_root);
    catalog
        .put("wider", "image_list.txt", b"a.png\ngone.png\n".to_vec())
        .unwrap();
    catalog.put("wider", "images/a.png", png(4, 4)).unwrap();

    let source = CatalogImageSource::new(
        Box::new(FsObjectStore::new(&store_root)),
        "wider",
        "image_list.txt",
        "images",
    );
    let uploader = RemoteUploader::new(
        Box::new(FsObjectStore::new(&store_root)),
        "results",
        "outputs",
        "job-2",
    )
    .with_staging_dir(tmp.path().join("staging"));

    let mut uc = EvaluateRuntimeUseCase::new(
        Box::new(source),
        Box::new(uploader),
        Box::new(NullEvalLogger),
    );
    let err = uc.execute(detector(0)).unwrap_err();

    assert!(matches!(err, EvalError::Fetch { ref id, .. } if id == "gone.png"));
    assert!(!store_root.join("results").exists());
    assert!(!tmp.path().join("staging").exists());
}
