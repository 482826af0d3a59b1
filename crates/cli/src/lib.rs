//! Wiring shared by the `run-evaluation` and `local-test` binaries:
//! command-line overrides on top of [`EvalConfig`], and construction of
//! the detector, image source and result sink it describes.
use std::error::Error;
use std::path::PathBuf;

use clap::Args;

use wider_eval_core::detection::domain::face_detector::FaceDetector;
use wider_eval_core::detection::infrastructure::onnx_sample_detector::OnnxSampleDetector;
use wider_eval_core::evaluation::eval_logger::LogEvalLogger;
use wider_eval_core::evaluation::evaluate_runtime_use_case::EvaluateRuntimeUseCase;
use wider_eval_core::remote::domain::RemoteError;
use wider_eval_core::remote::infrastructure::aws_credentials::resolve_credentials;
use wider_eval_core::remote::infrastructure::http_function_invoker::HttpFunctionInvoker;
use wider_eval_core::remote::infrastructure::http_object_store::HttpObjectStore;
use wider_eval_core::remote::infrastructure::request_signer::{
    RequestSigner, LAMBDA_SERVICE, S3_SERVICE,
};
use wider_eval_core::shared::config::{
    ConfigError, DetectorConfig, EvalConfig, RemoteConfig, SourceKind,
};
use wider_eval_core::shared::error::{BoxError, EvalError};
use wider_eval_core::sink::domain::result_sink::{ResultSink, SinkReport};
use wider_eval_core::sink::infrastructure::local_verifier::LocalVerifier;
use wider_eval_core::sink::infrastructure::remote_uploader::RemoteUploader;
use wider_eval_core::source::domain::image_source::ImageSource;
use wider_eval_core::source::infrastructure::catalog_image_source::CatalogImageSource;
use wider_eval_core::source::infrastructure::local_image_source::LocalImageSource;
use wider_eval_core::source::infrastructure::service_image_source::ServiceImageSource;

/// Flags accepted by both binaries. Each one overrides the config file.
#[derive(Args, Debug, Default)]
pub struct EvalArgs {
    /// JSON config file (default: ./eval_config.json when present).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Evaluate at most this many images.
    #[arg(long)]
    pub max_images: Option<usize>,

    /// ONNX model for the sample detector.
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Detection confidence threshold (0.0-1.0).
    #[arg(long)]
    pub confidence: Option<f32>,
}

/// Loads the config file, applies command-line overrides, validates.
pub fn load_config(args: &EvalArgs) -> Result<EvalConfig, ConfigError> {
    let mut config = EvalConfig::load(args.config.as_deref())?;
    apply_overrides(&mut config, args);
    config.validate()?;
    Ok(config)
}

pub fn apply_overrides(config: &mut EvalConfig, args: &EvalArgs) {
    if args.max_images.is_some() {
        config.max_images = args.max_images;
    }
    if let Some(model) = &args.model {
        config.detector.model_path = model.clone();
    }
    if let Some(confidence) = args.confidence {
        config.detector.confidence = confidence;
    }
}

pub fn build_detector(config: &DetectorConfig) -> Result<Box<dyn FaceDetector>, BoxError> {
    log::info!("Loading sample detector: {}", config.model_path.display());
    Ok(Box::new(OnnxSampleDetector::new(
        &config.model_path,
        config.confidence,
    )?))
}

/// Object store and function clients for the configured endpoints, signed
/// with one set of credentials resolved up front.
pub struct RemoteClients<'a> {
    remote: &'a RemoteConfig,
    signers: Option<(RequestSigner, RequestSigner)>,
}

impl<'a> RemoteClients<'a> {
    pub fn new(remote: &'a RemoteConfig) -> Result<Self, RemoteError> {
        if !remote.sign_requests {
            log::warn!("Remote request signing is disabled");
            return Ok(Self {
                remote,
                signers: None,
            });
        }
        let credentials = resolve_credentials(remote.profile.as_deref())?;
        let s3 = RequestSigner::new(credentials.clone(), &remote.region, S3_SERVICE);
        let lambda = RequestSigner::new(credentials, &remote.region, LAMBDA_SERVICE);
        Ok(Self {
            remote,
            signers: Some((s3, lambda)),
        })
    }

    pub fn object_store(&self) -> Result<HttpObjectStore, RemoteError> {
        let store = HttpObjectStore::new(&self.remote.object_store_endpoint)?;
        Ok(match &self.signers {
            Some((s3, _)) => store.with_signer(s3.clone()),
            None => store,
        })
    }

    pub fn function_invoker(&self) -> Result<HttpFunctionInvoker, RemoteError> {
        let invoker = HttpFunctionInvoker::new(&self.remote.function_endpoint)?;
        Ok(match &self.signers {
            Some((_, lambda)) => invoker.with_signer(lambda.clone()),
            None => invoker,
        })
    }
}

pub fn build_source(config: &EvalConfig) -> Result<Box<dyn ImageSource>, Box<dyn Error>> {
    let limit = config.max_images;
    let source: Box<dyn ImageSource> = match config.source {
        SourceKind::Local => Box::new(
            LocalImageSource::new(&config.local.image_list, &config.local.image_dir)
                .with_limit(limit),
        ),
        SourceKind::Catalog => Box::new(
            CatalogImageSource::new(
                Box::new(RemoteClients::new(&config.remote)?.object_store()?),
                &config.catalog.bucket,
                &config.catalog.list_key,
                &config.catalog.image_prefix,
            )
            .with_limit(limit),
        ),
        SourceKind::Service => {
            let clients = RemoteClients::new(&config.remote)?;
            Box::new(
                ServiceImageSource::new(
                    Box::new(clients.function_invoker()?),
                    Box::new(clients.object_store()?),
                    &config.listing.function,
                    &config.listing.user_id,
                )
                .with_limit(limit),
            )
        }
    };
    Ok(source)
}

pub fn build_uploader(config: &EvalConfig, job_id: &str) -> Result<RemoteUploader, Box<dyn Error>> {
    let upload = &config.upload;
    let clients = RemoteClients::new(&config.remote)?;
    let mut uploader = RemoteUploader::new(
        Box::new(clients.object_store()?),
        &upload.bucket,
        &upload.prefix,
        job_id,
    )
    .with_compression(upload.compression)
    .with_staging_dir(&upload.staging_dir);

    if let Some(function) = &upload.scoring_function {
        uploader = uploader.with_scoring(
            Box::new(clients.function_invoker()?),
            function,
        );
    }
    Ok(uploader)
}

pub fn build_verifier(config: &EvalConfig) -> Result<LocalVerifier, EvalError> {
    LocalVerifier::from_file(&config.local.ground_truth)
}

/// Runs the sample detector over `source` and hands the results to `sink`.
pub fn evaluate(
    config: &EvalConfig,
    source: Box<dyn ImageSource>,
    sink: Box<dyn ResultSink>,
) -> Result<SinkReport, EvalError> {
    let logger = Box::new(LogEvalLogger::new(config.progress_interval));
    let detector = config.detector.clone();
    EvaluateRuntimeUseCase::new(source, sink, logger).execute(move || build_detector(&detector))
}
