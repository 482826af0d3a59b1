pub const DEFAULT_REGION: &str = "us-west-2";
pub const DEFAULT_OBJECT_STORE_ENDPOINT: &str = "https://s3.us-west-2.amazonaws.com";
pub const DEFAULT_FUNCTION_ENDPOINT: &str = "https://lambda.us-west-2.amazonaws.com";

pub const IMAGE_LIST_FUNCTION: &str = "WIDERImageList";
pub const SCORING_FUNCTION: &str = "WIDEREval";
/// Identifying payload sent with the image-list request.
pub const IMAGE_LIST_USER_ID: &str = "123";

pub const UPLOAD_BUCKET: &str = "wider-runtime-eval-dev";
pub const UPLOAD_PREFIX: &str = "outputs";

pub const LOCAL_IMAGE_LIST: &str = "local_test/image_list.txt";
pub const LOCAL_IMAGE_DIR: &str = "local_test/images";
pub const LOCAL_GROUND_TRUTH: &str = "local_test/ground_truth.json";

pub const CATALOG_LIST_KEY: &str = "image_list.txt";
pub const CATALOG_IMAGE_PREFIX: &str = "images";

pub const SAMPLE_MODEL_PATH: &str = "models/sample_face_detector.onnx";
pub const SAMPLE_CONFIDENCE: f32 = 0.7;

/// Processed images between progress log lines.
pub const PROGRESS_INTERVAL: usize = 100;

pub const CONFIG_FILE_NAME: &str = "eval_config.json";
pub const JOB_ID_ENV: &str = "JOB_ID";
