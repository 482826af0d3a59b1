use serde::Deserialize;

use crate::remote::domain::function_invoker::FunctionInvoker;
use crate::remote::domain::object_store::ObjectStore;
use crate::shared::error::EvalError;
use crate::source::domain::image_source::{apply_limit, ImageSource, ImageStream};
use crate::source::infrastructure::object_image_stream::stream_objects;

/// Response payload of the image-list function.
#[derive(Debug, Deserialize)]
pub struct ImageListResponse {
    pub body: ImageListBody,
}

#[derive(Debug, Deserialize)]
pub struct ImageListBody {
    pub s3_bucket: String,
    pub s3_prefix: String,
    pub s3_ids: Vec<String>,
}

/// Asks the image-list function which images to evaluate and where they
/// live, then downloads them from the object store one by one.
pub struct ServiceImageSource {
    invoker: Box<dyn FunctionInvoker>,
    store: Box<dyn ObjectStore>,
    function: String,
    user_id: String,
    limit: Option<usize>,
}

impl ServiceImageSource {
    pub fn new(
        invoker: Box<dyn FunctionInvoker>,
        store: Box<dyn ObjectStore>,
        function: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            invoker,
            store,
            function: function.into(),
            user_id: user_id.into(),
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    fn request_list(&self) -> Result<ImageListBody, EvalError> {
        let payload = serde_json::json!({ "user_id": self.user_id });
        let raw = self
            .invoker
            .invoke(&self.function, &payload)
            .map_err(|e| EvalError::Listing(Box::new(e)))?;
        let response: ImageListResponse =
            serde_json::from_slice(&raw).map_err(|e| EvalError::Listing(Box::new(e)))?;
        Ok(response.body)
    }
}

impl ImageSource for ServiceImageSource {
    fn images(&mut self) -> Result<ImageStream<'_>, EvalError> {
        let body = self.request_list()?;
        let ids = apply_limit(body.s3_ids, self.limit);
        log::info!(
            "got image list, {} images in {}/{}",
            ids.len(),
            body.s3_bucket,
            body.s3_prefix
        );

        Ok(stream_objects(
            self.store.as_ref(),
            body.s3_bucket,
            body.s3_prefix,
            ids,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::domain::RemoteError;
    use crate::remote::infrastructure::fs_object_store::FsObjectStore;
    use crate::source::infrastructure::image_decoder::encode_png;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    // --- Stubs ---

    struct StubInvoker {
        response: Vec<u8>,
        calls: Arc<Mutex<Vec<(String, serde_json::Value)>>>,
    }

    impl FunctionInvoker for StubInvoker {
        fn invoke(
            &self,
            function: &str,
            payload: &serde_json::Value,
        ) -> Result<Vec<u8>, RemoteError> {
            self.calls
                .lock()
                .unwrap()
                .push((function.to_string(), payload.clone()));
            Ok(self.response.clone())
        }
    }

    struct FailingInvoker;

    impl FunctionInvoker for FailingInvoker {
        fn invoke(&self, _: &str, _: &serde_json::Value) -> Result<Vec<u8>, RemoteError> {
            Err(RemoteError::Status {
                url: "http://lambda".into(),
                status: 500,
                body: "internal".into(),
            })
        }
    }

    // --- Helpers ---

    fn list_response(ids: &[&str]) -> Vec<u8> {
        serde_json::json!({
            "body": {"s3_bucket": "wider", "s3_prefix": "val", "s3_ids": ids}
        })
        .to_string()
        .into_bytes()
    }

    fn store_with(tmp: &TempDir, ids: &[&str]) -> FsObjectStore {
        let store = FsObjectStore::new(tmp.path());
        for id in ids {
            store
                .put("wider", &format!("val/{id}"), encode_png(3, 3, [0, 0, 0]))
                .unwrap();
        }
        store
    }

    // --- Tests ---

    #[test]
    fn test_sends_user_id_and_streams_listed_images() {
        let tmp = TempDir::new().unwrap();
        let ids = ["x.jpg", "y.jpg"];
        let calls = Arc::new(Mutex::new(Vec::new()));
        let invoker = StubInvoker {
            response: list_response(&ids),
            calls: calls.clone(),
        };
        let mut src = ServiceImageSource::new(
            Box::new(invoker),
            Box::new(store_with(&tmp, &ids)),
            "WIDERImageList",
            "123",
        );

        let got: Vec<String> = src.images().unwrap().map(|r| r.unwrap().id).collect();
        assert_eq!(got, ids);

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "WIDERImageList");
        assert_eq!(calls[0].1, serde_json::json!({"user_id": "123"}));
    }

    #[test]
    fn test_limit_applies_to_listed_ids() {
        let tmp = TempDir::new().unwrap();
        let ids = ["a", "b", "c"];
        let mut src = ServiceImageSource::new(
            Box::new(StubInvoker {
                response: list_response(&ids),
                calls: Arc::new(Mutex::new(Vec::new())),
            }),
            Box::new(store_with(&tmp, &ids)),
            "WIDERImageList",
            "123",
        )
        .with_limit(Some(1));
        assert_eq!(src.images().unwrap().count(), 1);
    }

    #[test]
    fn test_invoke_failure_is_listing_error() {
        let tmp = TempDir::new().unwrap();
        let mut src = ServiceImageSource::new(
            Box::new(FailingInvoker),
            Box::new(FsObjectStore::new(tmp.path())),
            "WIDERImageList",
            "123",
        );
        assert!(matches!(src.images(), Err(EvalError::Listing(_))));
    }

    #[test]
    fn test_unexpected_response_shape_is_listing_error() {
        let tmp = TempDir::new().unwrap();
        let mut src = ServiceImageSource::new(
            Box::new(StubInvoker {
                response: br#"{"statusCode": 200}"#.to_vec(),
                calls: Arc::new(Mutex::new(Vec::new())),
            }),
            Box::new(FsObjectStore::new(tmp.path())),
            "WIDERImageList",
            "123",
        );
        assert!(matches!(src.images(), Err(EvalError::Listing(_))));
    }
}
