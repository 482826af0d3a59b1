use std::io::{Cursor, Write};

use flate2::write::GzEncoder;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::evaluation::evaluation_output::EvaluationOutput;
use crate::shared::config::Compression;
use crate::shared::detection::BOX_COLUMNS;

/// Name of the JSON entry inside a zipped artifact.
pub const ZIP_ENTRY_NAME: &str = "wider_output.json";

/// JSON view of a run: `{ "<id>": {"boxes": [[l,t,w,h,conf], ...], "runtime": secs}, ... }`
/// with keys in run order.
pub struct ResultsArtifact<'a>(pub &'a EvaluationOutput);

#[derive(Serialize)]
struct EntryRef {
    boxes: Vec<[f32; BOX_COLUMNS]>,
    runtime: f64,
}

/// One image's entry as read back from an artifact.
#[derive(Debug, Deserialize, PartialEq)]
pub struct ArtifactEntry {
    pub boxes: Vec<Vec<f32>>,
    pub runtime: f64,
}

impl Serialize for ResultsArtifact<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for result in self.0.iter() {
            let entry = EntryRef {
                boxes: result.detections.iter().map(|d| d.to_row()).collect(),
                runtime: result.runtime.as_secs_f64(),
            };
            map.serialize_entry(&result.id, &entry)?;
        }
        map.end()
    }
}

pub fn artifact_file_name(job_id: &str, compression: Compression) -> String {
    match compression {
        Compression::None => format!("{job_id}.json"),
        Compression::Zip => format!("{job_id}.zip"),
        Compression::Gzip => format!("{job_id}.json.gz"),
    }
}

/// Serializes the run and applies the configured compression.
pub fn encode_artifact(
    output: &EvaluationOutput,
    compression: Compression,
) -> Result<Vec<u8>, std::io::Error> {
    let json = serde_json::to_vec(&ResultsArtifact(output))?;
    match compression {
        Compression::None => Ok(json),
        Compression::Zip => {
            let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
            let options =
                SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
            writer.start_file(ZIP_ENTRY_NAME, options)?;
            writer.write_all(&json)?;
            Ok(writer.finish()?.into_inner())
        }
        Compression::Gzip => {
            let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
            encoder.write_all(&json)?;
            encoder.finish()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::detection::Detection;
    use flate2::read::GzDecoder;
    use rstest::rstest;
    use std::collections::HashMap;
    use std::io::Read;
    use std::time::Duration;

    fn output() -> EvaluationOutput {
        let mut out = EvaluationOutput::new();
        out.record(
            "b.jpg".into(),
            vec![Detection {
                left: 1.0,
                top: 2.0,
                width: 3.0,
                height: 4.0,
                confidence: 0.5,
            }],
            Duration::from_millis(250),
        );
        out.record("a.jpg".into(), vec![], Duration::from_millis(500));
        out
    }

    #[test]
    fn test_schema_boxes_and_runtime() {
        let bytes = encode_artifact(&output(), Compression::None).unwrap();
        let parsed: HashMap<String, ArtifactEntry> = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed["b.jpg"].boxes, vec![vec![1.0, 2.0, 3.0, 4.0, 0.5]]);
        assert_eq!(parsed["b.jpg"].runtime, 0.25);
        assert!(parsed["a.jpg"].boxes.is_empty());
        assert_eq!(parsed["a.jpg"].runtime, 0.5);
    }

    #[test]
    fn test_keys_follow_run_order() {
        let json = String::from_utf8(encode_artifact(&output(), Compression::None).unwrap()).unwrap();
        assert!(json.find("b.jpg").unwrap() < json.find("a.jpg").unwrap());
    }

    #[test]
    fn test_gzip_decompresses_to_same_json() {
        let plain = encode_artifact(&output(), Compression::None).unwrap();
        let gz = encode_artifact(&output(), Compression::Gzip).unwrap();
        assert_eq!(&gz[..2], &[0x1f, 0x8b]);

        let mut unpacked = Vec::new();
        GzDecoder::new(&gz[..]).read_to_end(&mut unpacked).unwrap();
        assert_eq!(unpacked, plain);
    }

    #[test]
    fn test_zip_holds_single_deflated_json_entry() {
        let plain = encode_artifact(&output(), Compression::None).unwrap();
        let zipped = encode_artifact(&output(), Compression::Zip).unwrap();
        assert_eq!(&zipped[..2], b"PK");

        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zipped)).unwrap();
        assert_eq!(archive.len(), 1);
        let mut entry = archive.by_name("wider_output.json").unwrap();
        assert_eq!(entry.compression(), CompressionMethod::Deflated);

        let mut unpacked = Vec::new();
        entry.read_to_end(&mut unpacked).unwrap();
        assert_eq!(unpacked, plain);
    }

    #[rstest]
    #[case(Compression::None, "job-1.json")]
    #[case(Compression::Zip, "job-1.zip")]
    #[case(Compression::Gzip, "job-1.json.gz")]
    fn test_file_names(#[case] compression: Compression, #[case] expected: &str) {
        assert_eq!(artifact_file_name("job-1", compression), expected);
    }
}
