//! Manifest decoding for file-driven scaling.
//!
//! A manifest is either a YAML stream of one or more documents or a sequence
//! of JSON objects, optionally separated by whitespace. Only `kind`,
//! `metadata.name` and `metadata.namespace` are read; everything else in a
//! document is ignored.

use std::io::{self, BufRead, BufReader};

use mscale_core::DEFAULT_NAMESPACE;
use serde::Deserialize;
use tracing::warn;

/// Identity of one resource described in a manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestDocument {
    /// Kind as written, e.g. `Deployment`. Empty for documents without one.
    pub kind: String,
    /// `metadata.name`.
    pub name: String,
    /// `metadata.namespace`, or `default` when absent or empty.
    pub namespace: String,
}

#[derive(Deserialize)]
struct RawDocument {
    kind: Option<String>,
    metadata: Option<RawMetadata>,
}

#[derive(Deserialize)]
struct RawMetadata {
    name: Option<String>,
    namespace: Option<String>,
}

impl From<RawDocument> for ManifestDocument {
    fn from(raw: RawDocument) -> Self {
        let (name, namespace) = raw
            .metadata
            .map(|m| (m.name, m.namespace))
            .unwrap_or_default();

        Self {
            kind: raw.kind.unwrap_or_default(),
            name: name.unwrap_or_default(),
            namespace: namespace
                .filter(|ns| !ns.is_empty())
                .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
        }
    }
}

type JsonDocuments<'de> = Box<dyn Iterator<Item = serde_json::Result<Option<RawDocument>>> + 'de>;

enum Documents<'de> {
    Yaml(serde_yaml::Deserializer<'de>),
    Json(JsonDocuments<'de>),
}

/// Forward-only iterator over the documents of a manifest.
///
/// The first document that fails to decode ends the stream; documents before
/// it are still yielded. Empty documents are yielded with an empty kind.
pub struct ManifestStream<'de> {
    documents: Documents<'de>,
    finished: bool,
}

impl<'de> ManifestStream<'de> {
    /// Decode documents from a reader.
    pub fn from_reader<R: io::Read + 'de>(reader: R) -> Self {
        let mut reader = BufReader::new(reader);
        let documents = if starts_with_json_object(&mut reader) {
            Documents::Json(Box::new(
                serde_json::Deserializer::from_reader(reader).into_iter::<Option<RawDocument>>(),
            ))
        } else {
            Documents::Yaml(serde_yaml::Deserializer::from_reader(reader))
        };
        Self::new(documents)
    }

    /// Decode documents from an in-memory string.
    #[must_use]
    pub fn parse(input: &'de str) -> Self {
        let documents = if input.trim_start().starts_with('{') {
            Documents::Json(Box::new(
                serde_json::Deserializer::from_str(input).into_iter::<Option<RawDocument>>(),
            ))
        } else {
            Documents::Yaml(serde_yaml::Deserializer::from_str(input))
        };
        Self::new(documents)
    }

    fn new(documents: Documents<'de>) -> Self {
        Self {
            documents,
            finished: false,
        }
    }

    fn next_raw(&mut self) -> Option<Result<Option<RawDocument>, String>> {
        match &mut self.documents {
            Documents::Yaml(stream) => stream.next().map(|document| {
                Option::<RawDocument>::deserialize(document).map_err(|e| e.to_string())
            }),
            Documents::Json(stream) => stream
                .next()
                .map(|result| result.map_err(|e| e.to_string())),
        }
    }
}

/// Skip leading whitespace and report whether the input opens a JSON object.
fn starts_with_json_object<R: BufRead>(reader: &mut R) -> bool {
    loop {
        let Ok(buffer) = reader.fill_buf() else {
            return false;
        };
        if buffer.is_empty() {
            return false;
        }
        match buffer.iter().position(|b| !b.is_ascii_whitespace()) {
            Some(offset) => {
                let opens_object = buffer[offset] == b'{';
                reader.consume(offset);
                return opens_object;
            }
            None => {
                let len = buffer.len();
                reader.consume(len);
            }
        }
    }
}

impl Iterator for ManifestStream<'_> {
    type Item = ManifestDocument;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.next_raw() {
            None => {
                self.finished = true;
                None
            }
            Some(Ok(raw)) => Some(raw.map(ManifestDocument::from).unwrap_or_default()),
            Some(Err(e)) => {
                warn!(error = %e, "Stopped reading manifest at undecodable document");
                self.finished = true;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_identity_fields() {
        let input = "\
apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
  namespace: ns-a
spec:
  replicas: 3
---
apiVersion: apps/v1
kind: StatefulSet
metadata:
  name: db
";
        let docs: Vec<_> = ManifestStream::parse(input).collect();

        assert_eq!(
            docs,
            vec![
                ManifestDocument {
                    kind: "Deployment".to_string(),
                    name: "web".to_string(),
                    namespace: "ns-a".to_string(),
                },
                ManifestDocument {
                    kind: "StatefulSet".to_string(),
                    name: "db".to_string(),
                    namespace: "default".to_string(),
                },
            ]
        );
    }

    #[test]
    fn empty_namespace_becomes_default() {
        let input = "kind: Job\nmetadata:\n  name: etl\n  namespace: \"\"\n";
        let docs: Vec<_> = ManifestStream::parse(input).collect();
        assert_eq!(docs[0].namespace, "default");
    }

    #[test]
    fn document_without_kind_has_empty_kind() {
        let input = "metadata:\n  name: orphan\n";
        let docs: Vec<_> = ManifestStream::parse(input).collect();
        assert_eq!(docs.len(), 1);
        assert!(docs[0].kind.is_empty());
    }

    #[test]
    fn json_document() {
        let input = r#"{"kind": "CronJob", "metadata": {"name": "nightly", "namespace": "batch"}}"#;
        let docs: Vec<_> = ManifestStream::parse(input).collect();
        assert_eq!(docs[0].kind, "CronJob");
        assert_eq!(docs[0].namespace, "batch");
    }

    #[test]
    fn concatenated_json_objects() {
        let input = r#"
{"kind": "Deployment", "metadata": {"name": "web", "namespace": "ns-a"}}
{"kind": "StatefulSet", "metadata": {"name": "db"}}{"kind": "Job", "metadata": {"name": "etl"}}
"#;
        let docs: Vec<_> = ManifestStream::parse(input).collect();

        let names: Vec<_> = docs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["web", "db", "etl"]);
        assert_eq!(docs[0].namespace, "ns-a");
        assert_eq!(docs[1].namespace, "default");
    }

    #[test]
    fn concatenated_json_from_reader() {
        let input = b"\n  {\"kind\": \"hpa\", \"metadata\": {\"name\": \"api\"}}\n{\"kind\": \"cj\", \"metadata\": {\"name\": \"nightly\"}}\n".to_vec();
        let docs: Vec<_> = ManifestStream::from_reader(io::Cursor::new(input)).collect();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].kind, "hpa");
        assert_eq!(docs[1].name, "nightly");
    }

    #[test]
    fn malformed_json_object_ends_stream() {
        let input = r#"{"kind": "Deployment", "metadata": {"name": "web"}} {"kind": "#;
        let docs: Vec<_> = ManifestStream::parse(input).collect();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].name, "web");
    }

    #[test]
    fn undecodable_document_ends_stream() {
        let input = "\
kind: Deployment
metadata:
  name: first
---
just a string
---
kind: Deployment
metadata:
  name: never-seen
";
        let mut stream = ManifestStream::parse(input);

        assert_eq!(stream.next().unwrap().name, "first");
        assert!(stream.next().is_none());
        assert!(stream.next().is_none());
    }

    #[test]
    fn reads_from_reader() {
        let input = b"kind: rc\nmetadata:\n  name: legacy\n".to_vec();
        let docs: Vec<_> = ManifestStream::from_reader(io::Cursor::new(input)).collect();
        assert_eq!(docs[0].kind, "rc");
        assert_eq!(docs[0].name, "legacy");
    }
}
