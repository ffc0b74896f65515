use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::OutputFormat;
use crate::core::{DocgenError, DocgenResult};

/// Body of a `POST` to the file handler's generate endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    #[serde(rename = "type")]
    pub format: OutputFormat,
    /// The complete field data, serialized to a JSON string.
    pub template_fields: String,
    pub template_name: String,
}

impl GenerationRequest {
    pub fn docx(data: &EnhancedDocumentData, template_name: &str) -> DocgenResult<Self> {
        Ok(GenerationRequest {
            format: OutputFormat::Docx,
            template_fields: serde_json::to_string(data)?,
            template_name: template_name.to_string(),
        })
    }
}

/// Free-form field values collected for a template.
///
/// Any key is accepted and passed to the backend verbatim. `ref_id` names the
/// downloaded file; `additional_fields` and `api_data` are conventional
/// sub-objects filled by dialogs and by lookups against other services.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnhancedDocumentData(Map<String, Value>);

impl EnhancedDocumentData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails unless `value` is a JSON object.
    pub fn from_value(value: Value) -> DocgenResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn with_ref_id(self, ref_id: impl Into<String>) -> Self {
        self.with_field("ref_id", Value::String(ref_id.into()))
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn with_additional_fields(self, fields: Map<String, Value>) -> Self {
        self.with_field("additional_fields", Value::Object(fields))
    }

    pub fn with_api_data(self, data: Map<String, Value>) -> Self {
        self.with_field("api_data", Value::Object(data))
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Reference id as it appears in file names. `null` counts as missing;
    /// other values are rendered the way a JS template literal would.
    pub fn ref_id(&self) -> Option<String> {
        match self.0.get("ref_id") {
            None | Some(Value::Null) => None,
            Some(value) => Some(interpolate(value)),
        }
    }

    pub fn additional_fields(&self) -> Option<&Map<String, Value>> {
        self.0.get("additional_fields").and_then(Value::as_object)
    }

    pub fn api_data(&self) -> Option<&Map<String, Value>> {
        self.0.get("api_data").and_then(Value::as_object)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// String form of a field value inside a file name: `2.0` -> `2`, `[1, 2]` -> `1,2`.
fn interpolate(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => i.to_string(),
            (_, Some(u), _) => u.to_string(),
            (_, _, Some(f)) => f.to_string(),
            _ => n.to_string(),
        },
        Value::Array(items) => items.iter().map(interpolate).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

impl From<Map<String, Value>> for EnhancedDocumentData {
    fn from(map: Map<String, Value>) -> Self {
        EnhancedDocumentData(map)
    }
}

impl TryFrom<Value> for EnhancedDocumentData {
    type Error = DocgenError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSetEntry {
    pub template_name: String,
    #[serde(default)]
    pub data: EnhancedDocumentData,
}

impl DocumentSetEntry {
    pub fn new(template_name: impl Into<String>, data: EnhancedDocumentData) -> Self {
        DocumentSetEntry {
            template_name: template_name.into(),
            data,
        }
    }
}

/// Several templates to render and bundle into one archive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSetRequest {
    pub documents: Vec<DocumentSetEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_filename: Option<String>,
}

impl DocumentSetRequest {
    pub fn new(documents: Vec<DocumentSetEntry>) -> Self {
        DocumentSetRequest {
            documents,
            zip_filename: None,
        }
    }

    pub fn with_zip_filename(mut self, filename: impl Into<String>) -> Self {
        self.zip_filename = Some(filename.into());
        self
    }

    /// `ref_id` of the first document, which names the archive.
    pub fn lead_ref_id(&self) -> Option<String> {
        self.documents.first().and_then(|doc| doc.data.ref_id())
    }
}

/// A named file ready to be handed to a download sink.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedArtifact {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Bytes,
}

impl GeneratedArtifact {
    pub fn new(filename: impl Into<String>, format: OutputFormat, bytes: impl Into<Bytes>) -> Self {
        GeneratedArtifact {
            filename: filename.into(),
            content_type: format.content_type(),
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// What a successful generation produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationOutcome {
    pub filename: String,
    pub documents: usize,
    pub size_bytes: usize,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_template_fields_round_trip() {
        let data = EnhancedDocumentData::from_value(json!({
            "ref_id": "42",
            "full_name": "Иванов Иван",
            "amount": 1250.5,
            "tags": ["a", "b"],
            "additional_fields": { "court": "Arbitration" },
            "api_data": { "inn": 7701234567u64, "active": true },
            "nested": { "deep": { "value": null } }
        }))
        .unwrap();

        let request = GenerationRequest::docx(&data, "petition").unwrap();
        let parsed: EnhancedDocumentData = serde_json::from_str(&request.template_fields).unwrap();

        assert_eq!(parsed, data);
        assert_eq!(request.template_name, "petition");
    }

    #[test]
    fn test_request_wire_shape() {
        let data = EnhancedDocumentData::new().with_field("b", 2).with_field("a", 1);
        let request = GenerationRequest::docx(&data, "claim").unwrap();

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "type": "docx",
                "template_fields": "{\"b\":2,\"a\":1}",
                "template_name": "claim"
            })
        );
    }

    #[test]
    fn test_ref_id_variants() {
        assert_eq!(EnhancedDocumentData::new().ref_id(), None);
        assert_eq!(EnhancedDocumentData::new().with_field("ref_id", Value::Null).ref_id(), None);
        assert_eq!(EnhancedDocumentData::new().with_ref_id("A-1").ref_id().as_deref(), Some("A-1"));
        assert_eq!(EnhancedDocumentData::new().with_field("ref_id", 17).ref_id().as_deref(), Some("17"));
    }

    #[test]
    fn test_ref_id_renders_like_template_literal() {
        let ref_id = |v: Value| EnhancedDocumentData::new().with_field("ref_id", v).ref_id();

        assert_eq!(ref_id(json!(2.0)).as_deref(), Some("2"));
        assert_eq!(ref_id(json!(2.5)).as_deref(), Some("2.5"));
        assert_eq!(ref_id(json!(true)).as_deref(), Some("true"));
        assert_eq!(ref_id(json!([1, 2])).as_deref(), Some("1,2"));
        assert_eq!(ref_id(json!([1, null, [2, "x"]])).as_deref(), Some("1,,2,x"));
        assert_eq!(ref_id(json!({ "a": 1 })).as_deref(), Some("[object Object]"));
    }

    #[test]
    fn test_sub_mappings() {
        let mut extra = Map::new();
        extra.insert("judge".to_string(), json!("Petrov"));

        let data = EnhancedDocumentData::new()
            .with_additional_fields(extra)
            .with_field("api_data", "not an object");

        assert_eq!(data.additional_fields().unwrap()["judge"], "Petrov");
        assert!(data.api_data().is_none());
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert!(EnhancedDocumentData::from_value(json!([1, 2, 3])).is_err());
    }

    #[test]
    fn test_set_request_uses_camel_case() {
        let request: DocumentSetRequest = serde_json::from_value(json!({
            "documents": [
                { "templateName": "A", "data": { "ref_id": "42" } },
                { "templateName": "B" }
            ],
            "zipFilename": "bundle"
        }))
        .unwrap();

        assert_eq!(request.documents.len(), 2);
        assert!(request.documents[1].data.is_empty());
        assert_eq!(request.zip_filename.as_deref(), Some("bundle"));
        assert_eq!(request.lead_ref_id().as_deref(), Some("42"));
    }
}
