//! JSON result envelope shared by the launcher and the trainers.
//!
//! The envelope is the sole reporting channel across the launcher/trainer
//! boundary: every outcome, success or failure, is representable here, and
//! its `status` field doubles as the process exit code.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Result of one training invocation, serialized as a single JSON object.
///
/// Beyond the fixed fields, trainers contribute an open set of keys
/// (metrics, the run directory, the strategy name) through `extra`, which is
/// flattened into the top-level object on serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainOutcome {
    /// 0 on success, nonzero on failure. Used as the process exit code.
    pub status: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runid: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modelid: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TrainOutcome {
    pub fn success(runid: i64, modelid: &str) -> Self {
        TrainOutcome {
            status: 0,
            runid: Some(runid),
            modelid: Some(modelid.to_string()),
            errors: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn failure(runid: Option<i64>, modelid: Option<&str>, message: impl Into<String>) -> Self {
        TrainOutcome {
            status: 1,
            runid,
            modelid: modelid.map(|id| id.to_string()),
            errors: vec![message.into()],
            extra: Map::new(),
        }
    }

    /// Usage-error envelope for an invocation with fewer than three
    /// arguments. `argv` is the raw process argument list (program name
    /// first); the supplied model identifier, when present, is echoed back.
    pub fn missing_arguments(runid: i64, argv: &[String]) -> Self {
        let message = format!(
            "Missing arguments, you should set: the model unique identifier, the directory \
             to store all generated outputs and the training file. Received: {}",
            argv.join(" ")
        );
        TrainOutcome {
            status: 1,
            runid: Some(runid),
            modelid: argv.get(1).cloned(),
            errors: vec![message],
            extra: Map::new(),
        }
    }

    /// Attach a trainer-contributed key to the envelope.
    pub fn with_value(mut self, key: &str, value: Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }

    /// Merge every field of a JSON object into the envelope's open key set.
    pub fn with_object(mut self, object: Map<String, Value>) -> Self {
        self.extra.extend(object);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_flattens_extra_keys() {
        let outcome = TrainOutcome::success(1700000000, "m1")
            .with_value("accuracy", serde_json::json!(0.91));
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], 0);
        assert_eq!(json["modelid"], "m1");
        assert_eq!(json["accuracy"], 0.91);
        // empty error list is omitted entirely
        assert!(json.get("errors").is_none());
    }

    #[test]
    fn missing_arguments_envelope_shape() {
        let argv = vec!["foresight-train".to_string()];
        let outcome = TrainOutcome::missing_arguments(1700000000, &argv);
        assert_eq!(outcome.status, 1);
        assert_eq!(outcome.runid, Some(1700000000));
        assert!(outcome.modelid.is_none());
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].starts_with("Missing arguments"));
        assert!(outcome.errors[0].contains("foresight-train"));
    }

    #[test]
    fn missing_arguments_echoes_modelid_when_present() {
        let argv = vec!["foresight-train".to_string(), "m1".to_string()];
        let outcome = TrainOutcome::missing_arguments(1700000000, &argv);
        assert_eq!(outcome.modelid.as_deref(), Some("m1"));
    }

    #[test]
    fn envelope_round_trips_through_json() {
        let outcome = TrainOutcome::failure(Some(5), Some("m2"), "boom");
        let json = serde_json::to_string(&outcome).unwrap();
        let back: TrainOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(back.status, 1);
        assert_eq!(back.runid, Some(5));
        assert_eq!(back.errors, vec!["boom".to_string()]);
    }
}
