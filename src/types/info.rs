//! Formal parameter descriptors.
use super::param::ParamType;
use serde::{Deserialize, Serialize};

/// Describes one formal parameter of an instance factory.
///
/// Descriptors are immutable once loaded; authoring tools "change" them by
/// taking a modified copy (`renamed`, `retyped`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamInfo {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub ty: ParamType,
    #[serde(default)]
    pub is_array: bool,
    #[serde(default = "required_by_default")]
    pub is_required: bool,
}

fn required_by_default() -> bool { true }

impl ParamInfo {
    /// A required, single-valued parameter.
    pub fn new(name: impl Into<String>, ty: ParamType) -> Self {
        Self { name: name.into(), description: String::new(), ty, is_array: false, is_required: true }
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn array(mut self) -> Self {
        self.is_array = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.is_required = false;
        self
    }

    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self { name: name.into(), ..self.clone() }
    }

    pub fn retyped(&self, ty: ParamType) -> Self {
        Self { ty, ..self.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_with_override_leaves_original() {
        let original = ParamInfo::new("input", ParamType::String).array();
        let renamed = original.renamed("value");
        let retyped = original.retyped(ParamType::Int);

        assert_eq!(original.name, "input");
        assert_eq!(renamed.name, "value");
        assert!(renamed.is_array);
        assert_eq!(retyped.ty, ParamType::Int);
        assert_eq!(retyped.name, "input");
    }

    #[test]
    fn test_deserialize_defaults() {
        let info: ParamInfo = serde_json::from_str(r#"{"name":"min","type":"Int"}"#).unwrap();
        assert_eq!(info, ParamInfo::new("min", ParamType::Int));
    }
}
