//! Schema introspection: derive machine-readable field descriptors from
//! the static projection tables.
//!
//! Clients fetch these to build forms ahead of time — the descriptors
//! cover every registered operation on a kind, not just the one the
//! client is about to perform.

use serde::Serialize;
use serde_json::Value;

use super::{registered, EntityKind, Field, FieldKind};

/// One `{value, display_name}` choice pair.
#[derive(Debug, Clone, Serialize)]
pub struct ChoiceInfo {
    pub value: &'static str,
    pub display_name: &'static str,
}

/// The introspected description of a single projection field.
#[derive(Debug, Clone, Serialize)]
pub struct FieldInfo {
    #[serde(skip_serializing_if = "str::is_empty")]
    pub name: &'static str,

    #[serde(rename = "type")]
    pub type_tag: &'static str,

    pub required: bool,

    pub read_only: bool,

    pub label: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_text: Option<&'static str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,

    /// Present only for writable choice fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<ChoiceInfo>>,

    /// Element descriptor for collection fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child: Option<Box<FieldInfo>>,

    /// Sub-field descriptors for embedded objects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FieldInfo>>,
}

/// Describe every registered operation on `kind`:
/// `{"actions": {"list": [FieldInfo, ...], ...}}`.
pub fn describe(kind: EntityKind) -> Value {
    let mut actions = serde_json::Map::new();
    for (op, projection) in registered(kind) {
        let fields: Vec<FieldInfo> = projection.fields.iter().map(describe_field).collect();
        actions.insert(
            op.as_str().to_string(),
            serde_json::to_value(fields).unwrap_or_default(),
        );
    }
    serde_json::json!({ "actions": actions })
}

/// Describe one field descriptor.
pub fn describe_field(field: &Field) -> FieldInfo {
    let mut info = FieldInfo {
        name: field.name,
        type_tag: type_tag(&field.kind),
        // Read-only fields are never required from the client.
        required: field.required && !field.read_only,
        read_only: field.read_only,
        label: field.label,
        help_text: field.help_text,
        max_length: field.max_length,
        choices: None,
        child: None,
        children: None,
    };

    match field.kind {
        FieldKind::Choice(choices) if !field.read_only => {
            info.choices = Some(
                choices
                    .iter()
                    .map(|(value, display_name)| ChoiceInfo {
                        value,
                        display_name,
                    })
                    .collect(),
            );
        }
        FieldKind::Nested(nested) => {
            info.children = Some(nested.fields.iter().map(describe_field).collect());
        }
        FieldKind::NestedList(nested) => {
            info.child = Some(Box::new(FieldInfo {
                name: "",
                type_tag: "nested object",
                required: false,
                read_only: field.read_only,
                label: field.label,
                help_text: None,
                max_length: None,
                choices: None,
                child: None,
                children: Some(nested.fields.iter().map(describe_field).collect()),
            }));
        }
        _ => {}
    }

    info
}

fn type_tag(kind: &FieldKind) -> &'static str {
    match kind {
        FieldKind::Integer => "integer",
        FieldKind::String => "string",
        FieldKind::Boolean => "boolean",
        FieldKind::DateTime => "datetime",
        FieldKind::Choice(_) => "choice",
        FieldKind::Reference(_) | FieldKind::ReferenceList(_) => "field",
        FieldKind::Nested(_) => "nested object",
        FieldKind::NestedList(_) => "list",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action_fields(described: &Value, op: &str) -> Vec<Value> {
        described["actions"][op].as_array().unwrap().clone()
    }

    fn field<'a>(fields: &'a [Value], name: &str) -> &'a Value {
        fields
            .iter()
            .find(|f| f["name"] == name)
            .unwrap_or_else(|| panic!("field {} missing", name))
    }

    #[test]
    fn describes_all_registered_operations() {
        let d = describe(EntityKind::LifeSituation);
        let actions = d["actions"].as_object().unwrap();
        for op in ["list", "retrieve", "create", "update"] {
            assert!(actions.contains_key(op), "missing action {}", op);
        }
    }

    #[test]
    fn writable_choice_field_exposes_choices() {
        let d = describe(EntityKind::Process);
        let fields = action_fields(&d, "create");
        let status = field(&fields, "status");
        assert_eq!(status["type"], "choice");
        let choices = status["choices"].as_array().unwrap();
        assert_eq!(choices.len(), 5);
        assert_eq!(choices[0]["value"], "NOT_STARTED");
        assert_eq!(choices[0]["display_name"], "Not started");
    }

    #[test]
    fn read_only_choice_field_hides_choices() {
        let d = describe(EntityKind::LifeSituation);
        let fields = action_fields(&d, "list");
        let name = field(&fields, "name");
        assert_eq!(name["read_only"], true);
        assert!(name.get("choices").is_none());
    }

    #[test]
    fn read_only_fields_are_never_required() {
        let d = describe(EntityKind::Service);
        let fields = action_fields(&d, "create");
        let identifier = field(&fields, "identifier");
        assert_eq!(identifier["read_only"], true);
        assert_eq!(identifier["required"], false);
    }

    #[test]
    fn process_retrieve_describes_process_data_children() {
        let d = describe(EntityKind::Process);
        let fields = action_fields(&d, "retrieve");
        let data = field(&fields, "process_data");
        assert_eq!(data["type"], "nested object");
        let children: Vec<String> = data["children"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            children,
            vec!["client_value", "input_data", "output_data", "related_processes", "group"]
        );
    }

    #[test]
    fn nested_list_describes_element_under_child() {
        let d = describe(EntityKind::LifeSituation);
        let fields = action_fields(&d, "list");
        let services = field(&fields, "services");
        assert_eq!(services["type"], "list");
        let element = &services["child"];
        assert_eq!(element["type"], "nested object");
        let names: Vec<&str> = element["children"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap())
            .collect();
        assert!(names.contains(&"service_type"));
        assert!(names.contains(&"identifier"));
    }

    #[test]
    fn relational_fields_have_no_choices() {
        let d = describe(EntityKind::Service);
        let fields = action_fields(&d, "create");
        let parent = field(&fields, "life_situation");
        assert_eq!(parent["type"], "field");
        assert!(parent.get("choices").is_none());
    }
}
