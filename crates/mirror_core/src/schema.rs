//! crates/mirror_core/src/schema.rs
//!
//! Provider-neutral description of the JSON shape the analysis backend must
//! return. Adapters render it into whatever schema dialect their provider expects.

use serde_json::{json, Map, Value};

use crate::domain::{AlertSeverity, ContentTone, HookStyle};

/// One node of a response schema.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    String,
    Number,
    /// A string restricted to a fixed set of values.
    Enum(Vec<&'static str>),
    Array(Box<SchemaNode>),
    Object(ObjectSchema),
}

/// An object with named properties; every property listed in `required` must be present.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSchema {
    pub properties: Vec<(&'static str, SchemaNode)>,
    pub required: Vec<&'static str>,
}

impl ObjectSchema {
    /// Builds an object schema in which every property is required.
    pub fn all_required(properties: Vec<(&'static str, SchemaNode)>) -> Self {
        let required = properties.iter().map(|(name, _)| *name).collect();
        Self {
            properties,
            required,
        }
    }
}

/// A named top-level response schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSchema {
    pub name: &'static str,
    pub root: ObjectSchema,
}

impl ResponseSchema {
    pub fn required_fields(&self) -> &[&'static str] {
        &self.root.required
    }

    /// Renders the schema as standard JSON Schema, closed to extra properties.
    pub fn to_json_schema(&self) -> Value {
        object_to_json_schema(&self.root)
    }
}

fn node_to_json_schema(node: &SchemaNode) -> Value {
    match node {
        SchemaNode::String => json!({ "type": "string" }),
        SchemaNode::Number => json!({ "type": "number" }),
        SchemaNode::Enum(values) => json!({ "type": "string", "enum": values }),
        SchemaNode::Array(items) => json!({ "type": "array", "items": node_to_json_schema(items) }),
        SchemaNode::Object(object) => object_to_json_schema(object),
    }
}

fn object_to_json_schema(object: &ObjectSchema) -> Value {
    let properties: Map<String, Value> = object
        .properties
        .iter()
        .map(|(name, node)| (name.to_string(), node_to_json_schema(node)))
        .collect();
    json!({
        "type": "object",
        "properties": properties,
        "required": object.required,
        "additionalProperties": false,
    })
}

//=========================================================================================
// The Three Declared Schemas
//=========================================================================================

fn tone_enum() -> SchemaNode {
    SchemaNode::Enum(ContentTone::ALL.iter().map(|t| t.as_str()).collect())
}

fn hook_enum() -> SchemaNode {
    SchemaNode::Enum(HookStyle::ALL.iter().map(|h| h.as_str()).collect())
}

pub fn performance_dna_schema() -> ResponseSchema {
    ResponseSchema {
        name: "performance_dna",
        root: ObjectSchema::all_required(vec![
            ("strengthScore", SchemaNode::Number),
            ("hookEffectiveness", SchemaNode::Number),
            ("retentionPrediction", SchemaNode::Number),
            ("audienceSensitivity", SchemaNode::String),
            ("topTone", tone_enum()),
            ("bestDuration", SchemaNode::Number),
        ]),
    }
}

pub fn recommendation_schema() -> ResponseSchema {
    ResponseSchema {
        name: "ai_recommendation",
        root: ObjectSchema::all_required(vec![
            ("suggestedDuration", SchemaNode::Number),
            ("suggestedTone", tone_enum()),
            ("suggestedHook", hook_enum()),
            ("predictedEngagement", SchemaNode::Number),
            ("reasoning", SchemaNode::String),
        ]),
    }
}

pub fn dashboard_insights_schema() -> ResponseSchema {
    let trend = ObjectSchema::all_required(vec![
        ("date", SchemaNode::String),
        ("views", SchemaNode::Number),
        ("engagement", SchemaNode::Number),
    ]);
    let alert = ObjectSchema::all_required(vec![
        (
            "severity",
            SchemaNode::Enum(AlertSeverity::ALL.iter().map(|s| s.as_str()).collect()),
        ),
        ("message", SchemaNode::String),
    ]);

    ResponseSchema {
        name: "dashboard_insights",
        root: ObjectSchema::all_required(vec![
            ("trends", SchemaNode::Array(Box::new(SchemaNode::Object(trend)))),
            ("suggestions", SchemaNode::Array(Box::new(SchemaNode::String))),
            ("alerts", SchemaNode::Array(Box::new(SchemaNode::Object(alert)))),
        ]),
    }
}
