//! Serde model of a JSON schema file.

use serde::Deserialize;

use crate::config::GeneratorConfig;
use crate::ir::{LimitDirective, MemberAccess, TypeCategory};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDocument {
    #[serde(default)]
    pub options: Option<GeneratorConfig>,
    #[serde(default)]
    pub records: Vec<RecordDoc>,
    /// Types implementing the contract by hand.
    #[serde(default)]
    pub serializable: Vec<SerializableDoc>,
    #[serde(default)]
    pub enums: Vec<EnumDoc>,
    #[serde(default)]
    pub codecs: Vec<CodecDoc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstructorDoc {
    None,
    #[default]
    Default,
    AllFields {
        function: String,
        params: Vec<String>,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BaseDoc {
    pub field: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnclosingDoc {
    pub name: String,
    #[serde(default)]
    pub category: TypeCategory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordDoc {
    pub name: String,
    /// Module path, e.g. `crate::model`.
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub enclosing: Vec<EnclosingDoc>,
    #[serde(default)]
    pub category: TypeCategory,
    #[serde(default)]
    pub constructor: ConstructorDoc,
    #[serde(default)]
    pub base: Option<BaseDoc>,
    #[serde(default)]
    pub sealed: bool,
    #[serde(default)]
    pub members: Vec<MemberDoc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemberDoc {
    pub name: String,
    #[serde(rename = "type")]
    pub type_text: String,
    #[serde(default)]
    pub access: MemberAccess,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub limit: Option<LimitDirective>,
    #[serde(default)]
    pub skip: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SerializableDoc {
    pub name: String,
    /// Full path; defaults to the name.
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub category: TypeCategory,
    #[serde(default)]
    pub constructor: ConstructorDoc,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnumDoc {
    pub name: String,
    #[serde(default)]
    pub path: Option<String>,
    pub repr: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CodecDoc {
    #[serde(rename = "type")]
    pub type_name: String,
    pub serialize: String,
    pub deserialize: String,
}

impl SchemaDocument {
    /// Appends another document. Options from `other` win where both set them.
    pub fn merge(&mut self, other: SchemaDocument) {
        if other.options.is_some() {
            self.options = other.options;
        }
        self.records.extend(other.records);
        self.serializable.extend(other.serializable);
        self.enums.extend(other.enums);
        self.codecs.extend(other.codecs);
    }
}
