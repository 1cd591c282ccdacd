//! Per-operation projections — the single source of truth for what each
//! operation on each entity kind reads and writes.
//!
//! A [`Projection`] is a statically declared, ordered field-descriptor
//! table. The same table drives three things:
//!
//! - [`render`](render::render) — shaping an entity into the response
//!   for one operation (field subset, display labels, nested records);
//! - [`validate`](validate::validate) — shaping and checking an incoming
//!   payload (writable subset, choice membership, primitive types);
//! - [`describe`](describe::describe) — machine-readable schema metadata
//!   for client-side form generation.
//!
//! Nothing here is derived from live objects at request time; the tables
//! are built once at compile time and looked up by `(kind, operation)`.

pub mod describe;
pub mod registry;
pub mod render;
pub mod validate;

pub use registry::{default_for, projection_for, registered};

/// The catalog entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    LifeSituation,
    Service,
    Process,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LifeSituation => "life_situation",
            Self::Service => "service",
            Self::Process => "process",
        }
    }
}

/// The operations a projection can be registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Retrieve,
    Create,
    Update,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::List,
        Operation::Retrieve,
        Operation::Create,
        Operation::Update,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Retrieve => "retrieve",
            Self::Create => "create",
            Self::Update => "update",
        }
    }
}

/// The value shape of a single field.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Integer,
    String,
    Boolean,
    DateTime,
    /// Closed `(value, display label)` set.
    Choice(&'static [(&'static str, &'static str)]),
    /// Id of another entity.
    Reference(EntityKind),
    /// Ids of other entities.
    ReferenceList(EntityKind),
    /// A single embedded sub-object, shaped by its own projection.
    Nested(&'static Projection),
    /// A list of embedded sub-objects, each shaped by its own projection.
    NestedList(&'static Projection),
}

/// One field descriptor in a projection.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
    pub label: &'static str,
    pub help_text: Option<&'static str>,
    pub required: bool,
    pub read_only: bool,
    pub max_length: Option<u32>,
    /// Render the display label instead of the stored code.
    /// Only meaningful for choice fields.
    pub as_label: bool,
}

impl Field {
    pub const fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            label,
            help_text: None,
            required: false,
            read_only: false,
            max_length: None,
            as_label: false,
        }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub const fn max_length(mut self, n: u32) -> Self {
        self.max_length = Some(n);
        self
    }

    pub const fn help(mut self, text: &'static str) -> Self {
        self.help_text = Some(text);
        self
    }

    pub const fn as_label(mut self) -> Self {
        self.as_label = true;
        self
    }
}

/// An ordered field subset used by one operation on one entity kind.
#[derive(Debug)]
pub struct Projection {
    /// Diagnostic name, e.g. `life_situation.list`.
    pub name: &'static str,
    pub fields: &'static [Field],
}

impl Projection {
    /// Look up a field descriptor by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_names() {
        for op in Operation::ALL {
            assert!(!op.as_str().is_empty());
        }
        assert_eq!(Operation::Retrieve.as_str(), "retrieve");
    }

    #[test]
    fn field_builder_defaults() {
        const F: Field = Field::new("name", "Name", FieldKind::String);
        assert!(!F.required);
        assert!(!F.read_only);
        assert!(F.help_text.is_none());

        const G: Field = Field::new("name", "Name", FieldKind::String)
            .required()
            .max_length(255);
        assert!(G.required);
        assert_eq!(G.max_length, Some(255));
    }
}
