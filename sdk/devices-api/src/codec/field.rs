//! Per-field metadata a model declares about itself.

/// Expected JSON shape of a field.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    String,
    Integer,
    /// Any JSON number; integers are accepted.
    Number,
    Boolean,
    /// Free-form JSON object.
    Object,
    /// Anything, including nested arrays of mixed kinds.
    Any,
    /// String restricted to the listed values.
    Enum(&'static [&'static str]),
    Array(&'static FieldKind),
    Model(&'static ModelSpec),
}

impl FieldKind {
    pub fn describe(&self) -> String {
        match self {
            FieldKind::String => String::from("string"),
            FieldKind::Integer => String::from("integer"),
            FieldKind::Number => String::from("number"),
            FieldKind::Boolean => String::from("boolean"),
            FieldKind::Object => String::from("object"),
            FieldKind::Any => String::from("any"),
            FieldKind::Enum(_) => String::from("string (enum)"),
            FieldKind::Array(inner) => format!("array of {}", inner.describe()),
            FieldKind::Model(spec) => spec.name.to_string(),
        }
    }
}

/// Which direction a field travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldAccess {
    ReadWrite,
    /// Set by the server; never sent in a request body.
    ReadOnly,
    /// Sent by the client; dropped when decoding a response.
    WriteOnly,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub nullable: bool,
    pub access: FieldAccess,
}

impl FieldSpec {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
            nullable: false,
            access: FieldAccess::ReadWrite,
        }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            nullable: false,
            access: FieldAccess::ReadWrite,
        }
    }

    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub const fn read_only(mut self) -> Self {
        self.access = FieldAccess::ReadOnly;
        self
    }

    pub const fn write_only(mut self) -> Self {
        self.access = FieldAccess::WriteOnly;
        self
    }
}

/// Name plus ordered field list of one model.
#[derive(Debug, Clone, Copy)]
pub struct ModelSpec {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

impl ModelSpec {
    pub const fn new(name: &'static str, fields: &'static [FieldSpec]) -> Self {
        Self { name, fields }
    }
}
