// src/core/schema/types.rs
use serde::{Deserialize, Serialize};

/// Annotations layered on top of a physical type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalType {
    Date,
    TimeMillis,
    TimeMicros,
    TimestampMillis,
    TimestampMicros,
    Datetime,
    Decimal { precision: u32, scale: u32 },
}

impl LogicalType {
    pub fn display_name(&self) -> &'static str {
        match self {
            LogicalType::Date => "date",
            LogicalType::TimeMillis | LogicalType::TimeMicros => "time",
            LogicalType::TimestampMillis | LogicalType::TimestampMicros => "timestamp",
            LogicalType::Datetime => "datetime",
            LogicalType::Decimal { .. } => "decimal",
        }
    }

    /// The type the logical value is stored as.
    pub fn physical(&self) -> Schema {
        match self {
            LogicalType::Date | LogicalType::TimeMillis => Schema::Int,
            LogicalType::TimeMicros
            | LogicalType::TimestampMillis
            | LogicalType::TimestampMicros => Schema::Long,
            LogicalType::Datetime => Schema::String,
            LogicalType::Decimal { .. } => Schema::Bytes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub schema: Schema,
}

impl Field {
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }
}

/// Shape of a record or of a single value inside one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Schema {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
    Enum { symbols: Vec<String> },
    Array { items: Box<Schema> },
    Map { keys: Box<Schema>, values: Box<Schema> },
    Record { name: String, fields: Vec<Field> },
    Union { branches: Vec<Schema> },
    Logical { logical_type: LogicalType },
}

impl Schema {
    pub fn record(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Schema::Record {
            name: name.into(),
            fields,
        }
    }

    pub fn nullable_of(schema: Schema) -> Self {
        Schema::Union {
            branches: vec![schema, Schema::Null],
        }
    }

    pub fn array_of(items: Schema) -> Self {
        Schema::Array {
            items: Box::new(items),
        }
    }

    pub fn map_of(keys: Schema, values: Schema) -> Self {
        Schema::Map {
            keys: Box::new(keys),
            values: Box::new(values),
        }
    }

    pub fn enum_of<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Schema::Enum {
            symbols: symbols.into_iter().map(Into::into).collect(),
        }
    }

    pub fn logical(logical_type: LogicalType) -> Self {
        Schema::Logical { logical_type }
    }

    pub fn decimal_of(precision: u32, scale: u32) -> Self {
        Schema::logical(LogicalType::Decimal { precision, scale })
    }

    pub fn is_nullable(&self) -> bool {
        match self {
            Schema::Union { branches } => branches.iter().any(|b| matches!(b, Schema::Null)),
            _ => false,
        }
    }

    /// Unwraps a `[T, null]` union to `T`. Anything else is returned as is.
    pub fn non_nullable(&self) -> &Schema {
        match self {
            Schema::Union { branches } if branches.len() == 2 => {
                match (&branches[0], &branches[1]) {
                    (Schema::Null, other) | (other, Schema::Null) => other,
                    _ => self,
                }
            }
            _ => self,
        }
    }

    pub fn logical_type(&self) -> Option<&LogicalType> {
        match self {
            Schema::Logical { logical_type } => Some(logical_type),
            _ => None,
        }
    }

    pub fn fields(&self) -> Option<&[Field]> {
        match self {
            Schema::Record { fields, .. } => Some(fields),
            _ => None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields()?.iter().find(|f| f.name == name)
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields()?.iter().position(|f| f.name == name)
    }

    pub fn display_name(&self) -> String {
        match self {
            Schema::Null => "null".into(),
            Schema::Boolean => "boolean".into(),
            Schema::Int => "int".into(),
            Schema::Long => "long".into(),
            Schema::Float => "float".into(),
            Schema::Double => "double".into(),
            Schema::Bytes => "bytes".into(),
            Schema::String => "string".into(),
            Schema::Enum { .. } => "enum".into(),
            Schema::Array { items } => format!("array of {}", items.display_name()),
            Schema::Map { .. } => "map".into(),
            Schema::Record { .. } => "record".into(),
            Schema::Union { branches } if self.is_nullable() && branches.len() == 2 => {
                format!("nullable {}", self.non_nullable().display_name())
            }
            Schema::Union { .. } => "union".into(),
            Schema::Logical { logical_type } => logical_type.display_name().into(),
        }
    }
}
