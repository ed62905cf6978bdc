use derive_more::Display;

///
/// ColumnType
///
/// Store column type, rendered in the statement dialect's syntax.
///

#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub enum ColumnType {
    #[display("boolean")]
    Boolean,
    #[display("tinyint")]
    TinyInt,
    #[display("smallint")]
    SmallInt,
    #[display("int")]
    Int,
    #[display("bigint")]
    BigInt,
    #[display("float")]
    Float,
    #[display("double")]
    Double,
    #[display("text")]
    Text,
    #[display("blob")]
    Blob,
    #[display("timestamp")]
    Timestamp,
    #[display("uuid")]
    Uuid,
    #[display("list<{_0}>")]
    List(Box<Self>),
    #[display("set<{_0}>")]
    Set(Box<Self>),
    #[display("map<{_0}, {_1}>")]
    Map(Box<Self>, Box<Self>),
    /// Verbatim type taken from a field's type hint.
    #[display("{_0}")]
    Custom(String),
}

impl ColumnType {
    /// Apply a field's storage-type hint.
    ///
    /// `set` and `list` re-tag a collection's element type; any other hint
    /// replaces the type verbatim.
    #[must_use]
    pub fn with_hint(base: Option<Self>, hint: &str) -> Option<Self> {
        let element = |ty: Self| match ty {
            Self::List(inner) | Self::Set(inner) => Some(inner),
            _ => None,
        };

        if hint.eq_ignore_ascii_case("set") {
            base.and_then(element).map(Self::Set)
        } else if hint.eq_ignore_ascii_case("list") {
            base.and_then(element).map(Self::List)
        } else {
            Some(Self::Custom(hint.to_string()))
        }
    }
}
