use crate::{error::ConfigurationError, record::Record};
use std::{
    any::{TypeId, type_name},
    collections::HashMap,
    sync::{Arc, LazyLock, RwLock},
};

///
/// CACHE
///
/// Process-wide record metadata, keyed by type.
/// Entries are written once and never evicted or mutated.
///

static CACHE: LazyLock<RwLock<HashMap<TypeId, Arc<RecordTypeInfo>>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Metadata for `R`, building and caching it on first use.
///
/// # Panics
/// When two fields of `R` resolve to the same external name.
#[must_use]
pub fn info<R: Record>() -> Arc<RecordTypeInfo> {
    let id = TypeId::of::<R>();

    if let Some(found) = CACHE
        .read()
        .expect("record cache RwLock poisoned while acquiring read lock")
        .get(&id)
    {
        return Arc::clone(found);
    }

    let built = match RecordTypeInfo::build::<R>() {
        Ok(built) => built,
        Err(err) => panic!("{err}"),
    };

    let mut cache = CACHE
        .write()
        .expect("record cache RwLock poisoned while acquiring write lock");

    // another writer may have won the race; keep its entry
    Arc::clone(cache.entry(id).or_insert_with(|| Arc::new(built)))
}

///
/// FieldInfo
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldInfo {
    pub external_name: &'static str,

    /// Position in `Record::FIELDS`.
    pub declared_order: usize,

    pub type_hint: Option<&'static str>,
}

///
/// RecordTypeInfo
///
/// Resolved field layout of one record type.
///

#[derive(Debug)]
pub struct RecordTypeInfo {
    record: &'static str,
    fields: Vec<FieldInfo>,
    by_name: HashMap<&'static str, usize>,
    by_lower_name: HashMap<String, usize>,
}

impl RecordTypeInfo {
    /// Resolve the field layout of `R` without touching the cache.
    pub fn build<R: Record>() -> Result<Self, ConfigurationError> {
        let record = type_name::<R>();
        let mut fields = Vec::with_capacity(R::FIELDS.len());
        let mut by_name = HashMap::with_capacity(R::FIELDS.len());
        let mut by_lower_name = HashMap::with_capacity(R::FIELDS.len());

        for (declared_order, descriptor) in R::FIELDS.iter().enumerate() {
            let name = descriptor.external_name();

            if by_name.insert(name, declared_order).is_some() {
                return Err(ConfigurationError::DuplicateField { record, name });
            }
            by_lower_name
                .entry(name.to_lowercase())
                .or_insert(declared_order);

            fields.push(FieldInfo {
                external_name: name,
                declared_order,
                type_hint: descriptor.type_hint,
            });
        }

        Ok(Self {
            record,
            fields,
            by_name,
            by_lower_name,
        })
    }

    #[must_use]
    pub const fn record(&self) -> &'static str {
        self.record
    }

    /// Fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.by_name.get(name).map(|&i| &self.fields[i])
    }

    /// Exact lookup first, then a case-insensitive one.
    #[must_use]
    pub fn field_normalized(&self, name: &str) -> Option<&FieldInfo> {
        self.field(name).or_else(|| {
            self.by_lower_name
                .get(&name.to_lowercase())
                .map(|&i| &self.fields[i])
        })
    }
}
