//! URL-encoded request bodies.

use url::form_urlencoded;

/// Ordered list of form fields sent as `application/x-www-form-urlencoded`.
///
/// List fields are sent as bracketed indices, for example `ssh_keys[0]`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FormBody {
    fields: Vec<(String, String)>,
}

impl FormBody {
    /// Creates an empty body.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field.
    #[must_use]
    pub fn field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    /// Appends `key[0]`, `key[1]`, ... for every value.
    #[must_use]
    pub fn indexed<I, V>(mut self, key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        for (idx, value) in values.into_iter().enumerate() {
            self.fields.push((format!("{key}[{idx}]"), value.into()));
        }
        self
    }

    /// Returns the value of the first field named `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Field pairs in insertion order.
    #[must_use]
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// Encodes the body with keys in sorted order; fields sharing a key keep
    /// their insertion order.
    #[must_use]
    pub fn encode(&self) -> String {
        let mut sorted: Vec<&(String, String)> = self.fields.iter().collect();
        sorted.sort_by(|lhs, rhs| lhs.0.cmp(&rhs.0));
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in sorted {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }
}
