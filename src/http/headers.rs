//! HTTP headers shared by [`Request`](crate::http::request::Request) and
//! [`Response`](crate::http::response::Response).
//!
//! Headers are stored in an ordered map to preserve insertion order, which is
//! also the order they are written back on the wire. Names keep the casing
//! they were set with; lookups are case-insensitive.
//!
//! No HTTP semantics are enforced here. The request parser and the response
//! builders decide which headers they set.

use indexmap::IndexMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    headers: IndexMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self {
            headers: IndexMap::new(),
        }
    }

    /// Sets `name` to `value`, replacing any existing header with the same
    /// case-insensitive name while keeping its position.
    pub fn set(&mut self, name: &str, value: &str) {
        match self.position(name) {
            Some(idx) => {
                if let Some((_, v)) = self.headers.get_index_mut(idx) {
                    *v = value.to_string();
                }
            }
            None => {
                self.headers.insert(name.to_string(), value.to_string());
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name)
            .and_then(|idx| self.headers.get_index(idx))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let idx = self.position(name)?;
        self.headers.shift_remove_index(idx).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serializes as `Name: value\r\n` lines in insertion order.
    pub fn stringify(&self) -> String {
        let mut result = String::new();
        for (name, value) in &self.headers {
            result.push_str(name);
            result.push_str(": ");
            result.push_str(value);
            result.push_str("\r\n");
        }
        result
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.headers
            .keys()
            .position(|k| k.eq_ignore_ascii_case(name))
    }
}
