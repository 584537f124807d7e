//! Resolves bare enum symbols (`SPAN_KIND_CLIENT`) appearing in source text
//! to their integer value at compile time — looked up once per symbol
//! during statement compilation rather than per evaluation.
use std::collections::HashMap;

/// A source of named integer constants for one enum family (`SpanKind`,
/// `StatusCode`, ...). A host registers one per family it wants the
/// language to recognize.
pub trait EnumProvider {
    fn lookup(&self, symbol: &str) -> Option<i64>;
}

/// A provider backed by a plain map, useful for hosts whose enum symbols
/// aren't already described by a Rust enum type.
#[derive(Debug, Default, Clone)]
pub struct MapEnumProvider(HashMap<String, i64>);

impl MapEnumProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, symbol: impl Into<String>, value: i64) -> Self {
        self.0.insert(symbol.into(), value);
        self
    }
}

impl EnumProvider for MapEnumProvider {
    fn lookup(&self, symbol: &str) -> Option<i64> {
        self.0.get(symbol).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_provider_resolves_registered_symbols_only() {
        let provider = MapEnumProvider::new().with("FOO", 1).with("BAR", 2);
        assert_eq!(provider.lookup("FOO"), Some(1));
        assert_eq!(provider.lookup("BAZ"), None);
    }
}
