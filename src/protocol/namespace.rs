//! Initial namespace resolution

use super::message::{Identifier, Namespace};

/// Map configured catalog/schema strings to the session's initial namespace
///
/// An empty string becomes an absent identifier (server default); anything
/// else is passed through as-is. Names are not validated here, a bad name
/// surfaces as a server-side failure.
pub fn resolve_namespace(catalog: &str, schema: &str) -> Namespace {
    Namespace {
        catalog_name: to_identifier(catalog),
        schema_name: to_identifier(schema),
    }
}

fn to_identifier(name: &str) -> Option<Identifier> {
    if name.is_empty() {
        None
    } else {
        Some(Identifier(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_strings_are_absent() {
        let ns = resolve_namespace("", "");
        assert_eq!(ns.catalog_name, None);
        assert_eq!(ns.schema_name, None);
    }

    #[test]
    fn test_values_pass_through_unmodified() {
        let ns = resolve_namespace("c1", "s1");
        assert_eq!(ns.catalog_name, Some(Identifier("c1".into())));
        assert_eq!(ns.schema_name, Some(Identifier("s1".into())));
    }

    #[test]
    fn test_fields_resolve_independently() {
        let ns = resolve_namespace("", "reporting");
        assert_eq!(ns.catalog_name, None);
        assert_eq!(ns.schema_name, Some(Identifier("reporting".into())));

        let ns = resolve_namespace("main", "");
        assert_eq!(ns.catalog_name, Some(Identifier("main".into())));
        assert_eq!(ns.schema_name, None);
    }

    #[test]
    fn test_no_trimming_or_escaping() {
        let ns = resolve_namespace(" spaced ", "we`ird");
        assert_eq!(ns.catalog_name.unwrap().as_str(), " spaced ");
        assert_eq!(ns.schema_name.unwrap().as_str(), "we`ird");
    }
}
