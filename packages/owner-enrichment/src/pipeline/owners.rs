//! Owner resolution - turn an input record into person names to search.

use crate::types::{
    config::FieldMapping,
    events::SkipReason,
    record::{FieldValue, NormalizedRecord},
};

/// Characters separating multiple owners inside one cell.
const NAME_SEPARATORS: [char; 4] = ['&', '/', ';', ','];

/// Outcome of resolving a record's owners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerResolution {
    /// Nothing to search; the record is terminal.
    Skip(SkipReason),
    /// Person names to search, in column then segment order. Never empty.
    Search(Vec<String>),
}

impl OwnerResolution {
    pub fn is_skippable(&self) -> bool {
        matches!(self, Self::Skip(_))
    }

    pub fn names(&self) -> &[String] {
        match self {
            Self::Skip(_) => &[],
            Self::Search(names) => names,
        }
    }
}

/// Resolve candidate person names for a record.
///
/// Corporate rows are skipped outright. Otherwise every owner column is
/// split on `&`, `/`, `;` and `,`, segments are trimmed, blanks dropped and
/// any segment mentioning "trust" removed.
pub fn resolve_owners(record: &NormalizedRecord, fields: &FieldMapping) -> OwnerResolution {
    if record
        .get(&fields.corporate_field)
        .is_some_and(FieldValue::is_truthy)
    {
        return OwnerResolution::Skip(SkipReason::Corporate);
    }

    let names: Vec<String> = fields
        .owner_fields
        .iter()
        .filter_map(|field| record.get(field).and_then(FieldValue::as_text))
        .flat_map(split_owner_names)
        .filter(|name| !is_trust(name))
        .collect();

    if names.is_empty() {
        OwnerResolution::Skip(SkipReason::NoOwners)
    } else {
        OwnerResolution::Search(names)
    }
}

/// Split a raw owner cell into trimmed, non-empty name segments.
pub fn split_owner_names(raw: &str) -> Vec<String> {
    raw.split(&NAME_SEPARATORS[..])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Trusts are legal entities, not people to contact.
pub fn is_trust(name: &str) -> bool {
    name.to_lowercase().contains("trust")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::record::InputRecord;
    use proptest::prelude::*;

    fn resolve(record: InputRecord) -> OwnerResolution {
        resolve_owners(&record.normalize(), &FieldMapping::default())
    }

    #[test]
    fn test_corporate_record_is_skipped() {
        let resolution = resolve(
            InputRecord::new(0)
                .with_field("ID", "1")
                .with_field("Is corp?", "yes")
                .with_field("Owner 1", "Jane Doe"),
        );
        assert_eq!(resolution, OwnerResolution::Skip(SkipReason::Corporate));
        assert!(resolution.names().is_empty());
    }

    #[test]
    fn test_native_boolean_corporate_flag() {
        let resolution = resolve(
            InputRecord::new(0)
                .with_field("is corp?", true)
                .with_field("Owner 1", "Jane Doe"),
        );
        assert!(resolution.is_skippable());
    }

    #[test]
    fn test_trust_segment_excluded() {
        let resolution = resolve(
            InputRecord::new(0)
                .with_field("ID", "2")
                .with_field("Owner 1", "John Smith & Mary Smith Trust"),
        );
        assert_eq!(
            resolution,
            OwnerResolution::Search(vec!["John Smith".to_string()])
        );
    }

    #[test]
    fn test_all_separators_and_both_slots() {
        let resolution = resolve(
            InputRecord::new(0)
                .with_field("Owner 1", "A One / B Two; C Three")
                .with_field("OWNER 2", " D Four ,, E Five &"),
        );
        assert_eq!(
            resolution.names(),
            ["A One", "B Two", "C Three", "D Four", "E Five"]
        );
    }

    #[test]
    fn test_no_owner_fields_is_skippable() {
        let resolution = resolve(InputRecord::new(0).with_field("ID", "3"));
        assert_eq!(resolution, OwnerResolution::Skip(SkipReason::NoOwners));
    }

    #[test]
    fn test_only_trusts_is_skippable() {
        let resolution = resolve(
            InputRecord::new(0).with_field("Owner 1", "Smith Family TRUST / The Trustees"),
        );
        assert_eq!(resolution, OwnerResolution::Skip(SkipReason::NoOwners));
    }

    #[test]
    fn test_non_text_owner_ignored() {
        let resolution = resolve(InputRecord::new(0).with_field("Owner 1", 42.0));
        assert!(resolution.is_skippable());
    }

    proptest! {
        #[test]
        fn prop_corporate_always_skips(owner in ".{0,40}", flag in prop::sample::select(vec!["true", "YES", "y", "1", "t"])) {
            let resolution = resolve(
                InputRecord::new(0)
                    .with_field("Is corp?", flag)
                    .with_field("Owner 1", owner.as_str()),
            );
            prop_assert!(resolution.is_skippable());
            prop_assert!(resolution.names().is_empty());
        }

        #[test]
        fn prop_split_yields_trimmed_non_trust_segments(
            parts in prop::collection::vec("[A-Za-z ]{0,12}", 1..6),
            seps in prop::collection::vec(prop::sample::select(vec!["&", "/", ";", ","]), 5),
        ) {
            let mut raw = String::new();
            for (i, part) in parts.iter().enumerate() {
                if i > 0 {
                    raw.push_str(seps[i - 1]);
                }
                raw.push_str(part);
            }

            let expected: Vec<String> = parts
                .iter()
                .map(|p| p.trim())
                .filter(|p| !p.is_empty() && !p.to_lowercase().contains("trust"))
                .map(str::to_string)
                .collect();

            let resolution = resolve(InputRecord::new(0).with_field("Owner 1", raw.as_str()));
            prop_assert_eq!(resolution.names().to_vec(), expected);
        }
    }
}
