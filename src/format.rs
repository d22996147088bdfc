//! Category string encoding.
//!
//! A selection of services per catalogue is stored as one line of text:
//!
//! ```text
//! Home Services: Plumbing, Electrical | Automotive: Oil Change
//! ```
//!
//! Names are not escaped. A catalogue or service name containing `:`, `,` or
//! `|` does not survive a round trip.

use indexmap::{IndexMap, IndexSet};

/// Catalogue name to its ordered service names, as loaded from a source.
pub type GroupMap = IndexMap<String, Vec<String>>;

/// Catalogue name to the services selected under it.
pub type Selection = IndexMap<String, IndexSet<String>>;

/// Separator between catalogue segments.
pub const SEGMENT_SEPARATOR: &str = " | ";

/// Separator between services inside a segment.
pub const ITEM_SEPARATOR: &str = ", ";

/// Summary text shown when nothing is selected.
pub const PLACEHOLDER: &str = "Select Catalogue & Services";

/// Encode a selection as a category string.
///
/// Catalogues with no selected services are omitted. Segment order follows
/// the map, service order follows the set.
pub fn serialize(selection: &Selection) -> String {
    selection
        .iter()
        .filter(|(_, items)| !items.is_empty())
        .map(|(group, items)| {
            let items: Vec<&str> = items.iter().map(String::as_str).collect();
            format!("{group}: {}", items.join(ITEM_SEPARATOR))
        })
        .collect::<Vec<_>>()
        .join(SEGMENT_SEPARATOR)
}

/// Decode a category string against the catalogues currently known.
///
/// Every known catalogue gets an entry, empty unless the text selects
/// something under it. Segments without `:` and segments naming an unknown
/// catalogue are dropped. Parsing never fails.
pub fn parse<I, S>(text: &str, known_groups: I) -> Selection
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut selection: Selection = known_groups
        .into_iter()
        .map(|group| (group.into(), IndexSet::new()))
        .collect();

    if text.trim().is_empty() {
        return selection;
    }

    for segment in text.split('|').map(str::trim) {
        let Some((group, items)) = segment.split_once(':') else {
            continue;
        };

        if let Some(selected) = selection.get_mut(group.trim()) {
            selected.extend(
                items
                    .trim()
                    .split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string),
            );
        }
    }

    selection
}

/// Keep only the segments that carry services.
///
/// Older records mix bare catalogue names with `Catalogue: services`
/// segments. If no segment has services the first segment is returned as-is.
pub fn segments_with_items(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let segments: Vec<&str> = text.split('|').map(str::trim).collect();
    let with_items: Vec<&str> = segments
        .iter()
        .copied()
        .filter(|segment| segment.contains(':'))
        .collect();

    if with_items.is_empty() {
        segments[0].to_string()
    } else {
        with_items.join(SEGMENT_SEPARATOR)
    }
}

/// Catalogue names mentioned by a category string, in order.
///
/// Unlike [`parse`] this needs no known catalogue list and also reports bare
/// segments.
pub fn segment_groups(text: &str) -> Vec<String> {
    text.split('|')
        .map(|segment| segment.split_once(':').map_or(segment, |(group, _)| group))
        .map(str::trim)
        .filter(|group| !group.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection(entries: &[(&str, &[&str])]) -> Selection {
        entries
            .iter()
            .map(|(group, items)| {
                (
                    (*group).to_string(),
                    items.iter().map(|i| (*i).to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn serialize_joins_segments_in_map_order() {
        let sel = selection(&[
            ("Home Services", &["Plumbing", "Electrical"]),
            ("Automotive", &["Oil Change"]),
        ]);
        assert_eq!(
            serialize(&sel),
            "Home Services: Plumbing, Electrical | Automotive: Oil Change"
        );
    }

    #[test]
    fn serialize_skips_empty_groups() {
        let sel = selection(&[
            ("Home Services", &[]),
            ("Automotive", &["Oil Change"]),
            ("Beauty", &[]),
        ]);
        assert_eq!(serialize(&sel), "Automotive: Oil Change");
    }

    #[test]
    fn serialize_nothing_selected_is_empty() {
        let sel = selection(&[("Home Services", &[]), ("Automotive", &[])]);
        assert_eq!(serialize(&sel), "");
        assert_eq!(serialize(&Selection::new()), "");
    }

    #[test]
    fn parse_empty_input_yields_all_groups_empty() {
        let parsed = parse("", ["Home", "Auto"]);
        assert_eq!(parsed, selection(&[("Home", &[]), ("Auto", &[])]));

        let parsed = parse("   ", ["Home"]);
        assert_eq!(parsed, selection(&[("Home", &[])]));
    }

    #[test]
    fn parse_drops_unknown_group() {
        let parsed = parse("Nonexistent: A, B", ["Home"]);
        assert_eq!(parsed, selection(&[("Home", &[])]));
    }

    #[test]
    fn parse_drops_segments_without_colon() {
        let parsed = parse("Home | Home: Plumbing | garbage", ["Home"]);
        assert_eq!(parsed, selection(&[("Home", &["Plumbing"])]));
    }

    #[test]
    fn parse_tolerates_irregular_whitespace() {
        let parsed = parse("  Home :Plumbing ,  Electrical|Auto:   Oil Change  ", ["Home", "Auto"]);
        assert_eq!(
            parsed,
            selection(&[("Home", &["Plumbing", "Electrical"]), ("Auto", &["Oil Change"])])
        );
    }

    #[test]
    fn parse_ignores_empty_items() {
        let parsed = parse("Home: , Plumbing,, ", ["Home"]);
        assert_eq!(parsed, selection(&[("Home", &["Plumbing"])]));
    }

    #[test]
    fn parse_splits_on_first_colon_only() {
        let parsed = parse("Home: Repair: Doors", ["Home"]);
        assert_eq!(parsed, selection(&[("Home", &["Repair: Doors"])]));
    }

    #[test]
    fn parse_is_repeatable() {
        let text = "Home: Plumbing | Auto: Oil Change, Tires";
        assert_eq!(parse(text, ["Home", "Auto"]), parse(text, ["Home", "Auto"]));
    }

    #[test]
    fn round_trip_preserves_selection() {
        let sel = selection(&[
            ("Home Services", &["Plumbing", "Electrical"]),
            ("Automotive", &["Oil Change"]),
            ("Beauty", &[]),
        ]);
        let text = serialize(&sel);
        assert_eq!(parse(&text, sel.keys().cloned()), sel);
    }

    #[test]
    fn delimiter_in_name_breaks_round_trip() {
        // Known limitation: names are not escaped.
        let sel = selection(&[("Home", &["Heating, Cooling"])]);
        let parsed = parse(&serialize(&sel), ["Home"]);
        assert_ne!(parsed, sel);
        assert_eq!(parsed, selection(&[("Home", &["Heating", "Cooling"])]));
    }

    #[test]
    fn segments_with_items_filters_bare_segments() {
        assert_eq!(
            segments_with_items("Home | Automotive: Oil Change | Beauty: Nails"),
            "Automotive: Oil Change | Beauty: Nails"
        );
    }

    #[test]
    fn segments_with_items_falls_back_to_first_segment() {
        assert_eq!(segments_with_items(" Home | Automotive"), "Home");
        assert_eq!(segments_with_items(""), "");
    }

    #[test]
    fn segment_groups_lists_named_and_bare_segments() {
        assert_eq!(
            segment_groups("Home: Plumbing | Automotive | Beauty: Nails, Hair"),
            vec!["Home", "Automotive", "Beauty"]
        );
        assert!(segment_groups("").is_empty());
    }
}
