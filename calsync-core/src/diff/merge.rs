//! Three-way merge of generated summaries with manual edits.

/// Work out a new summary for an event whose summary was edited by hand.
///
/// - `original_generated`: what calsync wrote last time
/// - `manually_modified`: what the remote holds now
/// - `new_generated`: what calsync wants to write now
///
/// Comparisons ignore case; text reused from either side keeps its casing.
pub fn merge_summary(
    original_generated: &str,
    manually_modified: &str,
    new_generated: &str,
) -> String {
    // Same generated text as before, the edit still applies as is
    if eq_ignore_case(new_generated, original_generated) {
        return manually_modified.to_string();
    }

    // Text was added around the generated summary: swap the old part out
    if let Some(range) = find_ignore_case(manually_modified, original_generated) {
        let mut merged = String::with_capacity(manually_modified.len() + new_generated.len());
        merged.push_str(&manually_modified[..range.start]);
        merged.push_str(new_generated);
        merged.push_str(&manually_modified[range.end..]);
        return merged;
    }

    format!("{new_generated} / {manually_modified}")
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase()) || a.to_uppercase().eq(b.to_uppercase())
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars().count() == b.chars().count()
        && a.chars().zip(b.chars()).all(|(x, y)| chars_eq_ignore_case(x, y))
}

/// Byte range of the first case-insensitive occurrence of `needle`.
fn find_ignore_case(haystack: &str, needle: &str) -> Option<std::ops::Range<usize>> {
    if needle.is_empty() {
        return Some(0..0);
    }

    for (start, _) in haystack.char_indices() {
        let mut rest = haystack[start..].char_indices();
        let mut end = start;
        let mut matched = true;

        for n in needle.chars() {
            match rest.next() {
                Some((offset, h)) if chars_eq_ignore_case(h, n) => {
                    end = start + offset + h.len_utf8();
                }
                _ => {
                    matched = false;
                    break;
                }
            }
        }

        if matched {
            return Some(start..end);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unchanged_generated_summary_keeps_manual_edit() {
        assert_eq!(merge_summary("Lunch", "Team Lunch", "Lunch"), "Team Lunch");
        assert_eq!(merge_summary("Lunch", "Something else", "LUNCH"), "Something else");
    }

    #[test]
    fn test_no_manual_edit_passes_new_summary_through() {
        assert_eq!(merge_summary("Lunch", "Lunch", "Dinner"), "Dinner");
    }

    #[test]
    fn test_prefix_is_preserved() {
        assert_eq!(merge_summary("Lunch", "Team Lunch", "Dinner"), "Team Dinner");
    }

    #[test]
    fn test_suffix_is_preserved() {
        assert_eq!(merge_summary("Lunch", "Lunch w/ Bob", "Dinner"), "Dinner w/ Bob");
    }

    #[test]
    fn test_unrelated_edit_is_concatenated() {
        assert_eq!(
            merge_summary("Lunch", "Brunch Plans", "Dinner"),
            "Dinner / Brunch Plans"
        );
    }

    #[test]
    fn test_case_insensitive_match_keeps_user_casing_around_it() {
        assert_eq!(merge_summary("lunch", "TEAM LUNCH!", "Dinner"), "TEAM Dinner!");
    }

    #[test]
    fn test_only_first_occurrence_is_replaced() {
        assert_eq!(
            merge_summary("Shift", "Shift swap: Shift B", "Late shift"),
            "Late shift swap: Shift B"
        );
    }

    #[test]
    fn test_multibyte_text() {
        assert_eq!(merge_summary("Café", "☕ CAFÉ meetup", "Bar"), "☕ Bar meetup");
        assert_eq!(merge_summary("Straße", "Straße", "Weg"), "Weg");
    }
}
