//! Pairing of existing remote events with target events by uid.

use std::collections::{HashMap, HashSet};

use crate::event::Event;

/// Result of joining existing and target events on their uid.
///
/// `unmatched_targets` and `matched` follow the order of the targets,
/// `unmatched_existing` follows the order of the existing events.
#[derive(Debug, Default)]
pub struct EventMatches<'a> {
    pub unmatched_targets: Vec<&'a Event>,
    /// `(existing, target)` pairs sharing a uid.
    pub matched: Vec<(&'a Event, &'a Event)>,
    pub unmatched_existing: Vec<&'a Event>,
}

impl<'a> EventMatches<'a> {
    /// Join `existing` and `targets` on exact (case-sensitive) uid equality.
    ///
    /// Events without a uid take no part in the join: a uid-less existing
    /// event is neither matched nor reported as unmatched, and a uid-less
    /// target can never be matched. If several existing events share a uid
    /// the first one wins.
    pub fn compute(existing: &'a [Event], targets: &'a [Event]) -> Self {
        let mut existing_by_uid: HashMap<&str, &Event> = HashMap::with_capacity(existing.len());
        for event in existing {
            if let Some(uid) = event.uid() {
                existing_by_uid.entry(uid).or_insert(event);
            }
        }

        let mut matches = EventMatches::default();
        let mut target_uids: HashSet<&str> = HashSet::with_capacity(targets.len());

        for target in targets {
            let Some(uid) = target.uid() else {
                matches.unmatched_targets.push(target);
                continue;
            };
            target_uids.insert(uid);

            match existing_by_uid.get(uid) {
                Some(&existing) => matches.matched.push((existing, target)),
                None => matches.unmatched_targets.push(target),
            }
        }

        matches.unmatched_existing = existing
            .iter()
            .filter(|e| e.uid().is_some_and(|uid| !target_uids.contains(uid)))
            .collect();

        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::event;

    fn uids(events: &[&Event]) -> Vec<String> {
        events.iter().filter_map(|e| e.uid.clone()).collect()
    }

    #[test]
    fn test_partitions_into_three_disjoint_sets() {
        let existing = vec![event("a@d", "A"), event("b@d", "B"), event("c@d", "C")];
        let targets = vec![event("d@d", "D"), event("b@d", "B2"), event("a@d", "A2")];

        let matches = EventMatches::compute(&existing, &targets);

        assert_eq!(uids(&matches.unmatched_targets), vec!["d@d"]);
        assert_eq!(uids(&matches.unmatched_existing), vec!["c@d"]);

        // Matched pairs follow target order
        let matched: Vec<_> = matches
            .matched
            .iter()
            .map(|(existing, target)| (existing.summary.as_str(), target.summary.as_str()))
            .collect();
        assert_eq!(matched, vec![("B", "B2"), ("A", "A2")]);

        let mut all: Vec<String> = uids(&matches.unmatched_targets);
        all.extend(uids(&matches.unmatched_existing));
        all.extend(matches.matched.iter().filter_map(|(e, _)| e.uid.clone()));
        all.sort();
        assert_eq!(all, vec!["a@d", "b@d", "c@d", "d@d"]);
    }

    #[test]
    fn test_uid_comparison_is_case_sensitive() {
        let existing = vec![event("Shift-1@d", "Shift")];
        let targets = vec![event("shift-1@d", "Shift")];

        let matches = EventMatches::compute(&existing, &targets);

        assert!(matches.matched.is_empty());
        assert_eq!(matches.unmatched_targets.len(), 1);
        assert_eq!(matches.unmatched_existing.len(), 1);
    }

    #[test]
    fn test_existing_without_uid_is_ignored() {
        let mut foreign = event("x@d", "Dentist");
        foreign.uid = None;
        let existing = vec![foreign];
        let targets = vec![event("a@d", "A")];

        let matches = EventMatches::compute(&existing, &targets);

        assert!(matches.unmatched_existing.is_empty());
        assert!(matches.matched.is_empty());
        assert_eq!(matches.unmatched_targets.len(), 1);
    }

    #[test]
    fn test_empty_inputs() {
        let matches = EventMatches::compute(&[], &[]);
        assert!(matches.unmatched_targets.is_empty());
        assert!(matches.matched.is_empty());
        assert!(matches.unmatched_existing.is_empty());
    }
}
