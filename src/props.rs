//! Per-entity temporal property storage.
//!
//! A [`PropertyStore`] maps property names to append-only histories of
//! `(timestamp, value)` pairs. Histories only ever grow; no write ever
//! overwrites or removes an existing entry, even when the value is
//! identical to a previous one.

use crate::types::Prop;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;

/// One appended history entry.
type PropEntry = (i64, Prop);

/// Inline capacity of two entries covers the common case of a property
/// written once or twice per entity.
type History = SmallVec<[PropEntry; 2]>;

/// Append-only mapping from property name to timestamped value history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyStore {
    entries: FxHashMap<String, History>,
}

impl PropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `(t, value)` to the history of `name`, creating the
    /// history on first reference.
    pub fn append(&mut self, t: i64, name: &str, value: Prop) {
        self.entries
            .entry(name.to_string())
            .or_default()
            .push((t, value));
    }

    /// Appends every `(name, value)` pair at time `t`.
    pub fn append_all(&mut self, t: i64, props: &[(String, Prop)]) {
        for (name, value) in props {
            self.append(t, name, value.clone());
        }
    }

    /// Full history of `name`, ascending by timestamp (insertion order
    /// for equal timestamps). An unset property yields an empty vector;
    /// this is not an error.
    pub fn prop(&self, name: &str) -> Vec<(i64, Prop)> {
        self.prop_window(name, i64::MIN, i64::MAX)
    }

    /// History of `name` restricted to `[start, end)`.
    pub fn prop_window(&self, name: &str, start: i64, end: i64) -> Vec<(i64, Prop)> {
        if start >= end {
            return Vec::new();
        }
        match self.entries.get(name) {
            Some(history) => {
                let mut result: Vec<PropEntry> = history
                    .iter()
                    .filter(|(t, _)| *t >= start && *t < end)
                    .cloned()
                    .collect();
                result.sort_by_key(|(t, _)| *t);
                result
            }
            None => Vec::new(),
        }
    }

    /// Every property name mapped to its full history.
    pub fn props(&self) -> HashMap<String, Vec<(i64, Prop)>> {
        self.props_window(i64::MIN, i64::MAX)
    }

    /// Every property name mapped to its history restricted to
    /// `[start, end)`. Names whose history is empty in the window are
    /// omitted.
    pub fn props_window(&self, start: i64, end: i64) -> HashMap<String, Vec<(i64, Prop)>> {
        self.entries
            .keys()
            .filter_map(|name| {
                let history = self.prop_window(name, start, end);
                if history.is_empty() {
                    None
                } else {
                    Some((name.clone(), history))
                }
            })
            .collect()
    }

    /// Number of property names ever written.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_property_is_empty_not_error() {
        let store = PropertyStore::new();
        assert!(store.prop("missing").is_empty());
        assert!(store.props().is_empty());
    }

    #[test]
    fn test_append_preserves_duplicates() {
        let mut store = PropertyStore::new();
        store.append(0, "prop1", Prop::I64(1));
        store.append(1, "prop1", Prop::I64(1));

        // identical values at distinct timestamps both survive
        assert_eq!(
            store.prop("prop1"),
            vec![(0, Prop::I64(1)), (1, Prop::I64(1))]
        );
    }

    #[test]
    fn test_history_sorted_by_timestamp() {
        let mut store = PropertyStore::new();
        store.append(5, "cost", Prop::F64(1.0));
        store.append(-1, "cost", Prop::F64(2.0));
        store.append(3, "cost", Prop::F64(3.0));

        let times: Vec<i64> = store.prop("cost").into_iter().map(|(t, _)| t).collect();
        assert_eq!(times, vec![-1, 3, 5]);
    }

    #[test]
    fn test_equal_timestamps_keep_insertion_order() {
        let mut store = PropertyStore::new();
        store.append(2, "p", Prop::Str("first".into()));
        store.append(2, "p", Prop::Str("second".into()));

        assert_eq!(
            store.prop("p"),
            vec![
                (2, Prop::Str("first".into())),
                (2, Prop::Str("second".into()))
            ]
        );
    }

    #[test]
    fn test_windowed_prop_half_open() {
        let mut store = PropertyStore::new();
        store.append(0, "p", Prop::I64(10));
        store.append(5, "p", Prop::I64(20));

        assert_eq!(store.prop_window("p", 0, 5), vec![(0, Prop::I64(10))]);
        assert_eq!(store.prop_window("p", 0, 6).len(), 2);
        assert!(store.prop_window("p", 5, 5).is_empty());
        assert!(store.prop_window("p", 7, 3).is_empty());
    }

    #[test]
    fn test_props_window_omits_empty_histories() {
        let mut store = PropertyStore::new();
        store.append(0, "early", Prop::Bool(true));
        store.append(10, "late", Prop::Bool(false));

        let windowed = store.props_window(0, 5);
        assert_eq!(windowed.len(), 1);
        assert!(windowed.contains_key("early"));
    }

    #[test]
    fn test_append_all() {
        let mut store = PropertyStore::new();
        let props = vec![
            ("type".to_string(), Prop::Str("wallet".into())),
            ("cost".to_string(), Prop::F64(99.5)),
        ];
        store.append_all(0, &props);

        assert_eq!(store.len(), 2);
        assert_eq!(store.prop("type"), vec![(0, Prop::Str("wallet".into()))]);
        assert_eq!(store.prop("cost"), vec![(0, Prop::F64(99.5))]);
    }
}
