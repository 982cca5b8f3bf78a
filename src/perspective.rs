//! Perspective sequences: programmatic window generation.
//!
//! A [`Perspective`] is a single window specification; a
//! [`PerspectiveSet`] holds the parameters of a regular sweep (range,
//! rolling, expanding, walk) and materializes perspectives against a
//! store's timeline. [`Graph::through`] turns either into a
//! [`GraphWindowSet`], a lazy iterator of windowed views.
//!
//! [`Graph::through`]: crate::graph::Graph::through

use crate::graph::Graph;
use crate::view::WindowedGraph;

/// One window specification. Unset bounds mean unbounded on that side;
/// they resolve to `i64::MIN` / `i64::MAX` when the view is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Perspective {
    pub start: Option<i64>,
    pub end: Option<i64>,
}

impl Perspective {
    pub fn new(start: Option<i64>, end: Option<i64>) -> Self {
        Perspective { start, end }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tiling {
    /// Consecutive non-overlapping windows advancing by the increment.
    Rolling,
    /// Windows anchored at the sweep start, each one increment longer.
    Expanding,
}

/// Parameters of a regular window sweep.
///
/// The set stores parameters only; perspectives are materialized when a
/// sweep begins, so one set can be replayed against the same store (or
/// several stores) and unset bounds track the timeline at that moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerspectiveSet {
    start: Option<i64>,
    end: Option<i64>,
    increment: i64,
    tiling: Tiling,
}

impl PerspectiveSet {
    /// Consecutive `[s, min(s + increment, end))` windows covering
    /// `[start, end)`.
    pub fn range(start: i64, end: i64, increment: i64) -> Self {
        PerspectiveSet {
            start: Some(start),
            end: Some(end),
            increment,
            tiling: Tiling::Rolling,
        }
    }

    /// Consecutive windows of `window_size`. Unset bounds resolve from
    /// the store's timeline when the sweep begins.
    pub fn rolling(window_size: i64, start: Option<i64>, end: Option<i64>) -> Self {
        PerspectiveSet {
            start,
            end,
            increment: window_size,
            tiling: Tiling::Rolling,
        }
    }

    /// Windows `[start, start + k * step)` for `k = 1, 2, ...`, the
    /// final one clamped to `end`. Unset bounds resolve from the
    /// timeline.
    pub fn expanding(step: i64, start: Option<i64>, end: Option<i64>) -> Self {
        PerspectiveSet {
            start,
            end,
            increment: step,
            tiling: Tiling::Expanding,
        }
    }

    /// Consecutive windows of `step` covering the store's whole
    /// timeline, resolved when the sweep begins.
    pub fn walk(step: i64) -> Self {
        Self::rolling(step, None, None)
    }

    /// Materializes the sweep against `timeline` (the store's
    /// `(earliest, latest)` pair, or `None` when empty).
    ///
    /// Unset bounds resolve to `earliest` and `latest + 1`; if a bound
    /// stays unresolved because the store is empty, or the increment is
    /// not positive, the sweep is empty.
    pub fn build(&self, timeline: Option<(i64, i64)>) -> Vec<Perspective> {
        let start = self.start.or(timeline.map(|(earliest, _)| earliest));
        let end = self
            .end
            .or(timeline.map(|(_, latest)| latest.saturating_add(1)));
        let (Some(start), Some(end)) = (start, end) else {
            return Vec::new();
        };
        if self.increment <= 0 || start >= end {
            return Vec::new();
        }

        let mut perspectives = Vec::new();
        match self.tiling {
            Tiling::Rolling => {
                let mut s = start;
                while s < end {
                    let e = s.saturating_add(self.increment).min(end);
                    perspectives.push(Perspective::new(Some(s), Some(e)));
                    s = e;
                }
            }
            Tiling::Expanding => {
                let mut e = start;
                while e < end {
                    e = e.saturating_add(self.increment).min(end);
                    perspectives.push(Perspective::new(Some(start), Some(e)));
                }
            }
        }
        perspectives
    }
}

/// Anything [`Graph::through`] accepts: an explicit finite sequence of
/// perspectives, or a [`PerspectiveSet`] resolved against the store's
/// timeline.
///
/// [`Graph::through`]: crate::graph::Graph::through
pub trait IntoPerspectives {
    fn into_perspectives(self, timeline: Option<(i64, i64)>) -> Vec<Perspective>;
}

impl IntoPerspectives for Vec<Perspective> {
    fn into_perspectives(self, _timeline: Option<(i64, i64)>) -> Vec<Perspective> {
        self
    }
}

impl IntoPerspectives for &[Perspective] {
    fn into_perspectives(self, _timeline: Option<(i64, i64)>) -> Vec<Perspective> {
        self.to_vec()
    }
}

impl<const N: usize> IntoPerspectives for [Perspective; N] {
    fn into_perspectives(self, _timeline: Option<(i64, i64)>) -> Vec<Perspective> {
        self.to_vec()
    }
}

impl IntoPerspectives for PerspectiveSet {
    fn into_perspectives(self, timeline: Option<(i64, i64)>) -> Vec<Perspective> {
        self.build(timeline)
    }
}

/// Lazy iterator of windowed views, one per perspective, in order.
pub struct GraphWindowSet {
    graph: Graph,
    perspectives: std::vec::IntoIter<Perspective>,
}

impl GraphWindowSet {
    pub(crate) fn new(graph: Graph, perspectives: Vec<Perspective>) -> Self {
        GraphWindowSet {
            graph,
            perspectives: perspectives.into_iter(),
        }
    }
}

impl Iterator for GraphWindowSet {
    type Item = WindowedGraph;

    fn next(&mut self) -> Option<Self::Item> {
        let p = self.perspectives.next()?;
        Some(
            self.graph
                .window(p.start.unwrap_or(i64::MIN), p.end.unwrap_or(i64::MAX)),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.perspectives.size_hint()
    }
}

impl ExactSizeIterator for GraphWindowSet {}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(perspectives: &[Perspective]) -> Vec<(i64, i64)> {
        perspectives
            .iter()
            .map(|p| (p.start.unwrap(), p.end.unwrap()))
            .collect()
    }

    #[test]
    fn test_range_tiles_without_overlap() {
        let set = PerspectiveSet::range(0, 10, 4);
        let perspectives = set.build(None);
        assert_eq!(bounds(&perspectives), vec![(0, 4), (4, 8), (8, 10)]);
    }

    #[test]
    fn test_range_exact_cover_has_no_empty_tail() {
        let set = PerspectiveSet::range(0, 8, 4);
        assert_eq!(bounds(&set.build(None)), vec![(0, 4), (4, 8)]);
    }

    #[test]
    fn test_expanding_anchors_and_clamps() {
        let set = PerspectiveSet::expanding(4, Some(0), Some(10));
        assert_eq!(bounds(&set.build(None)), vec![(0, 4), (0, 8), (0, 10)]);
    }

    #[test]
    fn test_rolling_resolves_bounds_from_timeline() {
        let set = PerspectiveSet::rolling(5, None, None);
        // latest observation is included: end resolves to latest + 1
        let perspectives = set.build(Some((0, 9)));
        assert_eq!(bounds(&perspectives), vec![(0, 5), (5, 10)]);
    }

    #[test]
    fn test_walk_on_empty_store_yields_nothing() {
        let set = PerspectiveSet::walk(5);
        assert!(set.build(None).is_empty());
    }

    #[test]
    fn test_partial_bounds_resolve_independently() {
        let set = PerspectiveSet::rolling(5, Some(2), None);
        let perspectives = set.build(Some((0, 9)));
        assert_eq!(bounds(&perspectives), vec![(2, 7), (7, 10)]);

        let set = PerspectiveSet::rolling(5, Some(2), None);
        // explicit start but empty store: the end stays unresolved
        assert!(set.build(None).is_empty());
    }

    #[test]
    fn test_degenerate_parameters_yield_nothing() {
        assert!(PerspectiveSet::range(0, 10, 0).build(None).is_empty());
        assert!(PerspectiveSet::range(0, 10, -3).build(None).is_empty());
        assert!(PerspectiveSet::range(5, 5, 1).build(None).is_empty());
        assert!(PerspectiveSet::range(9, 2, 1).build(None).is_empty());
    }

    #[test]
    fn test_set_is_replayable() {
        let set = PerspectiveSet::walk(3);
        let first = set.build(Some((0, 5)));
        let second = set.build(Some((0, 5)));
        assert_eq!(first, second);
        // a grown timeline produces a longer sweep from the same set
        let third = set.build(Some((0, 8)));
        assert!(third.len() > first.len());
    }

    #[test]
    fn test_through_explicit_sequence() {
        let g = Graph::new(1);
        g.add_vertex(0, 1u64, &[]);
        g.add_vertex(5, 2u64, &[]);

        let windows: Vec<WindowedGraph> = g
            .through(vec![
                Perspective::new(Some(0), Some(3)),
                Perspective::new(None, None),
            ])
            .collect();

        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].len(), 1);
        assert_eq!(windows[1].len(), 2);
        assert_eq!(windows[0].start(), 0);
        assert_eq!(windows[1].start(), i64::MIN);
    }

    #[test]
    fn test_through_walk_covers_timeline() {
        let g = Graph::new(2);
        for t in 0..10 {
            g.add_edge(t, (t % 3) as u64, ((t + 1) % 3) as u64, &[]);
        }

        let windows: Vec<WindowedGraph> = g.through(PerspectiveSet::walk(4)).collect();
        // timeline [0, 9] resolves to [0, 10)
        assert_eq!(windows.len(), 3);
        assert_eq!(windows[0].start(), 0);
        assert_eq!(windows[2].end(), 10);
        // every observation falls in exactly one window
        let total: usize = windows.iter().map(|w| w.edges_len()).sum();
        assert!(total >= 3);
    }

    #[test]
    fn test_through_empty_store_is_empty_not_error() {
        let g = Graph::new(1);
        assert_eq!(g.through(PerspectiveSet::walk(10)).count(), 0);
    }
}
