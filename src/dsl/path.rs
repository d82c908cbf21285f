//! URI reconstruction from indent levels.
//!
//! Map lines only carry their own segment; the full URI comes from the lines
//! above them. The tracker keeps the most recent segment at every open level:
//!
//! ```text
//! line          level  tracked                 uri
//! home          0      [home]                  home
//! -about        1      [home, about]           home/about
//! --team        2      [home, about, team]     home/about/team
//! -contact      1      [home, contact]         home/contact
//! shop          0      [shop]                  shop
//! ```
//!
//! A line at level `L` truncates the tracked list to `L` entries and pushes its
//! segment, so a dedent can jump back any number of levels. A line that opens
//! more than one new level leaves the skipped levels empty and is placed under
//! the nearest tracked ancestor; the returned [`Tracked`] carries an
//! [`IndentGap`] so the caller can report it:
//!
//! ```text
//! line          level  tracked                    uri
//! home          0      [home]                     home
//! ---deep       3      [home, _, _, deep]         home/deep
//! ----leaf      4      [home, _, _, deep, leaf]   home/deep/leaf
//! ```
//!
//! [`PathTracker::hold`] occupies a level without a segment, for lines that
//! produced no page. Lines below a held level attach to its nearest tracked
//! ancestor and are not reported as gaps.

/// A line opened more than one new indent level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndentGap {
    pub level: usize,
    /// Levels open before the line.
    pub open: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tracked {
    pub uri: String,
    pub gap: Option<IndentGap>,
}

#[derive(Debug, Clone, Default)]
pub struct PathTracker {
    slots: Vec<Option<String>>,
}

impl PathTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `segment` at `level` and return its full URI.
    pub fn track(&mut self, level: usize, segment: &str) -> Tracked {
        let open = self.slots.len();
        let gap = (level > open).then_some(IndentGap { level, open });
        self.open_at(level, Some(segment.to_string()));
        Tracked { uri: self.uri(), gap }
    }

    /// Occupy `level` without a segment.
    pub fn hold(&mut self, level: usize) {
        self.open_at(level, None);
    }

    fn open_at(&mut self, level: usize, slot: Option<String>) {
        self.slots.truncate(level);
        self.slots.resize(level, None);
        self.slots.push(slot);
    }

    pub fn uri(&self) -> String {
        self.slots.iter().flatten().map(String::as_str).collect::<Vec<_>>().join("/")
    }

    /// Number of tracked segments, empty levels excluded.
    pub fn depth(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn open_levels(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn dedent_jumps_back_several_levels() {
        let mut tracker = PathTracker::new();
        let uris: Vec<String> = [(0, "home"), (1, "about"), (2, "team"), (3, "lead"), (1, "contact"), (0, "shop")]
            .into_iter()
            .map(|(level, seg)| tracker.track(level, seg).uri)
            .collect();

        assert_eq!(uris, vec!["home", "home/about", "home/about/team", "home/about/team/lead", "home/contact", "shop"]);
    }

    #[test]
    fn gap_attaches_to_nearest_ancestor() {
        let mut tracker = PathTracker::new();
        assert_eq!(tracker.track(1, "orphan"), Tracked { uri: "orphan".into(), gap: Some(IndentGap { level: 1, open: 0 }) });

        tracker.track(0, "home");
        let deep = tracker.track(3, "deep");
        assert_eq!(deep.uri, "home/deep");
        assert_eq!(deep.gap, Some(IndentGap { level: 3, open: 1 }));

        let leaf = tracker.track(4, "leaf");
        assert_eq!(leaf, Tracked { uri: "home/deep/leaf".into(), gap: None });
        assert_eq!(tracker.depth(), 3);
        assert_eq!(tracker.open_levels(), 5);

        assert_eq!(tracker.track(1, "about").uri, "home/about");
        assert_eq!(tracker.open_levels(), 2);
    }

    #[test]
    fn held_level_is_open_but_empty() {
        let mut tracker = PathTracker::new();
        tracker.track(0, "home");
        tracker.hold(1);

        let child = tracker.track(2, "child");
        assert_eq!(child, Tracked { uri: "home/child".into(), gap: None });

        tracker.hold(0);
        assert_eq!(tracker.track(1, "about"), Tracked { uri: "about".into(), gap: None });
    }

    /// Levels where each step opens at most one new level.
    fn level_sequence() -> impl Strategy<Value = Vec<usize>> {
        prop::collection::vec(0usize..6, 1..40).prop_map(|raw| {
            let mut depth = 0usize;
            raw.into_iter()
                .map(|wanted| {
                    let level = wanted.min(depth);
                    depth = level + 1;
                    level
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn uri_is_join_of_latest_segment_per_level(levels in level_sequence()) {
            let mut tracker = PathTracker::new();
            let mut latest: Vec<String> = Vec::new();
            let mut max_depth = 0;

            for (i, level) in levels.iter().copied().enumerate() {
                let segment = format!("s{i}");
                let tracked = tracker.track(level, &segment);

                latest.truncate(level);
                latest.push(segment);
                prop_assert_eq!(tracked.gap, None);
                prop_assert_eq!(&tracked.uri, &latest.join("/"));
                prop_assert_eq!(tracked.uri.split('/').count(), level + 1);
                max_depth = max_depth.max(tracker.depth());
            }

            prop_assert_eq!(max_depth, levels.iter().copied().max().unwrap() + 1);
        }

        #[test]
        fn every_line_gets_a_uri_even_across_gaps(levels in prop::collection::vec(0usize..8, 1..40)) {
            let mut tracker = PathTracker::new();
            for (i, level) in levels.iter().copied().enumerate() {
                let segment = format!("s{i}");
                let tracked = tracker.track(level, &segment);
                prop_assert!(tracked.uri.ends_with(&segment));
                prop_assert!(tracked.uri.split('/').count() <= level + 1);
            }
        }
    }
}
