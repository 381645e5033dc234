//! Composite heuristic that decides how promising a directory is.
//!
//! All dampers share one shape: divide by `ln(x + 1)`, so larger counts or
//! older finds pull the score down. The divisor is floored at
//! [`MIN_DIVISOR`]: a find from a few moments ago yields a very large but
//! finite boost instead of infinity.

use chrono::{DateTime, Utc};

use crate::knowledge::{KnowledgeStore, Vertex};

/// Starting score for a directory and for every neighbor re-scored during recursion
pub const BASE_SCORE: f64 = 100.0;

/// Score for directories seeded from the pattern index
pub const INDEX_LOOKUP_SCORE: f64 = 1_000_000.0;

/// Deepest recursion level that still folds in neighbors
pub const MAX_SCORE_DEPTH: u32 = 2;

/// Smallest divisor a damper will use
pub const MIN_DIVISOR: f64 = 1e-3;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Rarity adjustment: `score / ln(count + 1)`
pub fn dampen(score: f64, count: f64) -> f64 {
    score / (count + 1.0).ln().max(MIN_DIVISOR)
}

/// Frequency adjustment: `score * ln(frequency + 1.1)`
pub fn amplify(score: f64, frequency: f64) -> f64 {
    score * (frequency + 1.1).ln()
}

/// Fractional days between `then` and `now`, never negative
pub fn days_since(then: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    ((now - then).num_milliseconds() as f64 / MILLIS_PER_DAY).max(0.0)
}

/// Recency adjustment: the more recent `then`, the larger the result
pub fn boost_recent(score: f64, then: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    dampen(score, days_since(then, now))
}

/// Scores vertices against a store snapshot at a fixed instant
pub struct Scorer<'a> {
    store: &'a KnowledgeStore,
    now: DateTime<Utc>,
}

impl<'a> Scorer<'a> {
    pub fn new(store: &'a KnowledgeStore, now: DateTime<Utc>) -> Self {
        Self { store, now }
    }

    /// Score a vertex, recursing into its neighbors up to [`MAX_SCORE_DEPTH`]
    pub fn score(&self, vertex: &Vertex) -> f64 {
        let mut deepest = 0;
        self.walk(vertex, vertex, BASE_SCORE, 0, &mut deepest)
    }

    /// Like [`Scorer::score`], also reporting the deepest level that recursed
    pub fn score_traced(&self, vertex: &Vertex, deepest: &mut u32) -> f64 {
        self.walk(vertex, vertex, BASE_SCORE, 0, deepest)
    }

    fn walk(
        &self,
        origin: &Vertex,
        vertex: &Vertex,
        base: f64,
        depth: u32,
        deepest: &mut u32,
    ) -> f64 {
        if depth > MAX_SCORE_DEPTH || (depth > 0 && vertex.key() == origin.key()) {
            return base;
        }
        *deepest = (*deepest).max(depth);

        let mut score = base;

        // Each neighbor replaces the running score; the last one in name order wins.
        for edge in vertex.adjacents.values() {
            if let Some(neighbor) = self.store.vertex(&edge.neighbor) {
                let neighbor_score = self.walk(origin, neighbor, BASE_SCORE, depth + 1, deepest);
                let distance = edge.closest_offset().unwrap_or(0) as f64;
                score = amplify(neighbor_score, distance);
            }
        }

        if let Some(average) = vertex.last_find_count.average() {
            score = dampen(score, average);
        }
        score = dampen(score, vertex.absolute_paths.len() as f64);

        let finds = vertex.find_count() as u64;
        score = amplify(score, finds as f64);
        score = if finds > 0 {
            amplify(score, (vertex.visits / finds) as f64)
        } else {
            1.0 / vertex.visits.max(1) as f64
        };

        if let Some(last) = vertex.last_find() {
            score = boost_recent(score, last, self.now);
        }
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::path::Path;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9 * a.abs().max(1.0)
    }

    #[test]
    fn test_dampen_and_amplify_shapes() {
        assert!(approx(dampen(100.0, 1.0), 100.0 / 2f64.ln()));
        assert!(approx(amplify(100.0, 0.0), 100.0 * 1.1f64.ln()));
        assert!(dampen(10.0, 10.0) < dampen(10.0, 2.0));
    }

    #[test]
    fn test_dampen_zero_count_is_finite() {
        let score = dampen(5.0, 0.0);
        assert!(score.is_finite());
        assert!(approx(score, 5.0 / MIN_DIVISOR));
    }

    #[test]
    fn test_recent_finds_rank_higher() {
        let now = Utc::now();
        let today = boost_recent(1.0, now - Duration::hours(1), now);
        let last_week = boost_recent(1.0, now - Duration::days(7), now);
        assert!(today > last_week);
        assert!(boost_recent(1.0, now, now).is_finite());
    }

    #[test]
    fn test_never_found_vertex_scores_inverse_visits() {
        let mut store = KnowledgeStore::default();
        store.resolve_vertex("build", Path::new("/repo/build"));
        store.vertex_mut("build").unwrap().visits = 4;

        let vertex = store.vertex("build").unwrap();
        let score = Scorer::new(&store, Utc::now()).score(vertex);
        assert!(approx(score, 0.25));
    }

    #[test]
    fn test_found_vertex_formula() {
        let now = Utc::now();
        let mut store = KnowledgeStore::default();
        store.resolve_vertex("src", Path::new("/repo/src"));
        let vertex = store.vertex_mut("src").unwrap();
        vertex.visits = 6;
        vertex.last_find_count.record(2);
        vertex.record_find(now - Duration::days(2));
        vertex.record_find(now - Duration::days(1));

        let vertex = store.vertex("src").unwrap();
        let score = Scorer::new(&store, now).score(vertex);

        let mut expected = BASE_SCORE;
        expected = dampen(expected, 2.0); // histogram average
        expected = dampen(expected, 1.0); // one path
        expected = amplify(expected, 2.0); // two finds
        expected = amplify(expected, 3.0); // 6 visits / 2 finds
        expected = dampen(expected, 1.0); // last find a day ago
        assert!(approx(score, expected), "{score} != {expected}");
    }

    #[test]
    fn test_cycle_terminates_within_depth() {
        let mut store = KnowledgeStore::default();
        store.resolve_vertex("a", Path::new("/r/a"));
        store.resolve_vertex("b", Path::new("/r/a/b"));
        store.resolve_vertex("c", Path::new("/r/a/b/c"));
        store.record_adjacency("b", &["a".to_string()]);
        store.record_adjacency("c", &["b".to_string(), "a".to_string()]);
        for name in ["a", "b", "c"] {
            store.vertex_mut(name).unwrap().record_find(Utc::now() - Duration::days(1));
        }

        let a = store.vertex("a").unwrap();
        let mut deepest = 0;
        let score = Scorer::new(&store, Utc::now()).score_traced(a, &mut deepest);

        assert!(score.is_finite());
        assert!(deepest <= MAX_SCORE_DEPTH);
        assert_eq!(deepest, 2);
    }

    #[test]
    fn test_self_loop_stops_at_origin() {
        let mut store = KnowledgeStore::default();
        store.resolve_vertex("src", Path::new("/r/src"));
        store.resolve_vertex("src", Path::new("/r/src/src"));
        store.record_adjacency("src", &["src".to_string()]);

        let vertex = store.vertex("src").unwrap();
        let mut deepest = 0;
        Scorer::new(&store, Utc::now()).score_traced(vertex, &mut deepest);
        assert_eq!(deepest, 0);
    }
}
