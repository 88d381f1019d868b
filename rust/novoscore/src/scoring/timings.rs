//! Wall-clock time spent in each lifecycle stage.

use serde::Serialize;
use std::time::Duration;

/// Accumulated stage timings, summed across spectra with `+=`.
///
/// Recalibration runs inside the scoring stage and is counted there.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScoreTimings {
    pub collect: Duration,
    pub dedup: Duration,
    /// Candidate expansion on accurate-mass instruments.
    pub expand: Duration,
    pub score: Duration,
    pub prune: Duration,
    /// Cross-correlation and composite score of the survivors.
    pub compose: Duration,
    pub rank: Duration,
}

impl ScoreTimings {
    pub fn total(&self) -> Duration {
        self.collect + self.dedup + self.expand + self.score + self.prune + self.compose + self.rank
    }
}

impl Serialize for ScoreTimings {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("ScoreTimings", 7)?;
        state.serialize_field("collect_ms", &self.collect.as_millis())?;
        state.serialize_field("dedup_ms", &self.dedup.as_millis())?;
        state.serialize_field("expand_ms", &self.expand.as_millis())?;
        state.serialize_field("score_ms", &self.score.as_millis())?;
        state.serialize_field("prune_ms", &self.prune.as_millis())?;
        state.serialize_field("compose_ms", &self.compose.as_millis())?;
        state.serialize_field("rank_ms", &self.rank.as_millis())?;
        state.end()
    }
}

impl std::ops::AddAssign for ScoreTimings {
    fn add_assign(&mut self, rhs: Self) {
        self.collect += rhs.collect;
        self.dedup += rhs.dedup;
        self.expand += rhs.expand;
        self.score += rhs.score;
        self.prune += rhs.prune;
        self.compose += rhs.compose;
        self.rank += rhs.rank;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_millis() {
        let mut timings = ScoreTimings {
            score: Duration::from_millis(12),
            ..Default::default()
        };
        timings += ScoreTimings {
            score: Duration::from_millis(3),
            rank: Duration::from_micros(1500),
            ..Default::default()
        };
        let json = serde_json::to_value(timings).unwrap();
        assert_eq!(json["score_ms"], 15);
        assert_eq!(json["rank_ms"], 1);
        assert_eq!(timings.total(), Duration::from_micros(16_500));
    }
}
