use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the learner's quiz history, newest first as returned by the
/// backend.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct QuizHistoryEntry {
    pub quiz_id: String,
    pub completed_at: DateTime<Utc>,
    pub score: f64,
    pub total_questions: usize,
    pub correct_answers: usize,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ProgressStats {
    pub total_quizzes: usize,
    pub average_score: f64,
    pub total_questions_answered: usize,
    pub accuracy_rate: f64,
    pub improvement_trend: Vec<TrendPoint>,
}

/// Score over attempt number, oldest first, for the progress chart.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct TrendPoint {
    pub quiz_number: usize,
    pub score: f64,
}

/// History and progress fetched together for the dashboard. The pair is only
/// considered available when both legs resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct Dashboard {
    pub history: Vec<QuizHistoryEntry>,
    pub progress: ProgressStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_stats_parses_backend_shape() {
        let json = r#"{
            "total_quizzes": 3,
            "average_score": 73.3,
            "total_questions_answered": 15,
            "accuracy_rate": 73.3,
            "improvement_trend": [
                {"quiz_number": 1, "score": 60.0},
                {"quiz_number": 2, "score": 80.0},
                {"quiz_number": 3, "score": 80.0}
            ]
        }"#;

        let stats: ProgressStats = serde_json::from_str(json).unwrap();
        assert_eq!(stats.total_quizzes, 3);
        assert_eq!(stats.improvement_trend.len(), 3);
        assert_eq!(stats.improvement_trend[1].score, 80.0);
    }
}
