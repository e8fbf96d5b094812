use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-computed result for one submitted quiz. Immutable once stored;
/// cleared only when the learner retakes.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct QuizResult {
    pub quiz_id: String,
    pub user_id: String,
    pub score: f64, // 0-100
    pub total_questions: usize,
    pub correct_answers: usize,
    pub results: Vec<QuestionResult>,
    pub summary: String,
    pub completed_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuestionResult {
    pub question_id: String,
    pub question_text: String,
    pub selected_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
    pub explanation: String,
}

#[cfg(test)]
impl QuizResult {
    pub fn test_result(quiz_id: &str, score: f64, total: usize, correct: usize) -> Self {
        QuizResult {
            quiz_id: quiz_id.to_string(),
            user_id: "user-1".to_string(),
            score,
            total_questions: total,
            correct_answers: correct,
            results: Vec::new(),
            summary: "Solid effort.".to_string(),
            completed_at: Utc::now(),
        }
    }
}
