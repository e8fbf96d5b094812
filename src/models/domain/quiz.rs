use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Quiz {
    pub quiz_id: String,
    pub user_id: String,
    pub email_context: String, // Donor email text the quiz was generated from
    pub questions: Vec<Question>,
    pub created_at: DateTime<Utc>,
}

impl Quiz {
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn question(&self, question_id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    pub fn contains_question(&self, question_id: &str) -> bool {
        self.question(question_id).is_some()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Question {
    pub id: String,
    pub question_text: String,
    pub options: Vec<String>, // Each option prefixed with its letter label, e.g. "A) ..."
    pub correct_answer: String, // Letter label of the correct option
    pub explanation: String,
    pub difficulty: Difficulty,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

#[cfg(test)]
impl Quiz {
    pub fn test_quiz(quiz_id: &str, questions: Vec<Question>) -> Self {
        Quiz {
            quiz_id: quiz_id.to_string(),
            user_id: "user-1".to_string(),
            email_context: "Dear donor, thank you for your support.".to_string(),
            questions,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
impl Question {
    pub fn test_question(id: &str, correct: &str) -> Self {
        Question {
            id: id.to_string(),
            question_text: format!("Question {}?", id),
            options: vec![
                "A) First".to_string(),
                "B) Second".to_string(),
                "C) Third".to_string(),
                "D) Fourth".to_string(),
            ],
            correct_answer: correct.to_string(),
            explanation: "Because the email says so.".to_string(),
            difficulty: Difficulty::Medium,
        }
    }
}
