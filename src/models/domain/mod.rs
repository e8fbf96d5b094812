pub mod analytics;
pub mod evaluation;
pub mod quiz;
pub mod user;

pub use analytics::{Dashboard, ProgressStats, QuizHistoryEntry, TrendPoint};
pub use evaluation::{QuestionResult, QuizResult};
pub use quiz::{Difficulty, Question, Quiz};
pub use user::SessionUser;
