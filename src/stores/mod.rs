pub mod quiz_session;
pub mod session;

pub use quiz_session::{Phase, QuizSession};
pub use session::{AuthState, SessionStore, Subscription};
