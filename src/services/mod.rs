pub mod dashboard_service;
pub mod quiz_flow;
pub mod session_service;

pub use dashboard_service::DashboardService;
pub use quiz_flow::QuizFlow;
pub use session_service::SessionService;
