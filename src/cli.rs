use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use comfy_table::Table;

use quizbot_client::api::QuizBackend;
use quizbot_client::app_state::AppState;
use quizbot_client::config::Config;
use quizbot_client::errors::{AppError, AppResult};
use quizbot_client::grading::{grade, is_valid_email, performance_label};
use quizbot_client::models::domain::{Dashboard, ProgressStats, Quiz, QuizHistoryEntry};
use quizbot_client::models::dto::ALLOWED_QUESTION_COUNTS;
use quizbot_client::stores::QuizSession;

#[derive(Parser, Debug)]
#[command(name = "quizbot", version, about = "Donor-email quiz client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in with email and password
    Login {
        email: String,
        #[arg(long)]
        password: Option<String>,
    },

    /// Create an account and sign in
    Register {
        email: String,
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        password: Option<String>,
    },

    /// Show the signed-in user
    Whoami,

    /// Generate a quiz from a donor email file and take it interactively
    Quiz {
        email_file: PathBuf,
        /// Number of questions (3, 5, 7 or 10)
        #[arg(long)]
        questions: Option<u8>,
    },

    /// List past quiz results
    History,

    /// Show aggregate progress analytics
    Progress,

    /// Fetch history and progress together
    Dashboard,

    /// Exchange the stored provider credential for a fresh session token
    Refresh,

    /// Sign out
    Logout,
}

pub async fn run() -> AppResult<()> {
    let cli = Cli::parse();
    let config = Config::from_env();
    let state = AppState::new(config)?;

    // Stand-in for the sign-in redirect: the global 401 policy already
    // cleared the credential by the time this fires.
    state.backend.set_unauthorized_hook(|| {
        eprintln!("Session expired. Please sign in again with `quizbot login`.");
    });

    match cli.command {
        Commands::Login { email, password } => login(&state, &email, password).await,
        Commands::Register {
            email,
            full_name,
            password,
        } => register(&state, &email, &full_name, password).await,
        Commands::Whoami => whoami(&state).await,
        Commands::Quiz {
            email_file,
            questions,
        } => take_quiz(&state, &email_file, questions).await,
        Commands::History => history(&state).await,
        Commands::Progress => progress(&state).await,
        Commands::Dashboard => dashboard(&state).await,
        Commands::Refresh => refresh(&state).await,
        Commands::Logout => logout(&state).await,
    }
}

/// Protected commands resolve identity first and refuse to run anonymously.
async fn require_auth(state: &AppState) -> AppResult<()> {
    state.session_service.resolve_startup().await;
    if state.session.is_authenticated() {
        Ok(())
    } else {
        Err(AppError::Unauthorized(
            "Please sign in first with `quizbot login`".to_string(),
        ))
    }
}

async fn login(state: &AppState, email: &str, password: Option<String>) -> AppResult<()> {
    if !is_valid_email(email) {
        return Err(AppError::ValidationError(format!(
            "'{}' is not a valid email address",
            email
        )));
    }
    let password = match password {
        Some(p) => p,
        None => prompt("Password: ")?,
    };

    let user = state.session_service.login(email, &password).await?;
    println!("Signed in as {} <{}>", user.full_name, user.email);
    Ok(())
}

async fn register(
    state: &AppState,
    email: &str,
    full_name: &str,
    password: Option<String>,
) -> AppResult<()> {
    if !is_valid_email(email) {
        return Err(AppError::ValidationError(format!(
            "'{}' is not a valid email address",
            email
        )));
    }
    let password = match password {
        Some(p) => p,
        None => prompt("Password: ")?,
    };

    let user = state
        .session_service
        .register(email, &password, full_name)
        .await?;
    println!("Account created. Signed in as {} <{}>", user.full_name, user.email);
    Ok(())
}

async fn whoami(state: &AppState) -> AppResult<()> {
    require_auth(state).await?;
    let user = state
        .session
        .current_user()
        .ok_or_else(|| AppError::InternalError("authenticated without a user".to_string()))?;
    println!("{} <{}> (uid {})", user.full_name, user.email, user.uid);
    Ok(())
}

async fn take_quiz(
    state: &AppState,
    email_file: &std::path::Path,
    questions: Option<u8>,
) -> AppResult<()> {
    require_auth(state).await?;

    let donor_email = std::fs::read_to_string(email_file)?;
    let num_questions = questions.unwrap_or(state.config.default_num_questions);
    if !ALLOWED_QUESTION_COUNTS.contains(&num_questions) {
        return Err(AppError::ValidationError(format!(
            "Question count must be one of {:?}",
            ALLOWED_QUESTION_COUNTS
        )));
    }

    let mut session = state.quiz_session.lock().await;
    state
        .quiz_flow
        .generate(&mut session, &donor_email, num_questions)
        .await?;

    let quiz = session
        .quiz()
        .cloned()
        .ok_or_else(|| AppError::InternalError("generation left no quiz behind".to_string()))?;
    println!("Quiz {} ready: {} questions\n", quiz.quiz_id, quiz.question_count());

    collect_answers(&mut session, &quiz)?;

    let result = state.quiz_flow.submit(&mut session).await?;

    println!();
    println!(
        "Score: {:.1}% (grade {}, {})",
        result.score,
        grade(result.score),
        performance_label(result.score)
    );
    println!(
        "Correct: {}/{}",
        result.correct_answers, result.total_questions
    );
    if !result.summary.is_empty() {
        println!("Summary: {}", result.summary);
    }

    println!("\nReview:");
    for question in &quiz.questions {
        let verdict = match session.is_correct(&question.id) {
            Some(true) => "correct",
            Some(false) => "incorrect",
            None => "unanswered",
        };
        println!("  [{}] {}", verdict, question.question_text);
        if session.is_correct(&question.id) == Some(false) {
            println!(
                "      correct answer: {} ({})",
                question.correct_answer, question.explanation
            );
        }
    }

    Ok(())
}

fn collect_answers(session: &mut QuizSession, quiz: &Quiz) -> AppResult<()> {
    for (index, question) in quiz.questions.iter().enumerate() {
        println!(
            "{}. {} [{}]",
            index + 1,
            question.question_text,
            question.difficulty
        );
        for option in &question.options {
            println!("   {}", option);
        }

        loop {
            let raw = prompt("Your answer: ")?;
            let label = raw.trim().to_uppercase();
            if label.len() != 1 || !label.chars().all(|c| c.is_ascii_alphabetic()) {
                println!("Enter a single option letter.");
                continue;
            }
            match session.select_answer(&question.id, &label) {
                Ok(()) => break,
                Err(err) => println!("{}", err),
            }
        }
        println!();
    }
    Ok(())
}

async fn history(state: &AppState) -> AppResult<()> {
    require_auth(state).await?;
    let entries = state.backend.history().await?;
    print_history(&entries);
    Ok(())
}

async fn progress(state: &AppState) -> AppResult<()> {
    require_auth(state).await?;
    let stats = state.backend.progress().await?;
    print_progress(&stats);
    Ok(())
}

async fn dashboard(state: &AppState) -> AppResult<()> {
    require_auth(state).await?;
    let Dashboard { history, progress } = state.dashboard.fetch().await?;
    print_progress(&progress);
    println!();
    print_history(&history);
    Ok(())
}

async fn refresh(state: &AppState) -> AppResult<()> {
    state.session_service.refresh_credential().await?;
    let user = state
        .session
        .current_user()
        .ok_or_else(|| AppError::InternalError("refresh left no user behind".to_string()))?;
    println!("Session refreshed for {} <{}>", user.full_name, user.email);
    Ok(())
}

async fn logout(state: &AppState) -> AppResult<()> {
    state.session_service.logout().await;
    println!("Signed out.");
    Ok(())
}

fn print_history(entries: &[QuizHistoryEntry]) {
    if entries.is_empty() {
        println!("No quizzes taken yet.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Quiz", "Completed", "Score", "Grade", "Correct"]);
    for entry in entries {
        table.add_row(vec![
            entry.quiz_id.clone(),
            entry.completed_at.format("%b %d, %Y %H:%M").to_string(),
            format!("{:.1}%", entry.score),
            grade(entry.score).to_string(),
            format!("{}/{}", entry.correct_answers, entry.total_questions),
        ]);
    }
    println!("{table}");
}

fn print_progress(stats: &ProgressStats) {
    println!("Quizzes taken:      {}", stats.total_quizzes);
    println!("Average score:      {:.1}%", stats.average_score);
    println!("Questions answered: {}", stats.total_questions_answered);
    println!("Accuracy:           {:.1}%", stats.accuracy_rate);

    if !stats.improvement_trend.is_empty() {
        println!("Trend:");
        for point in &stats.improvement_trend {
            println!("  quiz {:>3}: {:.1}%", point.quiz_number, point.score);
        }
    }
}

fn prompt(message: &str) -> AppResult<String> {
    print!("{}", message);
    io::stdout().flush()?;
    read_response(&mut io::stdin().lock())
}

/// Reads one line of input. A zero-byte read means the stream is closed, so
/// return an error instead of an empty answer the caller would re-prompt for.
fn read_response(input: &mut impl io::BufRead) -> AppResult<String> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(AppError::ValidationError(
            "Input closed before a response was given".to_string(),
        ));
    }
    Ok(line.trim().to_string())
}
