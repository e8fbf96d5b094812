use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("EMAIL_REGEX is a valid regex pattern")
});

/// Letter grade for a 0-100 score. Band edges are inclusive on the lower
/// side: 90 is already an A, 89.9 is still a B.
pub fn grade(score: f64) -> char {
    if score >= 90.0 {
        'A'
    } else if score >= 80.0 {
        'B'
    } else if score >= 70.0 {
        'C'
    } else if score >= 60.0 {
        'D'
    } else {
        'F'
    }
}

pub fn performance_label(score: f64) -> &'static str {
    if score >= 90.0 {
        "Excellent"
    } else if score >= 80.0 {
        "Very Good"
    } else if score >= 70.0 {
        "Good"
    } else if score >= 60.0 {
        "Fair"
    } else {
        "Needs Improvement"
    }
}

/// Rounded percentage of `value` out of `total`; 0 when total is 0.
pub fn percentage(value: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((value as f64 / total as f64) * 100.0).round() as u32
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}
