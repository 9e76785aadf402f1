//! Shared output formatting for the maintenance operations.

/// Announces the start of an operation.
pub fn message_welcome(text: &str) {
    println!("🚀 {text}");
}

/// Progress line for an intermediate step.
pub fn message_info(text: &str) {
    println!("ℹ {text}");
}

pub fn message_success(text: &str) {
    println!("✅ {text}");
}

/// Errors go to stderr so scripted callers can separate them from listings.
pub fn message_error(text: &str) {
    eprintln!("❌ {text}");
}
