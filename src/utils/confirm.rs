use anyhow::{Context, Result};
use std::io::{self, Write};

/// Interactive yes/no gate for destructive operations.
///
/// Reads one line from stdin; only a trimmed, case-insensitive `y` proceeds.
/// Anything else, including an empty line or closed stdin, declines.
pub fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N]: ");
    io::stdout().flush().context("Failed to flush stdout")?;

    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .context("Failed to read confirmation input")?;
    Ok(is_affirmative(&input))
}

fn is_affirmative(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case("y")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_y_is_affirmative() {
        assert!(is_affirmative("y\n"));
        assert!(is_affirmative("Y\n"));
        assert!(is_affirmative("  y  "));

        assert!(!is_affirmative("yes\n"));
        assert!(!is_affirmative("n\n"));
        assert!(!is_affirmative("\n"));
        assert!(!is_affirmative(""));
    }
}
