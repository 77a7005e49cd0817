//! Line-oriented operator prompts.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};

/// Print `question` and read one line; only `y`/`Y` (surrounding whitespace
/// ignored) counts as yes. End of input counts as no.
pub fn confirm<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> Result<bool> {
    let answer = ask(input, output, &format!("{question} (Y/N)"))?;
    Ok(answer.is_some_and(|a| a.eq_ignore_ascii_case("y")))
}

/// Print `question` and read one trimmed line, `None` at end of input.
pub fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> Result<Option<String>> {
    writeln!(output, "{question}").context("writing prompt")?;
    output.flush().context("flushing prompt")?;

    let mut line = String::new();
    let n = input.read_line(&mut line).context("reading answer")?;
    if n == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn confirm_with(answer: &str) -> bool {
        let mut input = Cursor::new(answer.as_bytes().to_vec());
        let mut out = Vec::new();
        confirm(&mut input, &mut out, "Execute PART I?").unwrap()
    }

    #[test]
    fn test_yes_is_case_insensitive() {
        assert!(confirm_with("Y\n"));
        assert!(confirm_with("y\n"));
        assert!(confirm_with("  y \r\n"));
    }

    #[test]
    fn test_anything_else_is_no() {
        assert!(!confirm_with("N\n"));
        assert!(!confirm_with("yes\n"));
        assert!(!confirm_with("\n"));
        assert!(!confirm_with(""));
    }

    #[test]
    fn test_prompt_text_written() {
        let mut input = Cursor::new(b"n\n".to_vec());
        let mut out = Vec::new();
        confirm(&mut input, &mut out, "Execute PART II?").unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Execute PART II? (Y/N)\n");
    }

    #[test]
    fn test_ask_reads_one_line() {
        let mut input = Cursor::new(b"  00ff \nsecond\n".to_vec());
        let mut out = Vec::new();
        assert_eq!(
            ask(&mut input, &mut out, "hex?").unwrap().as_deref(),
            Some("00ff")
        );
        assert_eq!(
            ask(&mut input, &mut out, "hex?").unwrap().as_deref(),
            Some("second")
        );
        assert_eq!(ask(&mut input, &mut out, "hex?").unwrap(), None);
    }
}
