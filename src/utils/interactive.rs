use crate::utils::error::AppResult;
use std::io::{self, BufRead, Write};

pub fn prompt_input(prompt: &str) -> AppResult<String> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().to_string())
}

/// Read lines until a lone `.` or end of input
pub fn prompt_multiline(prompt: &str) -> AppResult<String> {
    println!("{}", prompt);
    io::stdout().flush()?;

    read_until_terminator(io::stdin().lock())
}

fn read_until_terminator(reader: impl BufRead) -> AppResult<String> {
    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim_end() == "." {
            break;
        }
        lines.push(line);
    }
    Ok(lines.join("\n"))
}

pub fn prompt_yes_no(prompt: &str) -> AppResult<bool> {
    loop {
        let input = prompt_input(&format!("{} [y/N]: ", prompt))?;
        match input.to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" | "" => return Ok(false),
            _ => println!("Please enter 'y' or 'n'"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_multiline_stops_at_dot() {
        let input = Cursor::new("first line\nsecond line\n.\nignored\n");
        assert_eq!(read_until_terminator(input).unwrap(), "first line\nsecond line");
    }

    #[test]
    fn test_multiline_reads_to_eof() {
        let input = Cursor::new("only line");
        assert_eq!(read_until_terminator(input).unwrap(), "only line");
    }
}
