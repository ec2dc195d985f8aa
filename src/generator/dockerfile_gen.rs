use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{GenerationError, Result};

static FROM_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*FROM\s+(\S+)(.*)$").expect("FROM pattern is a valid regex")
});

/// Swap the generic base image in AI output for the resolved Harbor path.
///
/// Only the first `FROM` line whose argument equals `generic_image`
/// (case-insensitive) is rewritten. A stage alias such as `AS builder` is
/// kept. Later `FROM` lines and every other line pass through untouched.
pub fn substitute_base_image(content: &str, generic_image: &str, harbor_path: &str) -> Result<String> {
    let expected = generic_image.trim().to_lowercase();
    let mut replaced = false;

    let lines: Vec<String> = content
        .lines()
        .map(|line| {
            if replaced {
                return line.to_string();
            }
            match FROM_LINE.captures(line) {
                Some(caps) if caps[1].trim().to_lowercase() == expected => {
                    replaced = true;
                    let rest = caps.get(2).map_or("", |m| m.as_str()).trim_end();
                    format!("FROM {}{}", harbor_path, rest)
                }
                _ => line.to_string(),
            }
        })
        .collect();

    if !replaced {
        return Err(GenerationError::ResponseUnusable {
            generic: generic_image.to_string(),
        });
    }

    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HARBOR: &str = "harbor.test.local/base-images/python-base:3.11-slim";

    #[test]
    fn test_replaces_matching_line_and_preserves_the_rest() {
        let ai = "# syntax=docker/dockerfile:1\nFROM python:3.11-slim\n\nWORKDIR /app\nCOPY . .\nCMD [\"python\", \"app.py\"]";
        let out = substitute_base_image(ai, "python:3.11-slim", HARBOR).unwrap();
        assert_eq!(
            out,
            format!("# syntax=docker/dockerfile:1\nFROM {}\n\nWORKDIR /app\nCOPY . .\nCMD [\"python\", \"app.py\"]", HARBOR)
        );
    }

    #[test]
    fn test_match_is_case_insensitive_and_tolerates_indentation() {
        let ai = "   from PYTHON:3.11-SLIM\nRUN pip install flask";
        let out = substitute_base_image(ai, "python:3.11-slim", HARBOR).unwrap();
        assert_eq!(out, format!("FROM {}\nRUN pip install flask", HARBOR));
    }

    #[test]
    fn test_only_first_matching_from_is_replaced() {
        let ai = "FROM python:3.11-slim AS builder\nRUN pip wheel .\nFROM python:3.11-slim\nCOPY --from=builder /wheels /wheels";
        let out = substitute_base_image(ai, "python:3.11-slim", HARBOR).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], format!("FROM {} AS builder", HARBOR));
        assert_eq!(lines[2], "FROM python:3.11-slim");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_skips_from_lines_with_other_images() {
        let ai = "FROM golang:1.20-alpine AS build\nFROM python:3.11-slim\nCMD [\"x\"]";
        let out = substitute_base_image(ai, "python:3.11-slim", HARBOR).unwrap();
        assert_eq!(
            out,
            format!("FROM golang:1.20-alpine AS build\nFROM {}\nCMD [\"x\"]", HARBOR)
        );
    }

    #[test]
    fn test_missing_generic_from_is_unusable() {
        let ai = "FROM docker.io/library/python:3.11-slim\nCMD [\"python\"]";
        let err = substitute_base_image(ai, "python:3.11-slim", HARBOR).unwrap_err();
        assert!(matches!(err, GenerationError::ResponseUnusable { ref generic } if generic == "python:3.11-slim"));

        let err = substitute_base_image("", "python:3.11-slim", HARBOR).unwrap_err();
        assert!(matches!(err, GenerationError::ResponseUnusable { .. }));
    }

    #[test]
    fn test_from_must_be_a_directive() {
        let ai = "# FROM python:3.11-slim\nRUN echo FROM python:3.11-slim";
        assert!(substitute_base_image(ai, "python:3.11-slim", HARBOR).is_err());
    }
}
