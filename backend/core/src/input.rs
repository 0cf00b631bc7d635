/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use anyhow::{Context, Result};
use std::fmt;

use super::consts::*;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("Invalid slurm job id: {0}")]
    InvalidSlurmJobId(String),
    #[error("{0}")]
    InvalidFileType(String),
    #[error("{0}")]
    InvalidStatus(String),
    #[error("Invalid file name: {0}")]
    InvalidFileName(String),
}

/// Lookup key accepted by routes that take either a numeric id or a string identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdOrIdentifier {
    Id(i32),
    Identifier(String),
}

impl IdOrIdentifier {
    /// Strings made only of digits are ids, everything else is an identifier.
    pub fn coerce(value: &str) -> Self {
        if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(id) = value.parse::<i32>() {
                return IdOrIdentifier::Id(id);
            }
        }

        IdOrIdentifier::Identifier(value.to_string())
    }
}

impl fmt::Display for IdOrIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdOrIdentifier::Id(id) => write!(f, "{}", id),
            IdOrIdentifier::Identifier(identifier) => write!(f, "{}", identifier),
        }
    }
}

pub fn port_in_range(s: &str) -> Result<u16, String> {
    let port: usize = s
        .parse()
        .map_err(|_| format!("`{s}` is not a port number"))?;

    if PORT_RANGE.contains(&port) {
        Ok(port as u16)
    } else {
        Err(format!(
            "port not in range {}-{}",
            PORT_RANGE.start(),
            PORT_RANGE.end()
        ))
    }
}

pub fn greater_than_zero<
    T: std::str::FromStr + std::cmp::PartialOrd + std::fmt::Display + Default,
>(
    s: &str,
) -> Result<T, String> {
    let num: T = s
        .parse()
        .map_err(|_| format!("`{}` is not a valid number", s))?;

    if num > T::default() {
        Ok(num)
    } else {
        Err(format!("`{}` is not larger than 0", s))
    }
}

pub fn load_secret(path: &str) -> Result<String> {
    let secret = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read secret file {}", path))?;

    Ok(secret.trim().to_string())
}

/// Parses a comma separated list such as `"1,2, 3"`.
pub fn parse_slurm_job_ids(value: &str) -> Result<Vec<i32>, InputError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i32>()
                .map_err(|_| InputError::InvalidSlurmJobId(part.to_string()))
        })
        .collect()
}

/// Uploaded file names end up in object store keys and must stay a single path segment.
pub fn check_file_name(name: &str) -> Result<(), InputError> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('"')
        || name.chars().any(char::is_control)
    {
        return Err(InputError::InvalidFileName(name.to_string()));
    }

    Ok(())
}

/// `entrypoint.py.j2` becomes `entrypoint.py`.
pub fn strip_template_suffix(filename: &str) -> String {
    TEMPLATE_SUFFIXES
        .iter()
        .find_map(|suffix| filename.strip_suffix(suffix))
        .unwrap_or(filename)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_id_or_identifier() {
        assert_eq!(IdOrIdentifier::coerce("13"), IdOrIdentifier::Id(13));
        assert_eq!(
            IdOrIdentifier::coerce("13.1"),
            IdOrIdentifier::Identifier("13.1".to_string())
        );
        assert_eq!(
            IdOrIdentifier::coerce("three"),
            IdOrIdentifier::Identifier("three".to_string())
        );
        assert_eq!(
            IdOrIdentifier::coerce("-3"),
            IdOrIdentifier::Identifier("-3".to_string())
        );
        assert_eq!(
            IdOrIdentifier::coerce("99999999999"),
            IdOrIdentifier::Identifier("99999999999".to_string())
        );
    }

    #[test]
    fn test_parse_slurm_job_ids() {
        assert_eq!(parse_slurm_job_ids("1,2, 3").unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_slurm_job_ids("").unwrap(), Vec::<i32>::new());
        assert_eq!(
            parse_slurm_job_ids("1,two").unwrap_err(),
            InputError::InvalidSlurmJobId("two".to_string())
        );
    }

    #[test]
    fn test_strip_template_suffix() {
        assert_eq!(strip_template_suffix("entrypoint.py.j2"), "entrypoint.py");
        assert_eq!(strip_template_suffix("run.sh.jinja2"), "run.sh");
        assert_eq!(strip_template_suffix("plain.sh"), "plain.sh");
    }

    #[test]
    fn test_check_file_name() {
        assert!(check_file_name("entrypoint.py").is_ok());
        assert!(check_file_name("../etc/passwd").is_err());
        assert!(check_file_name("").is_err());
        assert!(check_file_name("..").is_err());
        assert!(check_file_name("run\".sh").is_err());
    }
}
