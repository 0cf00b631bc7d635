/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Tests for entity enums

use entity::*;
use std::str::FromStr;

#[test]
fn test_file_type_from_str() {
    assert_eq!(FileType::from_str("ENTRYPOINT").unwrap(), FileType::Entrypoint);
    assert_eq!(FileType::from_str("support").unwrap(), FileType::Support);
    assert_eq!(
        FileType::from_str("binary").unwrap_err(),
        "Invalid file type: binary"
    );
}

#[test]
fn test_submission_status_from_str() {
    assert_eq!(
        SubmissionStatus::from_str("created").unwrap(),
        SubmissionStatus::Created
    );
    assert_eq!(
        SubmissionStatus::from_str("ABORTED").unwrap(),
        SubmissionStatus::Aborted
    );
    assert!(SubmissionStatus::from_str("LOST").is_err());
}

#[test]
fn test_enum_serialization() {
    assert_eq!(
        serde_json::to_string(&FileType::Entrypoint).unwrap(),
        "\"ENTRYPOINT\""
    );
    assert_eq!(
        serde_json::from_str::<SubmissionStatus>("\"SUBMITTED\"").unwrap(),
        SubmissionStatus::Submitted
    );
    assert_eq!(SubmissionStatus::Rejected.to_string(), "REJECTED");
}
