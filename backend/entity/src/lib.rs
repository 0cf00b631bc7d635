/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub mod application;
pub mod job_script;
pub mod job_script_file;
pub mod job_script_template;
pub mod job_submission;
pub mod template_file;
pub mod workflow_file;

pub use job_submission::SubmissionStatus;
pub use template_file::FileType;
