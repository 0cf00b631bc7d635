/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use std::ops::RangeInclusive;

pub const PORT_RANGE: RangeInclusive<usize> = 1..=65535;

pub const WORKFLOW_FILE_NAME: &str = "jobbergate.py";
pub const APPLICATION_ARCHIVE_NAME: &str = "jobbergate.tar.gz";

pub const TEMPLATE_FILES_FOLDER: &str = "job_script_templates";
pub const WORKFLOW_FILES_FOLDER: &str = "workflow_files";
pub const JOB_SCRIPT_FILES_FOLDER: &str = "job_scripts";
pub const APPLICATION_FILES_FOLDER: &str = "applications";

pub const TEMPLATE_SUFFIXES: [&str; 2] = [".j2", ".jinja2"];

pub const FOREIGN_KEY_ERROR_MESSAGE: &str = "Delete failed due to foreign-key constraint";
