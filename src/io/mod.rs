// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - parsing, importing, and exporting

mod exporter;
mod importer;
mod parser;

pub use exporter::{export, export_obj, export_stl, write_obj, ExportFormat, OBJ_HEADER};
pub use importer::import_obj_file;
pub use parser::parse_obj;
