// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI output reporter with colored formatting

use super::runner::SliceRun;
use crate::geometry::MeshStats;
use colored::*;
use std::time::Duration;

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    /// Report a finished slice job
    pub fn report_slice(run: &SliceRun) {
        let report = &run.report;

        println!("\n{}", "━".repeat(80).bright_black());
        println!("{} {}", "Sliced:".bold(), run.input.display().to_string().cyan());
        println!("{}", "━".repeat(80).bright_black());
        println!(
            "  {} {} >= {}",
            "Plane:".bright_black(),
            report.axis.to_string().cyan(),
            report.height.to_string().cyan()
        );

        println!("\n{}", "Mesh:".bold());
        Self::print_change("Vertices", run.before.vertex_count, run.after.vertex_count);
        Self::print_change("Faces", run.before.face_count, run.after.face_count);

        println!("\n{}", "Cut:".bold());
        Self::print_count("Crossing faces", report.crossing_faces);
        Self::print_count("Triangulated", report.faces_triangulated);
        Self::print_count("New vertices", report.vertices_created);
        Self::print_count("Welds", report.welds);
        Self::print_count("Removed vertices", report.vertices_culled);
        Self::print_count("Cap faces", report.cap_faces);
        if report.degenerate_remnants > 0 {
            println!(
                "  {} {}",
                "Collapsed faces:".bright_black(),
                report.degenerate_remnants.to_string().yellow()
            );
        }

        if run.after.border_edges > 0 {
            println!(
                "\n{}",
                format!("Output has {} open edges", run.after.border_edges).yellow()
            );
        }

        println!("\n{}", "Performance:".bold());
        println!(
            "  {} {:>8} | {} {:>8}",
            "Slice:".bright_black(),
            Self::format_duration(run.slice_time).cyan(),
            "Total:".bright_black(),
            Self::format_duration(run.total_time).yellow()
        );
        println!(
            "  {} {}",
            "Output:".bright_black(),
            run.output.display().to_string().cyan()
        );
        println!("{}", "━".repeat(80).bright_black());
    }

    /// Report mesh statistics
    pub fn report_stats(file: &str, stats: &MeshStats) {
        println!("\n{}", "━".repeat(80).bright_black());
        println!("{} {}", "Mesh:".bold(), file.cyan());
        println!("{}", "━".repeat(80).bright_black());
        Self::print_count("Vertices", stats.vertex_count);
        Self::print_count("Faces", stats.face_count);
        Self::print_count("Edges", stats.edge_count);

        let closed = if stats.is_closed {
            "yes".green()
        } else {
            format!("no ({} open edges)", stats.border_edges).yellow()
        };
        println!("  {} {}", "Closed:".bright_black(), closed);
        println!(
            "  {} ({:.3}, {:.3}, {:.3}) - ({:.3}, {:.3}, {:.3})",
            "Bounds:".bright_black(),
            stats.bbox[0],
            stats.bbox[1],
            stats.bbox[2],
            stats.bbox[3],
            stats.bbox[4],
            stats.bbox[5]
        );
        println!("{}", "━".repeat(80).bright_black());
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("\n{} {}", "❌ Error:".red().bold(), message);
    }

    /// Report info
    pub fn report_info(message: &str) {
        println!("{} {}", "ℹ️".bright_blue(), message);
    }

    fn print_count(name: &str, value: usize) {
        println!(
            "  {} {}",
            format!("{}:", name).bright_black(),
            value.to_string().cyan()
        );
    }

    fn print_change(name: &str, before: usize, after: usize) {
        let after_str = if after < before {
            after.to_string().yellow()
        } else {
            after.to_string().green()
        };
        println!(
            "  {} {} -> {}",
            format!("{}:", name).bright_black(),
            before.to_string().cyan(),
            after_str
        );
    }

    /// Format duration for display
    pub fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();

        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", micros as f64 / 1_000_000.0)
        }
    }

    /// Print success message
    pub fn success(message: &str) {
        println!("{} {}", "✅".green(), message.green());
    }
}
