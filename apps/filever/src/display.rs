//! Output rendering and formatting

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use console::{Style, Term};
use filever_types::{ColorChoice, SplitComparisonResult};
use std::io;

use crate::commands::{CommandOutcome, VerifyReport};

/// Output renderer for CLI results
#[derive(Clone)]
pub struct OutputRenderer {
    /// Use JSON output format
    json_output: bool,
    /// Color configuration
    color_choice: ColorChoice,
    /// Terminal instance
    term: Term,
}

impl OutputRenderer {
    /// Create new output renderer
    pub fn new(json_output: bool, color_choice: ColorChoice) -> Self {
        Self {
            json_output,
            color_choice,
            term: Term::stdout(),
        }
    }

    /// Render command result
    pub fn render_result(&self, result: &CommandOutcome) -> io::Result<()> {
        if self.json_output {
            self.render_json(result)
        } else {
            match result {
                CommandOutcome::Verify(report) => self.render_verify_report(report),
                CommandOutcome::Splits(result) => self.render_split_report(result),
            }
        }
    }

    /// Render as JSON
    fn render_json(&self, result: &CommandOutcome) -> io::Result<()> {
        let json = serde_json::to_string_pretty(result).map_err(io::Error::other)?;
        self.term.write_line(&json)
    }

    fn render_verify_report(&self, report: &VerifyReport) -> io::Result<()> {
        let stats = &report.stats;

        println!("Index:     {}", report.index.display());
        println!("Algorithm: {}", report.run.algorithm);
        if let Some(root) = report.run.root() {
            println!("Root:      {root}");
        }
        println!("Workers:   {}", report.workers);
        println!();

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("Counter").add_attribute(Attribute::Bold),
                Cell::new("Value").add_attribute(Attribute::Bold),
            ]);

        let rows: [(&str, u64); 9] = [
            ("total", stats.total),
            ("processed", stats.processed),
            ("ok", stats.ok),
            ("skipped", stats.skipped),
            ("stat_errors", stats.stat_errors),
            ("size_mismatches", stats.size_mismatches),
            ("hash_errors", stats.hash_errors),
            ("hash_mismatches", stats.hash_mismatches),
            ("duration_ms", stats.duration_ms),
        ];
        for (name, value) in rows {
            table.add_row(vec![Cell::new(name), self.counter_cell(name, value)]);
        }
        table.add_row(vec![
            Cell::new("bytes_hashed"),
            Cell::new(format_size(stats.bytes_hashed)),
        ]);
        table.add_row(vec![
            Cell::new("bytes_stat_ok"),
            Cell::new(format_size(stats.bytes_stat_ok)),
        ]);
        table.add_row(vec![
            Cell::new("total_bytes"),
            Cell::new(format_size(stats.total_bytes)),
        ]);
        table.add_row(vec![
            Cell::new("throughput"),
            Cell::new(format!("{:.1} MB/s", report.throughput_mb_per_sec)),
        ]);
        println!("{table}");
        println!();

        if report.mismatches.is_empty() {
            println!("{}", self.paint("No hash mismatches.", &Style::new().green()));
        } else {
            println!(
                "{}",
                self.paint(
                    &format!("Mismatched files: {}", report.mismatches.len()),
                    &Style::new().red().bold(),
                )
            );
            for mismatch in &report.mismatches {
                println!("  {}", mismatch.path);
            }
        }
        println!("Report written to {}", report.report_path.display());

        Ok(())
    }

    fn render_split_report(&self, result: &SplitComparisonResult) -> io::Result<()> {
        println!("Algorithm: {}", result.algorithm);
        println!("Splits:    {}", result.split_count);
        println!();

        let mut files = Table::new();
        files
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("#").add_attribute(Attribute::Bold),
                Cell::new("Path").add_attribute(Attribute::Bold),
                Cell::new("Size").add_attribute(Attribute::Bold),
                Cell::new("Tail").add_attribute(Attribute::Bold),
            ]);
        for (i, path) in result.paths.iter().enumerate() {
            let tail = result.tail_bytes.get(i).copied().unwrap_or(0);
            let tail_cell = if tail > 0 && self.supports_color() {
                Cell::new(tail).fg(Color::Yellow)
            } else {
                Cell::new(tail)
            };
            files.add_row(vec![
                Cell::new(i),
                Cell::new(path.display()),
                Cell::new(result.sizes.get(i).copied().unwrap_or(0)),
                tail_cell,
            ]);
        }
        println!("{files}");
        println!();

        if result.min_size != result.max_size {
            println!(
                "Size mismatch detected. Overlap: {} bytes, max: {} bytes",
                result.min_size, result.max_size
            );
            println!();
        }

        if result.is_identical() {
            println!(
                "{}",
                self.paint(
                    "Result: all splits match and sizes match (files identical).",
                    &Style::new().green(),
                )
            );
            return Ok(());
        }
        if result.tails_only() {
            println!(
                "{}",
                self.paint(
                    "Result: all splits match over the overlap; only tails differ.",
                    &Style::new().yellow(),
                )
            );
            return Ok(());
        }

        println!(
            "{}",
            self.paint(
                &format!("Differing splits: {:?}", result.differing_splits),
                &Style::new().red().bold(),
            )
        );
        println!();

        for &split in &result.differing_splits {
            let Some(window) = result.windows.get(split) else {
                continue;
            };
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec![
                    Cell::new("#").add_attribute(Attribute::Bold),
                    Cell::new("Path").add_attribute(Attribute::Bold),
                    Cell::new("Digest").add_attribute(Attribute::Bold),
                ]);
            let hashes = result.split_hashes.get(split);
            for (i, path) in result.paths.iter().enumerate() {
                let digest = hashes.and_then(|h| h.get(i)).map_or("", String::as_str);
                table.add_row(vec![Cell::new(i), Cell::new(path.display()), Cell::new(digest)]);
            }
            println!(
                "Split {split} differs (bytes {}..{}):",
                window.start,
                window.end()
            );
            println!("{table}");
            println!();
        }

        Ok(())
    }

    /// Highlight non-zero problem counters
    fn counter_cell(&self, name: &str, value: u64) -> Cell {
        let cell = Cell::new(value);
        if !self.supports_color() || value == 0 {
            return cell;
        }
        match name {
            "hash_mismatches" => cell.fg(Color::Red),
            "stat_errors" | "size_mismatches" | "hash_errors" => cell.fg(Color::Yellow),
            "ok" => cell.fg(Color::Green),
            _ => cell,
        }
    }

    fn paint(&self, text: &str, style: &Style) -> String {
        if self.supports_color() {
            style.apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// Check if color output is supported
    fn supports_color(&self) -> bool {
        match self.color_choice {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => self.term.features().colors_supported(),
        }
    }
}

/// Format byte size in human readable format
fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    #[allow(clippy::cast_precision_loss)]
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{size:.0} {}", UNITS[unit_index])
    } else {
        format!("{size:.1} {}", UNITS[unit_index])
    }
}
