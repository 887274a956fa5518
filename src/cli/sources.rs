//! Sources subcommand: show where configuration was looked for.

use crate::config::defaults::DEFAULTS_LABEL;
use crate::config::{ConfigPaths, FileRole, SearchReport};
use std::fmt::Write;

/// Describe the search for both roles.
///
/// Markers: `*` selected, `+` exists but shadowed, `-` not found.
pub fn run_sources(paths: &ConfigPaths) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "defaults: {}", DEFAULTS_LABEL);
    for role in [FileRole::Main, FileRole::Secrets] {
        write_report(&mut out, &paths.report(role));
    }
    out
}

fn write_report(out: &mut String, report: &SearchReport) {
    let _ = writeln!(out, "{}:", report.role);

    if let Some(ref explicit) = report.explicit {
        let marker = if explicit.is_file() { '*' } else { '!' };
        let _ = writeln!(out, "  {} explicit  {}", marker, explicit.display());
        if marker == '!' {
            let _ = writeln!(out, "    (file does not exist; resolution will fail)");
        }
        return;
    }

    let selected = report.selected.as_ref().map(|s| s.path.as_path());
    for (candidate, exists) in &report.candidates {
        let marker = if Some(candidate.path.as_path()) == selected {
            '*'
        } else if *exists {
            '+'
        } else {
            '-'
        };
        let _ = writeln!(
            out,
            "  {} {:<8}  {}",
            marker,
            candidate.kind.to_string(),
            candidate.path.display()
        );
    }
    if selected.is_none() {
        let _ = writeln!(out, "  (none found)");
    }
}
