//! Terminal output for the tfx CLI.
//!
//! Documents and variable lists go to stdout. Headings and diagnostics go to
//! stderr through [`console::Term`], so `tfx render` can be piped.

use std::io;

use console::{measure_text_width, style, Term};
use tfx_core::walker::{SoftFailure, Stage};

/// Bold cyan heading with a dimmed rule under it.
pub fn section(title: &str) -> io::Result<()> {
    let term = Term::stderr();
    term.write_line(&style(title).bold().cyan().to_string())?;
    term.write_line(&style("-".repeat(measure_text_width(title))).dim().to_string())
}

/// Where a fixture was read from.
pub fn source(location: &str) -> io::Result<()> {
    Term::stderr().write_line(&format!("{} {location}", style("from").dim()))
}

/// An entry the per-entry phase left as written.
pub fn unresolved(key: &str, failure: &SoftFailure) -> io::Result<()> {
    Term::stderr().write_line(&format!(
        "{} '{key}' kept as written ({} failed): {}",
        style("[WARN]").yellow().bold(),
        stage_label(failure.stage),
        failure.message
    ))
}

/// One name per line on stdout; a dimmed `(none)` on stderr when empty.
pub fn names(names: &[String]) -> io::Result<()> {
    if names.is_empty() {
        return Term::stderr().write_line(&style("(none)").dim().to_string());
    }
    let term = Term::stdout();
    for name in names {
        term.write_line(name)?;
    }
    Ok(())
}

/// A rendered document, verbatim.
pub fn document(text: &str) -> io::Result<()> {
    Term::stdout().write_str(text)
}

fn stage_label(stage: Stage) -> &'static str {
    match stage {
        Stage::Parse => "parse",
        Stage::Execute => "render",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_labels() {
        assert_eq!(stage_label(Stage::Parse), "parse");
        assert_eq!(stage_label(Stage::Execute), "render");
    }
}
