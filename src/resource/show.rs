//! Diagnostic rendering of resources

use crate::error::Result;
use std::fmt::{Display, Write};

/// Renders labeled fields at an indentation depth.
/// Display only; not part of the data contract.
pub trait Show {
    fn show(&self, indent: usize) -> Result<String>;
}

/// Append `Label: value` at `indent` spaces
pub(crate) fn line(out: &mut String, indent: usize, label: &str, value: impl Display) {
    let _ = writeln!(out, "{:indent$}{}: {}", "", label, value, indent = indent);
}

/// Append a labeled block of entries, each two spaces deeper
pub(crate) fn list<T: Display>(out: &mut String, indent: usize, label: &str, entries: &[T]) {
    let _ = writeln!(out, "{:indent$}{}:", "", label, indent = indent);
    for entry in entries {
        let _ = writeln!(out, "{:indent$}{}", "", entry, indent = indent + 2);
    }
}

/// `-` for absent values
pub(crate) fn or_dash<T: Display>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".to_string())
}
