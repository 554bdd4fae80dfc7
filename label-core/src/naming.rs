//! Output file names that do not overwrite earlier sheets.
//!
//! The allocation itself is a pure function of the directory listing. Nothing
//! reserves the name between listing and writing, so two concurrent runs for
//! the same product can still pick the same file.

use std::collections::HashSet;
use std::io;
use std::path::Path;

use crate::text::normalize_text;

pub const DEFAULT_PREFIX: &str = "etiquettes";

/// Folded product name safe to use inside a file name.
pub fn file_stem(product_name: &str) -> String {
    normalize_text(product_name)
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '-',
            c => c,
        })
        .collect()
}

/// `{prefix}_{stem}.pdf`, or the first free `{prefix}_{stem}_{n}.pdf` for
/// n = 1, 2, ... when that name is taken.
pub fn allocate_output_name(product_name: &str, prefix: &str, existing: &HashSet<String>) -> String {
    let stem = format!("{prefix}_{}", file_stem(product_name));
    let first = format!("{stem}.pdf");
    if !existing.contains(&first) {
        return first;
    }
    let mut n = 1usize;
    loop {
        let candidate = format!("{stem}_{n}.pdf");
        if !existing.contains(&candidate) {
            tracing::debug!(taken = %first, chosen = %candidate, "output name already used");
            return candidate;
        }
        n += 1;
    }
}

/// File names present in `dir`. Names that are not valid UTF-8 cannot
/// collide with generated ones and are left out.
pub fn list_dir_names(dir: &Path) -> io::Result<HashSet<String>> {
    let mut names = HashSet::new();
    for entry in std::fs::read_dir(dir)? {
        if let Ok(name) = entry?.file_name().into_string() {
            names.insert(name);
        }
    }
    Ok(names)
}
