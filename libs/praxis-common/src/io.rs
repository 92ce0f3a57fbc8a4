// Problem file import/export
//
// The interchange format is a JSON document matching the Problem shape.
// A document is accepted only when it carries a non-empty `title` and a
// `testCases` array; everything else defaults. Export rewrites the id to
// a slug of the title so the file name and the stored identity agree.

use crate::types::Problem;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Slugify a title: lowercase, non-alphanumeric runs collapsed to a
/// single hyphen, leading/trailing hyphens stripped.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(ch.to_ascii_lowercase());
            pending_hyphen = false;
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// The id a problem is exported under: slug of the title, falling back
/// to `problem-<id>` when the title slugs to nothing.
pub fn export_id(problem: &Problem) -> String {
    let slug = slugify(&problem.title);
    if slug.is_empty() {
        format!("problem-{}", problem.id)
    } else {
        slug
    }
}

/// Parse and validate a problem document.
pub fn parse_problem(json: &str) -> Result<Problem> {
    let problem: Problem = serde_json::from_str(json).context("invalid problem JSON")?;
    if problem.title.trim().is_empty() {
        bail!("problem document has an empty title");
    }
    Ok(problem)
}

/// Import a problem file. On rejection the caller's active problem is
/// simply left as it was; nothing is written here.
pub fn import_problem(path: &Path) -> Result<Problem> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_problem(&raw).with_context(|| format!("rejected problem file {}", path.display()))
}

/// Export a problem to `<out_dir>/<slug>.json`, id rewritten to the slug.
/// Returns the written path.
pub fn export_problem(problem: &Problem, out_dir: &Path) -> Result<PathBuf> {
    let id = export_id(problem);
    let exported = Problem {
        id: id.clone(),
        ..problem.clone()
    };
    let payload =
        serde_json::to_string_pretty(&exported).context("failed to serialize problem")?;

    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;
    let path = out_dir.join(format!("{id}.json"));
    fs::write(&path, payload).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
