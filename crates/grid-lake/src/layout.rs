//! Partition layout: path construction and parsing.
//!
//! The layout is a bit-exact external contract consumed by the downstream
//! transformation layer:
//! `<root>/<provider>/<dataset>/dt=<YYYY-MM-DD>/<dataset>_<content-id>.arrow`
//! plus a `<dataset>_<content-id>_meta.json` sidecar per data file.

use chrono::NaiveDate;
use object_store::path::Path;

pub(crate) const DATA_EXT: &str = "arrow";
pub(crate) const META_SUFFIX: &str = "_meta.json";

/// Collapse a path segment to `[A-Za-z0-9._-]`, squeezing anything else into
/// single underscores. Segment identity must survive both filesystem and
/// object-store key rules.
pub(crate) fn sanitize_segment(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev_underscore = false;

    for ch in input.chars() {
        let keep = ch.is_ascii_alphanumeric() || ch == '.' || ch == '-' || ch == '_';
        if keep {
            out.push(ch);
            prev_underscore = false;
        } else if !prev_underscore {
            out.push('_');
            prev_underscore = true;
        }
    }

    let sanitized = out.trim_matches('_');
    if sanitized.is_empty() {
        return "_".to_string();
    }

    let mut capped = sanitized.to_string();
    if capped.len() > 128 {
        capped.truncate(128);
    }
    capped
}

pub(crate) fn dataset_prefix(provider: &str, dataset: &str) -> Path {
    Path::from(sanitize_segment(provider)).child(sanitize_segment(dataset))
}

pub(crate) fn partition_prefix(provider: &str, dataset: &str, as_of: NaiveDate) -> Path {
    dataset_prefix(provider, dataset).child(format!("dt={}", as_of.format("%Y-%m-%d")))
}

pub(crate) fn data_file_name(dataset: &str, content_id: &str) -> String {
    format!("{}_{content_id}.{DATA_EXT}", sanitize_segment(dataset))
}

pub(crate) fn meta_file_name(dataset: &str, content_id: &str) -> String {
    format!("{}_{content_id}{META_SUFFIX}", sanitize_segment(dataset))
}

/// Parse the as-of date out of a `dt=YYYY-MM-DD` partition directory name.
pub(crate) fn parse_partition_date(prefix: &Path) -> Option<NaiveDate> {
    let segment = prefix.parts().last()?;
    let raw = segment.as_ref().strip_prefix("dt=")?;
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Whether an object name is a sidecar, and if so which content id it
/// carries: `<dataset>_<content-id>_meta.json`.
pub(crate) fn content_id_of_meta(name: &str, dataset: &str) -> Option<String> {
    let stem = name.strip_suffix(META_SUFFIX)?;
    let id = stem.strip_prefix(&format!("{}_", sanitize_segment(dataset)))?;
    if id.is_empty() { None } else { Some(id.to_string()) }
}
