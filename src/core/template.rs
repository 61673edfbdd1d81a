// ipsift - core/template.rs
//
// Custom template mode: selected columns rendered through a `[1]:[2]#[3]`
// style format, then deduplicated and ordered.

use crate::core::dedup::{dedup_and_sort_keyed, KeyedRecord};
use crate::core::model::SortKey;
use crate::core::tabular::RowSource;
use crate::util::constants;
use crate::util::error::TemplateError;
use regex::Regex;
use std::sync::OnceLock;

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[(\d)\]").expect("template: invalid regex"))
}

fn scheme_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^https?://").expect("template: invalid regex"))
}

/// What the user asked custom mode to produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSpec {
    /// 1-based column indices, in output order.
    pub columns: Vec<usize>,

    /// Format string; `None` picks the preset for the selected count.
    pub format: Option<String>,

    /// Keep only the first occurrence of each output line.
    pub dedupe: bool,

    /// 1-based position within `columns` to order by; `None` orders by the
    /// output line itself.
    pub sort_by: Option<usize>,
}

impl Default for TemplateSpec {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            format: None,
            dedupe: true,
            sort_by: None,
        }
    }
}

/// Preset format for `count` selected columns. Counts beyond the largest
/// preset use the largest one.
pub fn preset_template(count: usize) -> &'static str {
    let index = count.clamp(1, constants::PRESET_TEMPLATES.len()) - 1;
    constants::PRESET_TEMPLATES[index]
}

/// Remove placeholders that refer past the selected columns.
pub fn truncate_format(format: &str, max_columns: usize) -> String {
    let mut out = format.to_string();
    for k in (max_columns + 1)..=constants::MAX_TEMPLATE_PLACEHOLDER {
        out = out.replace(&format!("[{k}]"), "");
    }
    out
}

/// Strip a leading `http://`/`https://` and anything from the first `/`.
pub fn clean_address(value: &str) -> String {
    let stripped = scheme_prefix_re().replace(value.trim(), "");
    match stripped.split_once('/') {
        Some((head, _)) => head.to_string(),
        None => stripped.into_owned(),
    }
}

/// Substitute `[k]` with the k-th value in a single pass, so a value that
/// itself contains `[k]` text is never substituted again. Placeholders with
/// no matching value are left as written.
pub fn render_template(format: &str, values: &[String]) -> String {
    placeholder_re()
        .replace_all(format, |caps: &regex::Captures<'_>| {
            let whole = caps[0].to_string();
            caps[1]
                .parse::<usize>()
                .ok()
                .filter(|k| (1..=values.len()).contains(k))
                .map_or(whole, |k| values[k - 1].clone())
        })
        .into_owned()
}

/// Resolve 1-based column requests against `source`.
///
/// Indices outside the source are ignored. Returns 0-based indices.
pub fn select_columns(source: &RowSource, requested: &[usize]) -> Result<Vec<usize>, TemplateError> {
    let available = source.column_count();
    let selected: Vec<usize> = requested
        .iter()
        .filter(|&&i| (1..=available).contains(&i))
        .map(|&i| i - 1)
        .collect();

    if selected.len() < requested.len() {
        tracing::warn!(
            requested = ?requested,
            available,
            "Ignoring column indices outside the source"
        );
    }

    if selected.is_empty() {
        return Err(TemplateError::NoColumnsSelected {
            requested: requested.to_vec(),
            available,
        });
    }
    Ok(selected)
}

fn is_address_header(header: &str) -> bool {
    header.to_lowercase().contains("ip")
}

/// Render every row of `source` through `spec`.
pub fn apply_template(source: &RowSource, spec: &TemplateSpec) -> Result<Vec<String>, TemplateError> {
    let selected = select_columns(source, &spec.columns)?;

    let format = match &spec.format {
        Some(custom) if custom.trim().is_empty() => return Err(TemplateError::EmptyFormat),
        Some(custom) => truncate_format(custom.trim(), selected.len()),
        None => preset_template(selected.len()).to_string(),
    };

    if let Some(index) = spec.sort_by {
        if !(1..=selected.len()).contains(&index) {
            return Err(TemplateError::SortColumnOutOfRange {
                index,
                selected: selected.len(),
            });
        }
    }

    let cleaned: Vec<bool> = selected
        .iter()
        .map(|&i| is_address_header(&source.headers[i]))
        .collect();

    tracing::debug!(
        columns = ?selected.iter().map(|&i| &source.headers[i]).collect::<Vec<_>>(),
        format = %format,
        dedupe = spec.dedupe,
        sort_by = ?spec.sort_by,
        "Applying template"
    );

    let records = source.rows.iter().map(|row| {
        let values: Vec<String> = selected
            .iter()
            .zip(&cleaned)
            .map(|(&i, &clean)| {
                let value = row.get(i).map(|v| v.trim()).unwrap_or("");
                if clean {
                    clean_address(value)
                } else {
                    value.to_string()
                }
            })
            .collect();
        let output = render_template(&format, &values);
        let key = match spec.sort_by {
            Some(index) => SortKey::from_value(&values[index - 1]),
            None => SortKey::Text(output.clone()),
        };
        KeyedRecord { output, key }
    });

    Ok(dedup_and_sort_keyed(records, spec.dedupe))
}
