//! Prometheus text exposition format, version 0.0.4.

use crate::metrics::family::{MetricFamily, Sample};

pub const TEXT_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

fn sample_line(name: &str, s: &Sample) -> String {
    if s.labels.is_empty() {
        return format!("{} {}", name, s.value);
    }
    let label_str = s
        .labels
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect::<Vec<_>>()
        .join(",");
    format!("{}{{{}}} {}", name, label_str, s.value)
}

fn family_lines(f: &MetricFamily) -> impl Iterator<Item = String> + '_ {
    let header = [
        format!("# HELP {} {}", f.name, escape_help(&f.help)),
        format!("# TYPE {} {}", f.name, f.kind.as_str()),
    ];
    header
        .into_iter()
        .chain(f.samples.iter().map(move |s| sample_line(&f.name, s)))
}

/// Lines of the exposition, blocks separated by one empty line.
pub fn lines(families: &[MetricFamily]) -> impl Iterator<Item = String> + '_ {
    families.iter().enumerate().flat_map(|(i, f)| {
        let sep = (i > 0).then(String::new);
        sep.into_iter().chain(family_lines(f))
    })
}

/// Full exposition body; ends with a newline unless empty.
pub fn encode(families: &[MetricFamily]) -> String {
    let mut out = String::new();
    for line in lines(families) {
        out.push_str(&line);
        out.push('\n');
    }
    out
}
