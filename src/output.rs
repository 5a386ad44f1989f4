use std::io::Write;
use std::path::PathBuf;

use crate::config::OutputFormats;
use crate::error::ReportError;
use crate::stats::{EndpointStats, RunStats};

/// Renders an optional average. Missing data shows as `NaN`.
pub fn format_avg(avg: Option<f64>) -> String {
    match avg {
        Some(value) => format!("{}", value),
        None => "NaN".to_string(),
    }
}

pub fn total_line(stats: &RunStats) -> String {
    format!("total avg roundtrip time: {}", format_avg(stats.global_avg))
}

pub fn failure_note(endpoint: &EndpointStats) -> Option<String> {
    endpoint
        .has_failures()
        .then(|| format!("cannot reach {} times", endpoint.failures))
}

pub fn address_line(endpoint: &EndpointStats) -> String {
    match failure_note(endpoint) {
        Some(note) => format!("address: {} ({})", endpoint.endpoint, note),
        None => format!("address: {}", endpoint.endpoint),
    }
}

pub fn roundtrip_line(endpoint: &EndpointStats) -> String {
    format!("roundtrip time: {}", format_avg(endpoint.avg_rtt))
}

/// Plain text report, shared by the console and `.txt` outputs.
pub fn render_text(stats: &RunStats) -> String {
    let mut out = format!("{}\n", total_line(stats));
    for endpoint in &stats.endpoints {
        out.push_str(&format!(
            "\n{}\n{}\n",
            address_line(endpoint),
            roundtrip_line(endpoint)
        ));
    }
    out
}

pub fn render_xml(stats: &RunStats) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<ping>\n");
    out.push_str(&format!("  <totalAvg>{}</totalAvg>\n", escape(&total_line(stats))));
    out.push_str("  <results>\n");
    for endpoint in &stats.endpoints {
        out.push_str("    <result>\n");
        if let Some(note) = failure_note(endpoint) {
            out.push_str(&format!("      <note>{}</note>\n", note));
        }
        out.push_str(&format!("      <address>{}</address>\n", escape(&endpoint.endpoint)));
        out.push_str(&format!(
            "      <roundtripTime>{}</roundtripTime>\n",
            format_avg(endpoint.avg_rtt)
        ));
        out.push_str("    </result>\n");
    }
    out.push_str("  </results>\n</ping>\n");
    out
}

pub fn render_html(stats: &RunStats) -> String {
    let mut out = format!("<html>\n<body>\n{}<br><br>\n", escape(&total_line(stats)));
    for endpoint in &stats.endpoints {
        out.push_str(&format!("<div>{}</div>\n", escape(&address_line(endpoint))));
        out.push_str(&format!("<div>{}</div><br>\n", escape(&roundtrip_line(endpoint))));
    }
    out.push_str("</body>\n</html>\n");
    out
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Writes every enabled report. Files are truncated and rewritten. Returns the
/// paths of the files written.
pub fn write_reports(
    stats: &RunStats,
    formats: OutputFormats,
    output_name: &str,
    console: &mut impl Write,
) -> Result<Vec<PathBuf>, ReportError> {
    let mut written = Vec::new();

    if formats.contains(OutputFormats::CONSOLE) {
        console.write_all(render_text(stats).as_bytes())?;
        console.flush()?;
    }

    let files: [(OutputFormats, &str, fn(&RunStats) -> String); 3] = [
        (OutputFormats::TXT, "txt", render_text),
        (OutputFormats::XML, "xml", render_xml),
        (OutputFormats::HTML, "html", render_html),
    ];

    for (format, extension, render) in files {
        if !formats.contains(format) {
            continue;
        }
        let path = PathBuf::from(format!("{}.{}", output_name, extension));
        std::fs::write(&path, render(stats)).map_err(|source| ReportError::Write {
            path: path.display().to_string(),
            source,
        })?;
        log::info!("wrote {}", path.display());
        written.push(path);
    }

    Ok(written)
}
