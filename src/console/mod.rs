use std::fmt::Write;

use unicode_truncate::UnicodeTruncateStr;

use crate::http_probe::prelude::*;

fn to_fixed_width(input: &str, width: usize) -> String {
    let (truncated, _) = input.unicode_truncate(width);
    format!("{:<width$}", truncated, width = width)
}

/// Width of the variant name column for a set of results.
pub fn name_width(results: &[ProbeResult]) -> usize {
    results
        .iter()
        .map(|r| r.variant_name.len())
        .max()
        .unwrap_or(10)
}

/// Render one result as a text block. The body preview is only shown for
/// error statuses.
pub fn render(result: &ProbeResult, name_width: usize) -> String {
    let mut out = format!(
        "[{}] {}\n",
        to_fixed_width(&result.variant_name, name_width),
        result.requested_url
    );

    match &result.outcome {
        ProbeOutcome::Success {
            status_code,
            headers,
            body_preview,
        } => {
            let _ = writeln!(
                out,
                "    Status: {} ({:.2}ms)",
                status_code,
                result.elapsed.as_secs_f64() * 1000.0
            );
            let headers = headers
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; ");
            let _ = writeln!(out, "    Headers: {headers}");
            if *status_code >= 400 {
                let _ = writeln!(out, "    Error content: {body_preview}");
            }
        }
        ProbeOutcome::TransportFailure { message } => {
            let _ = writeln!(out, "    Exception: {message}");
        }
    }

    out
}
