//! Email bodies for availability reports and operator alerts.

use chrono::{DateTime, Local};

use crate::error::ScoutError;
use crate::models::Feature;

pub const HEARTBEAT_SUBJECT: &str = "Weekly heartbeat: Parking script is working";
pub const NO_FREE_SPOTS_TEXT: &str = "No free spots at this time.";
const NO_FREE_SPOTS_ROW: &str = "<tr><td colspan='3'>No free spots</td></tr>";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Rendered subject plus HTML and plain-text bodies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

/// What the report is about
#[derive(Debug, Clone)]
pub struct ReportContext<'a> {
    pub facility_code: &'a str,
    pub site_label: &'a str,
    pub heartbeat: bool,
    pub checked_at: DateTime<Local>,
}

/// Render the availability report for the given free spots
pub fn render(free: &[&Feature], ctx: &ReportContext<'_>) -> Report {
    Report {
        subject: subject(free.len(), ctx),
        html_body: html_body(free, ctx),
        text_body: text_body(free),
    }
}

fn subject(free_count: usize, ctx: &ReportContext<'_>) -> String {
    match (ctx.heartbeat, free_count) {
        (true, 0) => HEARTBEAT_SUBJECT.to_string(),
        (true, n) => format!(
            "{HEARTBEAT_SUBJECT} - free spots ({}): {n}",
            ctx.facility_code
        ),
        (false, n) => format!(
            "IMPORTANT: LOC DE PARCARE LIBER IN {} ({}): {n}",
            ctx.site_label, ctx.facility_code
        ),
    }
}

fn html_body(free: &[&Feature], ctx: &ReportContext<'_>) -> String {
    let heading = if ctx.heartbeat {
        "Weekly heartbeat".to_string()
    } else {
        format!(
            "Free parking spots (cod_parcare={})",
            escape_html(ctx.facility_code)
        )
    };

    let rows = if free.is_empty() {
        NO_FREE_SPOTS_ROW.to_string()
    } else {
        free.iter()
            .map(|f| {
                format!(
                    "\n<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                    escape_html(&f.display_field("id")),
                    escape_html(&f.display_field("nr_loc_parcare")),
                    escape_html(&f.display_field("ocupat")),
                )
            })
            .collect()
    };

    format!(
        "<h2>{heading}</h2>\n\
         <p>Checked at: {}</p>\n\
         <table border=\"1\" cellpadding=\"6\" cellspacing=\"0\">\n\
         <thead><tr><th>ID</th><th>Nr Loc</th><th>Ocupat</th></tr></thead>\n\
         <tbody>{rows}</tbody>\n\
         </table>\n",
        ctx.checked_at.format(TIMESTAMP_FORMAT)
    )
}

fn text_body(free: &[&Feature]) -> String {
    if free.is_empty() {
        return NO_FREE_SPOTS_TEXT.to_string();
    }

    free.iter()
        .map(|f| {
            format!(
                "id={}, nr_loc={}, ocupat={}",
                f.display_field("id"),
                f.display_field("nr_loc_parcare"),
                f.display_field("ocupat")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Operator alert for a run that failed before anything was sent
pub fn render_failure(err: &ScoutError, site_label: &str, checked_at: DateTime<Local>) -> Report {
    let when = checked_at.format(TIMESTAMP_FORMAT);
    let mut text_body = format!("Parking check for {site_label} failed at {when}.\n\n{err}");
    let mut html_body = format!(
        "<h2>Parking script failed: {}</h2>\n<p>Checked at: {when}</p>\n<p>{}</p>\n",
        err.kind(),
        escape_html(&err.to_string())
    );

    if let Some(prefix) = err.body_prefix() {
        text_body.push_str(&format!("\n\nRaw response:\n{prefix}"));
        html_body.push_str(&format!("<pre>{}</pre>\n", escape_html(prefix)));
    }

    Report {
        subject: format!("Parking script failed: {}", err.kind()),
        html_body,
        text_body,
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn ctx(heartbeat: bool) -> ReportContext<'static> {
        ReportContext {
            facility_code: "9020",
            site_label: "VITAN",
            heartbeat,
            checked_at: Local.with_ymd_and_hms(2025, 3, 14, 8, 30, 0).unwrap(),
        }
    }

    fn spot(id: u32, nr: &str, ocupat: serde_json::Value) -> Feature {
        Feature::with_properties(json!({
            "id": id,
            "cod_parcare": "9020",
            "nr_loc_parcare": nr,
            "ocupat": ocupat
        }))
    }

    #[test]
    fn normal_report_lists_every_free_spot() {
        let a = spot(1, "A1", json!(0));
        let b = spot(12, "B4", json!("0"));
        let report = render(&[&a, &b], &ctx(false));

        assert_eq!(report.subject, "IMPORTANT: LOC DE PARCARE LIBER IN VITAN (9020): 2");
        assert_eq!(report.text_body, "id=1, nr_loc=A1, ocupat=0\nid=12, nr_loc=B4, ocupat=0");
        assert!(report.html_body.contains("<h2>Free parking spots (cod_parcare=9020)</h2>"));
        assert!(report.html_body.contains("<tr><td>1</td><td>A1</td><td>0</td></tr>"));
        assert!(report.html_body.contains("<tr><td>12</td><td>B4</td><td>0</td></tr>"));
        assert!(report.html_body.contains("Checked at: 2025-03-14 08:30:00"));
    }

    #[test]
    fn heartbeat_without_spots_uses_placeholders() {
        let report = render(&[], &ctx(true));

        assert_eq!(report.subject, HEARTBEAT_SUBJECT);
        assert_eq!(report.text_body, NO_FREE_SPOTS_TEXT);
        assert!(report.html_body.contains("<h2>Weekly heartbeat</h2>"));
        assert!(report.html_body.contains(NO_FREE_SPOTS_ROW));
    }

    #[test]
    fn heartbeat_with_spots_still_reports_the_count() {
        let a = spot(3, "C2", json!(0));
        let report = render(&[&a], &ctx(true));

        assert!(report.subject.starts_with(HEARTBEAT_SUBJECT));
        assert!(report.subject.ends_with(": 1"));
        assert_eq!(report.text_body, "id=3, nr_loc=C2, ocupat=0");
    }

    #[test]
    fn html_escapes_feed_values() {
        let a = spot(1, "<b>A&1</b>", json!(0));
        let report = render(&[&a], &ctx(false));

        assert!(report.html_body.contains("&lt;b&gt;A&amp;1&lt;/b&gt;"));
        assert!(report.text_body.contains("<b>A&1</b>"));
    }

    #[test]
    fn failure_report_carries_raw_prefix() {
        let source = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        let err = ScoutError::MalformedResponse {
            body_prefix: "<html>".to_string(),
            source,
        };
        let report = render_failure(&err, "VITAN", ctx(false).checked_at);

        assert_eq!(report.subject, "Parking script failed: MalformedResponse");
        assert!(report.text_body.contains("Raw response:\n<html>"));
        assert!(report.html_body.contains("<pre>&lt;html&gt;</pre>"));
    }

    #[test]
    fn failure_report_for_missing_features() {
        let err = ScoutError::MissingFeatures { found: "nothing" };
        let report = render_failure(&err, "VITAN", ctx(false).checked_at);

        assert_eq!(report.subject, "Parking script failed: MissingFeatures");
        assert!(report.text_body.contains("does not contain a features array"));
        assert!(!report.text_body.contains("Raw response"));
    }
}
