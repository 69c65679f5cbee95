use crate::error::Result;
use crate::sink::{write_atomic, ResultSink};
use crate::summary::Summary;
use arena_types::RunResult;
use async_trait::async_trait;
use std::fmt::Write as _;
use std::path::PathBuf;

/// Minimal self-contained HTML report. No client-side JS, no CSS framework
/// — out of scope per spec §1 ("HTML/Markdown/JUnit/JSON serialisation
/// templates" are external collaborators); this sink only has to produce
/// something real and atomic, not a polished viewer.
pub struct HtmlSink {
    path: PathBuf,
}

impl HtmlSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ResultSink for HtmlSink {
    fn name(&self) -> &'static str {
        "html"
    }

    async fn save(&self, results: &[RunResult], summary: &Summary) -> Result<()> {
        let mut out = String::new();
        let _ = writeln!(out, "<!doctype html><html><head><meta charset=\"utf-8\"><title>prompt-arena results</title></head><body>");
        let _ = writeln!(out, "<h1>prompt-arena results</h1>");
        let _ = writeln!(
            out,
            "<p>{} total, {} successful, {} errors, {} failed assertions</p>",
            summary.total_runs, summary.successful, summary.errors, summary.failed_assertions
        );
        let _ = writeln!(out, "<table border=\"1\"><tr><th>Run</th><th>Scenario</th><th>Provider</th><th>Status</th></tr>");
        for result in results {
            let _ = writeln!(
                out,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{:?}</td></tr>",
                html_escape(&result.run_id.to_string()),
                html_escape(result.scenario_id.as_str()),
                html_escape(result.provider_id.as_str()),
                result.status
            );
        }
        let _ = writeln!(out, "</table></body></html>");

        write_atomic(self.name(), &self.path, out.as_bytes()).await
    }
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
