//! Workload results.

use serde::Serialize;

use crate::app::CfApp;

/// Errors kept per app. The rest are only counted.
pub const MAX_RECORDED_ERRORS: usize = 5;

/// Workload outcome for one target app.
#[derive(Debug, Clone, Serialize)]
pub struct AppReport {
    pub app: String,
    pub route: String,
    /// Requests issued before the worker stopped.
    pub requests: u32,
    pub succeeded: u32,
    pub failed: u32,
    /// Probe counters, liveness check included.
    pub attempted_curls: u32,
    pub failed_curls: u32,
    /// Stopped on the first failure.
    pub aborted: bool,
    pub errors: Vec<String>,
}

impl AppReport {
    pub fn new(app: &CfApp) -> Self {
        Self {
            app: app.name().to_string(),
            route: app.route().to_string(),
            requests: 0,
            succeeded: 0,
            failed: 0,
            attempted_curls: app.attempted_curls(),
            failed_curls: app.failed_curls(),
            aborted: false,
            errors: Vec::new(),
        }
    }

    pub fn record_success(&mut self) {
        self.requests += 1;
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self, error: String) {
        self.requests += 1;
        self.failed += 1;
        if self.errors.len() < MAX_RECORDED_ERRORS {
            self.errors.push(error);
        }
    }

    /// Copy the app's probe counters into the report.
    pub fn sync_counters(&mut self, app: &CfApp) {
        self.attempted_curls = app.attempted_curls();
        self.failed_curls = app.failed_curls();
    }
}

/// Outcome of a full run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub domain: String,
    pub master: String,
    pub apps: Vec<AppReport>,
    pub elapsed_ms: u64,
}

impl RunReport {
    pub fn total_succeeded(&self) -> u32 {
        self.apps.iter().map(|a| a.succeeded).sum()
    }

    pub fn total_failed(&self) -> u32 {
        self.apps.iter().map(|a| a.failed).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.total_failed() == 0
    }
}

/// Plain-text rendering of a run for the terminal.
pub fn format_report(report: &RunReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "cedar run against {} (master {}), {} ms\n",
        report.domain, report.master, report.elapsed_ms
    ));
    for app in &report.apps {
        out.push_str(&format!(
            "  {:<24} {:>6} ok {:>6} failed  curls {}/{} failed{}\n",
            app.app,
            app.succeeded,
            app.failed,
            app.failed_curls,
            app.attempted_curls,
            if app.aborted { "  (aborted)" } else { "" },
        ));
        for err in &app.errors {
            out.push_str(&format!("    - {err}\n"));
        }
    }
    out.push_str(&format!(
        "total: {} succeeded, {} failed\n",
        report.total_succeeded(),
        report.total_failed()
    ));
    out
}

#[cfg(test)]
mod tests {
    use cedar_probe::RetryPolicy;

    use super::*;

    fn report_for(name: &str) -> AppReport {
        AppReport::new(&CfApp::new(name, "example.com", 3, RetryPolicy::default()))
    }

    #[test]
    fn records_are_counted() {
        let mut report = report_for("worker-1");
        report.record_success();
        report.record_failure("boom".to_string());
        report.record_success();

        assert_eq!(report.requests, 3);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.errors, vec!["boom"]);
        assert_eq!(report.route, "http://worker-1.example.com");
    }

    #[test]
    fn error_list_is_capped() {
        let mut report = report_for("worker-1");
        for i in 0..(MAX_RECORDED_ERRORS + 3) {
            report.record_failure(format!("err {i}"));
        }
        assert_eq!(report.errors.len(), MAX_RECORDED_ERRORS);
        assert_eq!(report.failed as usize, MAX_RECORDED_ERRORS + 3);
    }

    #[test]
    fn totals_and_text_output() {
        let mut a = report_for("worker-1");
        a.record_success();
        let mut b = report_for("worker-2");
        b.record_failure("Endpoint: x, Status Code: 500, Body: y".to_string());
        b.aborted = true;

        let run = RunReport {
            domain: "example.com".to_string(),
            master: "master".to_string(),
            apps: vec![a, b],
            elapsed_ms: 12,
        };
        assert_eq!(run.total_succeeded(), 1);
        assert_eq!(run.total_failed(), 1);
        assert!(!run.is_clean());

        let text = format_report(&run);
        assert!(text.contains("worker-2"));
        assert!(text.contains("(aborted)"));
        assert!(text.contains("Status Code: 500"));
        assert!(text.ends_with("total: 1 succeeded, 1 failed\n"));
    }
}
