//! Risk report rendering
//!
//! Gantree: L4_Integration → Reporter
//!
//! Markdown, JSON, CSV and plain-text views of a [`RiskReport`].

use crate::pipeline::RiskReport;
use std::fmt::{self, Write};

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Markdown tables
    Markdown,
    /// JSON
    Json,
    /// CSV of the precision sweep
    Csv,
    /// Plain text summary
    Text,
}

/// Risk report renderer
/// Gantree: Reporter // 결과 리포팅
pub struct Reporter;

impl Reporter {
    // ========================================================================
    // Format Converters
    // ========================================================================

    /// Render in the requested format
    pub fn report(report: &RiskReport, format: ReportFormat) -> String {
        match format {
            ReportFormat::Markdown => Self::to_markdown(report),
            ReportFormat::Json => Self::to_json(report),
            ReportFormat::Csv => Self::to_csv(report),
            ReportFormat::Text => Self::to_text(report),
        }
    }

    /// Markdown with summary, comparison, resources and sweep sections
    pub fn to_markdown(report: &RiskReport) -> String {
        let mut output = String::new();
        let _ = write_markdown(&mut output, report);
        output
    }

    /// Pretty JSON of the whole report
    pub fn to_json(report: &RiskReport) -> String {
        report.to_json().unwrap_or_else(|_| "{}".to_string())
    }

    /// Precision sweep as CSV
    pub fn to_csv(report: &RiskReport) -> String {
        let mut output = String::new();
        let _ = write_csv(&mut output, report);
        output
    }

    /// Plain text summary
    pub fn to_text(report: &RiskReport) -> String {
        let mut output = String::new();
        let _ = write_text(&mut output, report);
        output
    }
}

// ============================================================================
// Writers
// ============================================================================

fn write_markdown(out: &mut String, r: &RiskReport) -> fmt::Result {
    let q = &r.quantum;
    writeln!(out, "# QARE Tail-Risk Report\n")?;

    writeln!(out, "## Parameters\n")?;
    writeln!(out, "- **Loss model**: {}", r.parameters)?;
    writeln!(out, "- **Schedule**: {}", r.schedule)?;
    writeln!(out, "- **Total Time**: {:.2}s\n", r.total_time_ms as f64 / 1000.0)?;

    writeln!(out, "## Estimates\n")?;
    writeln!(out, "| Method | Estimate | Error |")?;
    writeln!(out, "|--------|----------|-------|")?;
    writeln!(
        out,
        "| QAE (mean) | {:.6} | {:.6} |",
        q.mean_amplitude_estimate, q.total_error
    )?;
    writeln!(out, "| QAE (mode) | {:.6} | - |", q.mode_amplitude_estimate)?;
    writeln!(out, "| QAE (circular) | {:.6} | - |", q.circular_amplitude)?;
    writeln!(out, "| Analytic (table) | {:.6} | 0 |", r.analytic_probability)?;
    writeln!(
        out,
        "| Analytic (continuous) | {:.6} | - |",
        r.continuous_probability
    )?;
    writeln!(
        out,
        "| Monte Carlo (N={}) | {:.6} | {:.6} |\n",
        r.monte_carlo.samples, r.monte_carlo.estimate, r.monte_carlo.std_error
    )?;
    writeln!(
        out,
        "- **Difference**: {:+.6} (within error: {})",
        r.difference,
        r.within_error(1.0)
    )?;
    writeln!(
        out,
        "- **Error budget**: sampling {:.6}, discretization {:.6}",
        q.standard_error, q.discretization_error
    )?;
    if q.short_circuited {
        writeln!(out, "- **Short-circuited**: tail is exactly {}", q.mean_amplitude_estimate)?;
    }
    writeln!(out)?;

    writeln!(out, "## Resources\n")?;
    writeln!(out, "| Metric | Value |")?;
    writeln!(out, "|--------|-------|")?;
    let m = &r.resources;
    writeln!(out, "| Logical qubits | {} |", m.logical_qubits)?;
    writeln!(out, "| State vector length | {} |", m.state_vector_len)?;
    writeln!(out, "| Grover applications / shot | {} |", m.grover_applications)?;
    writeln!(out, "| Gates | {} |", m.gate_count)?;
    writeln!(out, "| Depth | {} |", m.depth)?;
    writeln!(out, "| Max controls | {} |", m.max_controls)?;
    writeln!(out, "| Oracle | {} |\n", m.oracle_strategy)?;

    if !r.precision_sweep.is_empty() {
        writeln!(out, "## Precision Sweep\n")?;
        writeln!(out, "| ε | Classical samples | Quantum queries | Ratio | MC |")?;
        writeln!(out, "|---|-------------------|-----------------|-------|----|")?;
        for point in &r.precision_sweep {
            let mc = point
                .monte_carlo
                .map(|mc| format!("{:.6}", mc.estimate))
                .unwrap_or_else(|| "-".to_string());
            writeln!(
                out,
                "| {} | {} | {} | {:.1} | {} |",
                point.target,
                point.classical_samples,
                point.quantum_queries,
                point.advantage_ratio(),
                mc
            )?;
        }
        writeln!(out)?;
    }

    if let Some(sanity) = &r.sanity {
        writeln!(out, "## Sanity Check\n")?;
        writeln!(
            out,
            "- Mark-everything circuit decoded to {:.6}\n",
            sanity.mean_amplitude_estimate
        )?;
    }

    if let Some(ensemble) = &r.ensemble {
        writeln!(out, "## Ensemble\n")?;
        writeln!(out, "- **Runs**: {}", ensemble.runs)?;
        writeln!(
            out,
            "- **Mean**: {:.6} ± {:.6}",
            ensemble.mean_estimate, ensemble.std_error
        )?;
        writeln!(out, "- **Spread**: {:.6}", ensemble.std_deviation)?;
        writeln!(
            out,
            "- **Calibration**: {:.2}",
            ensemble.calibration_ratio()
        )?;
    }
    Ok(())
}

fn write_csv(out: &mut String, r: &RiskReport) -> fmt::Result {
    writeln!(
        out,
        "target,classical_samples,quantum_queries,advantage_ratio,monte_carlo"
    )?;
    for point in &r.precision_sweep {
        let mc = point
            .monte_carlo
            .map(|mc| mc.estimate.to_string())
            .unwrap_or_default();
        writeln!(
            out,
            "{},{},{},{},{}",
            point.target,
            point.classical_samples,
            point.quantum_queries,
            point.advantage_ratio(),
            mc
        )?;
    }
    Ok(())
}

fn write_text(out: &mut String, r: &RiskReport) -> fmt::Result {
    let q = &r.quantum;
    writeln!(out, "QARE Tail-Risk Report")?;
    writeln!(out, "=====================\n")?;

    writeln!(out, "Parameters:")?;
    writeln!(out, "  {}", r.parameters)?;
    writeln!(out, "  {}\n", r.schedule)?;

    writeln!(out, "Estimates:")?;
    writeln!(
        out,
        "  QAE:          {:.6} ± {:.6} (mode {:.6})",
        q.mean_amplitude_estimate, q.total_error, q.mode_amplitude_estimate
    )?;
    writeln!(out, "  Analytic:     {:.6}", r.analytic_probability)?;
    writeln!(out, "  Continuous:   {:.6}", r.continuous_probability)?;
    writeln!(out, "  Monte Carlo:  {}", r.monte_carlo)?;
    writeln!(out, "  Difference:   {:+.6}\n", r.difference)?;

    writeln!(
        out,
        "Resources: {} qubits, {} amplitudes, {} Grover applications per shot",
        r.resources.logical_qubits, r.resources.state_vector_len, r.resources.grover_applications
    )?;
    if let Some(ensemble) = &r.ensemble {
        writeln!(out, "{}", ensemble)?;
    }
    writeln!(out, "Total time: {}ms", r.total_time_ms)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QareConfig;
    use crate::pipeline::RiskPipeline;

    fn make_report() -> RiskReport {
        let config = QareConfig::quick()
            .with_repetitions(8)
            .with_seed(5)
            .with_sanity_check(false);
        RiskPipeline::new(config).run().unwrap()
    }

    #[test]
    fn test_to_markdown() {
        let md = Reporter::to_markdown(&make_report());
        assert!(md.contains("# QARE Tail-Risk Report"));
        assert!(md.contains("| QAE (mean) |"));
        assert!(md.contains("## Precision Sweep"));
        assert!(md.contains("| Logical qubits | 8 |"));
        assert!(!md.contains("## Ensemble"));
    }

    #[test]
    fn test_to_json() {
        let json = Reporter::to_json(&make_report());
        assert!(json.contains("\"quantum\""));
        assert!(json.contains("\"analytic_probability\""));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["resources"]["logical_qubits"], 8);
    }

    #[test]
    fn test_to_csv() {
        let csv = Reporter::to_csv(&make_report());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("target,classical_samples"));
        assert!(lines[1].starts_with("0.1,"));
    }

    #[test]
    fn test_to_text() {
        let text = Reporter::to_text(&make_report());
        assert!(text.contains("QARE Tail-Risk Report"));
        assert!(text.contains("Monte Carlo:"));
        assert!(text.contains("Total time:"));
    }

    #[test]
    fn test_report_format() {
        let report = make_report();
        assert!(Reporter::report(&report, ReportFormat::Markdown).contains("# QARE"));
        assert!(Reporter::report(&report, ReportFormat::Json).starts_with('{'));
        assert!(Reporter::report(&report, ReportFormat::Csv).contains(','));
        assert!(Reporter::report(&report, ReportFormat::Text).contains("Estimates:"));
    }
}
