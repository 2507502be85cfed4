use gtdiag_health::{Report, ReportItem};

const WIDTH: usize = 72;
pub const TITLE: &str = "GalaxyTrader MK3 Bug Report";
pub const END_MARKER: &str = "--- END OF REPORT ---";

/// Plain-text rendering, numbered sections, one check per line.
pub fn render_text(report: &Report) -> String {
    let heavy = "=".repeat(WIDTH);
    let light = "-".repeat(WIDTH);
    let mut out = String::new();

    out.push_str(&format!("{heavy}\n  {TITLE}\n"));
    out.push_str(&format!("  Overall status: {}\n{heavy}\n", report.worst()));

    for (i, section) in report.sections.iter().enumerate() {
        out.push_str(&format!("\n{light}\n  {}. {}\n{light}\n", i + 1, section.title));
        for item in &section.items {
            match item {
                ReportItem::Line(text) | ReportItem::Detail(text) => {
                    out.push_str(text);
                    out.push('\n');
                }
                ReportItem::Check(c) => {
                    out.push_str(&format!("  [{}] {}\n", c.status, c.message));
                }
            }
        }
    }

    out.push_str(&format!("\n{END_MARKER}\n"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use gtdiag_health::{CheckResult, Section, Status};

    #[test]
    fn numbers_sections_and_tags_checks() {
        let mut report = Report::new();
        let mut a = Section::new("First");
        a.line("  hello");
        report.push(a);
        let mut b = Section::new("Second");
        b.check(CheckResult::new("x", Status::Warn, "something odd"))
            .detail("      ABC-123: 4x");
        report.push(b);

        let text = render_text(&report);
        assert!(text.contains("  1. First\n"));
        assert!(text.contains("  2. Second\n"));
        assert!(text.contains("  [WARN] something odd\n"));
        assert!(text.contains("      ABC-123: 4x\n"));
        assert!(text.contains("Overall status: WARN"));
        assert!(text.trim_end().ends_with(END_MARKER));
    }
}
