//! 文本报告

use super::analyzer::Analysis;
use crate::event::{ActionKind, EventKind};
use std::fmt::Write;

const RULE: &str = "============================================================";
const THIN: &str = "------------------------------------------------------------";

fn kind_label(kind: EventKind) -> &'static str {
    match kind {
        EventKind::Snapshot => "Snapshot (DOM tree with node IDs)",
        EventKind::Interaction => "Interaction (user input)",
        EventKind::Meta => "Meta (page metadata)",
        EventKind::Custom => "Custom (application events)",
    }
}

impl Analysis {
    /// 人读的分析报告
    pub fn render_report(&self) -> String {
        let mut out = String::new();
        // 写入 String 不会失败
        let _ = self.write_report(&mut out);
        out
    }

    fn write_report(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, "{RULE}")?;
        writeln!(out, "RECORDING ANALYSIS")?;
        writeln!(out, "{RULE}")?;

        writeln!(out, "\n1. EVENT TYPE SUMMARY")?;
        writeln!(out, "{THIN}")?;
        for (kind, count) in &self.event_counts {
            writeln!(
                out,
                "   Type {} - {}: {count} events",
                kind.code(),
                kind_label(*kind)
            )?;
        }

        writeln!(out, "\n2. INTERACTIONS")?;
        writeln!(out, "{THIN}")?;
        for action in ActionKind::ALL {
            writeln!(out, "   {action}: {}", self.total(action))?;
        }
        writeln!(out, "   dropped (unknown node): {}", self.dropped_count)?;

        if !self.custom_tags.is_empty() {
            writeln!(out, "\n3. CUSTOM EVENTS")?;
            writeln!(out, "{THIN}")?;
            for (tag, count) in &self.custom_tags {
                writeln!(out, "   {tag}: {count}")?;
            }
        }

        writeln!(out, "\n4. COMPONENTS")?;
        writeln!(out, "{THIN}")?;
        writeln!(
            out,
            "   {:<28} {:>6} {:>6} {:>6} {:>6} {:>10} {:>10}",
            "component", "moves", "clicks", "scroll", "other", "first_ms", "last_ms"
        )?;
        for (name, s) in &self.summary {
            writeln!(
                out,
                "   {:<28} {:>6} {:>6} {:>6} {:>6} {:>10} {:>10}",
                name,
                s.pointer_moves,
                s.clicks,
                s.scrolls,
                s.pointer_interactions,
                s.first_seen.map_or(0, |t| t.0),
                s.last_seen.map_or(0, |t| t.0),
            )?;
        }
        writeln!(out, "{RULE}")
    }
}
