//! Per-host history fragments
//!
//! Renders the results one host produced for one action as a display fragment.
//! Output is agent-supplied and untrusted, so it is escaped before it is
//! embedded; the fragment never carries raw output.

use crate::actions::{Action, ActionResult, HostId};
use crate::constants::labels;

/// Renders history fragments for any action type
#[derive(Debug, Clone, Copy, Default)]
pub struct HistoryFormatter;

impl HistoryFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Fragment for `host_id`, empty when the host has not reported yet
    pub fn format_history(&self, action: &Action, results: &[ActionResult], host_id: HostId) -> String {
        let mut fragment = String::new();
        for result in results
            .iter()
            .filter(|r| Some(r.action_id) == action.id && r.host_id == host_id)
        {
            fragment.push_str(labels::HISTORY_RESULTS);
            fragment.push_str("<br/><pre>");
            fragment.push_str(&escape_output(&result.output));
            fragment.push_str("</pre>");
        }
        fragment
    }
}

/// Neutralizes markup and control sequences in raw agent output
pub fn escape_output(raw: &str) -> String {
    let visible: String = raw
        .chars()
        .map(|c| {
            if c.is_control() && !matches!(c, '\n' | '\r' | '\t') {
                '\u{FFFD}'
            } else {
                c
            }
        })
        .collect();
    html_escape::encode_safe(&visible).into_owned()
}
