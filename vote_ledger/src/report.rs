use crate::config::*;

/// How a report is laid out.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub enum ReportStyle {
    /// Wrapped in `<html>` with `<br>` line breaks, for rich text displays.
    #[default]
    Markup,
    /// One entry per line, for terminals and logs.
    PlainText,
}

impl ReportStyle {
    fn open(&self) -> &'static str {
        match self {
            ReportStyle::Markup => "<html>",
            ReportStyle::PlainText => "",
        }
    }

    fn close(&self) -> &'static str {
        match self {
            ReportStyle::Markup => "</html>",
            ReportStyle::PlainText => "",
        }
    }

    fn line_break(&self) -> &'static str {
        match self {
            ReportStyle::Markup => "<br>",
            ReportStyle::PlainText => "\n",
        }
    }
}

/// Renders a snapshot as a human-readable report.
///
/// The content is, in order:
/// - one line per candidate with the total number of votes
/// - the age demographics, always with the three brackets
/// - one line per state with the total number of votes cast in this state
pub fn render_snapshot(snapshot: &LedgerSnapshot, style: ReportStyle) -> String {
    let br = style.line_break();
    let mut res = String::from(style.open());

    for (candidate, total) in snapshot.candidate_totals.iter() {
        res.push_str(&format!(
            "Candidate: {}, Total number of votes: {}{}",
            candidate, total, br
        ));
    }

    res.push_str(&format!("Age demographics:{}", br));
    for bracket in AgeBracket::ALL {
        res.push_str(&format!(
            "{}: {}{}",
            bracket.label(),
            snapshot.age_demographics.count(bracket),
            br
        ));
    }

    res.push_str(&format!("Votes by state:{}", br));
    for (state, tally) in snapshot.state_totals.iter() {
        let total: u64 = tally.iter().map(|(_, c)| *c).sum();
        let name = if state.is_empty() {
            UNDETERMINED_STATE
        } else {
            state.as_str()
        };
        res.push_str(&format!("State: {}, Total votes: {}{}", name, total, br));
    }

    res.push_str(style.close());
    res
}
