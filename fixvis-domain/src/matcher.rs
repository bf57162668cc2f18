use fixvis_types::{AbortReason, BuildEvent, FixRecord};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Text Bazel embeds in every visibility violation it reports.
pub const VISIBILITY_ISSUE_SUBSTRING: &str = "is not visible from target";

static VISIBILITY_ISSUE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r".*target '(.*)' {VISIBILITY_ISSUE_SUBSTRING} '(.*)'.*"
    ))
    .expect("visibility issue pattern is valid")
});

/// Extract the fix implied by an analysis-failure event, if any.
///
/// Only `ANALYSIS_FAILURE` aborts whose description contains
/// [`VISIBILITY_ISSUE_SUBSTRING`] are considered.
pub fn match_visibility_issue(event: &BuildEvent) -> Option<FixRecord> {
    let aborted = event.get_aborted()?;
    if aborted.reason != AbortReason::AnalysisFailure {
        return None;
    }
    parse_visibility_issue(&aborted.description)
}

/// Extract `(to_fix, from)` from a diagnostic description.
///
/// The substring check gates the regex. A description that mentions the issue
/// but doesn't fit the pattern yields `None`.
pub fn parse_visibility_issue(description: &str) -> Option<FixRecord> {
    if !description.contains(VISIBILITY_ISSUE_SUBSTRING) {
        return None;
    }
    let Some(caps) = VISIBILITY_ISSUE_REGEX.captures(description) else {
        debug!("visibility diagnostic did not match the expected pattern");
        return None;
    };
    let from = caps.get(1)?.as_str();
    let to_fix = caps.get(2)?.as_str();
    Some(FixRecord::new(to_fix, from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DESCRIPTION: &str = "ERROR: in target '//a:a': target '//b:b' is not visible from target '//a:a', which needs dependency ...";

    #[test]
    fn extracts_from_and_to_fix() {
        let record = parse_visibility_issue(DESCRIPTION).expect("match");
        assert_eq!(record, FixRecord::new("//a:a", "//b:b"));
    }

    #[test]
    fn description_without_substring_yields_nothing() {
        assert_eq!(
            parse_visibility_issue("ERROR: in target '//a:a': no such package 'c'"),
            None
        );
    }

    #[test]
    fn substring_without_quotes_is_ignored() {
        let description = "target //b:b is not visible from target //a:a";
        assert_eq!(parse_visibility_issue(description), None);
    }

    #[test]
    fn only_analysis_failures_are_matched() {
        let analysis = BuildEvent::aborted(AbortReason::AnalysisFailure, DESCRIPTION);
        assert!(match_visibility_issue(&analysis).is_some());

        let loading = BuildEvent::aborted(AbortReason::LoadingFailure, DESCRIPTION);
        assert!(match_visibility_issue(&loading).is_none());

        assert!(match_visibility_issue(&BuildEvent::default()).is_none());
    }
}
