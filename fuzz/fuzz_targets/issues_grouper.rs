#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use bright_core::types::{Issue, Severity};
use bright_reporter::{CheckRunBuilder, IssuesGrouper, MAX_ANNOTATIONS};

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    issues: Vec<FuzzIssue>,
    head_sha: String,
    fail_on: FuzzSeverity,
}

#[derive(Arbitrary, Debug)]
struct FuzzIssue {
    severity: FuzzSeverity,
    name: String,
    url: String,
}

#[derive(Arbitrary, Debug, Clone, Copy)]
enum FuzzSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl From<FuzzSeverity> for Severity {
    fn from(value: FuzzSeverity) -> Self {
        match value {
            FuzzSeverity::Low => Severity::Low,
            FuzzSeverity::Medium => Severity::Medium,
            FuzzSeverity::High => Severity::High,
            FuzzSeverity::Critical => Severity::Critical,
        }
    }
}

fuzz_target!(|input: FuzzInput| {
    let issues: Vec<Issue> = input
        .issues
        .iter()
        .enumerate()
        .map(|(i, f)| Issue::new(i.to_string(), f.severity.into(), f.name.clone(), f.url.clone()))
        .collect();

    let groups = IssuesGrouper::group(issues.clone());
    let grouped: usize = groups.iter().map(|g| g.issues.len()).sum();
    assert_eq!(grouped, issues.len());

    for pair in groups.windows(2) {
        assert!(pair[0].severity >= pair[1].severity);
    }

    // 빈 SHA는 에러가 되어야 하며 패닉하면 안 됨
    if let Ok(payload) = CheckRunBuilder::new()
        .head_sha(input.head_sha)
        .fail_on(input.fail_on.into())
        .build(&issues)
    {
        assert!(payload.output.annotations.len() <= MAX_ANNOTATIONS);
    }
});
