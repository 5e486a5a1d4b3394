//! 이슈 그룹핑
//!
//! 같은 `(severity, name)`을 가진 이슈를 한 그룹으로 묶습니다.
//! 그룹 순서는 심각도 내림차순, 같은 심각도에서는 이슈 수 내림차순이며
//! 둘 다 같으면 처음 발견된 순서를 유지합니다.

use bright_core::types::{Issue, IssuesGroup, severity_comparator};

/// 이슈 그룹핑
pub struct IssuesGrouper;

impl IssuesGrouper {
    /// 이슈를 그룹으로 묶고 정렬합니다.
    ///
    /// 그룹 탐색은 선형 검색이며 그룹 안의 이슈는 도착 순서를 유지합니다.
    pub fn group(issues: impl IntoIterator<Item = Issue>) -> Vec<IssuesGroup> {
        let mut groups: Vec<IssuesGroup> = Vec::new();

        for issue in issues {
            match groups.iter_mut().find(|g| g.accepts(&issue)) {
                Some(group) => group.issues.push(issue),
                None => groups.push(IssuesGroup::new(issue)),
            }
        }

        // sort_by는 안정 정렬
        groups.sort_by(|a, b| {
            severity_comparator(&a.severity, &b.severity)
                .then_with(|| b.issues.len().cmp(&a.issues.len()))
        });
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bright_core::types::Severity;
    use proptest::prelude::*;

    fn issue(id: &str, severity: Severity, name: &str) -> Issue {
        Issue::new(id, severity, name, format!("https://target/{id}"))
    }

    fn ids(group: &IssuesGroup) -> Vec<&str> {
        group.issues.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn empty_input_gives_no_groups() {
        assert!(IssuesGrouper::group(Vec::new()).is_empty());
    }

    #[test]
    fn groups_by_severity_and_name() {
        let groups = IssuesGrouper::group(vec![
            issue("1", Severity::Low, "A"),
            issue("2", Severity::High, "A"),
            issue("3", Severity::Low, "A"),
            issue("4", Severity::Low, "B"),
        ]);

        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].severity, Severity::High);
        assert_eq!(ids(&groups[0]), vec!["2"]);
        assert_eq!(groups[1].name, "A");
        assert_eq!(ids(&groups[1]), vec!["1", "3"]);
        assert_eq!(groups[2].name, "B");
    }

    #[test]
    fn larger_groups_first_within_severity() {
        let groups = IssuesGrouper::group(vec![
            issue("1", Severity::Medium, "small"),
            issue("2", Severity::Medium, "big"),
            issue("3", Severity::Medium, "big"),
            issue("4", Severity::Critical, "rare"),
        ]);

        let names: Vec<_> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["rare", "big", "small"]);
    }

    #[test]
    fn equal_groups_keep_discovery_order() {
        let groups = IssuesGrouper::group(vec![
            issue("1", Severity::High, "first"),
            issue("2", Severity::High, "second"),
            issue("3", Severity::High, "third"),
        ]);

        let names: Vec<_> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    fn arb_severity() -> impl Strategy<Value = Severity> {
        prop_oneof![
            Just(Severity::Low),
            Just(Severity::Medium),
            Just(Severity::High),
            Just(Severity::Critical),
        ]
    }

    proptest! {
        #[test]
        fn grouping_preserves_every_issue(
            input in prop::collection::vec((arb_severity(), "[abc]"), 0..60)
        ) {
            let issues: Vec<Issue> = input
                .iter()
                .enumerate()
                .map(|(i, (sev, name))| issue(&i.to_string(), *sev, name))
                .collect();
            let groups = IssuesGrouper::group(issues.clone());

            let mut seen: Vec<String> = groups
                .iter()
                .flat_map(|g| g.issues.iter().map(|i| i.id.clone()))
                .collect();
            seen.sort();
            let mut expected: Vec<String> = issues.iter().map(|i| i.id.clone()).collect();
            expected.sort();
            prop_assert_eq!(seen, expected);

            for group in &groups {
                for member in &group.issues {
                    prop_assert_eq!(member.severity, group.severity);
                    prop_assert_eq!(&member.name, &group.name);
                }
            }
            for (i, a) in groups.iter().enumerate() {
                for b in &groups[i + 1..] {
                    prop_assert!(a.severity != b.severity || a.name != b.name);
                }
            }
        }

        #[test]
        fn groups_are_ordered(
            input in prop::collection::vec((arb_severity(), "[a-e]"), 0..60)
        ) {
            let issues: Vec<Issue> = input
                .iter()
                .enumerate()
                .map(|(i, (sev, name))| issue(&i.to_string(), *sev, name))
                .collect();
            let groups = IssuesGrouper::group(issues);

            for pair in groups.windows(2) {
                let (a, b) = (&pair[0], &pair[1]);
                prop_assert!(a.severity >= b.severity);
                if a.severity == b.severity {
                    prop_assert!(a.issues.len() >= b.issues.len());
                }
            }
        }

        #[test]
        fn members_keep_arrival_order(
            input in prop::collection::vec((arb_severity(), "[ab]"), 0..40)
        ) {
            let issues: Vec<Issue> = input
                .iter()
                .enumerate()
                .map(|(i, (sev, name))| issue(&format!("{i:03}"), *sev, name))
                .collect();
            for group in IssuesGrouper::group(issues) {
                let ids: Vec<&str> = group.issues.iter().map(|i| i.id.as_str()).collect();
                let mut sorted = ids.clone();
                sorted.sort();
                prop_assert_eq!(ids, sorted);
            }
        }
    }
}
