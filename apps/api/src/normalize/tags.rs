//! Keyword inference for employment type and tags.

use crate::models::job::{EmploymentType, GENERAL_TAG};

struct TagRule {
    tag: &'static str,
    keywords: &'static [&'static str],
}

const fn rule(tag: &'static str, keywords: &'static [&'static str]) -> TagRule {
    TagRule { tag, keywords }
}

/// Tag dictionary in output order. Keywords are literal lowercase
/// substrings, so short ones like "it" also hit inside longer words.
const TAG_RULES: &[TagRule] = &[
    // Role
    rule("Analysis", &["analyst"]),
    rule("Development", &["developer", "engineer"]),
    rule("Management", &["manager"]),
    rule("Planning", &["planner"]),
    rule("Systems", &["system"]),
    rule("Data", &["data"]),
    rule("Senior", &["senior"]),
    // Work mode
    rule("Remote", &["remote"]),
    rule("Part-time", &["part time"]),
    rule("Full-time", &["full time"]),
    rule("Temporary", &["temporary"]),
    rule("Permanent", &["permanent"]),
    // Domain
    rule("Government", &["government", "municipal", "city"]),
    rule("IT", &["it", "technology"]),
];

/// Employment type markers, highest priority first.
const TYPE_RULES: &[(&str, EmploymentType)] = &[
    ("part time", EmploymentType::PartTime),
    ("full time", EmploymentType::FullTime),
    ("temporary", EmploymentType::Temporary),
    ("permanent", EmploymentType::Permanent),
    ("contract", EmploymentType::Contract),
];

impl TagRule {
    fn matches(&self, text: &str) -> bool {
        self.keywords.iter().any(|kw| text.contains(kw))
    }
}

/// First matching marker in the description decides the type.
pub fn infer_employment_type(description: &str) -> EmploymentType {
    let text = description.to_lowercase();
    TYPE_RULES
        .iter()
        .find(|(marker, _)| text.contains(marker))
        .map(|(_, ty)| *ty)
        .unwrap_or(EmploymentType::Unknown)
}

/// All tags whose keywords appear in title or description, in dictionary
/// order. Falls back to `["General"]`.
pub fn infer_tags(title: &str, description: &str) -> Vec<String> {
    let text = format!("{title} {description}").to_lowercase();

    let tags: Vec<String> = TAG_RULES
        .iter()
        .filter(|rule| rule.matches(&text))
        .map(|rule| rule.tag.to_string())
        .collect();

    if tags.is_empty() {
        vec![GENERAL_TAG.to_string()]
    } else {
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_senior_systems_analyst_tags() {
        let tags = infer_tags("Senior Systems Analyst", "Remote, full time");
        assert_eq!(
            tags,
            vec!["Analysis", "Systems", "Senior", "Remote", "Full-time"]
        );
    }

    #[test]
    fn test_no_keywords_falls_back_to_general() {
        assert_eq!(infer_tags("X", ""), vec!["General"]);
        assert_eq!(infer_tags("", ""), vec!["General"]);
    }

    #[test]
    fn test_tags_are_unique_when_several_keywords_hit() {
        let tags = infer_tags("Developer / Engineer", "City and municipal government work");
        // "city" also carries the "it" keyword.
        assert_eq!(tags, vec!["Development", "Government", "IT"]);
    }

    #[test]
    fn test_hyphenated_work_mode_is_not_a_marker() {
        let tags = infer_tags("Clerk", "Part-time, temporary");
        assert_eq!(tags, vec!["Temporary"]);
    }

    #[test]
    fn test_it_keyword_matches_as_substring() {
        assert_eq!(infer_tags("IT Support", ""), vec!["IT"]);
        assert_eq!(infer_tags("Information Technology Lead", ""), vec!["IT"]);
        assert_eq!(
            infer_tags("City Planner", ""),
            vec!["Planning", "Government", "IT"]
        );
        assert_eq!(infer_tags("Permit clerk", ""), vec!["IT"]);
        assert_eq!(infer_tags("Clerk", "Front desk"), vec!["General"]);
    }

    #[test]
    fn test_type_priority_order() {
        assert_eq!(
            infer_employment_type("Permanent, full time position"),
            EmploymentType::FullTime
        );
        assert_eq!(
            infer_employment_type("Part time with option to go full time"),
            EmploymentType::PartTime
        );
        assert_eq!(
            infer_employment_type("Temporary contract"),
            EmploymentType::Temporary
        );
        assert_eq!(
            infer_employment_type("12 month CONTRACT"),
            EmploymentType::Contract
        );
    }

    #[test]
    fn test_type_unknown_without_marker() {
        assert_eq!(infer_employment_type(""), EmploymentType::Unknown);
        assert_eq!(
            infer_employment_type("No description available"),
            EmploymentType::Unknown
        );
    }

    #[test]
    fn test_type_ignores_hyphenated_marker() {
        assert_eq!(
            infer_employment_type("Full-time position"),
            EmploymentType::Unknown
        );
        assert_eq!(infer_employment_type("Full Time"), EmploymentType::FullTime);
    }
}
