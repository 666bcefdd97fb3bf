use serde::{Deserialize, Serialize};

use common::TagValueError;

use crate::tags::TagMask;

/// A rule applied to new windows.
///
/// Every field that is set must be a substring of the matching window property
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Rule {
    /// match against the class part of WM_CLASS
    pub(crate) class: Option<String>,
    /// match against the instance part of WM_CLASS
    pub(crate) instance: Option<String>,
    /// match against the window title
    pub(crate) title: Option<String>,
    /// Tag numbers (starting from 1) the window should be on
    pub(crate) tags: Vec<usize>,
    pub(crate) floating: bool,
    /// Index of the monitor the window should open on
    pub(crate) monitor: Option<usize>,
}

/// What the matching rules decided for a new window
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct RuleOutcome {
    pub(crate) tags: TagMask,
    pub(crate) floating: bool,
    pub(crate) monitor: Option<usize>,
}

impl Rule {
    pub(crate) fn tag_mask(&self) -> Result<TagMask, TagValueError> {
        self.tags.iter().try_fold(TagMask::EMPTY, |mask, &tag| {
            let single = tag
                .checked_sub(1)
                .ok_or(TagValueError { tag_num: tag })
                .and_then(TagMask::single)?;
            Ok(mask | single)
        })
    }

    fn matches(&self, class: &str, instance: &str, title: &str) -> bool {
        let field_matches = |pattern: &Option<String>, value: &str| {
            pattern.as_deref().map_or(true, |p| value.contains(p))
        };

        field_matches(&self.title, title)
            && field_matches(&self.class, class)
            && field_matches(&self.instance, instance)
    }
}

/// Run every rule in order. Later rules overwrite `floating` and `monitor`, tags add up.
pub(crate) fn apply_rules(rules: &[Rule], class: &str, instance: &str, title: &str) -> RuleOutcome {
    let mut outcome = RuleOutcome::default();
    for rule in rules.iter().filter(|r| r.matches(class, instance, title)) {
        log::debug!("Rule {:?} matched window {:?} ({}, {})", rule, title, class, instance);
        outcome.floating = rule.floating;
        // Rules are validated when the config is loaded
        outcome.tags = outcome.tags | rule.tag_mask().unwrap_or_default();
        if rule.monitor.is_some() {
            outcome.monitor = rule.monitor;
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(class: &str, tags: Vec<usize>, floating: bool, monitor: Option<usize>) -> Rule {
        Rule {
            class: Some(class.to_string()),
            tags,
            floating,
            monitor,
            ..Rule::default()
        }
    }

    #[test]
    fn no_match_changes_nothing() {
        let rules = vec![rule("Gimp", vec![2], true, Some(1))];
        assert_eq!(
            apply_rules(&rules, "Firefox", "Navigator", "title"),
            RuleOutcome::default()
        );
    }

    #[test]
    fn last_writer_wins_and_tags_accumulate() {
        let rules = vec![
            rule("Fire", vec![1], true, Some(1)),
            rule("fox", vec![3], false, None),
            rule("Gimp", vec![9], true, Some(0)),
        ];
        let outcome = apply_rules(&rules, "Firefox", "Navigator", "title");
        assert_eq!(outcome.tags.bits(), 0b101);
        assert!(!outcome.floating);
        assert_eq!(outcome.monitor, Some(1));
    }

    #[test]
    fn every_set_field_must_match() {
        let mut r = rule("Firefox", vec![2], true, None);
        r.title = Some("Library".to_string());
        let rules = vec![r];
        assert!(!apply_rules(&rules, "Firefox", "Navigator", "Mozilla").floating);
        assert!(apply_rules(&rules, "Firefox", "Navigator", "Library").floating);
    }

    #[test]
    fn invalid_tags() {
        assert!(rule("a", vec![0], false, None).tag_mask().is_err());
        assert!(rule("a", vec![32], false, None).tag_mask().is_err());
        assert_eq!(
            rule("a", vec![1, 31], false, None).tag_mask().unwrap().bits(),
            0x4000_0001
        );
    }
}
