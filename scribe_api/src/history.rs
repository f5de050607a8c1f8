use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A commit in which the set of comments on a file changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitCommentDelta {
    /// Full commit identifier.
    pub commit_id: String,
    /// Commit time as a Unix timestamp (seconds).
    pub timestamp: i64,
    /// First line of the commit message.
    #[serde(default)]
    pub summary: Option<String>,
    /// Comments present in the first parent (empty for root commits).
    #[serde(default)]
    pub old_comments: BTreeSet<String>,
    /// Comments present in the commit itself.
    #[serde(default)]
    pub new_comments: BTreeSet<String>,
}

impl CommitCommentDelta {
    /// Comments introduced by the commit.
    pub fn added(&self) -> impl Iterator<Item = &str> + '_ {
        self.new_comments
            .difference(&self.old_comments)
            .map(String::as_str)
    }

    /// Comments dropped by the commit.
    pub fn removed(&self) -> impl Iterator<Item = &str> + '_ {
        self.old_comments
            .difference(&self.new_comments)
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn added_and_removed_are_set_differences() {
        let delta = CommitCommentDelta {
            commit_id: "1111111111111111111111111111111111111111".into(),
            timestamp: 1_700_000_000,
            summary: Some("Reword docs".into()),
            old_comments: ["keep", "old"].into_iter().map(String::from).collect(),
            new_comments: ["keep", "new"].into_iter().map(String::from).collect(),
        };

        assert_eq!(delta.added().collect::<Vec<_>>(), vec!["new"]);
        assert_eq!(delta.removed().collect::<Vec<_>>(), vec!["old"]);
    }

    #[test]
    fn serde_defaults_are_applied() {
        let json = r#"{"commit_id": "abc", "timestamp": 0}"#;
        let delta: CommitCommentDelta = serde_json::from_str(json).expect("deserialize delta");
        assert!(delta.summary.is_none());
        assert!(delta.old_comments.is_empty());
        assert!(delta.new_comments.is_empty());
    }
}
