//! Database / retention-policy pairs as exchanged with task storage.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ast::DbrpNode;
use crate::literal::quote_reference;

/// A (database, retention policy) pair a task reads from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Dbrp {
    #[serde(rename = "db")]
    pub database: String,
    #[serde(rename = "rp")]
    pub retention_policy: String,
}

impl Dbrp {
    pub fn new(database: impl Into<String>, retention_policy: impl Into<String>) -> Self {
        Dbrp {
            database: database.into(),
            retention_policy: retention_policy.into(),
        }
    }
}

impl From<&DbrpNode> for Dbrp {
    fn from(node: &DbrpNode) -> Self {
        Dbrp::new(node.database.clone(), node.retention_policy.clone())
    }
}

impl fmt::Display for Dbrp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}",
            quote_reference(&self.database),
            quote_reference(&self.retention_policy)
        )
    }
}

/// Multiset equality: same pairs with the same multiplicities, in any order.
pub fn equal_as_sets(a: &[Dbrp], b: &[Dbrp]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut counts: HashMap<&Dbrp, isize> = HashMap::new();
    for dbrp in a {
        *counts.entry(dbrp).or_default() += 1;
    }
    for dbrp in b {
        *counts.entry(dbrp).or_default() -= 1;
    }
    counts.values().all(|count| *count == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_count() {
        let a = vec![Dbrp::new("telegraf", "autogen"), Dbrp::new("telegraf", "autogen")];
        let b = vec![Dbrp::new("telegraf", "autogen"), Dbrp::new("telegraf", "other")];
        assert!(!equal_as_sets(&a, &b));
        assert!(!equal_as_sets(&b, &a));
        assert!(equal_as_sets(&a, &a.clone()));
    }

    #[test]
    fn wire_names() {
        let json = serde_json::to_string(&Dbrp::new("telegraf", "autogen")).unwrap();
        assert_eq!(json, r#"{"db":"telegraf","rp":"autogen"}"#);
        assert_eq!(Dbrp::new("telegraf", "autogen").to_string(), r#""telegraf"."autogen""#);
    }
}
