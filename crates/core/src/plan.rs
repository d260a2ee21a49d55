//! `EXPLAIN ANALYZE` output parsing.
//!
//! The server returns the plan as one text row per line, followed by the
//! planning and execution timings:
//!
//! ```text
//! Index Scan using idx_address on users  (cost=0.13..8.15 rows=1 width=68) (actual time=0.010..0.011 rows=1 loops=1)
//!   Index Cond: ((address).pin_code = 25130)
//! Planning Time: 0.062 ms
//! Execution Time: 0.031 ms
//! ```
//!
//! Servers before 9.4 print `Total runtime` and no planning time.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while parsing `EXPLAIN ANALYZE` output.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("EXPLAIN output has no execution time")]
    MissingExecutionTime,
    #[error("Invalid duration in EXPLAIN output: {0}")]
    InvalidDuration(String),
}

/// The demo queries whose plans can be inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExplainTarget {
    /// Full scan of `users`.
    AllUsers,
    /// `users` filtered on a field of the composite address.
    UsersByPinCode(i32),
    /// Full scan of `contacts`.
    AllContacts,
    /// `contacts` whose phone directory has the given label (`?` operator).
    ContactsWithLabel(String),
    /// Full scan of `tagged_contacts`.
    AllTaggedContacts,
    /// `tagged_contacts` whose array holds an entry with the tag (`@>`).
    TaggedContactsWithTag(String),
    /// Numbers under a tag, unnested with `JOIN LATERAL jsonb_array_elements`.
    TaggedNumbersWithTag(String),
}

/// A parsed query plan with its timings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryTiming {
    /// Plan lines, without the timing lines.
    pub plan: Vec<String>,
    /// None on servers that do not report planning time.
    pub planning_ms: Option<f64>,
    pub execution_ms: f64,
}

impl QueryTiming {
    /// Parses the rows returned by `EXPLAIN ANALYZE`.
    pub fn parse<I, S>(lines: I) -> Result<Self, PlanError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut plan = Vec::new();
        let mut planning_ms = None;
        let mut execution_ms = None;

        for line in lines {
            let line = line.as_ref();
            let lowered = line.trim().to_ascii_lowercase();

            if let Some(rest) = lowered.strip_prefix("planning time:") {
                planning_ms = Some(parse_millis(rest, line)?);
            } else if let Some(rest) = lowered
                .strip_prefix("execution time:")
                .or_else(|| lowered.strip_prefix("total runtime:"))
            {
                execution_ms = Some(parse_millis(rest, line)?);
            } else {
                plan.push(line.to_string());
            }
        }

        Ok(Self {
            plan,
            planning_ms,
            execution_ms: execution_ms.ok_or(PlanError::MissingExecutionTime)?,
        })
    }

    /// Returns true if any plan node reads through an index.
    pub fn uses_index(&self) -> bool {
        self.plan.iter().any(|line| {
            line.contains("Index Scan")
                || line.contains("Index Only Scan")
                || line.contains("Bitmap Index Scan")
        })
    }

    /// Returns true if any plan node is a sequential scan.
    pub fn uses_sequential_scan(&self) -> bool {
        self.plan.iter().any(|line| line.contains("Seq Scan"))
    }
}

fn parse_millis(rest: &str, line: &str) -> Result<f64, PlanError> {
    let value = rest.trim();
    let value = value.strip_suffix("ms").unwrap_or(value).trim();
    value
        .parse()
        .map_err(|_| PlanError::InvalidDuration(line.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX_PLAN: &[&str] = &[
        "Index Scan using idx_address on users  (cost=0.13..8.15 rows=1 width=68) (actual time=0.010..0.011 rows=1 loops=1)",
        "  Index Cond: ((address).pin_code = 25130)",
        "Planning Time: 0.062 ms",
        "Execution Time: 0.031 ms",
    ];

    #[test]
    fn test_parse_extracts_timings() {
        let timing = QueryTiming::parse(INDEX_PLAN).unwrap();

        assert_eq!(timing.planning_ms, Some(0.062));
        assert_eq!(timing.execution_ms, 0.031);
        assert_eq!(timing.plan.len(), 2);
        assert!(timing.plan[1].contains("Index Cond"));
    }

    #[test]
    fn test_parse_accepts_pre_9_4_output() {
        let timing = QueryTiming::parse([
            "Seq Scan on contacts  (cost=0.00..1.20 rows=20 width=32) (actual time=0.005..0.007 rows=20 loops=1)",
            "Total runtime: 2.25 ms",
        ])
        .unwrap();

        assert_eq!(timing.planning_ms, None);
        assert_eq!(timing.execution_ms, 2.25);
        assert_eq!(timing.plan.len(), 1);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        let timing =
            QueryTiming::parse(["Seq Scan on users", "Planning time: 1.5 ms", "Execution time: 3 ms"])
                .unwrap();

        assert_eq!(timing.planning_ms, Some(1.5));
        assert_eq!(timing.execution_ms, 3.0);
    }

    #[test]
    fn test_scan_detection() {
        let index = QueryTiming::parse(INDEX_PLAN).unwrap();
        assert!(index.uses_index());
        assert!(!index.uses_sequential_scan());

        let bitmap = QueryTiming::parse([
            "Bitmap Heap Scan on contacts  (cost=8.00..12.01 rows=1 width=32)",
            "  Recheck Cond: (phone_numbers ? 'Home'::text)",
            "  ->  Bitmap Index Scan on idx_phone_numbers  (cost=0.00..8.00 rows=1 width=0)",
            "Planning Time: 0.1 ms",
            "Execution Time: 0.2 ms",
        ])
        .unwrap();
        assert!(bitmap.uses_index());

        let seq = QueryTiming::parse([
            "Seq Scan on users  (cost=0.00..1.02 rows=2 width=68)",
            "Planning Time: 0.1 ms",
            "Execution Time: 0.2 ms",
        ])
        .unwrap();
        assert!(seq.uses_sequential_scan());
        assert!(!seq.uses_index());
    }

    #[test]
    fn test_parse_requires_execution_time() {
        assert_eq!(
            QueryTiming::parse(["Seq Scan on users", "Planning Time: 0.2 ms"]),
            Err(PlanError::MissingExecutionTime)
        );
    }

    #[test]
    fn test_parse_rejects_invalid_duration() {
        let result = QueryTiming::parse(["Planning Time: fast", "Execution Time: 0.2 ms"]);

        assert_eq!(
            result,
            Err(PlanError::InvalidDuration("Planning Time: fast".to_string()))
        );
    }
}
