//! Query name matching.
//!
//! Queries arrive as fully qualified names under the configured zone. The zone is stripped off
//! with [`relative_name`], and the remainder is looked up in the current
//! [`NameTable`] with [`resolve`].
//!
//! # Wildcards
//!
//! With [`MatchPolicy::Wildcard`], any name below an instance also resolves to that instance.
//! Given a table holding `web1.acme`, a query for `sub.web1.acme` (or `a.b.web1.acme`) answers
//! with the address of `web1.acme`. When several suffixes of the query exist in the table, the
//! longest one wins.

use crate::table::NameTable;
use std::net::Ipv4Addr;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPolicy {
    /// Only the exact relative name matches.
    #[default]
    Exact,
    /// The longest suffix of the relative name present in the table matches.
    Wildcard,
}

impl From<bool> for MatchPolicy {
    fn from(wildcard: bool) -> Self {
        if wildcard {
            MatchPolicy::Wildcard
        } else {
            MatchPolicy::Exact
        }
    }
}

/// Look up the addresses for a relative name.
pub fn resolve<'t>(
    relative_name: &str,
    table: &'t NameTable,
    policy: MatchPolicy,
) -> Option<&'t [Ipv4Addr]> {
    match policy {
        MatchPolicy::Exact => table.get(relative_name),
        MatchPolicy::Wildcard => resolve_suffix(relative_name, table),
    }
}

/// Scan suffixes from the two-label parent towards the full name. Every hit replaces the
/// previous one, so the last hit, i.e. the longest suffix present, is the answer.
fn resolve_suffix<'t>(relative_name: &str, table: &'t NameTable) -> Option<&'t [Ipv4Addr]> {
    let starts: Vec<usize> = std::iter::once(0)
        .chain(relative_name.match_indices('.').map(|(i, _)| i + 1))
        .collect();

    let mut found = None;
    for &start in starts.iter().rev().skip(1) {
        if let Some(addrs) = table.get(&relative_name[start..]) {
            found = Some(addrs);
        }
    }
    found
}

/// Strip `zone` (and the dot before it) from the end of `query_name`.
///
/// A trailing root dot on either name is ignored and the zone is compared case-insensitively.
/// Returns `None` when the query is not within the zone, and `Some("")` for the zone apex.
pub fn relative_name<'q>(query_name: &'q str, zone: &str) -> Option<&'q str> {
    let query = query_name.strip_suffix('.').unwrap_or(query_name);
    let zone = zone.strip_suffix('.').unwrap_or(zone);
    if zone.is_empty() {
        return Some(query);
    }
    if query.len() == zone.len() {
        return query.eq_ignore_ascii_case(zone).then_some("");
    }

    let split = query.len().checked_sub(zone.len() + 1)?;
    if !query.is_char_boundary(split) || !query.is_char_boundary(split + 1) {
        return None;
    }
    let (head, tail) = query.split_at(split);
    let tail_zone = tail.strip_prefix('.')?;
    tail_zone.eq_ignore_ascii_case(zone).then_some(head)
}
