//! Schema diff engine.
//!
//! Compares a table's current (server) definition against the desired
//! (caller) definition and produces an ordered change list. Columns and
//! keys are matched by name; a matched pair whose rendered DDL differs
//! becomes a change, everything else a drop or an add.
//!
//! Execution order inside the resulting list: all key removals, then
//! all column changes (drops/changes/adds), then all key additions.
//! This avoids adding a key that references a column not yet added, and
//! avoids dropping a column still referenced by a key not yet dropped.

use std::collections::BTreeSet;

use stela_sql::{Column, Key, SqlBuilder, Table};

use crate::error::DiffError;

/// Minimum normalized similarity score (0.0–1.0) for a
/// (dropped, added) column pair to be flagged as a possible rename.
const RENAME_SIMILARITY_THRESHOLD: f64 = 0.4;

/// Computes the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let m = a.len();
    let n = b.len();
    let mut prev = (0..=n).collect::<Vec<_>>();
    let mut curr = vec![0; n + 1];
    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[n]
}

/// Returns a normalized similarity score in `[0.0, 1.0]`.
fn similarity(a: &str, b: &str) -> f64 {
    let max_len = a.len().max(b.len());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - (levenshtein(a, b) as f64 / max_len as f64)
}

/// Diff behavior knobs.
#[derive(Debug, Clone)]
pub struct DiffOptions {
    /// When enabled, (dropped, added) column pairs with the same type
    /// and similar names are reported as [`PossibleRename`] entries
    /// instead of a destructive drop+add. Disabled by default: name-only
    /// matching treats a rename as drop+add, which loses data.
    pub detect_renames: bool,
    /// Similarity threshold for rename candidates.
    pub rename_similarity_threshold: f64,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            detect_renames: false,
            rename_similarity_threshold: RENAME_SIMILARITY_THRESHOLD,
        }
    }
}

/// One entry of the ordered change list.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    /// Drop a key that is absent from (or differs in) the desired set.
    DropKey(Key),
    /// Drop a column absent from the desired set.
    DropColumn(String),
    /// Redefine a column whose rendered DDL differs.
    ChangeColumn(Column),
    /// Add a column absent from the current set.
    AddColumn(Column),
    /// Add a key absent from (or differing in) the current set.
    AddKey(Key),
}

/// A (dropped, added) column pair that may actually be a rename and
/// needs caller confirmation before anything destructive happens.
#[derive(Debug, Clone, PartialEq)]
pub struct PossibleRename {
    /// The column present only in the current definition.
    pub old_column: String,
    /// The column present only in the desired definition.
    pub new_column: String,
    /// Name similarity score (0.0–1.0).
    pub similarity: f64,
}

/// Result of diffing one table: changes in execution order, plus any
/// rename candidates withheld from the change list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableDiff {
    /// Changes in execution order.
    pub changes: Vec<Change>,
    /// Possible renames requiring confirmation (only populated when
    /// rename detection is enabled).
    pub ambiguous: Vec<PossibleRename>,
}

impl TableDiff {
    /// Returns `true` if there is nothing to apply and nothing to
    /// confirm.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.ambiguous.is_empty()
    }

    /// Renders every change as an ALTER statement against the given
    /// table, preserving execution order.
    #[must_use]
    pub fn to_sql(&self, builder: &SqlBuilder, database_name: &str, table_name: &str) -> Vec<String> {
        let fqtn = builder.escape_identifier([database_name, table_name]);
        self.changes
            .iter()
            .map(|change| match change {
                Change::DropKey(key) => {
                    format!("ALTER TABLE {fqtn} DROP {}", builder.build_key_identifier_sql(key))
                }
                Change::DropColumn(name) => format!(
                    "ALTER TABLE {fqtn} DROP COLUMN {}",
                    builder.escape_identifier([name.as_str()])
                ),
                Change::ChangeColumn(column) => format!(
                    "ALTER TABLE {fqtn} CHANGE COLUMN {} {}",
                    builder.escape_identifier([column.name.as_str()]),
                    builder.build_column_sql(column)
                ),
                Change::AddColumn(column) => format!(
                    "ALTER TABLE {fqtn} ADD COLUMN {}",
                    builder.build_column_sql(column)
                ),
                Change::AddKey(key) => {
                    format!("ALTER TABLE {fqtn} ADD {}", builder.build_key_sql(key))
                }
            })
            .collect()
    }
}

/// Compares a table's current and desired definitions.
///
/// Both snapshots are borrowed immutably and never mutated. An empty
/// desired column or key set is a [`DiffError::PreconditionFailed`]:
/// the caller wants table removal, which is a different path.
pub fn diff_table(
    builder: &SqlBuilder,
    current: &Table,
    desired: &Table,
    options: &DiffOptions,
) -> Result<TableDiff, DiffError> {
    if desired.columns.is_empty() {
        return Err(DiffError::PreconditionFailed(String::from(
            "cannot update a table to have no columns; use table removal instead",
        )));
    }
    if desired.keys.is_empty() {
        return Err(DiffError::PreconditionFailed(String::from(
            "cannot update a table to have no keys; use table removal instead",
        )));
    }
    for key in &desired.keys {
        if key.column_names().is_empty() {
            return Err(DiffError::PreconditionFailed(format!(
                "key `{}` covers no columns",
                key.name()
            )));
        }
        for column in key.column_names() {
            if desired.find_column(column).is_none() {
                return Err(DiffError::PreconditionFailed(format!(
                    "key `{}` references unknown column `{column}`",
                    key.name()
                )));
            }
        }
    }

    let mut key_removals = Vec::new();
    let mut key_additions = Vec::new();
    for current_key in &current.keys {
        match desired.find_key(current_key.name()) {
            None => key_removals.push(Change::DropKey(current_key.clone())),
            Some(desired_key) => {
                if builder.build_key_sql(current_key) != builder.build_key_sql(desired_key) {
                    key_removals.push(Change::DropKey(current_key.clone()));
                    key_additions.push(Change::AddKey(desired_key.clone()));
                }
            }
        }
    }
    for desired_key in &desired.keys {
        if current.find_key(desired_key.name()).is_none() {
            key_additions.push(Change::AddKey(desired_key.clone()));
        }
    }

    let dropped: Vec<&Column> = current
        .columns
        .iter()
        .filter(|c| desired.find_column(&c.name).is_none())
        .collect();
    let added: Vec<&Column> = desired
        .columns
        .iter()
        .filter(|c| current.find_column(&c.name).is_none())
        .collect();

    let (rename_dropped, rename_added, ambiguous) = if options.detect_renames {
        detect_renames(&dropped, &added, options.rename_similarity_threshold)
    } else {
        (BTreeSet::new(), BTreeSet::new(), Vec::new())
    };

    let mut column_changes = Vec::new();
    for current_column in &current.columns {
        match desired.find_column(&current_column.name) {
            None => {
                if !rename_dropped.contains(current_column.name.as_str()) {
                    column_changes.push(Change::DropColumn(current_column.name.clone()));
                }
            }
            Some(desired_column) => {
                if builder.build_column_sql(current_column)
                    != builder.build_column_sql(desired_column)
                {
                    column_changes.push(Change::ChangeColumn(desired_column.clone()));
                }
            }
        }
    }
    for added_column in &added {
        if !rename_added.contains(added_column.name.as_str()) {
            column_changes.push(Change::AddColumn((*added_column).clone()));
        }
    }

    let mut changes = key_removals;
    changes.extend(column_changes);
    changes.extend(key_additions);
    Ok(TableDiff { changes, ambiguous })
}

/// Greedy N:M rename matching over (dropped, added) column pairs with
/// identical types, highest name similarity first.
fn detect_renames<'a>(
    dropped: &[&'a Column],
    added: &[&'a Column],
    threshold: f64,
) -> (BTreeSet<&'a str>, BTreeSet<&'a str>, Vec<PossibleRename>) {
    let mut candidates: Vec<(&str, &str, f64)> = Vec::new();
    for old in dropped {
        for new in added {
            if old.data_type == new.data_type && old.type_params == new.type_params {
                let score = similarity(&old.name, &new.name);
                if score >= threshold {
                    candidates.push((&old.name, &new.name, score));
                }
            }
        }
    }
    candidates.sort_by(|a, b| b.2.total_cmp(&a.2));

    let mut rename_dropped = BTreeSet::new();
    let mut rename_added = BTreeSet::new();
    let mut ambiguous = Vec::new();
    for (old, new, score) in candidates {
        if rename_dropped.contains(old) || rename_added.contains(new) {
            continue;
        }
        ambiguous.push(PossibleRename {
            old_column: String::from(old),
            new_column: String::from(new),
            similarity: score,
        });
        rename_dropped.insert(old);
        rename_added.insert(new);
    }
    (rename_dropped, rename_added, ambiguous)
}
