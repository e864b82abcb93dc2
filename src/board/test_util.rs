//! Shared fixtures for board tests.

use once_cell::sync::Lazy;

use super::attack_tables::AttackTables;

static TABLES: Lazy<AttackTables> = Lazy::new(AttackTables::generate);

/// Attack tables generated once and shared by every test module.
pub(crate) fn tables() -> &'static AttackTables {
    &TABLES
}
