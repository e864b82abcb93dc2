//! Attack-table persistence.
//!
//! The file is a JSON document with, per square and ray family, the relevant
//! occupancy mask, the magic multiplier, and the dense attack array, plus a
//! global entry count used to size the runtime arena in one allocation.
//! Generated once offline; read-only at runtime.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{AttackTables, Magic};

/// Error type for attack-table load/store failures.
///
/// At engine startup these are fatal: no sliding move can be generated
/// without the tables.
#[derive(Debug)]
pub enum TableError {
    /// File could not be read or written
    Io(io::Error),
    /// File contents are not valid JSON
    Malformed(serde_json::Error),
    /// A ray family does not hold exactly 64 square entries
    WrongSquareCount { family: &'static str, found: usize },
    /// A square's attack array does not match its mask's subset count
    WrongEntryCount {
        square: usize,
        expected: usize,
        found: usize,
    },
    /// The global entry count disagrees with the per-square data
    TotalMismatch { declared: u64, found: u64 },
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::Io(e) => write!(f, "Attack table I/O failed: {e}"),
            TableError::Malformed(e) => write!(f, "Attack table file is malformed: {e}"),
            TableError::WrongSquareCount { family, found } => {
                write!(f, "Family '{family}' has {found} squares, expected 64")
            }
            TableError::WrongEntryCount {
                square,
                expected,
                found,
            } => write!(
                f,
                "Square {square} stores {found} attack entries, expected {expected}"
            ),
            TableError::TotalMismatch { declared, found } => write!(
                f,
                "Declared entry total {declared} does not match stored data ({found})"
            ),
        }
    }
}

impl std::error::Error for TableError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TableError::Io(e) => Some(e),
            TableError::Malformed(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for TableError {
    fn from(e: io::Error) -> Self {
        TableError::Io(e)
    }
}

impl From<serde_json::Error> for TableError {
    fn from(e: serde_json::Error) -> Self {
        TableError::Malformed(e)
    }
}

#[derive(Serialize, Deserialize)]
struct StoredSquare {
    mask: u64,
    magic: u64,
    attacks: Vec<u64>,
}

#[derive(Serialize, Deserialize)]
struct StoredTables {
    /// Total attack entries across both families, for upfront buffer sizing
    total_entries: u64,
    rook: Vec<StoredSquare>,
    bishop: Vec<StoredSquare>,
}

fn to_stored(tables: &AttackTables) -> StoredTables {
    let family = |magics: &[Magic]| -> Vec<StoredSquare> {
        magics
            .iter()
            .map(|m| {
                let len = 1usize << m.mask.count_ones();
                StoredSquare {
                    mask: m.mask,
                    magic: m.magic,
                    attacks: tables.attacks[m.offset..m.offset + len].to_vec(),
                }
            })
            .collect()
    };

    StoredTables {
        total_entries: tables.attacks.len() as u64,
        rook: family(&tables.rook),
        bishop: family(&tables.bishop),
    }
}

fn from_stored(stored: StoredTables) -> Result<AttackTables, TableError> {
    if stored.rook.len() != 64 {
        return Err(TableError::WrongSquareCount {
            family: "rook",
            found: stored.rook.len(),
        });
    }
    if stored.bishop.len() != 64 {
        return Err(TableError::WrongSquareCount {
            family: "bishop",
            found: stored.bishop.len(),
        });
    }

    let mut attacks = Vec::with_capacity(stored.total_entries as usize);
    let mut load_family = |squares: Vec<StoredSquare>| -> Result<Vec<Magic>, TableError> {
        let mut magics = Vec::with_capacity(64);
        for (square, entry) in squares.into_iter().enumerate() {
            let expected = 1usize << entry.mask.count_ones();
            if entry.attacks.len() != expected {
                return Err(TableError::WrongEntryCount {
                    square,
                    expected,
                    found: entry.attacks.len(),
                });
            }
            magics.push(Magic {
                mask: entry.mask,
                magic: entry.magic,
                shift: 64 - entry.mask.count_ones(),
                offset: attacks.len(),
            });
            attacks.extend_from_slice(&entry.attacks);
        }
        Ok(magics)
    };

    let rook = load_family(stored.rook)?;
    let bishop = load_family(stored.bishop)?;

    if attacks.len() as u64 != stored.total_entries {
        return Err(TableError::TotalMismatch {
            declared: stored.total_entries,
            found: attacks.len() as u64,
        });
    }

    Ok(AttackTables {
        rook,
        bishop,
        attacks,
    })
}

pub(super) fn load(path: &Path) -> Result<AttackTables, TableError> {
    let text = fs::read_to_string(path)?;
    let stored: StoredTables = serde_json::from_str(&text)?;
    let tables = from_stored(stored)?;
    log::info!(
        "loaded attack tables from {}: {} entries",
        path.display(),
        tables.entry_count()
    );
    Ok(tables)
}

pub(super) fn save(tables: &AttackTables, path: &Path) -> Result<(), TableError> {
    let stored = to_stored(tables);
    let text = serde_json::to_string(&stored)?;
    fs::write(path, text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_round_trip_preserves_lookups() {
        let tables = AttackTables::generate();
        let stored = to_stored(&tables);
        let text = serde_json::to_string(&stored).unwrap();
        let reloaded = from_stored(serde_json::from_str(&text).unwrap()).unwrap();

        assert_eq!(reloaded.entry_count(), tables.entry_count());
        for sq in [0usize, 7, 28, 36, 63] {
            for occ in [0u64, 0xFF00FF00FF00FF00, 0x1248_0000_8421_0000] {
                assert_eq!(
                    reloaded.rook_attacks(sq, occ),
                    tables.rook_attacks(sq, occ)
                );
                assert_eq!(
                    reloaded.bishop_attacks(sq, occ),
                    tables.bishop_attacks(sq, occ)
                );
            }
        }
    }

    #[test]
    fn total_mismatch_is_rejected() {
        let tables = AttackTables::generate();
        let mut stored = to_stored(&tables);
        stored.total_entries += 1;
        let err = from_stored(stored).map(|_| ()).unwrap_err();
        assert!(matches!(err, TableError::TotalMismatch { .. }), "{err}");
    }

    #[test]
    fn truncated_square_is_rejected() {
        let tables = AttackTables::generate();
        let mut stored = to_stored(&tables);
        stored.rook[10].attacks.pop();
        stored.total_entries -= 1;
        let err = from_stored(stored).map(|_| ()).unwrap_err();
        assert!(
            matches!(err, TableError::WrongEntryCount { square: 10, .. }),
            "{err}"
        );
    }

    #[test]
    fn missing_file_reports_io_error() {
        let err = load(Path::new("/nonexistent/attack_tables.json"))
            .map(|_| ())
            .unwrap_err();
        assert!(matches!(err, TableError::Io(_)), "{err}");
    }
}
