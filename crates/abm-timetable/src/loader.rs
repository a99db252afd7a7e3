//! CSV loader for the tdd alternative table.
//!
//! # CSV format
//!
//! One row per alternative.  `duration` is optional; when present it must
//! equal `end - start`.
//!
//! ```csv
//! tdd,start,end,duration
//! 1,1,1,0
//! 2,1,4,3
//! 3,2,5,3
//! 4,3,6,3
//! ```
//!
//! Rows may appear in any order; the table is sorted by `tdd` on load.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use abm_core::{Period, TddAltId};

use crate::{TddAlt, TddAlts, TimetableError, TimetableResult};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct TddRecord {
    tdd:      u32,
    start:    u16,
    end:      u16,
    #[serde(default)]
    duration: Option<u16>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load the alternative table from a CSV file.
pub fn load_tdd_alts_csv(path: &Path) -> TimetableResult<TddAlts> {
    let file = std::fs::File::open(path).map_err(TimetableError::Io)?;
    load_tdd_alts_reader(file)
}

/// Like [`load_tdd_alts_csv`] but accepts any `Read` source.
pub fn load_tdd_alts_reader<R: Read>(reader: R) -> TimetableResult<TddAlts> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut alts = Vec::new();

    for result in csv_reader.deserialize::<TddRecord>() {
        let row = result.map_err(|e| TimetableError::Parse(e.to_string()))?;
        let mismatched = row.duration.is_some_and(|d| row.end >= row.start && d != row.end - row.start);
        if mismatched {
            return Err(TimetableError::Parse(format!(
                "tdd {}: duration {:?} does not match {}..{}",
                row.tdd, row.duration, row.start, row.end
            )));
        }
        alts.push(TddAlt::new(TddAltId(row.tdd), Period(row.start), Period(row.end)));
    }

    let table = TddAlts::new(alts)?;
    tracing::debug!(alternatives = table.len(), "loaded tdd table");
    Ok(table)
}
