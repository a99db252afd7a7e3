//! Window persistence.
//!
//! Windows are written as one row per committed tour, in unit order and then
//! commit order, so reading a file back replays the commits exactly:
//!
//! ```csv
//! unit,tour,tdd,start,end
//! 7,70,2,1,4
//! 7,71,9,4,6
//! 8,80,1,1,1
//! ```
//!
//! This is how a later scheduling step (or a later run) resumes from the
//! windows an earlier step produced.

use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use abm_core::{Period, TddAltId, TourId};

use crate::{TddAlt, Timetable, TimetableError, TimetableResult, WindowKey};

#[derive(Serialize, Deserialize)]
struct WindowRecord {
    unit:  u32,
    tour:  u32,
    tdd:   u32,
    start: u16,
    end:   u16,
}

/// Write every committed tour of `timetable` as CSV.
pub fn write_windows<U: WindowKey, W: Write>(timetable: &Timetable<U>, writer: W) -> TimetableResult<()> {
    let mut out = csv::Writer::from_writer(writer);
    for (unit, window) in timetable.iter() {
        for t in window.tours() {
            out.serialize(WindowRecord {
                unit:  unit.to_raw(),
                tour:  t.tour.0,
                tdd:   t.tdd.0,
                start: t.start.0,
                end:   t.end.0,
            })
            .map_err(|e| TimetableError::Io(e.into()))?;
        }
    }
    out.flush()?;
    Ok(())
}

pub fn write_windows_csv<U: WindowKey>(timetable: &Timetable<U>, path: &Path) -> TimetableResult<()> {
    let file = std::fs::File::create(path)?;
    write_windows(timetable, file)?;
    tracing::info!(path = %path.display(), tours = timetable.tour_count(), "saved windows");
    Ok(())
}

/// Rebuild a timetable of `periods` periods by replaying the rows of a
/// windows CSV.  Overlapping rows are rejected exactly as `commit` would.
pub fn read_windows<U: WindowKey, R: Read>(reader: R, periods: u16) -> TimetableResult<Timetable<U>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut timetable = Timetable::new(periods);

    for result in csv_reader.deserialize::<WindowRecord>() {
        let row = result.map_err(|e| TimetableError::Parse(e.to_string()))?;
        let alt = TddAlt::new(TddAltId(row.tdd), Period(row.start), Period(row.end));
        timetable.commit(U::from_raw(row.unit), TourId(row.tour), &alt)?;
    }
    Ok(timetable)
}

pub fn read_windows_csv<U: WindowKey>(path: &Path, periods: u16) -> TimetableResult<Timetable<U>> {
    let file = std::fs::File::open(path)?;
    read_windows(file, periods)
}
