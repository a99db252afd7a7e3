//! Text rendering of windows, one line per unit.
//!
//! | Glyph | Period state                                   |
//! |-------|------------------------------------------------|
//! | `.`   | free                                           |
//! | `<`   | a tour starts here                             |
//! | `>`   | a tour ends here                               |
//! | `=`   | inside a tour                                  |
//! | `o`   | a zero-duration tour                           |
//! | `x`   | one tour ends and the next starts here         |
//! | `*`   | any other combination (a point on a boundary)  |

use std::fmt::Write;

use crate::{PeriodFlags, Timetable, Window, WindowKey};

/// Render a single window as a string of `periods` glyphs.
pub fn render_window(window: &Window) -> String {
    (0..window.periods())
        .map(|p| glyph(window.flags(abm_core::Period(p))))
        .collect()
}

/// Render the windows of `units` (or of every unit when `units` is empty),
/// with a period ruler on top.
pub fn tour_map<U: WindowKey>(timetable: &Timetable<U>, units: &[U]) -> String {
    let periods = timetable.periods();
    let selected: Vec<U> = if units.is_empty() { timetable.units().collect() } else { units.to_vec() };
    let label_width = selected.iter().map(|u| u.to_string().len()).max().unwrap_or(0);

    let mut out = String::new();
    let ruler: String = (0..periods).map(|p| char::from(b'0' + (p % 10) as u8)).collect();
    let _ = writeln!(out, "{:>label_width$} |{ruler}|", "");

    let empty = Window::new(periods);
    for unit in selected {
        let window = timetable.window(unit).unwrap_or(&empty);
        let _ = writeln!(out, "{:>label_width$} |{}|", unit.to_string(), render_window(window));
    }
    out
}

fn glyph(flags: PeriodFlags) -> char {
    match flags.bits() {
        0 => '.',
        b if b == PeriodFlags::START.bits() => '<',
        b if b == PeriodFlags::END.bits() => '>',
        b if b == PeriodFlags::MIDDLE.bits() => '=',
        b if b == PeriodFlags::POINT.bits() => 'o',
        b if b == PeriodFlags::START.union(PeriodFlags::END).bits() => 'x',
        _ => '*',
    }
}
