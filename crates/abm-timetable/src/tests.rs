//! Unit tests for abm-timetable.

use std::io::Cursor;

use abm_core::{DayConfig, Period, PersonId, TddAltId, TourId};

use crate::{
    CommitOutcome, PeriodFlags, TddAlt, TddAlts, Timetable, TimetableError, load_tdd_alts_reader,
    read_windows, render_window, tour_map, write_windows,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn alt(id: u32, s: u16, e: u16) -> TddAlt {
    TddAlt::new(TddAltId(id), Period(s), Period(e))
}

const P: PersonId = PersonId(1);

fn table() -> Timetable<PersonId> {
    Timetable::new(10)
}

// ── TddAlts ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tdd_alts {
    use super::*;

    #[test]
    fn sorted_by_id_with_lookup() {
        let alts = TddAlts::new(vec![alt(30, 2, 5), alt(10, 1, 1), alt(20, 1, 4)]).unwrap();
        assert_eq!(alts.ids(), vec![TddAltId(10), TddAltId(20), TddAltId(30)]);
        assert_eq!(alts.index_of(TddAltId(20)), Some(1));
        assert_eq!(alts.get(TddAltId(30)).unwrap().duration(), 3);
        assert!(alts.get(TddAltId(15)).is_none());
    }

    #[test]
    fn rejects_duplicates_and_backwards_spans() {
        assert!(matches!(
            TddAlts::new(vec![alt(1, 1, 2), alt(1, 3, 4)]),
            Err(TimetableError::DuplicateAlternative(TddAltId(1)))
        ));
        assert!(matches!(
            TddAlts::from_spans(1, &[(4, 2)]),
            Err(TimetableError::InvalidAlternative { .. })
        ));
    }

    #[test]
    fn all_spans_covers_upper_triangle() {
        let day = DayConfig { periods: 4, ..DayConfig::default() };
        let alts = TddAlts::all_spans(&day, 1);
        assert_eq!(alts.len(), 10);
        assert_eq!(alts.as_slice()[0], alt(1, 0, 0));
        assert_eq!(alts.as_slice()[9], alt(10, 3, 3));
        assert_eq!(alts.max_end(), Some(Period(3)));
    }

    #[test]
    fn within_selects_nested_spans() {
        let alts = TddAlts::from_spans(1, &[(1, 1), (1, 4), (2, 5), (3, 6), (2, 3)]).unwrap();
        assert_eq!(alts.within(Period(1), Period(4)), vec![TddAltId(1), TddAltId(2), TddAltId(5)]);
    }

    #[test]
    fn require_unknown_is_error() {
        let alts = TddAlts::from_spans(1, &[(1, 1)]).unwrap();
        assert!(matches!(alts.require(TddAltId(9)), Err(TimetableError::UnknownAlternative(TddAltId(9)))));
    }
}

// ── Availability and commit ───────────────────────────────────────────────────

#[cfg(test)]
mod commit {
    use super::*;

    #[test]
    fn consecutive_tours_may_share_a_boundary() {
        let mut tt = table();
        tt.commit(P, TourId(1), &alt(1, 2, 4)).unwrap();
        assert!(tt.is_available(P, &alt(2, 4, 6)));
        assert_eq!(tt.commit(P, TourId(2), &alt(2, 4, 6)).unwrap(), CommitOutcome::Committed);
        assert!(tt.is_available(P, &alt(3, 0, 2)));
    }

    #[test]
    fn overlapping_tour_is_rejected() {
        let mut tt = table();
        tt.commit(P, TourId(1), &alt(1, 2, 4)).unwrap();
        assert!(!tt.is_available(P, &alt(2, 3, 5)));
        let err = tt.commit(P, TourId(2), &alt(2, 3, 5)).unwrap_err();
        match err {
            TimetableError::Conflict { tour, existing, .. } => {
                assert_eq!(tour, TourId(2));
                assert_eq!(existing, TourId(1));
            }
            other => panic!("expected Conflict, got {other:?}"),
        }
        // Window unchanged.
        assert_eq!(tt.tours(P).len(), 1);
    }

    #[test]
    fn enclosing_and_identical_spans_conflict() {
        let mut tt = table();
        tt.commit(P, TourId(1), &alt(1, 3, 5)).unwrap();
        assert!(!tt.is_available(P, &alt(2, 2, 6)));
        assert!(!tt.is_available(P, &alt(3, 3, 5)));
        assert!(!tt.is_available(P, &alt(4, 4, 4)));
        assert!(!tt.is_available(P, &alt(5, 1, 4)));
        assert!(tt.is_available(P, &alt(6, 5, 5)));
        assert!(tt.is_available(P, &alt(7, 3, 3)));
    }

    #[test]
    fn zero_duration_tours_coexist_on_a_boundary() {
        let mut tt = table();
        tt.commit(P, TourId(1), &alt(1, 4, 4)).unwrap();
        tt.commit(P, TourId(2), &alt(1, 4, 4)).unwrap();
        assert!(tt.is_available(P, &alt(2, 2, 4)));
        assert!(tt.is_available(P, &alt(3, 4, 7)));
        // A zero-duration tour splits nothing, but a span across it does.
        assert!(!tt.is_available(P, &alt(4, 3, 5)));
        assert_eq!(tt.window(P).unwrap().flags(Period(4)), PeriodFlags::POINT);
    }

    #[test]
    fn recommit_same_alternative_is_noop() {
        let mut tt = table();
        assert_eq!(tt.commit(P, TourId(1), &alt(1, 2, 4)).unwrap(), CommitOutcome::Committed);
        let once = tt.window(P).unwrap().clone();
        assert_eq!(tt.commit(P, TourId(1), &alt(1, 2, 4)).unwrap(), CommitOutcome::AlreadyCommitted);
        assert_eq!(tt.window(P).unwrap(), &once);
        assert_eq!(tt.tours(P).len(), 1);
    }

    #[test]
    fn recommit_different_alternative_is_error() {
        let mut tt = table();
        tt.commit(P, TourId(1), &alt(1, 2, 4)).unwrap();
        assert!(matches!(
            tt.commit(P, TourId(1), &alt(2, 6, 8)),
            Err(TimetableError::Reassigned { committed: TddAltId(1), requested: TddAltId(2), .. })
        ));
    }

    #[test]
    fn alternative_past_day_end_is_rejected() {
        let mut tt = table();
        assert!(!tt.is_available(P, &alt(1, 8, 10)));
        assert!(matches!(
            tt.commit(P, TourId(1), &alt(1, 8, 10)),
            Err(TimetableError::PeriodOutOfRange { periods: 10, .. })
        ));
    }

    #[test]
    fn windows_are_per_unit() {
        let mut tt = table();
        tt.commit(PersonId(1), TourId(1), &alt(1, 2, 6)).unwrap();
        assert!(tt.is_available(PersonId(2), &alt(1, 2, 6)));
        tt.commit(PersonId(2), TourId(2), &alt(1, 2, 6)).unwrap();
        assert_eq!(tt.unit_count(), 2);
        assert_eq!(tt.tour_count(), 2);
    }

    #[test]
    fn commit_all_counts_new_tours() {
        let alts = TddAlts::from_spans(1, &[(1, 3), (3, 5), (6, 8)]).unwrap();
        let mut tt = table();
        let added = tt
            .commit_all(
                vec![
                    (P, TourId(1), TddAltId(1)),
                    (P, TourId(2), TddAltId(2)),
                    (P, TourId(1), TddAltId(1)),
                    (PersonId(2), TourId(3), TddAltId(3)),
                ],
                &alts,
            )
            .unwrap();
        assert_eq!(added, 3);
    }
}

// ── Filtering ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod filtering {
    use super::*;

    #[test]
    fn filter_is_elementwise() {
        let alts = TddAlts::from_spans(1, &[(1, 1), (1, 4), (2, 5), (4, 6)]).unwrap();
        let mut tt = table();
        tt.commit(P, TourId(1), alts.require(TddAltId(2)).unwrap()).unwrap();

        let units = [P, P, P, P, PersonId(2)];
        let tdds = [TddAltId(1), TddAltId(2), TddAltId(3), TddAltId(4), TddAltId(3)];
        let ok = tt.filter_alternatives(&units, &tdds, &alts).unwrap();
        assert_eq!(ok, vec![true, false, false, true, true]);
    }

    #[test]
    fn later_start_overlapping_alternative_is_excluded() {
        // (3,6) overlaps a committed (1,4) in periods 3..4.
        let alts = TddAlts::from_spans(1, &[(1, 1), (1, 4), (2, 5), (3, 6)]).unwrap();
        let mut tt = table();
        tt.commit(P, TourId(1), alts.require(TddAltId(2)).unwrap()).unwrap();
        assert_eq!(tt.available_alternatives(P, &alts), vec![TddAltId(1)]);
    }

    #[test]
    fn filter_length_mismatch() {
        let alts = TddAlts::from_spans(1, &[(1, 1)]).unwrap();
        assert!(matches!(
            table().filter_alternatives(&[P, P], &[TddAltId(1)], &alts),
            Err(TimetableError::LengthMismatch { expected: 2, got: 1, .. })
        ));
    }

    #[test]
    fn filter_unknown_alternative() {
        let alts = TddAlts::from_spans(1, &[(1, 1)]).unwrap();
        assert!(matches!(
            table().filter_alternatives(&[P], &[TddAltId(7)], &alts),
            Err(TimetableError::UnknownAlternative(TddAltId(7)))
        ));
    }

    #[test]
    fn empty_window_allows_everything_in_day() {
        let day = DayConfig { periods: 10, ..DayConfig::default() };
        let alts = TddAlts::all_spans(&day, 0);
        assert_eq!(table().available_alternatives(P, &alts).len(), alts.len());
    }
}

// ── Window queries ────────────────────────────────────────────────────────────

#[cfg(test)]
mod queries {
    use super::*;

    fn busy() -> Timetable<PersonId> {
        let mut tt = table();
        tt.commit(P, TourId(1), &alt(1, 2, 4)).unwrap();
        tt.commit(P, TourId(2), &alt(2, 7, 7)).unwrap();
        tt
    }

    #[test]
    fn previous_tour_is_last_committed() {
        let tt = busy();
        assert_eq!(tt.previous_tour(P).unwrap().tour, TourId(2));
        assert_eq!(tt.previous_tour_window(P), Some((Period(7), Period(7))));
        assert!(tt.previous_tour(PersonId(9)).is_none());
    }

    #[test]
    fn find_tour_across_units() {
        let tt = busy();
        let (unit, t) = tt.find_tour(TourId(1)).unwrap();
        assert_eq!(unit, P);
        assert_eq!((t.start, t.end), (Period(2), Period(4)));
    }

    #[test]
    fn occupied_and_free_blocks() {
        let tt = busy();
        assert_eq!(tt.occupied_periods(P), vec![Period(2), Period(3), Period(4), Period(7)]);
        // Free runs: 0-1, 5-6, 8-9.
        assert_eq!(tt.max_free_block(P), 2);
        assert_eq!(tt.max_free_block(PersonId(9)), 10);
    }

    #[test]
    fn adjacent_free_periods() {
        let tt = busy();
        assert_eq!(tt.adjacent_free_before(P, Period(2)), 2);
        assert_eq!(tt.adjacent_free_after(P, Period(4)), 2);
        assert_eq!(tt.adjacent_free_after(P, Period(7)), 2);
        assert_eq!(tt.adjacent_free_before(P, Period(3)), 0);
        assert_eq!(tt.adjacent_free_before(PersonId(9), Period(3)), 3);
        assert_eq!(tt.adjacent_free_after(PersonId(9), Period(3)), 6);
    }

    #[test]
    fn overlay_replays_tours() {
        let mut base = busy();
        let mut extra = table();
        extra.commit(P, TourId(3), &alt(3, 4, 6)).unwrap();
        extra.commit(PersonId(2), TourId(4), &alt(4, 0, 9)).unwrap();
        assert_eq!(base.overlay(&extra).unwrap(), 2);
        assert_eq!(base.tours(P).len(), 3);
        // Overlaying again is a no-op.
        assert_eq!(base.overlay(&extra).unwrap(), 0);
    }

    #[test]
    fn overlay_conflict_is_error() {
        let mut base = busy();
        let mut extra = table();
        extra.commit(P, TourId(3), &alt(3, 3, 5)).unwrap();
        assert!(matches!(base.overlay(&extra), Err(TimetableError::Conflict { .. })));
        assert!(matches!(
            base.overlay(&Timetable::new(12)),
            Err(TimetableError::LengthMismatch { .. })
        ));
    }
}

// ── Loader and persistence ────────────────────────────────────────────────────

#[cfg(test)]
mod io {
    use super::*;

    #[test]
    fn load_tdd_csv() {
        let csv = "tdd,start,end,duration\n2,1,4,3\n1,1,1,0\n";
        let alts = load_tdd_alts_reader(Cursor::new(csv)).unwrap();
        assert_eq!(alts.as_slice(), &[alt(1, 1, 1), alt(2, 1, 4)]);
    }

    #[test]
    fn load_tdd_csv_without_duration() {
        let csv = "tdd,start,end\n1,0,5\n";
        let alts = load_tdd_alts_reader(Cursor::new(csv)).unwrap();
        assert_eq!(alts.get(TddAltId(1)).unwrap().duration(), 5);
    }

    #[test]
    fn load_tdd_csv_bad_duration() {
        let csv = "tdd,start,end,duration\n1,1,4,2\n";
        assert!(matches!(load_tdd_alts_reader(Cursor::new(csv)), Err(TimetableError::Parse(_))));
    }

    #[test]
    fn windows_round_trip_preserves_commit_order() {
        let mut tt = table();
        tt.commit(PersonId(8), TourId(80), &alt(1, 1, 1)).unwrap();
        tt.commit(PersonId(7), TourId(71), &alt(9, 4, 6)).unwrap();
        tt.commit(PersonId(7), TourId(70), &alt(2, 1, 4)).unwrap();

        let mut buf = Vec::new();
        write_windows(&tt, &mut buf).unwrap();
        let text = String::from_utf8(buf.clone()).unwrap();
        assert!(text.starts_with("unit,tour,tdd,start,end\n7,71,9,4,6\n7,70,2,1,4\n"));

        let back: Timetable<PersonId> = read_windows(Cursor::new(buf), 10).unwrap();
        assert_eq!(back, tt);
        assert_eq!(back.previous_tour(PersonId(7)).unwrap().tour, TourId(70));
    }

    struct BrokenPipe;

    impl std::io::Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn write_failure_is_io_error() {
        let mut tt = table();
        tt.commit(P, TourId(1), &alt(1, 2, 4)).unwrap();
        assert!(matches!(write_windows(&tt, BrokenPipe), Err(TimetableError::Io(_))));
    }

    #[test]
    fn read_windows_rejects_overlap() {
        let csv = "unit,tour,tdd,start,end\n1,1,1,2,4\n1,2,2,3,5\n";
        let res: Result<Timetable<PersonId>, _> = read_windows(Cursor::new(csv), 10);
        assert!(matches!(res, Err(TimetableError::Conflict { .. })));
    }
}

// ── Tour map ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod rendering {
    use super::*;

    #[test]
    fn glyphs_per_period() {
        let mut tt = table();
        tt.commit(P, TourId(1), &alt(1, 1, 3)).unwrap();
        tt.commit(P, TourId(2), &alt(2, 3, 5)).unwrap();
        tt.commit(P, TourId(3), &alt(3, 7, 7)).unwrap();
        tt.commit(P, TourId(4), &alt(4, 8, 9)).unwrap();
        tt.commit(P, TourId(5), &alt(5, 9, 9)).unwrap();
        assert_eq!(render_window(tt.window(P).unwrap()), ".<=x=>.o<*");
    }

    #[test]
    fn map_includes_requested_units() {
        let mut tt = Timetable::new(4);
        tt.commit(TourId(5), TourId(50), &alt(1, 0, 2)).unwrap();
        let map = tour_map(&tt, &[TourId(5), TourId(6)]);
        let lines: Vec<&str> = map.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("|0123|"));
        assert!(lines[1].starts_with("TourId(5) |<=>.|"));
        assert!(lines[2].ends_with("|....|"));
    }
}

// ── Properties ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod props {
    use proptest::prelude::*;

    use super::*;

    fn compatible(a: (u16, u16), b: (u16, u16)) -> bool {
        a.1 <= b.0 || b.1 <= a.0
    }

    proptest! {
        /// The flag-based check agrees with the closed-interval rule, and
        /// committed tours stay pairwise compatible.
        #[test]
        fn flags_match_interval_rule(spans in prop::collection::vec((0u16..12, 0u16..6), 1..25)) {
            let mut tt: Timetable<PersonId> = Timetable::new(18);
            let mut placed: Vec<(u16, u16)> = Vec::new();
            for (i, (s, d)) in spans.into_iter().enumerate() {
                let candidate = alt(i as u32, s, s + d);
                let expected = placed.iter().all(|&p| compatible(p, (s, s + d)));
                prop_assert_eq!(tt.is_available(P, &candidate), expected);
                if expected {
                    tt.commit(P, TourId(i as u32), &candidate).unwrap();
                    placed.push((s, s + d));
                } else {
                    prop_assert!(tt.commit(P, TourId(i as u32), &candidate).is_err());
                }
            }
            let tours = tt.tours(P);
            for (i, a) in tours.iter().enumerate() {
                for b in &tours[i + 1..] {
                    prop_assert!(compatible((a.start.0, a.end.0), (b.start.0, b.end.0)));
                }
            }
        }
    }
}
