//! daily: schedules one synthetic day for a handful of persons.
//!
//! Every person has a mandatory work or school tour followed by zero or more
//! discretionary tours; workers may add an at-work lunch subtour inside
//! their work tour.  Utilities are a toy multinomial logit over preferred
//! departure time and duration.  The run prints the chosen windows, a tour
//! map per person, and per-round diagnostics as JSON, then writes the
//! windows to `output/daily/windows.csv` and reads them back.

use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use abm_choice::{Matrix, sample_choices};
use abm_core::{DayConfig, DrawStream, PersonId, PurposeId, TourId};
use abm_scheduling::{
    Assignment, Chooser, LogitProvider, RoundStats, SchedulerBuilder, SchedulerConfig, Tour,
};
use abm_timetable::{TddAlt, TddAlts, Timetable, read_windows_csv, tour_map, write_windows_csv};

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED: u64 = 42;

const WORK:   PurposeId = PurposeId(0);
const SCHOOL: PurposeId = PurposeId(1);
const SHOP:   PurposeId = PurposeId(2);
const LUNCH:  PurposeId = PurposeId(3);

/// Channels keep the two scheduling steps and destination sampling on
/// independent draw streams.
const TOUR_CHANNEL:    u32 = 1;
const SUBTOUR_CHANNEL: u32 = 2;
const DEST_CHANNEL:    u32 = 3;

/// Size terms of the shopping destination zones.
const ZONE_SIZES: [f64; 5] = [120.0, 40.0, 300.0, 15.0, 60.0];
const DEST_SAMPLES: usize = 4;

// ── Population ────────────────────────────────────────────────────────────────

fn tours() -> Vec<Tour> {
    // (person, mandatory purpose, discretionary tours)
    let persons = [(0, WORK, 1), (1, WORK, 0), (2, SCHOOL, 2), (3, WORK, 2), (4, SCHOOL, 0), (5, WORK, 1)];
    let mut out = Vec::new();
    for (person, mandatory, extra) in persons {
        let id = |k: u32| TourId(person * 10 + k);
        out.push(Tour::new(id(0), PersonId(person), 1, mandatory));
        for k in 0..extra {
            out.push(Tour::new(id(k + 1), PersonId(person), 2 + k as u16, SHOP));
        }
    }
    out
}

fn lunch_subtours(tours: &[Tour]) -> Vec<Tour> {
    tours
        .iter()
        .filter(|t| t.purpose == WORK)
        .map(|t| Tour::new(TourId(t.id.0 + 100), t.person, 1, LUNCH).with_parent(t.id))
        .collect()
}

// ── Utility model ─────────────────────────────────────────────────────────────

/// Preferred `(start, duration)` in periods for each purpose.
fn preference(purpose: PurposeId) -> (f64, f64) {
    match purpose {
        WORK => (3.0, 9.0),
        SCHOOL => (3.0, 7.0),
        SHOP => (12.0, 2.0),
        _ => (7.0, 1.0),
    }
}

fn utility(chooser: &Chooser, alt: &TddAlt) -> f64 {
    let (start, duration) = preference(chooser.purpose);
    let mut u = -0.6 * (alt.start.0 as f64 - start).abs() - 0.4 * (alt.duration() as f64 - duration).abs();
    // Later tours should follow the previous one.
    if chooser.gap_after_previous(alt.start).is_some_and(|gap| gap < 0) {
        u -= 2.0;
    }
    u
}

// ── Output helpers ────────────────────────────────────────────────────────────

fn print_assignments(day: &DayConfig, label: &str, assigned: &[Assignment]) {
    println!("{label}");
    println!("{:<10} {:<10} {:<6} {:<6} {:<6}", "Person", "Tour", "Round", "Depart", "Arrive");
    println!("{}", "-".repeat(42));
    for a in assigned {
        println!(
            "{:<10} {:<10} {:<6} {:<6} {:<6}",
            a.person.0,
            a.tour.0,
            a.round,
            day.label(a.start),
            day.label(a.end),
        );
    }
    println!();
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // 1. Day and alternative table: hourly bins from 05:00.
    let day = DayConfig { periods: 20, minutes_per_period: 60, day_start_minutes: 300 };
    day.validate()?;
    let alts = TddAlts::all_spans(&day, 1);
    println!("=== daily: {} periods, {} alternatives, seed {SEED} ===", day.periods, alts.len());
    println!();

    // 2. Tours.
    let tours = tours();
    let t0 = Instant::now();
    let config = SchedulerConfig { seed: SEED, channel: TOUR_CHANNEL, renormalize: false };
    let mut scheduler = SchedulerBuilder::new(config, day.clone(), alts.clone(), LogitProvider::new(utility)).build()?;
    let mut stats = RoundStats::new();
    let assigned = scheduler.schedule_tours(&tours, &mut stats)?;
    print_assignments(&day, "Tours", &assigned);

    // 3. At-work subtours, on their own channel.
    let subtours = lunch_subtours(&tours);
    let sub_config = SchedulerConfig { seed: SEED, channel: SUBTOUR_CHANNEL, renormalize: false };
    let mut sub_scheduler = SchedulerBuilder::new(sub_config, day.clone(), alts, LogitProvider::new(utility)).build()?;
    let sub_assigned = sub_scheduler.schedule_subtours(&assigned, &subtours, &mut stats)?;
    print_assignments(&day, "At-work subtours", &sub_assigned);
    println!("Scheduled {} tours in {:.3} ms", assigned.len() + sub_assigned.len(), t0.elapsed().as_secs_f64() * 1e3);
    println!();

    // 4. Tour map.
    let windows = scheduler.into_timetable();
    print!("{}", tour_map(&windows, &[]));
    println!();

    // 5. Destination pre-sampling for shopping tours: sampling with replacement
    //    over zone size terms.
    let shopping: Vec<&Assignment> = assigned
        .iter()
        .filter(|a| tours.iter().any(|t| t.id == a.tour && t.purpose == SHOP))
        .collect();
    if !shopping.is_empty() {
        let total: f64 = ZONE_SIZES.iter().sum();
        let weights: Vec<f64> = ZONE_SIZES.iter().map(|s| s / total).collect();
        let probs = Matrix::from_rows(&vec![weights; shopping.len()])?;
        let stream = DrawStream::new(SEED).channel(DEST_CHANNEL);
        let draw_rows: Vec<Vec<f64>> = shopping.iter().map(|a| stream.uniforms(a.tour.raw(), 0, DEST_SAMPLES)).collect();
        let draws = Matrix::from_rows(&draw_rows)?;
        let zones: Vec<u32> = (1..=ZONE_SIZES.len() as u32).collect();
        let samples = sample_choices(&probs, &draws, &zones)?;
        for (a, row) in shopping.iter().zip(&samples.rows) {
            let picks: Vec<String> = row
                .pick_counts()
                .iter()
                .map(|(zone, p, n)| format!("zone {zone} (p={p:.2}) x{n}"))
                .collect();
            println!("Tour {:<4} destinations: {}", a.tour.0, picks.join(", "));
        }
        println!();
    }

    // 6. Diagnostics.
    println!("Rounds: {}  |  choices: {}  |  residual fallbacks: {}", stats.round_count(), stats.choices, stats.residuals);
    println!("{}", serde_json::to_string_pretty(&stats.rounds)?);
    println!();

    // 7. Persist windows and read them back.
    std::fs::create_dir_all("output/daily")?;
    let path = Path::new("output/daily/windows.csv");
    write_windows_csv(&windows, path)?;
    let reloaded: Timetable<PersonId> = read_windows_csv(path, day.periods)?;
    anyhow::ensure!(reloaded == windows, "reloaded windows differ from the scheduled ones");
    println!("Wrote {} ({} tours) and read it back", path.display(), reloaded.tour_count());

    // 8. Free time left per person.
    println!();
    println!("{:<10} {:<10} {:<10}", "Person", "Free block", "Busy");
    println!("{}", "-".repeat(30));
    for person in reloaded.units() {
        println!(
            "{:<10} {:<10} {:<10}",
            person.0,
            reloaded.max_free_block(person),
            reloaded.occupied_periods(person).len(),
        );
    }
    let last = day.last_period();
    println!("Day ends at {} (period {last})", day.label(last));

    Ok(())
}
