//! Episode numbering for concurrent registrations.
//!
//! Each patient's concurrent registrations are ordered by waitlist end date
//! and cut into listing windows: a window closes once every registration in
//! it has left the list before any later one was listed. A new window always
//! opens a new episode.
//!
//! Inside a window, missing transplant dates are filled forward then backward,
//! and adjacent rows that recorded different dates for the same transplant
//! are aligned on the later row's date. The window is then scanned once as a
//! fold over [`EpisodeState`]: a registration opens a new episode when its
//! transplant date differs from the one the episode carries, or when it was
//! listed on or after that transplant.
//!
//! Fills never cross a window, so a transplant recorded after a listing gap
//! cannot reach the listings before it.

use std::cmp::Ordering;
use std::ops::Range;

use chrono::NaiveDate;

use waitlist_model::{ClassifiedRegistration, ListType};

use crate::fill::{fill_backward_where, fill_forward_where};
use crate::partition::partition_by_patient;

/// The part of a registration the episode scan looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeRow {
    pub list_date: NaiveDate,
    pub waitlist_end_date: NaiveDate,
    pub transplant_date: Option<NaiveDate>,
}

impl From<&ClassifiedRegistration> for EpisodeRow {
    fn from(registration: &ClassifiedRegistration) -> Self {
        Self {
            list_date: registration.list_date(),
            waitlist_end_date: registration.waitlist_end_date(),
            transplant_date: registration.transplant_date(),
        }
    }
}

/// State carried from one row of the scan to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeState {
    pub episode_number: u32,
    /// Transplant date of the current episode, if one is known.
    pub transplant_date: Option<NaiveDate>,
}

impl EpisodeState {
    /// State for the first row of a window.
    pub fn first(row: &EpisodeRow, episode_number: u32) -> Self {
        Self {
            episode_number,
            transplant_date: row.transplant_date,
        }
    }
}

/// Whether `row` belongs to a different transplant cycle than `previous`.
pub fn starts_new_episode(previous: &EpisodeState, row: &EpisodeRow) -> bool {
    match (previous.transplant_date, row.transplant_date) {
        (carried, Some(current)) => carried != Some(current),
        // Relisted after the previous episode's transplant.
        (Some(carried), None) => row.list_date >= carried,
        (None, None) => false,
    }
}

/// One step of the numbering fold.
pub fn next_state(previous: &EpisodeState, row: &EpisodeRow) -> EpisodeState {
    if starts_new_episode(previous, row) {
        EpisodeState {
            episode_number: previous.episode_number + 1,
            transplant_date: row.transplant_date,
        }
    } else {
        EpisodeState {
            episode_number: previous.episode_number,
            transplant_date: row.transplant_date.or(previous.transplant_date),
        }
    }
}

/// Run the numbering fold over one listing window, numbering from
/// `first_episode`.
pub fn scan_episodes(rows: &[EpisodeRow], first_episode: u32) -> Vec<EpisodeState> {
    let mut iter = rows.iter();
    let Some(first) = iter.next() else {
        return Vec::new();
    };
    let initial = EpisodeState::first(first, first_episode);
    std::iter::once(initial)
        .chain(iter.scan(initial, |state, row| {
            *state = next_state(state, row);
            Some(*state)
        }))
        .collect()
}

/// Cut scan-ordered rows into listing windows.
///
/// A window ends before row `i` when every row ahead of `i` left the list no
/// later than the earliest listing among `i` and the rows after it. A row
/// that sorts late but was listed early keeps the window open.
pub fn listing_windows(rows: &[EpisodeRow]) -> Vec<Range<usize>> {
    let mut earliest_later_listing: Vec<NaiveDate> = rows
        .iter()
        .rev()
        .scan(NaiveDate::MAX, |earliest, row| {
            *earliest = (*earliest).min(row.list_date);
            Some(*earliest)
        })
        .collect();
    earliest_later_listing.reverse();

    let mut windows = Vec::new();
    let mut start = 0;
    let mut latest_end = NaiveDate::MIN;
    for (idx, (row, earliest)) in rows.iter().zip(&earliest_later_listing).enumerate() {
        if idx > start && *earliest >= latest_end {
            windows.push(start..idx);
            start = idx;
        }
        latest_end = latest_end.max(row.waitlist_end_date);
    }
    if start < rows.len() {
        windows.push(start..rows.len());
    }
    windows
}

/// Align the transplant dates of one listing window before numbering.
///
/// Missing dates are filled forward from the nearest earlier known date, then
/// backward from the nearest later one; either way only into a registration
/// listed before that transplant. Afterwards, when two adjacent rows carry
/// different dates and the later registration was already listed before the
/// earlier row's transplant, both describe the same transplant and the later
/// row's date overwrites the earlier one, unless it falls before the earlier
/// row's own listing. The overwrite walks bottom-up, so it reaches every
/// earlier row of the same transplant.
pub fn reconcile_transplant_dates(rows: &[EpisodeRow]) -> Vec<Option<NaiveDate>> {
    let recorded: Vec<Option<NaiveDate>> = rows.iter().map(|row| row.transplant_date).collect();
    let listed_before = |idx: usize, transplant: &NaiveDate| rows[idx].list_date < *transplant;
    let forward = fill_forward_where(&recorded, listed_before);
    let filled = fill_backward_where(&forward, listed_before);

    let mut aligned: Vec<Option<NaiveDate>> = rows
        .iter()
        .zip(filled)
        .rev()
        .scan(None::<EpisodeRow>, |later, (row, date)| {
            let value = match (date, *later) {
                (Some(own), Some(next)) => match next.transplant_date {
                    Some(next_date)
                        if next_date != own
                            && next.list_date < own
                            && next_date >= row.list_date =>
                    {
                        Some(next_date)
                    }
                    _ => Some(own),
                },
                (own, _) => own,
            };
            *later = Some(EpisodeRow {
                transplant_date: value,
                ..*row
            });
            Some(value)
        })
        .collect();
    aligned.reverse();
    aligned
}

/// Order concurrent rows for the scan: end date, then list date, then id.
pub fn episode_order(left: &ClassifiedRegistration, right: &ClassifiedRegistration) -> Ordering {
    left.waitlist_end_date()
        .cmp(&right.waitlist_end_date())
        .then_with(|| left.list_date().cmp(&right.list_date()))
        .then_with(|| left.registration_id().cmp(right.registration_id()))
}

/// Number the concurrent registrations of one patient.
///
/// Rows come back in scan order with their aligned transplant dates.
pub fn group_patient_episodes(
    mut rows: Vec<ClassifiedRegistration>,
) -> Vec<ClassifiedRegistration> {
    rows.sort_by(episode_order);
    let scan_rows: Vec<EpisodeRow> = rows.iter().map(EpisodeRow::from).collect();

    let mut dates = Vec::with_capacity(scan_rows.len());
    let mut numbers: Vec<u32> = Vec::with_capacity(scan_rows.len());
    for window in listing_windows(&scan_rows) {
        let window_rows = &scan_rows[window];
        let window_dates = reconcile_transplant_dates(window_rows);
        let aligned: Vec<EpisodeRow> = window_rows
            .iter()
            .zip(&window_dates)
            .map(|(row, date)| EpisodeRow {
                transplant_date: *date,
                ..*row
            })
            .collect();
        let first_episode = numbers.last().map_or(1, |last| last + 1);
        numbers.extend(
            scan_episodes(&aligned, first_episode)
                .iter()
                .map(|state| state.episode_number),
        );
        dates.extend(window_dates);
    }

    rows.into_iter()
        .zip(dates)
        .zip(numbers)
        .map(|((mut row, date), number)| {
            row.resolved.registration.transplant_date = date;
            row.episode_number = number;
            row
        })
        .collect()
}

/// Assign episode numbers across the whole collection.
///
/// Concurrent registrations are numbered per patient from 1; every other
/// registration is set to episode 0.
pub fn assign_episodes(registrations: Vec<ClassifiedRegistration>) -> Vec<ClassifiedRegistration> {
    let mut assigned = Vec::with_capacity(registrations.len());
    for (_, group) in partition_by_patient(registrations, |r| r.patient_id()) {
        let (concurrent, others): (Vec<_>, Vec<_>) = group
            .into_iter()
            .partition(|r| r.list_type == ListType::Concurrent);
        assigned.extend(group_patient_episodes(concurrent));
        assigned.extend(others.into_iter().map(|mut row| {
            row.episode_number = 0;
            row
        }));
    }
    assigned
}
