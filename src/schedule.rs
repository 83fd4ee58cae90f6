//! Due-date bucketing and display ordering.
//!
//! This module is the scheduling core: it takes an immutable snapshot of
//! items plus a wall-clock instant and partitions the unfinished ones into
//! the four display sections (overdue, today, soon, later). It performs no
//! I/O and never mutates items; rendering is handled elsewhere.

use chrono::{DateTime, Days, Duration, Local, Timelike};

use crate::task::Item;

/// Urgency class handed to the renderer alongside each section.
///
/// Never-due items share the `Later` severity since they trail that section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Overdue = 0,
    Today = 1,
    Soon = 2,
    Later = 3,
}

/// The bucketed, ordered view of one snapshot.
///
/// Each section is sorted ascending by due date with input order preserved on
/// ties; never-due items are appended to `later`, themselves ordered by
/// ascending (priority, id). Empty sections stay empty so the renderer can
/// skip their headers.
#[derive(Debug, Default)]
pub struct Agenda<'a> {
    pub overdue: Vec<&'a Item>,
    pub today: Vec<&'a Item>,
    pub soon: Vec<&'a Item>,
    pub later: Vec<&'a Item>,
}

impl<'a> Agenda<'a> {
    pub fn is_empty(&self) -> bool {
        self.overdue.is_empty() && self.today.is_empty() && self.soon.is_empty() && self.later.is_empty()
    }
}

/// Partition a snapshot into unfinished and finished items, keeping order.
pub fn split_finished(items: &[Item]) -> (Vec<&Item>, Vec<&Item>) {
    let mut pending = Vec::new();
    let mut done = Vec::new();
    for item in items {
        if item.finished {
            done.push(item);
        } else {
            pending.push(item);
        }
    }
    (pending, done)
}

/// Bucket boundary: `now` truncated to the minute, plus `days` calendar days,
/// plus a one-minute pad so an item due exactly `days` * 24h out still lands
/// inside the boundary.
fn horizon(now: DateTime<Local>, days: u64) -> DateTime<Local> {
    let wall = now
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now);
    let shifted = wall
        .checked_add_days(Days::new(days))
        .unwrap_or(wall + Duration::days(days as i64));
    shifted + Duration::minutes(1)
}

/// Assign every unfinished item to exactly one urgency bucket and order each
/// bucket for display.
///
/// Classification, evaluated in order per item: no due date -> never;
/// due before `now` -> overdue (a due date equal to `now` is not before it
/// and falls through); due before the one-day horizon -> today; due before
/// the seven-day horizon -> soon; everything else -> later. Pure function of
/// `(pending, now)`.
pub fn build_agenda<'a>(pending: &[&'a Item], now: DateTime<Local>) -> Agenda<'a> {
    let today_end = horizon(now, 1);
    let soon_end = horizon(now, 7);

    let mut agenda = Agenda::default();
    let mut never: Vec<&Item> = Vec::new();

    for &item in pending {
        match item.due {
            None => never.push(item),
            Some(due) if due < now => agenda.overdue.push(item),
            Some(due) if due < today_end => agenda.today.push(item),
            Some(due) if due < soon_end => agenda.soon.push(item),
            Some(_) => agenda.later.push(item),
        }
    }

    // Stable sort keeps input order across equal due dates.
    agenda.overdue.sort_by_key(|t| t.due);
    agenda.today.sort_by_key(|t| t.due);
    agenda.soon.sort_by_key(|t| t.due);
    agenda.later.sort_by_key(|t| t.due);

    never.sort_by_key(|t| (t.priority, t.id));
    agenda.later.extend(never);

    agenda
}

/// Column width for item ids, from the magnitude of the largest assigned id.
pub fn id_width(next_id: u64) -> usize {
    let largest = next_id.saturating_sub(1).max(1);
    (largest.ilog10() + 1) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{Priority, TaskLength};
    use chrono::TimeZone;

    fn item(id: u64, due: Option<DateTime<Local>>, priority: Priority) -> Item {
        Item {
            id,
            name: format!("item {id}"),
            due,
            start: None,
            length: TaskLength::Short,
            priority,
            finished: false,
            tags: Vec::new(),
        }
    }

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn ids(section: &[&Item]) -> Vec<u64> {
        section.iter().map(|t| t.id).collect()
    }

    #[test]
    fn split_finished_partitions_in_order() {
        let items = vec![
            item(1, None, Priority::Normal),
            Item { finished: true, ..item(2, None, Priority::Normal) },
            item(3, None, Priority::Normal),
        ];
        let (pending, done) = split_finished(&items);
        assert_eq!(ids(&pending), vec![1, 3]);
        assert_eq!(ids(&done), vec![2]);
    }

    #[test]
    fn empty_input_yields_empty_agenda() {
        let agenda = build_agenda(&[], at(2024, 1, 10, 9, 0));
        assert!(agenda.is_empty());
    }

    #[test]
    fn five_way_classification() {
        // now = 2024-01-10 09:00; one item per bucket.
        let now = at(2024, 1, 10, 9, 0);
        let a = item(1, Some(at(2024, 1, 9, 8, 0)), Priority::Normal);
        let b = item(2, None, Priority::High);
        let c = item(3, Some(at(2024, 1, 10, 10, 0)), Priority::Normal);
        let d = item(4, Some(at(2024, 1, 12, 9, 0)), Priority::Normal);
        let e = item(5, Some(at(2024, 2, 1, 9, 0)), Priority::Normal);
        let all = [&a, &b, &c, &d, &e];

        let agenda = build_agenda(&all, now);
        assert_eq!(ids(&agenda.overdue), vec![1]);
        assert_eq!(ids(&agenda.today), vec![3]);
        assert_eq!(ids(&agenda.soon), vec![4]);
        assert_eq!(ids(&agenda.later), vec![5, 2]);
    }

    #[test]
    fn every_item_lands_in_exactly_one_bucket() {
        let now = at(2024, 1, 10, 9, 0);
        let items: Vec<Item> = (0..40)
            .map(|i| {
                let due = match i % 5 {
                    0 => None,
                    1 => Some(at(2024, 1, 1 + (i as u32 % 9), 12, 0)),
                    2 => Some(at(2024, 1, 10, 9 + (i as u32 % 12), 0)),
                    3 => Some(at(2024, 1, 13, 9, 0)),
                    _ => Some(at(2024, 3, 1, 9, 0)),
                };
                item(i, due, Priority::Normal)
            })
            .collect();
        let refs: Vec<&Item> = items.iter().collect();

        let agenda = build_agenda(&refs, now);
        let mut seen: Vec<u64> = Vec::new();
        seen.extend(ids(&agenda.overdue));
        seen.extend(ids(&agenda.today));
        seen.extend(ids(&agenda.soon));
        seen.extend(ids(&agenda.later));
        seen.sort_unstable();
        assert_eq!(seen, (0..40).collect::<Vec<u64>>());
    }

    #[test]
    fn due_equal_to_now_is_not_overdue() {
        let now = at(2024, 1, 10, 9, 0);
        let x = item(1, Some(now), Priority::Normal);
        let agenda = build_agenda(&[&x], now);
        assert!(agenda.overdue.is_empty());
        assert_eq!(ids(&agenda.today), vec![1]);
    }

    #[test]
    fn due_just_before_now_is_overdue() {
        let now = at(2024, 1, 10, 9, 0);
        let x = item(1, Some(now - Duration::seconds(1)), Priority::Normal);
        let agenda = build_agenda(&[&x], now);
        assert_eq!(ids(&agenda.overdue), vec![1]);
    }

    #[test]
    fn due_exactly_one_day_out_is_today() {
        // The one-minute pad keeps a 24h-out item in the today section even
        // when `now` carries seconds.
        let now = at(2024, 1, 10, 9, 0) + Duration::seconds(30);
        let x = item(1, Some(now + Duration::days(1)), Priority::Normal);
        let agenda = build_agenda(&[&x], now);
        assert_eq!(ids(&agenda.today), vec![1]);
    }

    #[test]
    fn seven_day_boundary_splits_soon_and_later() {
        let now = at(2024, 1, 10, 9, 0);
        let inside = item(1, Some(at(2024, 1, 17, 9, 0)), Priority::Normal);
        let outside = item(2, Some(at(2024, 1, 17, 9, 2)), Priority::Normal);
        let agenda = build_agenda(&[&inside, &outside], now);
        assert_eq!(ids(&agenda.soon), vec![1]);
        assert_eq!(ids(&agenda.later), vec![2]);
    }

    #[test]
    fn sentinel_due_goes_to_never_regardless_of_now() {
        let x = item(1, None, Priority::Low);
        for now in [at(1990, 6, 1, 0, 0), at(2024, 1, 10, 9, 0), at(2099, 12, 31, 23, 59)] {
            let agenda = build_agenda(&[&x], now);
            assert_eq!(ids(&agenda.later), vec![1]);
        }
    }

    #[test]
    fn sections_sort_by_ascending_due() {
        let now = at(2024, 1, 10, 9, 0);
        let late2 = item(1, Some(at(2024, 1, 9, 12, 0)), Priority::Normal);
        let late1 = item(2, Some(at(2024, 1, 8, 12, 0)), Priority::Normal);
        let agenda = build_agenda(&[&late2, &late1], now);
        assert_eq!(ids(&agenda.overdue), vec![2, 1]);
    }

    #[test]
    fn equal_due_dates_keep_input_order() {
        let now = at(2024, 1, 10, 9, 0);
        let due = at(2024, 1, 9, 12, 0);
        let x = item(7, Some(due), Priority::Normal);
        let y = item(3, Some(due), Priority::Normal);
        let agenda = build_agenda(&[&x, &y], now);
        assert_eq!(ids(&agenda.overdue), vec![7, 3]);
    }

    #[test]
    fn never_items_order_by_priority_then_id() {
        let now = at(2024, 1, 10, 9, 0);
        let a = item(5, None, Priority::Low);
        let b = item(4, None, Priority::High);
        let c = item(2, None, Priority::Normal);
        let d = item(1, None, Priority::Normal);
        let agenda = build_agenda(&[&a, &b, &c, &d], now);
        assert_eq!(ids(&agenda.later), vec![4, 1, 2, 5]);
    }

    #[test]
    fn never_items_trail_dated_later_items() {
        let now = at(2024, 1, 10, 9, 0);
        let never = item(1, None, Priority::High);
        let dated = item(2, Some(at(2024, 6, 1, 9, 0)), Priority::Low);
        let agenda = build_agenda(&[&never, &dated], now);
        assert_eq!(ids(&agenda.later), vec![2, 1]);
    }

    #[test]
    fn id_width_counts_digits_of_largest_assigned_id() {
        assert_eq!(id_width(1), 1); // empty store
        assert_eq!(id_width(2), 1);
        assert_eq!(id_width(10), 1);
        assert_eq!(id_width(11), 2);
        assert_eq!(id_width(101), 3);
    }
}
