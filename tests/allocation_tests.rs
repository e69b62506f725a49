use chrono::{DateTime, Duration, TimeZone, Utc};
use training_cadence::{BulkSlotAllocator, SchedulerConfig, SlotAllocator, TrainingCadence};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 3, 8, 0, 0).unwrap()
}

fn days(n: i64) -> DateTime<Utc> {
    now() + Duration::days(n)
}

fn slot_of(date: DateTime<Utc>) -> i64 {
    (date - now()).num_days() / 7
}

#[test]
fn empty_library_defaults_to_one_week_out() {
    let allocator = SlotAllocator::default();
    for cadence in TrainingCadence::ALL {
        assert_eq!(allocator.choose_date(cadence, &[], now()), days(7));
    }
}

#[test]
fn crowded_slot_is_avoided() {
    let allocator = SlotAllocator::default();
    let existing = vec![days(7), days(8), days(10), days(13)];
    let chosen = allocator.choose_date(TrainingCadence::Annually, &existing, now());

    let counts = allocator.occupancy(TrainingCadence::Annually, &existing, now());
    let slot = slot_of(chosen) as usize;
    assert_ne!(slot, 1);
    let min_candidate = counts.iter().skip(1).min().copied().unwrap();
    assert_eq!(counts[slot], min_candidate);
    assert_eq!(chosen, days(17));
}

#[test]
fn least_occupied_slot_wins_with_lowest_index_on_ties() {
    let allocator = SlotAllocator::default();
    // Monthly window: slots 0..=4. Fill slots 1, 2 and 4, leaving 3 empty.
    let existing = vec![days(8), days(15), days(16), days(29), days(2)];
    let chosen = allocator.choose_date(TrainingCadence::Monthly, &existing, now());
    assert_eq!(chosen, days(3 * 7 + 3));
}

#[test]
fn dates_outside_the_window_do_not_count() {
    let allocator = SlotAllocator::default();
    // Past and far-future dates only: every candidate slot is empty.
    let existing = vec![days(-3), days(400)];
    let chosen = allocator.choose_date(TrainingCadence::Quarterly, &existing, now());
    assert_eq!(chosen, days(10));
}

#[test]
fn once_items_use_a_four_week_window() {
    let allocator = SlotAllocator::default();
    let existing = vec![days(7), days(14), days(30)];
    let chosen = allocator.choose_date(TrainingCadence::Once, &existing, now());
    assert_eq!(chosen, days(24));
}

#[test]
fn single_slot_window_falls_back_to_slot_one() {
    let config = SchedulerConfig {
        once_window_days: 5,
        ..SchedulerConfig::default()
    };
    let allocator = SlotAllocator::from_config(&config);
    let chosen = allocator.choose_date(TrainingCadence::Once, &[days(1)], now());
    assert_eq!(chosen, days(10));
}

#[test]
fn never_less_than_a_week_of_notice() {
    let allocator = SlotAllocator::default();
    let scenarios: Vec<Vec<DateTime<Utc>>> = vec![
        vec![],
        vec![days(0)],
        vec![days(7), days(14), days(21), days(28)],
        (0..60).map(days).collect(),
        (0..365).step_by(3).map(days).collect(),
    ];
    for existing in &scenarios {
        for cadence in TrainingCadence::ALL {
            let chosen = allocator.choose_date(cadence, existing, now());
            assert!(chosen >= days(7), "{cadence} chose {chosen}");
        }
    }
}

#[test]
fn choose_date_is_deterministic() {
    let allocator = SlotAllocator::default();
    let existing = vec![days(9), days(40), days(41), days(100)];
    let a = allocator.choose_date(TrainingCadence::SemiAnnually, &existing, now());
    let b = allocator.choose_date(TrainingCadence::SemiAnnually, &existing, now());
    assert_eq!(a, b);
}

#[test]
fn bulk_spreads_same_cadence_across_interval() {
    let allocator = BulkSlotAllocator::default();
    let dates = allocator.choose_dates(
        &[
            TrainingCadence::Annually,
            TrainingCadence::Annually,
            TrainingCadence::Annually,
        ],
        now(),
    );
    assert_eq!(dates, vec![days(7), days(7 + 121), days(7 + 242)]);
}

#[test]
fn bulk_once_items_step_three_days() {
    let allocator = BulkSlotAllocator::default();
    let dates = allocator.choose_dates(&[TrainingCadence::Once, TrainingCadence::Once], now());
    assert_eq!(dates, vec![days(7), days(10)]);
}

#[test]
fn bulk_preserves_input_order_across_groups() {
    let allocator = BulkSlotAllocator::default();
    let dates = allocator.choose_dates(
        &[
            TrainingCadence::Quarterly,
            TrainingCadence::Once,
            TrainingCadence::Monthly,
            TrainingCadence::Quarterly,
            TrainingCadence::Once,
        ],
        now(),
    );
    assert_eq!(
        dates,
        vec![days(7), days(7), days(7), days(7 + 45), days(10)]
    );
}

#[test]
fn bulk_is_deterministic_and_sized_to_input() {
    let allocator = BulkSlotAllocator::default();
    let input = [
        TrainingCadence::Monthly,
        TrainingCadence::Monthly,
        TrainingCadence::SemiAnnually,
    ];
    let a = allocator.choose_dates(&input, now());
    let b = allocator.choose_dates(&input, now());
    assert_eq!(a, b);
    assert_eq!(a.len(), input.len());
    assert!(allocator.choose_dates(&[], now()).is_empty());
}
