use chrono::{DateTime, Duration, Utc};
use world_level_core::RerollRecord;
use world_level_system_reroll::{consumed, next_utc_midnight, RerollDenial, RerollLimiter};

fn at(text: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(text)
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

#[test]
fn first_reroll_is_always_allowed() {
    let limiter = RerollLimiter::default();
    assert!(limiter.can_reroll(&RerollRecord::default(), at("2024-05-01T10:00:00Z")));
}

#[test]
fn cooldown_boundary_is_inclusive() {
    let limiter = RerollLimiter::new(Duration::minutes(5), 10);
    let t0 = at("2024-05-01T10:00:00Z");
    let record = consumed(RerollRecord::default(), t0);

    let just_before = t0 + Duration::minutes(5) - Duration::seconds(1);
    assert!(!limiter.can_reroll(&record, just_before));
    assert!(limiter.can_reroll(&record, t0 + Duration::minutes(5)));
}

#[test]
fn daily_cap_blocks_until_counters_reset() {
    let limiter = RerollLimiter::new(Duration::minutes(5), 3);
    let mut now = at("2024-05-01T08:00:00Z");
    let next_reset = next_utc_midnight(now);
    let mut record = RerollRecord::default();

    for _ in 0..3 {
        assert!(limiter.check(&record, now, next_reset).is_ok());
        record = consumed(record, now);
        now += Duration::minutes(5);
    }

    assert_eq!(limiter.remaining_today(&record), 0);
    match limiter.check(&record, now, next_reset) {
        Err(RerollDenial::DailyCapReached { cap, resets_in }) => {
            assert_eq!(cap, 3);
            assert_eq!(resets_in, next_reset - now);
        }
        other => panic!("expected cap denial, got {other:?}"),
    }

    let after_reset = RerollRecord {
        used_today: 0,
        ..record
    };
    assert!(limiter.check(&after_reset, next_reset, next_utc_midnight(next_reset)).is_ok());
}

#[test]
fn cooldown_is_reported_before_the_cap() {
    let limiter = RerollLimiter::new(Duration::minutes(5), 1);
    let t0 = at("2024-05-01T08:00:00Z");
    let record = consumed(RerollRecord::default(), t0);
    let denial = limiter
        .check(&record, t0 + Duration::minutes(1), next_utc_midnight(t0))
        .expect_err("cooldown active");
    assert_eq!(
        denial,
        RerollDenial::CoolingDown {
            remaining: Duration::minutes(4)
        }
    );
}
