//! Property tests for aggregation, mapping and report ordering.

use chrono::TimeZone;
use chrono_tz::Europe::London;
use power_position::domain::aggregation::aggregate_by_period;
use power_position::domain::period_mapper::period_to_hour;
use power_position::domain::report::PositionReport;
use power_position::domain::report_period::ReportPeriod;
use power_position::domain::trade::{PowerPeriod, PowerTrade};
use proptest::prelude::*;

fn trading_day_hours() -> Vec<u32> {
    let mut hours = vec![23];
    hours.extend(0..=22);
    hours
}

fn trades_strategy() -> impl Strategy<Value = Vec<PowerTrade>> {
    prop::collection::vec(
        prop::collection::vec((1i32..=24, 0.0f64..1_000.0), 0..30),
        0..8,
    )
    .prop_map(|trades| {
        trades
            .into_iter()
            .enumerate()
            .map(|(i, periods)| {
                PowerTrade::new(
                    format!("T{i}"),
                    periods
                        .into_iter()
                        .map(|(p, v)| PowerPeriod::new(p, v))
                        .collect(),
                )
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn aggregation_ignores_trade_order(trades in trades_strategy()) {
        let forward = aggregate_by_period(&trades);
        let mut reversed = trades.clone();
        reversed.reverse();
        let backward = aggregate_by_period(&reversed);

        prop_assert_eq!(forward.keys().collect::<Vec<_>>(), backward.keys().collect::<Vec<_>>());
        for (period, total) in &forward {
            prop_assert!(approx::relative_eq!(*total, backward[period], max_relative = 1e-9));
        }
    }

    #[test]
    fn any_permutation_of_a_full_day_is_stored_in_trading_order(
        hours in Just((0..24).collect::<Vec<i32>>()).prop_shuffle()
    ) {
        let ts = London.with_ymd_and_hms(2025, 9, 26, 15, 0, 0).unwrap();
        let periods: Vec<ReportPeriod> = hours
            .iter()
            .map(|&h| ReportPeriod::new(h, h as f64).unwrap())
            .collect();

        let report = PositionReport::new(ts, periods).unwrap();

        let stored: Vec<u32> = report.periods().iter().map(|p| p.hour()).collect();
        prop_assert_eq!(stored, trading_day_hours());
        for p in report.periods() {
            prop_assert_eq!(p.volume(), p.hour() as f64);
        }
    }

    #[test]
    fn duplicate_hours_are_always_named(
        hours in prop::collection::vec(0i32..24, 1..40),
        dup in 0i32..24,
    ) {
        let ts = London.with_ymd_and_hms(2025, 9, 26, 15, 0, 0).unwrap();
        let mut periods: Vec<ReportPeriod> =
            hours.iter().map(|&h| ReportPeriod::new(h, 1.0).unwrap()).collect();
        periods.push(ReportPeriod::new(dup, 1.0).unwrap());
        periods.push(ReportPeriod::new(dup, 2.0).unwrap());

        let err = PositionReport::new(ts, periods).unwrap_err().to_string();

        let dup_label = format!("{:02}:00", dup);
        prop_assert!(err.contains(&dup_label));
        let mut seen = std::collections::HashMap::new();
        for h in &hours {
            *seen.entry(*h).or_insert(0) += 1;
        }
        for (h, n) in seen {
            if n > 1 {
                let label = format!("{:02}:00", h);
                prop_assert!(err.contains(&label));
            }
        }
    }

    #[test]
    fn mapper_covers_the_day_once(p in 1i32..=24) {
        let h = period_to_hour(p);
        prop_assert!((0..=23).contains(&h));
        prop_assert_eq!(period_to_hour(p), h);
    }
}
