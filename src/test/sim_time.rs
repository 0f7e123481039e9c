use crate::sim::SimTime;

#[test]
fn sim_time_unit_conversions() {
    assert_eq!(SimTime::from_micros(1), SimTime(1_000));
    assert_eq!(SimTime::from_millis(1), SimTime(1_000_000));
    assert_eq!(SimTime::from_secs(1), SimTime(1_000_000_000));
    assert_eq!(SimTime::at_tick(3), SimTime::from_secs(3));
}

#[test]
fn sim_time_unit_conversions_saturate_on_overflow() {
    assert_eq!(SimTime::from_micros(u64::MAX), SimTime(u64::MAX));
    assert_eq!(SimTime::from_millis(u64::MAX), SimTime(u64::MAX));
    assert_eq!(SimTime::from_secs(u64::MAX), SimTime(u64::MAX));
}

#[test]
fn burst_offsets_stay_below_one_tick_for_small_bursts() {
    let gap = SimTime::from_millis(200);
    assert_eq!(gap.times(0), SimTime::ZERO);
    assert!(gap.times(4) < SimTime::from_secs(1));
    assert_eq!(SimTime::from_secs(2).saturating_add(gap.times(2)).as_secs_f64(), 2.4);
    assert_eq!(SimTime(5).saturating_sub(SimTime(9)), SimTime::ZERO);
}
