//! Reduced ADM1 on the reference digester and substrate set.

use std::path::PathBuf;

use ad_core::{Compartment, ReactorParams, ReactorState, STATE_DIM, TimeGrid};
use ad_feed::{FeedSchedule, FeedSlot, FeedingInterval, InfluentBuilder};
use ad_sim::{Adm1Kinetics, BufferedTrace, SimOptions, SimulationTrace, Simulator};
use ad_substrates::SubstrateDatabase;

const DIGESTER: [f64; STATE_DIM] = [
    0.012, 0.0053, 0.099, 0.0116, 0.0132, 0.0158, 0.197, 2.36e-7, 0.055, 0.14738, 0.13, 0.33,
    0.308, 0.028, 0.1027, 0.0295, 0.42, 1.18, 0.243, 0.432, 0.137, 0.76, 0.317, 25.6, 0.5, 0.04,
    0.0252, 0.0115, 0.0131, 0.0157, 0.1964, 0.1375, 0.0028, 1.02e-5, 1.63, 0.0141, 1.0696,
];

fn reference_db() -> SubstrateDatabase {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/substrates.yaml");
    SubstrateDatabase::load(&path).unwrap()
}

fn simulator() -> (Simulator<Adm1Kinetics>, FeedSchedule) {
    let db = reference_db();
    let slots: Vec<FeedSlot> = db.ids().map(|id| FeedSlot::new(id, true)).collect();
    let reactor = ReactorParams::default();
    let builder = InfluentBuilder::new(
        &db,
        &slots,
        FeedingInterval::from_hours(48.0).unwrap(),
        &reactor.chemistry(),
    )
    .unwrap();
    let mut rates = vec![0.0; slots.len()];
    rates[0] = 15.0;
    rates[1] = 10.0;
    let schedule = FeedSchedule::from_rates(slots, vec![rates]).unwrap();
    let kinetics = Adm1Kinetics::new(reactor).unwrap();
    (
        Simulator::new(kinetics, builder, SimOptions::default()),
        schedule,
    )
}

fn digester() -> ReactorState {
    ReactorState::from_slice(&DIGESTER).unwrap()
}

#[test]
fn ten_day_reference_feed_stays_in_domain() {
    let (mut sim, schedule) = simulator();
    let grid = TimeGrid::uniform(9.0, 1.0).unwrap();
    let trace = sim.run(&grid, &digester(), &schedule).unwrap();

    assert_eq!(trace.len(), 10);
    assert!(trace.states[0].bit_eq(&digester()));
    for state in &trace.states {
        assert!(state.as_slice().iter().all(|v| v.is_finite() && *v >= 0.0));
    }
    let last = trace.last().unwrap();
    assert!(last[Compartment::SGasCh4] > 0.0);
    assert!(last[Compartment::PGas] > 0.5 && last[Compartment::PGas] < 2.0);
}

#[test]
fn repeated_runs_are_bit_identical() {
    let grid = TimeGrid::uniform(3.0, 1.0).unwrap();
    let (mut a, schedule) = simulator();
    let (mut b, _) = simulator();
    let first = a.run(&grid, &digester(), &schedule).unwrap();
    let second = b.run(&grid, &digester(), &schedule).unwrap();
    assert!(first.bit_eq(&second));

    let again = a.run(&grid, &digester(), &schedule).unwrap();
    assert!(first.bit_eq(&again));
}

#[test]
fn negative_initial_concentration_diverges_at_start() {
    let (mut sim, schedule) = simulator();
    let grid = TimeGrid::uniform(2.0, 1.0).unwrap();
    let bad = digester().with(Compartment::SAc, -0.01);
    let err = sim.run(&grid, &bad, &schedule).unwrap_err();
    let d = err.divergence().unwrap();
    assert_eq!(d.index, 0);
    assert!(d.last_valid.is_none());
    assert!(d.reason.contains("S_ac"));
}

#[test]
fn buffered_sink_receives_the_full_trace() {
    let grid = TimeGrid::uniform(3.0, 0.5).unwrap();
    let (mut sim, schedule) = simulator();
    let expected = sim.run(&grid, &digester(), &schedule).unwrap();

    let mut buffered = BufferedTrace::new(SimulationTrace::default(), 3);
    sim.run_into(&grid, &digester(), &schedule, &mut buffered, None)
        .unwrap();
    assert_eq!(buffered.pending(), 0);
    assert!(buffered.last_state().unwrap().bit_eq(expected.last().unwrap()));
    let streamed = buffered.into_inner().unwrap();
    assert!(streamed.bit_eq(&expected));
}
