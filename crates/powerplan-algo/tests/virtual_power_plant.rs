//! VPP stochastic model solve tests

use powerplan_algo::mip::{GoodLpSolver, SolveStatus, SolverConfig};
use powerplan_algo::vpp::{expected_series, solve_vpp, VppModel, VppSolution};
use powerplan_core::{
    BatterySpec, DistributedResource, MarketScenario, PlanError, ResourceKind, VppParameters,
};

const TOL: f64 = 1e-5;

fn battery_spec() -> BatterySpec {
    BatterySpec {
        energy_capacity: 80.0,
        min_soc: 0.1,
        max_soc: 0.9,
        initial_soc: 0.5,
        efficiency: 0.9,
        max_charge_rate: 20.0,
        max_discharge_rate: 20.0,
    }
}

fn portfolio() -> Vec<DistributedResource> {
    vec![
        DistributedResource::new("solar", ResourceKind::Solar, 50.0)
            .with_costs(0.0, 5.0)
            .with_ramps(10.0, 10.0)
            .with_availability(vec![0.0, 0.3, 0.8, 1.0, 0.6, 0.1]),
        DistributedResource::new("wind", ResourceKind::Wind, 30.0)
            .with_costs(0.0, 8.0)
            .with_ramps(15.0, 15.0)
            .with_availability(vec![0.4, 0.5, 0.6, 0.7, 0.8, 0.9]),
        DistributedResource::battery("battery", battery_spec())
            .with_costs(2.0, 3.0)
            .with_ramps(20.0, 20.0),
        DistributedResource::new("demand_response", ResourceKind::DemandResponse, 15.0)
            .with_costs(15.0, 0.0)
            .with_ramps(5.0, 5.0),
        DistributedResource::new("ev", ResourceKind::EvCharging, 10.0)
            .with_costs(25.0, 1.0)
            .with_ramps(5.0, 5.0)
            .with_availability(vec![0.2, 0.1, 0.3, 0.5, 0.7, 0.4]),
    ]
}

fn scenarios() -> Vec<MarketScenario> {
    vec![
        MarketScenario::new("high", 0.3, vec![45.0, 52.0, 58.0, 65.0, 72.0, 68.0]),
        MarketScenario::new("base", 0.5, vec![35.0, 38.0, 42.0, 45.0, 48.0, 45.0]),
        MarketScenario::new("low", 0.2, vec![25.0, 28.0, 32.0, 35.0, 38.0, 35.0]),
    ]
}

fn params() -> VppParameters {
    VppParameters {
        time_periods: 6,
        ..VppParameters::default()
    }
}

fn solve() -> VppSolution {
    solve_vpp(&portfolio(), &scenarios(), &params(), &SolverConfig::default())
        .expect("VPP should solve")
}

#[test]
fn test_solution_shape() {
    let solution = solve();
    assert_eq!(solution.status, SolveStatus::Optimal);
    assert_eq!(solution.resources.len(), 5);
    assert_eq!(solution.market_bids.len(), 3);
    for resource in &solution.resources {
        assert_eq!(resource.power.len(), 3);
        assert!(resource.power.iter().all(|p| p.len() == 6));
        assert_eq!(resource.expected_power.len(), 6);
    }
    assert!(solution.resource("battery").unwrap().battery.is_some());
    assert!(solution.resource("solar").unwrap().battery.is_none());
    assert_eq!(solution.battery_audits.len(), 3);
}

#[test]
fn test_probabilities_and_expected_power() {
    let solution = solve();
    let total: f64 = solution.market_bids.iter().map(|b| b.probability).sum();
    assert!((total - 1.0).abs() < 1e-12);

    let scenarios = scenarios();
    for resource in &solution.resources {
        for t in 0..6 {
            let manual: f64 = scenarios
                .iter()
                .enumerate()
                .map(|(s, sc)| sc.probability * resource.power[s][t])
                .sum();
            assert!((resource.expected_power[t] - manual).abs() < 1e-9);
        }
        assert_eq!(
            resource.expected_power,
            expected_series(&resource.power, &scenarios, 6)
        );
    }
}

#[test]
fn test_battery_soc_dynamics() {
    let solution = solve();
    let spec = battery_spec();
    let battery = solution.resource("battery").unwrap();
    let storage = battery.battery.as_ref().unwrap();

    for s in 0..3 {
        assert!((storage.soc[s][0] - spec.initial_soc).abs() < TOL);
        for t in 0..6 {
            let soc = storage.soc[s][t];
            assert!(soc >= spec.min_soc - TOL && soc <= spec.max_soc + TOL);
            let net = storage.discharge[s][t] - storage.charge[s][t];
            assert!((battery.power[s][t] - net).abs() < TOL);
        }
        for t in 1..6 {
            let expected = storage.soc[s][t - 1]
                + (storage.charge[s][t - 1] * spec.efficiency
                    - storage.discharge[s][t - 1] / spec.efficiency)
                    / spec.energy_capacity;
            assert!((storage.soc[s][t] - expected).abs() < TOL, "soc lag at s={s} t={t}");
        }
    }
}

#[test]
fn test_market_balance_and_reserve() {
    let solution = solve();
    let margin = params().reserve_margin;
    for (s, bids) in solution.market_bids.iter().enumerate() {
        for t in 0..6 {
            let net: f64 = solution
                .resources
                .iter()
                .map(|r| {
                    if r.kind == ResourceKind::DemandResponse {
                        -r.power[s][t]
                    } else {
                        r.power[s][t]
                    }
                })
                .sum();
            assert!((net - bids.bids[t]).abs() < TOL, "balance at s={s} t={t}");

            let reserve: f64 = solution.resources.iter().map(|r| r.reserve[s][t]).sum();
            assert!(reserve + TOL >= margin * bids.bids[t]);
        }
    }
}

#[test]
fn test_financial_metrics_match_objective() {
    let solution = solve();
    let m = solution.metrics;
    let identity = m.expected_revenue - m.expected_costs + m.expected_carbon_credits - m.expected_fees;
    assert!((m.expected_profit - identity).abs() < 1e-9);
    assert!(
        (solution.objective - m.expected_profit).abs() < 1e-4 * m.expected_profit.abs().max(1.0),
        "objective {} vs profit {}",
        solution.objective,
        m.expected_profit
    );
    if m.expected_costs > 0.0 {
        assert!((m.roi - m.expected_profit / m.expected_costs).abs() < 1e-9);
    }
}

#[test]
fn test_solve_is_deterministic() {
    let first = solve();
    let second = solve();
    assert!((first.objective - second.objective).abs() < 1e-6);
}

#[test]
fn test_extract_before_solve_fails() {
    let model = VppModel::build(&portfolio(), &scenarios(), &params(), GoodLpSolver::new()).unwrap();
    assert!(matches!(model.extract(), Err(PlanError::NotSolved(_))));
}

#[test]
fn test_short_price_series_rejected() {
    let mut scenarios = scenarios();
    scenarios[2].prices.truncate(4);
    let err = solve_vpp(&portfolio(), &scenarios, &params(), &SolverConfig::default()).unwrap_err();
    assert!(matches!(err, PlanError::Config(_)));
}
