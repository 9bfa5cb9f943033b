//! Built-in reference cases.
//!
//! The three-unit fleet and the demand patterns reproduce the reference
//! configuration used for regression runs; the VPP portfolio is a 24-hour
//! day with five resources and three price scenarios.

use crate::case::{UcCase, VppCase};
use anyhow::{anyhow, Result};
use powerplan_core::{
    BatterySpec, DistributedResource, Horizon, InitialState, MarketScenario, ResourceKind, Unit,
    VppParameters,
};
use std::fmt;
use std::str::FromStr;

/// Three-unit fleet: a base unit online with two must-run periods left and
/// two offline peaking units.
pub fn reference_units() -> Vec<Unit> {
    vec![
        Unit::new("Unit 1", 80.0, 300.0)
            .with_costs(800.0, 5.0, 100.0, 80.0)
            .with_ramps(100.0, 80.0, 50.0, 30.0)
            .with_min_times(2, 2)
            .with_initial(InitialState::online(120.0).with_must_stay_on(2)),
        Unit::new("Unit 2", 50.0, 200.0)
            .with_costs(500.0, 15.0, 70.0, 50.0)
            .with_ramps(70.0, 50.0, 60.0, 40.0)
            .with_min_times(2, 2),
        Unit::new("Unit 3", 30.0, 100.0)
            .with_costs(250.0, 30.0, 40.0, 30.0)
            .with_ramps(40.0, 30.0, 70.0, 50.0)
            .with_min_times(1, 2),
    ]
}

/// Load shapes available for the reference fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DemandPattern {
    /// Six-period example with a flat reserve of 10 MW
    Example,
    Residential24h,
    Residential24hLarge,
    Residential24hExtraLarge,
    Weekend24h,
    Industrial24h,
}

impl DemandPattern {
    pub const ALL: [DemandPattern; 6] = [
        DemandPattern::Example,
        DemandPattern::Residential24h,
        DemandPattern::Residential24hLarge,
        DemandPattern::Residential24hExtraLarge,
        DemandPattern::Weekend24h,
        DemandPattern::Industrial24h,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DemandPattern::Example => "example",
            DemandPattern::Residential24h => "residential_24h",
            DemandPattern::Residential24hLarge => "residential_24h_large",
            DemandPattern::Residential24hExtraLarge => "residential_24h_extra_large",
            DemandPattern::Weekend24h => "weekend_24h",
            DemandPattern::Industrial24h => "industrial_24h",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            DemandPattern::Example => "6-period example, peak 250 MW",
            DemandPattern::Residential24h => "residential day with an evening peak of 360 MW",
            DemandPattern::Residential24hLarge => "residential day scaled to a 540 MW peak",
            DemandPattern::Residential24hExtraLarge => "residential day scaled to a 502 MW peak",
            DemandPattern::Weekend24h => "late-rising weekend day, peak 330 MW",
            DemandPattern::Industrial24h => "flat daytime industrial load, peak 460 MW",
        }
    }

    /// Planning-period demand and reserve, without the initial period.
    fn series(self) -> (Vec<f64>, Vec<f64>) {
        match self {
            DemandPattern::Example => (
                vec![230.0, 250.0, 200.0, 170.0, 230.0, 190.0],
                vec![10.0; 6],
            ),
            DemandPattern::Residential24h => (
                vec![
                    120.0, 110.0, 105.0, 100.0, 95.0, 90.0, 150.0, 200.0, 250.0, 280.0, 290.0,
                    300.0, 280.0, 260.0, 270.0, 280.0, 290.0, 310.0, 350.0, 360.0, 340.0, 320.0,
                    280.0, 200.0,
                ],
                vec![
                    8.0, 8.0, 7.0, 7.0, 7.0, 6.0, 10.0, 12.0, 15.0, 17.0, 18.0, 18.0, 17.0, 16.0,
                    16.0, 17.0, 17.0, 19.0, 21.0, 22.0, 20.0, 19.0, 17.0, 12.0,
                ],
            ),
            DemandPattern::Residential24hLarge => (
                vec![
                    180.0, 165.0, 158.0, 150.0, 143.0, 135.0, 225.0, 300.0, 375.0, 420.0, 435.0,
                    450.0, 420.0, 390.0, 405.0, 420.0, 435.0, 465.0, 525.0, 540.0, 510.0, 480.0,
                    420.0, 300.0,
                ],
                vec![
                    12.0, 12.0, 11.0, 11.0, 11.0, 9.0, 15.0, 18.0, 23.0, 26.0, 27.0, 27.0, 26.0,
                    24.0, 24.0, 26.0, 26.0, 29.0, 32.0, 33.0, 30.0, 29.0, 26.0, 18.0,
                ],
            ),
            DemandPattern::Residential24hExtraLarge => (
                vec![
                    168.0, 154.0, 147.0, 140.0, 133.0, 126.0, 210.0, 280.0, 350.0, 392.0, 406.0,
                    420.0, 392.0, 364.0, 378.0, 392.0, 406.0, 434.0, 490.0, 502.0, 476.0, 448.0,
                    392.0, 280.0,
                ],
                vec![
                    11.0, 11.0, 10.0, 10.0, 10.0, 9.0, 14.0, 17.0, 21.0, 24.0, 25.0, 25.0, 24.0,
                    23.0, 23.0, 24.0, 24.0, 26.0, 30.0, 31.0, 28.0, 26.0, 24.0, 17.0,
                ],
            ),
            DemandPattern::Weekend24h => (
                vec![
                    130.0, 120.0, 115.0, 110.0, 105.0, 100.0, 120.0, 140.0, 160.0, 180.0, 200.0,
                    220.0, 240.0, 250.0, 260.0, 270.0, 280.0, 290.0, 320.0, 330.0, 310.0, 290.0,
                    250.0, 180.0,
                ],
                vec![
                    8.0, 8.0, 7.0, 7.0, 7.0, 6.0, 8.0, 9.0, 10.0, 11.0, 12.0, 13.0, 14.0, 15.0,
                    16.0, 16.0, 17.0, 17.0, 19.0, 20.0, 19.0, 17.0, 15.0, 11.0,
                ],
            ),
            DemandPattern::Industrial24h => (
                vec![
                    200.0, 190.0, 185.0, 180.0, 175.0, 170.0, 250.0, 350.0, 400.0, 420.0, 430.0,
                    440.0, 420.0, 400.0, 430.0, 440.0, 450.0, 460.0, 400.0, 350.0, 320.0, 300.0,
                    250.0, 220.0,
                ],
                vec![
                    12.0, 11.0, 11.0, 11.0, 10.0, 10.0, 15.0, 21.0, 24.0, 25.0, 26.0, 26.0, 25.0,
                    24.0, 26.0, 26.0, 27.0, 28.0, 24.0, 21.0, 19.0, 18.0, 15.0, 13.0,
                ],
            ),
        }
    }

    /// Horizon `t = 0..=T` with a zero initial period.
    pub fn horizon(self) -> Result<Horizon> {
        let (demand, reserve) = self.series();
        Ok(Horizon::from_planning(&demand, &reserve)?)
    }
}

impl fmt::Display for DemandPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DemandPattern {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        DemandPattern::ALL
            .into_iter()
            .find(|p| p.name() == normalized)
            .ok_or_else(|| {
                anyhow!(
                    "unknown demand pattern '{s}' (available: {})",
                    DemandPattern::ALL.map(|p| p.name()).join(", ")
                )
            })
    }
}

/// Reference fleet facing `pattern`, all constraint families enabled.
pub fn reference_uc_case(pattern: DemandPattern) -> Result<UcCase> {
    Ok(UcCase::new(reference_units(), pattern.horizon()?))
}

/// Five-resource portfolio: solar, wind, battery, demand response, EV charging.
pub fn reference_resources() -> Vec<DistributedResource> {
    let solar = vec![
        0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.1, 0.3, 0.6, 0.8, 0.9, 1.0, 1.0, 0.9, 0.8, 0.6, 0.3, 0.1,
        0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
    ];
    let wind = vec![
        0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 0.8, 0.7, 0.6, 0.5, 0.4, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9,
        0.8, 0.7, 0.6, 0.5, 0.4, 0.3,
    ];
    let demand_response = vec![
        0.8, 0.8, 0.8, 0.8, 0.8, 0.8, 0.9, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0,
        0.9, 0.8, 0.8, 0.8, 0.8, 0.8,
    ];
    let ev = vec![
        0.2, 0.1, 0.1, 0.1, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.8, 0.7, 0.6, 0.5, 0.4, 0.3,
        0.2, 0.1, 0.1, 0.1, 0.1, 0.2,
    ];

    vec![
        DistributedResource::new("Solar_Farm_1", ResourceKind::Solar, 50.0)
            .with_costs(0.0, 5.0)
            .with_ramps(10.0, 10.0)
            .with_availability(solar),
        DistributedResource::new("Wind_Farm_1", ResourceKind::Wind, 30.0)
            .with_costs(0.0, 8.0)
            .with_ramps(15.0, 15.0)
            .with_availability(wind),
        DistributedResource::battery(
            "Battery_Storage_1",
            BatterySpec {
                energy_capacity: 80.0,
                min_soc: 0.1,
                max_soc: 0.9,
                initial_soc: 0.5,
                efficiency: 0.9,
                max_charge_rate: 20.0,
                max_discharge_rate: 20.0,
            },
        )
        .with_costs(2.0, 3.0)
        .with_ramps(20.0, 20.0),
        DistributedResource::new("Demand_Response_1", ResourceKind::DemandResponse, 15.0)
            .with_costs(15.0, 0.0)
            .with_ramps(5.0, 5.0)
            .with_availability(demand_response),
        DistributedResource::new("EV_Charging_Station_1", ResourceKind::EvCharging, 10.0)
            .with_costs(25.0, 1.0)
            .with_ramps(5.0, 5.0)
            .with_availability(ev),
    ]
}

/// High, medium and low price days with probabilities 0.3, 0.5 and 0.2.
pub fn reference_scenarios() -> Vec<MarketScenario> {
    vec![
        MarketScenario::new(
            "scenario_1",
            0.3,
            vec![
                45.0, 52.0, 58.0, 65.0, 72.0, 68.0, 55.0, 48.0, 42.0, 38.0, 35.0, 32.0, 30.0, 28.0,
                26.0, 25.0, 24.0, 23.0, 22.0, 21.0, 20.0, 19.0, 18.0, 17.0,
            ],
        ),
        MarketScenario::new(
            "scenario_2",
            0.5,
            vec![
                35.0, 38.0, 42.0, 45.0, 48.0, 45.0, 40.0, 35.0, 32.0, 30.0, 28.0, 26.0, 25.0, 24.0,
                23.0, 22.0, 21.0, 20.0, 19.0, 18.0, 17.0, 16.0, 15.0, 14.0,
            ],
        ),
        MarketScenario::new(
            "scenario_3",
            0.2,
            vec![
                25.0, 28.0, 32.0, 35.0, 38.0, 35.0, 30.0, 25.0, 22.0, 20.0, 18.0, 16.0, 15.0, 14.0,
                13.0, 12.0, 11.0, 10.0, 9.0, 8.0, 7.0, 6.0, 5.0, 4.0,
            ],
        ),
    ]
}

pub fn reference_vpp_case() -> VppCase {
    VppCase {
        resources: reference_resources(),
        scenarios: reference_scenarios(),
        parameters: VppParameters::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patterns_are_valid() {
        for pattern in DemandPattern::ALL {
            let horizon = pattern.horizon().unwrap();
            let expected = if pattern == DemandPattern::Example { 6 } else { 24 };
            assert_eq!(horizon.planning_periods(), expected, "{pattern}");
            assert_eq!(horizon.demand(0), 0.0);
        }
    }

    #[test]
    fn test_pattern_names_round_trip() {
        for pattern in DemandPattern::ALL {
            assert_eq!(pattern.name().parse::<DemandPattern>().unwrap(), pattern);
        }
        assert_eq!(
            "residential-24h".parse::<DemandPattern>().unwrap(),
            DemandPattern::Residential24h
        );
        assert!("monthly".parse::<DemandPattern>().is_err());
    }

    #[test]
    fn test_example_peak() {
        let horizon = DemandPattern::Example.horizon().unwrap();
        assert_eq!(horizon.peak_demand(), 250.0);
        assert_eq!(horizon.reserve(3), 10.0);
    }

    #[test]
    fn test_reference_cases_validate() {
        assert!(reference_uc_case(DemandPattern::Example)
            .unwrap()
            .validate()
            .is_ok());
        let vpp = reference_vpp_case();
        assert!(vpp.validate().is_ok());
        assert_eq!(vpp.parameters.time_periods, 24);
        let total: f64 = vpp.scenarios.iter().map(|s| s.probability).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }
}
