use powerplan_scenarios::{
    load_uc_case, load_vpp_case, reference_uc_case, reference_vpp_case, DemandPattern,
};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_uc_case_round_trips_through_yaml_and_json() {
    let case = reference_uc_case(DemandPattern::Example).unwrap();
    let dir = tempdir().unwrap();

    let yaml = dir.path().join("uc.yaml");
    fs::write(&yaml, serde_yaml::to_string(&case).unwrap()).unwrap();
    assert_eq!(load_uc_case(&yaml).unwrap(), case);

    let json = dir.path().join("uc.json");
    fs::write(&json, serde_json::to_string_pretty(&case).unwrap()).unwrap();
    assert_eq!(load_uc_case(&json).unwrap(), case);
}

#[test]
fn test_unknown_extension_falls_back() {
    let case = reference_vpp_case();
    let dir = tempdir().unwrap();
    let path = dir.path().join("portfolio.case");
    fs::write(&path, serde_json::to_string(&case).unwrap()).unwrap();

    let loaded = load_vpp_case(&path).unwrap();
    assert_eq!(loaded.resources.len(), 5);
    assert_eq!(loaded.scenarios.len(), 3);
}

#[test]
fn test_invalid_case_reports_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.yaml");
    let yaml = r#"
units:
  - name: G1
    P_min: 120
    P_max: 100
    cU: 0
    c: 1
    SU: 100
    SD: 100
    SU_cost: 0
    SD_cost: 0
    RU: 100
    RD: 100
    TU: 1
    TD: 1
periods:
  - { demand: 0 }
  - { demand: 50 }
"#;
    fs::write(&path, yaml).unwrap();

    let err = load_uc_case(&path).unwrap_err();
    let chain = format!("{err:#}");
    assert!(chain.contains("bad.yaml"), "{chain}");
    assert!(chain.contains("G1"), "{chain}");
}

#[test]
fn test_missing_file_has_context() {
    let err = load_vpp_case(std::path::Path::new("/nonexistent/case.yaml")).unwrap_err();
    assert!(err.to_string().contains("reading VPP case"));
}
