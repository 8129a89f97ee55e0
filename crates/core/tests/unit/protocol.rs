//! # Protocol Resolution Tests
//!
//! Verifies name resolution, capability queries and that an unknown protocol
//! never yields a partially built snapshot.

use dramcfg_core::loader::MapSource;
use dramcfg_core::protocol::{DramProtocol, resolve};
use dramcfg_core::{Config, ConfigError};
use rstest::rstest;

use crate::common;

#[rstest]
#[case("DDR3", DramProtocol::Ddr3)]
#[case("DDR4", DramProtocol::Ddr4)]
#[case("GDDR5", DramProtocol::Gddr5)]
#[case("GDDR5X", DramProtocol::Gddr5x)]
#[case("LPDDR", DramProtocol::Lpddr)]
#[case("LPDDR3", DramProtocol::Lpddr3)]
#[case("LPDDR4", DramProtocol::Lpddr4)]
#[case("HBM", DramProtocol::Hbm)]
#[case("HBM2", DramProtocol::Hbm2)]
#[case("HMC", DramProtocol::Hmc)]
fn resolves_every_supported_name(#[case] name: &str, #[case] expected: DramProtocol) {
    assert_eq!(resolve(name).unwrap(), expected);
    assert_eq!(expected.to_string(), name);
    assert_eq!(name.parse::<DramProtocol>().unwrap(), expected);
}

#[rstest]
#[case("DDR9")]
#[case("ddr4")]
#[case(" DDR4")]
#[case("")]
fn unknown_names_are_rejected(#[case] name: &str) {
    match resolve(name) {
        Err(ConfigError::InvalidProtocol(n)) => assert_eq!(n, name),
        other => panic!("expected InvalidProtocol, got {other:?}"),
    }
}

#[test]
fn unknown_protocol_aborts_construction() {
    let source = common::ddr4_small().with("dram_structure", "protocol", "DDR9");
    assert!(matches!(
        Config::from_source(&source, common::OUT_DIR),
        Err(ConfigError::InvalidProtocol(name)) if name == "DDR9"
    ));
}

#[test]
fn protocol_defaults_to_ddr3() {
    let mut ddr3 = common::ddr4_small();
    ddr3.unset("dram_structure", "protocol");
    let config = common::build(&ddr3).unwrap();
    assert_eq!(config.protocol(), DramProtocol::Ddr3);
    assert!(!config.is_ddr4());
}

#[test]
fn capability_queries() {
    let families: Vec<_> = DramProtocol::ALL
        .into_iter()
        .map(|p| (p.is_gddr(), p.is_hbm(), p.is_hmc(), p.is_ddr4()))
        .collect();
    assert_eq!(families.iter().filter(|f| f.0).count(), 2);
    assert_eq!(families.iter().filter(|f| f.1).count(), 2);
    assert_eq!(families.iter().filter(|f| f.2).count(), 1);
    assert_eq!(families.iter().filter(|f| f.3).count(), 1);

    assert!(DramProtocol::Gddr5x.is_gddr());
    assert!(DramProtocol::Hbm2.is_hbm());
    assert!(DramProtocol::Lpddr4.is_lpddr4());
    assert!(!DramProtocol::Lpddr3.is_lpddr4());
}

#[test]
fn only_commodity_ddr_has_default_currents() {
    let with_defaults: Vec<_> = DramProtocol::ALL
        .into_iter()
        .filter(|p| p.has_default_currents())
        .collect();
    assert_eq!(with_defaults, [DramProtocol::Ddr3, DramProtocol::Ddr4]);
}

#[test]
fn protocol_value_allows_inline_comment() {
    let source = MapSource::new().with("dram_structure", "protocol", "DDR9 ; typo");
    assert!(matches!(
        Config::from_source(&source, common::OUT_DIR),
        Err(ConfigError::InvalidProtocol(name)) if name == "DDR9"
    ));
}
