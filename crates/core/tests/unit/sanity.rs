//! # Sanity Checker Tests
//!
//! One rejection per cross-field relation, each starting from a valid fixture
//! and breaking exactly one thing.

use dramcfg_core::{DramProtocol, ValidationError};
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::{self, rejection};

// ══════════════════════════════════════════════════════════
// 1. Geometry
// ══════════════════════════════════════════════════════════

#[test]
fn inconsistent_bank_product_is_rejected() {
    let source = common::ddr4_small()
        .with("dram_structure", "bankgroups", 3)
        .with("dram_structure", "banks_per_group", 2)
        .with("dram_structure", "banks", 5);
    assert_eq!(
        rejection(&source),
        ValidationError::BankProduct {
            banks: 5,
            bankgroups: 3,
            banks_per_group: 2,
        }
    );
}

#[test]
fn overflowing_bank_product_is_rejected() {
    let source = common::ddr4_small()
        .with("dram_structure", "ranks", 1)
        .with("dram_structure", "banks_per_group", i64::MAX);
    assert_eq!(
        rejection(&source),
        ValidationError::BankProduct {
            banks: i64::MAX,
            bankgroups: 4,
            banks_per_group: i64::MAX,
        }
    );
}

#[test]
fn zero_channels_are_rejected() {
    let source = common::ddr4_small().with("system", "channels", 0);
    assert_eq!(
        rejection(&source),
        ValidationError::NonPositive {
            field: "channels",
            value: 0,
        }
    );
}

#[test]
fn channel_smaller_than_one_rank_is_rejected() {
    let source = common::ddr4_small().with("system", "channel_size", 512);
    assert_eq!(
        rejection(&source),
        ValidationError::NonPositive {
            field: "ranks",
            value: 0,
        }
    );
}

#[test]
fn bus_width_must_be_whole_bytes() {
    let source = common::ddr4_small().with("system", "bus_width", 60);
    assert_eq!(
        rejection(&source),
        ValidationError::BusWidth {
            bus_width: 60,
            device_width: 8,
        }
    );
}

// ══════════════════════════════════════════════════════════
// 2. Timing
// ══════════════════════════════════════════════════════════

#[test]
fn negative_timing_names_the_field() {
    let source = common::ddr4_small().with("timing", "tRTP", -1);
    assert_eq!(
        rejection(&source),
        ValidationError::NegativeTiming {
            field: "tRTP",
            value: -1,
        }
    );
}

#[test]
fn overflowing_read_latency_is_rejected() {
    let source = common::ddr4_small()
        .with("timing", "AL", i64::MAX)
        .with("timing", "CL", 1);
    assert_eq!(
        rejection(&source),
        ValidationError::TimingOverflow {
            field: "RL",
            relation: "AL + CL",
        }
    );
}

#[test]
fn overflowing_row_cycle_is_rejected() {
    let source = common::ddr4_small().with("timing", "tRAS", i64::MAX);
    assert!(matches!(
        rejection(&source),
        ValidationError::TimingOverflow { field: "tRC", .. }
    ));
}

#[rstest]
#[case("0")]
#[case("-0.5")]
fn clock_period_must_be_positive(#[case] t_ck: &str) {
    let source = common::ddr4_small().with("timing", "tCK", t_ck);
    assert!(matches!(rejection(&source), ValidationError::ClockPeriod(_)));
}

// ══════════════════════════════════════════════════════════
// 3. Power
// ══════════════════════════════════════════════════════════

#[test]
fn gddr_without_read_current_is_rejected() {
    let mut source = common::gddr5();
    source.unset("power", "IDD4R");
    assert_eq!(
        rejection(&source),
        ValidationError::MissingPowerInput {
            key: "IDD4R",
            protocol: "GDDR5",
        }
    );
}

#[test]
fn read_current_below_standby_gives_negative_energy() {
    let source = common::ddr4_small().with("power", "IDD4R", 50);
    match rejection(&source) {
        ValidationError::Energy { field, value } => {
            assert_eq!(field, "read_energy_inc");
            assert!(value < 0.0);
        }
        other => panic!("expected an energy error, got {other:?}"),
    }
}

// ══════════════════════════════════════════════════════════
// 4. Capacity and coverage
// ══════════════════════════════════════════════════════════

#[test]
fn channel_size_must_be_whole_ranks() {
    let source = common::ddr4_small().with("dram_structure", "rows", 12000);
    assert_eq!(
        rejection(&source),
        ValidationError::ChannelSize {
            declared: 1 << 30,
            physical: 12000 * 1024 * 64,
        }
    );
}

#[test]
fn non_power_of_two_rows_leave_holes() {
    // 12288 rows fill 768 MB exactly, but 14 row bits address 1 GiB.
    let source = common::ddr4_small()
        .with("dram_structure", "rows", 12288)
        .with("system", "channel_size", 768);
    assert_eq!(
        rejection(&source),
        ValidationError::Capacity {
            declared: 768 << 20,
            addressable: 1 << 30,
        }
    );
}

#[test]
fn non_power_of_two_requests_cannot_be_offset_bits() {
    let source = common::ddr4_small().with("dram_structure", "BL", 6);
    assert_eq!(
        rejection(&source),
        ValidationError::AddressCoverage {
            layout_bits: 24,
            shift_bits: 6,
            total_bytes: 1 << 30,
        }
    );
}

#[test]
fn huge_burst_length_is_rejected() {
    let source = common::ddr4_small().with("dram_structure", "BL", i64::MAX);
    match rejection(&source) {
        ValidationError::AddressCoverage { shift_bits, .. } => assert_eq!(shift_bits, 63),
        other => panic!("expected an address coverage error, got {other:?}"),
    }
}

// ══════════════════════════════════════════════════════════
// 5. Policy
// ══════════════════════════════════════════════════════════

#[test]
fn bank_staggered_refresh_needs_several_banks() {
    let source = common::ddr4_small()
        .with("dram_structure", "bankgroups", 1)
        .with("dram_structure", "banks_per_group", 1)
        .with("system", "channel_size", 128)
        .with("system", "refresh_policy", "BANK_LEVEL_STAGGERED");
    match rejection(&source) {
        ValidationError::RefreshPolicy { policy, .. } => assert_eq!(policy, "BANK_LEVEL_STAGGERED"),
        other => panic!("expected a refresh policy error, got {other:?}"),
    }

    let rank_level = source.with("system", "refresh_policy", "RANK_LEVEL_SIMULTANEOUS");
    assert!(common::build(&rank_level).is_ok());
}

#[rstest]
#[case("system", "cmd_queue_size", "0", "cmd_queue_size")]
#[case("system", "trans_queue_size", "-4", "trans_queue_size")]
#[case("system", "sref_threshold", "0", "sref_threshold")]
#[case("other", "epoch_period", "0", "epoch_period")]
fn depths_and_periods_must_be_positive(
    #[case] section: &str,
    #[case] key: &str,
    #[case] raw: &str,
    #[case] field: &str,
) {
    let source = common::ddr4_small().with(section, key, raw);
    match rejection(&source) {
        ValidationError::NonPositive { field: f, .. } => assert_eq!(f, field),
        other => panic!("expected a non-positive error, got {other:?}"),
    }
}

#[rstest]
#[case("system", "delay_queue_cycles", -1)]
#[case("other", "output_level", 3)]
#[case("other", "output_level", -2)]
fn ranges_are_enforced(#[case] section: &str, #[case] key: &str, #[case] value: i64) {
    let source = common::ddr4_small().with(section, key, value);
    match rejection(&source) {
        ValidationError::OutOfRange { field, value: v, .. } => {
            assert_eq!(field, key);
            assert_eq!(v, value);
        }
        other => panic!("expected an out-of-range error, got {other:?}"),
    }
}

// ══════════════════════════════════════════════════════════
// 6. HMC
// ══════════════════════════════════════════════════════════

#[rstest]
#[case("link_width", 12)]
#[case("link_speed", 20)]
#[case("block_size", 48)]
#[case("num_links", 3)]
fn hmc_link_settings_are_restricted(#[case] key: &str, #[case] value: i64) {
    let source = common::hmc().with("hmc", key, value);
    match rejection(&source) {
        ValidationError::OutOfRange { field, .. } => assert_eq!(field, key),
        other => panic!("expected an out-of-range error, got {other:?}"),
    }
}

#[test]
fn hmc_accepts_every_legal_link_width() {
    for width in dramcfg_core::hmc::LINK_WIDTHS {
        let source = common::hmc().with("hmc", "link_width", width);
        assert!(common::build(&source).is_ok(), "link_width = {width}");
    }
}

// ══════════════════════════════════════════════════════════
// 7. Every protocol
// ══════════════════════════════════════════════════════════

#[rstest]
fn every_protocol_satisfies_the_relations(
    #[values(
        DramProtocol::Ddr3,
        DramProtocol::Ddr4,
        DramProtocol::Gddr5,
        DramProtocol::Gddr5x,
        DramProtocol::Lpddr,
        DramProtocol::Lpddr3,
        DramProtocol::Lpddr4,
        DramProtocol::Hbm,
        DramProtocol::Hbm2,
        DramProtocol::Hmc
    )]
    protocol: DramProtocol,
) {
    let config = common::build(&common::for_protocol(protocol)).unwrap();
    assert_eq!(config.protocol(), protocol);

    let g = config.geometry();
    assert_eq!(g.banks, g.bankgroups * g.banks_per_group);

    let p = &config.timing().primitive;
    assert_eq!(config.rl(), p.al + p.cl);
    assert_eq!(config.wl(), p.al + p.cwl);
    assert_eq!(config.timing().t_rc, p.t_ras + p.t_rp);
}

#[test]
fn protocol_cases_cover_every_protocol() {
    for protocol in DramProtocol::ALL {
        assert!(common::build(&common::for_protocol(protocol)).is_ok(), "{protocol}");
    }
}
