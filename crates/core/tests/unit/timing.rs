//! # Timing Derivation Tests
//!
//! Verifies the composite latencies, burst cycles per protocol family and
//! the protocol-specific timing extensions.

use dramcfg_core::DramProtocol;
use dramcfg_core::loader::{FieldLoader, MapSource};
use dramcfg_core::timing::{ProtocolTiming, TimingInputs, burst_cycles, derive};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

use crate::common;

fn inputs(source: MapSource, protocol: DramProtocol) -> TimingInputs {
    TimingInputs::load(&FieldLoader::new(source), protocol).unwrap()
}

// ══════════════════════════════════════════════════════════
// 1. Composite latencies
// ══════════════════════════════════════════════════════════

#[test]
fn defaults_derive_consistent_latencies() {
    let t = derive(DramProtocol::Ddr3, &inputs(MapSource::new(), DramProtocol::Ddr3), 8);
    assert_eq!(t.rl, 12);
    assert_eq!(t.wl, 12);
    assert_eq!(t.t_rc, 24 + 10);
    assert_eq!(t.burst_cycle, 4);
    assert_eq!(t.read_delay, 12 + 4);
    assert_eq!(t.write_delay, 12 + 4);
}

#[test]
fn long_preambles_extend_delays() {
    let source = MapSource::new()
        .with("timing", "AL", 2)
        .with("timing", "CL", 16)
        .with("timing", "CWL", 12)
        .with("timing", "tRPRE", 2)
        .with("timing", "tWPRE", 3);
    let t = derive(DramProtocol::Ddr4, &inputs(source, DramProtocol::Ddr4), 8);
    assert_eq!(t.rl, 18);
    assert_eq!(t.wl, 14);
    assert_eq!(t.read_delay, 18 + 4 + 1);
    assert_eq!(t.write_delay, 14 + 4 + 2);
}

#[test]
fn negative_inputs_pass_through_untouched() {
    let source = MapSource::new().with("timing", "CL", -3);
    let t = derive(DramProtocol::Ddr3, &inputs(source, DramProtocol::Ddr3), 8);
    assert_eq!(t.primitive.cl, -3);
    assert_eq!(t.rl, -3);
}

#[test]
fn overflowing_sums_saturate() {
    let source = MapSource::new()
        .with("timing", "AL", i64::MAX)
        .with("timing", "CL", 1)
        .with("timing", "tRAS", i64::MAX);
    let t = derive(DramProtocol::Ddr4, &inputs(source, DramProtocol::Ddr4), i64::MAX);
    assert_eq!(t.rl, i64::MAX);
    assert_eq!(t.wl, i64::MAX);
    assert_eq!(t.t_rc, i64::MAX);
    assert_eq!(t.read_delay, i64::MAX);
    assert_eq!(t.burst_cycle, i64::MAX / 2);
}

proptest! {
    #[test]
    fn latency_relations_hold(
        al in 0i64..32,
        cl in 0i64..64,
        cwl in 0i64..64,
        rpre in 0i64..4,
        wpre in 0i64..4,
        bl in prop::sample::select(vec![2i64, 4, 8, 16]),
    ) {
        let source = MapSource::new()
            .with("timing", "AL", al)
            .with("timing", "CL", cl)
            .with("timing", "CWL", cwl)
            .with("timing", "tRPRE", rpre)
            .with("timing", "tWPRE", wpre);
        let t = derive(DramProtocol::Ddr4, &inputs(source, DramProtocol::Ddr4), bl);
        prop_assert_eq!(t.rl, al + cl);
        prop_assert_eq!(t.wl, al + cwl);
        prop_assert!(t.read_delay >= t.rl + t.burst_cycle);
        prop_assert!(t.write_delay >= t.wl + t.burst_cycle);
        prop_assert!(t.read_delay >= 0 && t.write_delay >= 0);
    }
}

// ══════════════════════════════════════════════════════════
// 2. Burst cycles
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(DramProtocol::Ddr3, 8, 4)]
#[case(DramProtocol::Ddr4, 8, 4)]
#[case(DramProtocol::Lpddr4, 16, 8)]
#[case(DramProtocol::Hbm2, 4, 2)]
#[case(DramProtocol::Gddr5, 8, 2)]
#[case(DramProtocol::Gddr5x, 16, 4)]
fn burst_cycles_per_family(#[case] protocol: DramProtocol, #[case] bl: i64, #[case] expected: i64) {
    assert_eq!(burst_cycles(protocol, bl), expected);
}

// ══════════════════════════════════════════════════════════
// 3. Protocol extensions
// ══════════════════════════════════════════════════════════

#[test]
fn lpddr4_carries_only_ppd() {
    let source = MapSource::new().with("timing", "tPPD", 4).with("timing", "t32AW", 99);
    let t = derive(DramProtocol::Lpddr4, &inputs(source, DramProtocol::Lpddr4), 16);
    assert_eq!(t.extension, ProtocolTiming::Lpddr4 { t_ppd: 4 });
    assert_eq!(t.t_ppd(), 4);
    assert_eq!(t.t_32aw(), 0);
    assert_eq!(t.t_rcdrd(), t.primitive.t_rcd);
}

#[test]
fn gddr_extension_uses_defaults_for_absent_keys() {
    let source = MapSource::new().with("timing", "tRCDRD", 18);
    let t = derive(DramProtocol::Gddr5x, &inputs(source, DramProtocol::Gddr5x), 16);
    assert_eq!(
        t.extension,
        ProtocolTiming::Gddr {
            t_ppd: 0,
            t_32aw: 330,
            t_rcdrd: 18,
            t_rcdwr: 20,
        }
    );
}

#[test]
fn ddr_ignores_extension_keys() {
    let source = MapSource::new().with("timing", "tPPD", 4).with("timing", "tRCDWR", 7);
    let t = derive(DramProtocol::Ddr4, &inputs(source, DramProtocol::Ddr4), 8);
    assert_eq!(t.extension, ProtocolTiming::None);
    assert_eq!(t.t_ppd(), 0);
    assert_eq!(t.t_rcdwr(), t.primitive.t_rcd);
    assert!(t.named_cycles().iter().all(|(name, _)| *name != "tPPD"));
}

#[test]
fn inapplicable_keys_are_warned_about() {
    let source = MapSource::new().with("timing", "tPPD", 4).with("timing", "t32AW", 99);
    let (_, logs) = common::captured_warnings(|| inputs(source, DramProtocol::Ddr4));
    assert_eq!(logs.lines().count(), 2, "{logs}");
    assert!(logs.lines().all(|line| line.contains("WARN")), "{logs}");
    assert!(logs.contains("tPPD") && logs.contains("t32AW"), "{logs}");
}

#[test]
fn applicable_keys_are_not_warned_about() {
    let source = MapSource::new().with("timing", "tPPD", 4).with("timing", "t32AW", 99);
    let (_, logs) = common::captured_warnings(|| inputs(source, DramProtocol::Gddr5));
    assert_eq!(logs, "");
}

#[test]
fn snapshot_exposes_gddr_timing() {
    let config = common::build(&common::gddr5()).unwrap();
    assert_eq!(config.burst_cycle(), 2);
    assert_eq!(config.t_ppd(), 2);
    assert_eq!(config.t_32aw(), 184);
    assert_eq!(config.rl(), 20);
    assert_eq!(config.wl(), 6);
    assert_eq!(config.read_delay(), 22);
}
