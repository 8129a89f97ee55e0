//! Timing parameters and composite latency derivation.
//!
//! This module covers the `[timing]` section. It provides:
//! 1. **Primitive timings:** Cycle counts read directly from the file with defaults.
//! 2. **Derivation:** Burst cycles, read/write latencies and delays, computed in dependency order.
//! 3. **Protocol extensions:** LPDDR4 and GDDR-only fields as a tagged variant.
//!
//! Derivation is total: nonsensical inputs (including negative counts) produce
//! nonsensical outputs, and the sanity checker is the one place that rejects them.

use serde::Serialize;
use tracing::warn;

use crate::common::ConfigError;
use crate::loader::{sections::TIMING, ConfigSource, FieldLoader};
use crate::protocol::DramProtocol;

/// A count of memory-clock cycles.
pub type Cycles = i64;

mod defaults {
    use super::Cycles;

    pub const T_CK: f64 = 1.0;
    pub const AL: Cycles = 0;
    pub const CL: Cycles = 12;
    pub const CWL: Cycles = 12;
    pub const T_CCD_L: Cycles = 6;
    pub const T_CCD_S: Cycles = 4;
    pub const T_RTRS: Cycles = 2;
    pub const T_RTP: Cycles = 5;
    pub const T_WTR_L: Cycles = 5;
    pub const T_WTR_S: Cycles = 5;
    pub const T_WR: Cycles = 10;
    pub const T_RP: Cycles = 10;
    pub const T_RRD_L: Cycles = 4;
    pub const T_RRD_S: Cycles = 4;
    pub const T_RAS: Cycles = 24;
    pub const T_RCD: Cycles = 10;
    pub const T_RFC: Cycles = 74;
    pub const T_CKE: Cycles = 6;
    pub const T_CKESR: Cycles = 12;
    pub const T_XS: Cycles = 432;
    pub const T_XP: Cycles = 8;
    pub const T_RFCB: Cycles = 20;
    pub const T_REFI: Cycles = 7800;
    pub const T_REFIB: Cycles = 1950;
    pub const T_FAW: Cycles = 50;
    pub const T_RPRE: Cycles = 1;
    pub const T_WPRE: Cycles = 1;
    pub const T_PPD: Cycles = 0;
    pub const T_32AW: Cycles = 330;
    pub const T_RCDRD: Cycles = 24;
    pub const T_RCDWR: Cycles = 20;
    pub const IDEAL_MEMORY_LATENCY: Cycles = 10;
}

/// Timing counts read directly from the `[timing]` section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrimitiveTiming {
    /// Clock period in nanoseconds.
    pub t_ck: f64,
    /// Additive latency.
    pub al: Cycles,
    /// CAS (read) latency.
    pub cl: Cycles,
    /// CAS write latency.
    pub cwl: Cycles,
    /// Column-to-column delay, same bankgroup.
    pub t_ccd_l: Cycles,
    /// Column-to-column delay, different bankgroup.
    pub t_ccd_s: Cycles,
    /// Rank-to-rank switch.
    pub t_rtrs: Cycles,
    /// Read to precharge.
    pub t_rtp: Cycles,
    /// Write to read, same bankgroup.
    pub t_wtr_l: Cycles,
    /// Write to read, different bankgroup.
    pub t_wtr_s: Cycles,
    /// Write recovery.
    pub t_wr: Cycles,
    /// Precharge period.
    pub t_rp: Cycles,
    /// Activate to activate, same bankgroup.
    pub t_rrd_l: Cycles,
    /// Activate to activate, different bankgroup.
    pub t_rrd_s: Cycles,
    /// Activate to precharge.
    pub t_ras: Cycles,
    /// Activate to column command (row-to-column delay).
    pub t_rcd: Cycles,
    /// All-bank refresh cycle time.
    pub t_rfc: Cycles,
    /// Minimum CKE pulse width.
    pub t_cke: Cycles,
    /// Minimum self-refresh residency.
    pub t_ckesr: Cycles,
    /// Exit self-refresh to next valid command.
    pub t_xs: Cycles,
    /// Exit power-down to next valid command.
    pub t_xp: Cycles,
    /// Per-bank refresh cycle time.
    pub t_rfcb: Cycles,
    /// All-bank refresh interval.
    pub t_refi: Cycles,
    /// Per-bank refresh interval.
    pub t_refib: Cycles,
    /// Four-activate window.
    pub t_faw: Cycles,
    /// Read preamble.
    pub t_rpre: Cycles,
    /// Write preamble.
    pub t_wpre: Cycles,
    /// Latency of the ideal (zero-contention) memory model.
    pub ideal_memory_latency: Cycles,
}

/// Protocol-specific timing fields as read, before protocol gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtensionInputs {
    /// Pulse-to-pulse delay (LPDDR4, GDDR).
    pub t_ppd: Option<Cycles>,
    /// 32-activate window (GDDR).
    pub t_32aw: Option<Cycles>,
    /// Activate to read (GDDR).
    pub t_rcdrd: Option<Cycles>,
    /// Activate to write (GDDR).
    pub t_rcdwr: Option<Cycles>,
}

/// Everything the timing deriver consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingInputs {
    /// Common primitive counts.
    pub primitive: PrimitiveTiming,
    /// Protocol-specific counts, if configured.
    pub extension: ExtensionInputs,
}

impl TimingInputs {
    /// Reads the `[timing]` section.
    ///
    /// Protocol-specific keys that do not apply to `protocol` are ignored with a
    /// warning.
    pub fn load<S: ConfigSource>(
        loader: &FieldLoader<S>,
        protocol: DramProtocol,
    ) -> Result<Self, ConfigError> {
        let int = |key: &str, default: Cycles| loader.integer(TIMING, key, default);
        let primitive = PrimitiveTiming {
            t_ck: loader.float(TIMING, "tCK", defaults::T_CK)?,
            al: int("AL", defaults::AL)?,
            cl: int("CL", defaults::CL)?,
            cwl: int("CWL", defaults::CWL)?,
            t_ccd_l: int("tCCD_L", defaults::T_CCD_L)?,
            t_ccd_s: int("tCCD_S", defaults::T_CCD_S)?,
            t_rtrs: int("tRTRS", defaults::T_RTRS)?,
            t_rtp: int("tRTP", defaults::T_RTP)?,
            t_wtr_l: int("tWTR_L", defaults::T_WTR_L)?,
            t_wtr_s: int("tWTR_S", defaults::T_WTR_S)?,
            t_wr: int("tWR", defaults::T_WR)?,
            t_rp: int("tRP", defaults::T_RP)?,
            t_rrd_l: int("tRRD_L", defaults::T_RRD_L)?,
            t_rrd_s: int("tRRD_S", defaults::T_RRD_S)?,
            t_ras: int("tRAS", defaults::T_RAS)?,
            t_rcd: int("tRCD", defaults::T_RCD)?,
            t_rfc: int("tRFC", defaults::T_RFC)?,
            t_cke: int("tCKE", defaults::T_CKE)?,
            t_ckesr: int("tCKESR", defaults::T_CKESR)?,
            t_xs: int("tXS", defaults::T_XS)?,
            t_xp: int("tXP", defaults::T_XP)?,
            t_rfcb: int("tRFCb", defaults::T_RFCB)?,
            t_refi: int("tREFI", defaults::T_REFI)?,
            t_refib: int("tREFIb", defaults::T_REFIB)?,
            t_faw: int("tFAW", defaults::T_FAW)?,
            t_rpre: int("tRPRE", defaults::T_RPRE)?,
            t_wpre: int("tWPRE", defaults::T_WPRE)?,
            ideal_memory_latency: int("ideal_memory_latency", defaults::IDEAL_MEMORY_LATENCY)?,
        };

        let extension = ExtensionInputs {
            t_ppd: loader.load_opt(TIMING, "tPPD")?,
            t_32aw: loader.load_opt(TIMING, "t32AW")?,
            t_rcdrd: loader.load_opt(TIMING, "tRCDRD")?,
            t_rcdwr: loader.load_opt(TIMING, "tRCDWR")?,
        };

        let gddr_only = [
            ("t32AW", extension.t_32aw),
            ("tRCDRD", extension.t_rcdrd),
            ("tRCDWR", extension.t_rcdwr),
        ];
        let mut ignored = Vec::new();
        if !protocol.is_gddr() {
            ignored.extend(gddr_only);
            if !protocol.is_lpddr4() {
                ignored.push(("tPPD", extension.t_ppd));
            }
        }
        for (key, _) in ignored.into_iter().filter(|(_, v)| v.is_some()) {
            warn!(key, %protocol, "timing key does not apply to this protocol; ignored");
        }

        Ok(Self {
            primitive,
            extension,
        })
    }
}

/// Timing fields that exist only for some protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProtocolTiming {
    /// The protocol has no extra timing constraints.
    #[default]
    None,
    /// LPDDR4 per-bank precharge spacing.
    Lpddr4 {
        /// Precharge-to-precharge delay.
        t_ppd: Cycles,
    },
    /// GDDR5/GDDR5X constraints.
    Gddr {
        /// Precharge-to-precharge delay.
        t_ppd: Cycles,
        /// 32-activate window.
        t_32aw: Cycles,
        /// Activate to read.
        t_rcdrd: Cycles,
        /// Activate to write.
        t_rcdwr: Cycles,
    },
}

/// Complete timing set: primitives plus derived latencies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timing {
    /// Counts read from the file.
    #[serde(flatten)]
    pub primitive: PrimitiveTiming,
    /// Cycles the data bus is busy for one burst.
    pub burst_cycle: Cycles,
    /// Read latency (`AL + CL`).
    pub rl: Cycles,
    /// Write latency (`AL + CWL`).
    pub wl: Cycles,
    /// Row cycle time (`tRAS + tRP`).
    pub t_rc: Cycles,
    /// Read command to last data beat.
    pub read_delay: Cycles,
    /// Write command to last data beat.
    pub write_delay: Cycles,
    /// Protocol-specific extension.
    pub extension: ProtocolTiming,
}

impl Timing {
    /// Pulse-to-pulse delay, or 0 if the protocol has none.
    pub fn t_ppd(&self) -> Cycles {
        match self.extension {
            ProtocolTiming::Lpddr4 { t_ppd } | ProtocolTiming::Gddr { t_ppd, .. } => t_ppd,
            ProtocolTiming::None => 0,
        }
    }

    /// 32-activate window, or 0 if the protocol has none.
    pub fn t_32aw(&self) -> Cycles {
        match self.extension {
            ProtocolTiming::Gddr { t_32aw, .. } => t_32aw,
            _ => 0,
        }
    }

    /// Activate-to-read delay; plain `tRCD` unless the protocol splits it.
    pub fn t_rcdrd(&self) -> Cycles {
        match self.extension {
            ProtocolTiming::Gddr { t_rcdrd, .. } => t_rcdrd,
            _ => self.primitive.t_rcd,
        }
    }

    /// Activate-to-write delay; plain `tRCD` unless the protocol splits it.
    pub fn t_rcdwr(&self) -> Cycles {
        match self.extension {
            ProtocolTiming::Gddr { t_rcdwr, .. } => t_rcdwr,
            _ => self.primitive.t_rcd,
        }
    }

    /// Every integer timing field with its configuration name.
    pub fn named_cycles(&self) -> Vec<(&'static str, Cycles)> {
        let p = &self.primitive;
        let mut fields = vec![
            ("AL", p.al),
            ("CL", p.cl),
            ("CWL", p.cwl),
            ("tCCD_L", p.t_ccd_l),
            ("tCCD_S", p.t_ccd_s),
            ("tRTRS", p.t_rtrs),
            ("tRTP", p.t_rtp),
            ("tWTR_L", p.t_wtr_l),
            ("tWTR_S", p.t_wtr_s),
            ("tWR", p.t_wr),
            ("tRP", p.t_rp),
            ("tRRD_L", p.t_rrd_l),
            ("tRRD_S", p.t_rrd_s),
            ("tRAS", p.t_ras),
            ("tRCD", p.t_rcd),
            ("tRFC", p.t_rfc),
            ("tCKE", p.t_cke),
            ("tCKESR", p.t_ckesr),
            ("tXS", p.t_xs),
            ("tXP", p.t_xp),
            ("tRFCb", p.t_rfcb),
            ("tREFI", p.t_refi),
            ("tREFIb", p.t_refib),
            ("tFAW", p.t_faw),
            ("tRPRE", p.t_rpre),
            ("tWPRE", p.t_wpre),
            ("ideal_memory_latency", p.ideal_memory_latency),
            ("burst_cycle", self.burst_cycle),
            ("RL", self.rl),
            ("WL", self.wl),
            ("tRC", self.t_rc),
            ("read_delay", self.read_delay),
            ("write_delay", self.write_delay),
        ];
        match self.extension {
            ProtocolTiming::None => {}
            ProtocolTiming::Lpddr4 { t_ppd } => fields.push(("tPPD", t_ppd)),
            ProtocolTiming::Gddr {
                t_ppd,
                t_32aw,
                t_rcdrd,
                t_rcdwr,
            } => fields.extend([
                ("tPPD", t_ppd),
                ("t32AW", t_32aw),
                ("tRCDRD", t_rcdrd),
                ("tRCDWR", t_rcdwr),
            ]),
        }
        fields
    }
}

/// Data-bus cycles per burst.
///
/// DDR-style parts move two beats per clock; GDDR parts are clocked so that
/// four beats land in each command clock.
pub fn burst_cycles(protocol: DramProtocol, burst_length: i64) -> Cycles {
    if protocol.is_gddr() {
        burst_length / 4
    } else {
        burst_length / 2
    }
}

/// Command-to-last-beat delay for a latency, burst and preamble.
///
/// A one-cycle preamble is already covered by CL/CWL. Saturates at
/// `Cycles::MAX`.
pub fn access_delay(latency: Cycles, burst_cycle: Cycles, preamble: Cycles) -> Cycles {
    latency
        .saturating_add(burst_cycle)
        .saturating_add(preamble.saturating_sub(1).max(0))
}

/// Computes the complete timing set.
///
/// Applied in dependency order: burst cycles, latencies, row cycle, delays,
/// then the protocol extension. Sums saturate; an overflowing input is left
/// for the sanity checker to reject.
///
/// # Examples
///
/// ```
/// use dramcfg_core::protocol::DramProtocol;
/// use dramcfg_core::timing::{derive, PrimitiveTiming, TimingInputs};
/// # use dramcfg_core::timing::ExtensionInputs;
/// # let primitive = PrimitiveTiming {
/// #     t_ck: 0.833, al: 0, cl: 16, cwl: 12, t_ccd_l: 6, t_ccd_s: 4, t_rtrs: 2,
/// #     t_rtp: 9, t_wtr_l: 9, t_wtr_s: 3, t_wr: 18, t_rp: 16, t_rrd_l: 6,
/// #     t_rrd_s: 4, t_ras: 39, t_rcd: 16, t_rfc: 420, t_cke: 6, t_ckesr: 7,
/// #     t_xs: 432, t_xp: 8, t_rfcb: 20, t_refi: 9360, t_refib: 1950, t_faw: 26,
/// #     t_rpre: 1, t_wpre: 1, ideal_memory_latency: 10,
/// # };
/// let inputs = TimingInputs { primitive, extension: ExtensionInputs::default() };
/// let timing = derive(DramProtocol::Ddr4, &inputs, 8);
/// assert_eq!(timing.rl, 16);
/// assert_eq!(timing.read_delay, 16 + 4);
/// assert_eq!(timing.t_rc, 39 + 16);
/// ```
pub fn derive(protocol: DramProtocol, inputs: &TimingInputs, burst_length: i64) -> Timing {
    let p = &inputs.primitive;
    let burst_cycle = burst_cycles(protocol, burst_length);

    let rl = p.al.saturating_add(p.cl);
    let wl = p.al.saturating_add(p.cwl);
    let t_rc = p.t_ras.saturating_add(p.t_rp);

    let read_delay = access_delay(rl, burst_cycle, p.t_rpre);
    let write_delay = access_delay(wl, burst_cycle, p.t_wpre);

    let ext = &inputs.extension;
    let extension = match protocol {
        DramProtocol::Lpddr4 => ProtocolTiming::Lpddr4 {
            t_ppd: ext.t_ppd.unwrap_or(defaults::T_PPD),
        },
        proto if proto.is_gddr() => ProtocolTiming::Gddr {
            t_ppd: ext.t_ppd.unwrap_or(defaults::T_PPD),
            t_32aw: ext.t_32aw.unwrap_or(defaults::T_32AW),
            t_rcdrd: ext.t_rcdrd.unwrap_or(defaults::T_RCDRD),
            t_rcdwr: ext.t_rcdwr.unwrap_or(defaults::T_RCDWR),
        },
        _ => ProtocolTiming::None,
    };

    Timing {
        primitive: p.clone(),
        burst_cycle,
        rl,
        wl,
        t_rc,
        read_delay,
        write_delay,
        extension,
    }
}
