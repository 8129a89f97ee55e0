//! Per-command energy increments.
//!
//! This module converts the `[power]` supply voltage and IDD currents into the
//! energy the power model adds for each command (or each cycle, for the
//! background states). It provides:
//! 1. **Inputs:** Voltage and currents, with datasheet defaults only for protocols that have them.
//! 2. **Increments:** One coefficient per operation class, in pJ (V * mA * ns).
//!
//! Computation never fails. Missing currents are carried as `None`, treated as
//! zero here, and reported by the sanity checker.

use serde::Serialize;

use crate::common::ConfigError;
use crate::geometry::Geometry;
use crate::loader::sections::POWER;
use crate::loader::{ConfigSource, FieldLoader};
use crate::protocol::DramProtocol;
use crate::timing::Timing;

/// Datasheet defaults for commodity DDR parts (V, mA).
mod defaults {
    pub const VDD: f64 = 1.2;
    pub const IDD0: f64 = 75.0;
    pub const IDD2P: f64 = 25.0;
    pub const IDD2N: f64 = 45.0;
    pub const IDD3N: f64 = 60.0;
    pub const IDD4W: f64 = 180.0;
    pub const IDD4R: f64 = 180.0;
    pub const IDD5AB: f64 = 250.0;
    pub const IDD6X: f64 = 20.0;
}

/// Supply voltage and currents; `None` marks a value that was required but absent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PowerInputs {
    /// Supply voltage (V).
    pub vdd: Option<f64>,
    /// One bank activate-precharge current (mA).
    pub idd0: Option<f64>,
    /// Precharge power-down current (mA).
    pub idd2p: Option<f64>,
    /// Precharge standby current (mA).
    pub idd2n: Option<f64>,
    /// Active standby current (mA).
    pub idd3n: Option<f64>,
    /// Burst write current (mA).
    pub idd4w: Option<f64>,
    /// Burst read current (mA).
    pub idd4r: Option<f64>,
    /// All-bank refresh current (mA).
    pub idd5ab: Option<f64>,
    /// Self-refresh current (mA).
    pub idd6x: Option<f64>,
}

impl PowerInputs {
    /// Reads the `[power]` section.
    ///
    /// Protocols with datasheet defaults fall back to them; for every other
    /// protocol a missing key stays `None`.
    pub fn load<S: ConfigSource>(
        loader: &FieldLoader<S>,
        protocol: DramProtocol,
    ) -> Result<Self, ConfigError> {
        let fallback = protocol.has_default_currents();
        let read = |key: &str, default: f64| -> Result<Option<f64>, ConfigError> {
            let value = loader.load_opt::<f64>(POWER, key)?;
            Ok(value.or(fallback.then_some(default)))
        };
        Ok(Self {
            vdd: read("VDD", defaults::VDD)?,
            idd0: read("IDD0", defaults::IDD0)?,
            idd2p: read("IDD2P", defaults::IDD2P)?,
            idd2n: read("IDD2N", defaults::IDD2N)?,
            idd3n: read("IDD3N", defaults::IDD3N)?,
            idd4w: read("IDD4W", defaults::IDD4W)?,
            idd4r: read("IDD4R", defaults::IDD4R)?,
            idd5ab: read("IDD5AB", defaults::IDD5AB)?,
            idd6x: read("IDD6x", defaults::IDD6X)?,
        })
    }

    /// The built-in defaults, all present.
    pub fn datasheet_defaults() -> Self {
        Self {
            vdd: Some(defaults::VDD),
            idd0: Some(defaults::IDD0),
            idd2p: Some(defaults::IDD2P),
            idd2n: Some(defaults::IDD2N),
            idd3n: Some(defaults::IDD3N),
            idd4w: Some(defaults::IDD4W),
            idd4r: Some(defaults::IDD4R),
            idd5ab: Some(defaults::IDD5AB),
            idd6x: Some(defaults::IDD6X),
        }
    }

    /// Configuration keys whose values are absent.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("VDD", self.vdd),
            ("IDD0", self.idd0),
            ("IDD2P", self.idd2p),
            ("IDD2N", self.idd2n),
            ("IDD3N", self.idd3n),
            ("IDD4W", self.idd4w),
            ("IDD4R", self.idd4r),
            ("IDD5AB", self.idd5ab),
            ("IDD6x", self.idd6x),
        ]
        .into_iter()
        .filter_map(|(key, v)| v.is_none().then_some(key))
        .collect()
    }
}

/// Energy added per command, or per cycle for the background states, in pJ.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct EnergyIncrements {
    /// Per activate.
    pub act: f64,
    /// Per precharge.
    pub pre: f64,
    /// Per read burst.
    pub read: f64,
    /// Per write burst.
    pub write: f64,
    /// Per all-bank refresh.
    pub refresh: f64,
    /// Per single-bank refresh.
    pub refresh_bank: f64,
    /// Per cycle with at least one bank open.
    pub act_standby: f64,
    /// Per cycle with all banks closed.
    pub pre_standby: f64,
    /// Per cycle in precharge power-down.
    pub pre_power_down: f64,
    /// Per cycle in self-refresh.
    pub self_refresh: f64,
}

impl EnergyIncrements {
    /// Every increment with its name.
    pub fn named(&self) -> [(&'static str, f64); 10] {
        [
            ("act_energy_inc", self.act),
            ("pre_energy_inc", self.pre),
            ("read_energy_inc", self.read),
            ("write_energy_inc", self.write),
            ("ref_energy_inc", self.refresh),
            ("refb_energy_inc", self.refresh_bank),
            ("act_stb_energy_inc", self.act_standby),
            ("pre_stb_energy_inc", self.pre_standby),
            ("pre_pd_energy_inc", self.pre_power_down),
            ("sref_energy_inc", self.self_refresh),
        ]
    }
}

/// Computes the increments for one rank (all `devices_per_rank` devices).
///
/// Activate and precharge share the IDD0 measurement window: the energy of one
/// activate-precharge pair above background is split in proportion to tRAS and
/// tRP.
pub fn energy_increments(inputs: &PowerInputs, timing: &Timing, geometry: &Geometry) -> EnergyIncrements {
    let v = |x: Option<f64>| x.unwrap_or(0.0);
    let vdd = v(inputs.vdd);
    let (idd0, idd2p, idd2n, idd3n) = (v(inputs.idd0), v(inputs.idd2p), v(inputs.idd2n), v(inputs.idd3n));
    let (idd4w, idd4r, idd5ab, idd6x) = (v(inputs.idd4w), v(inputs.idd4r), v(inputs.idd5ab), v(inputs.idd6x));

    let p = &timing.primitive;
    // V * mA * cycles * ns/cycle = pJ, for every device in the rank.
    let scale = vdd * geometry.devices_per_rank as f64 * p.t_ck;
    let cycles = |c: i64| c as f64;

    let t_rc = cycles(timing.t_rc);
    let t_ras = cycles(p.t_ras);
    let pair = scale * (idd0 * t_rc - (idd3n * t_ras + idd2n * (t_rc - t_ras)));
    let act = if timing.t_rc == 0 { 0.0 } else { pair * t_ras / t_rc };

    EnergyIncrements {
        act,
        pre: if timing.t_rc == 0 { 0.0 } else { pair - act },
        read: scale * (idd4r - idd3n) * cycles(timing.burst_cycle),
        write: scale * (idd4w - idd3n) * cycles(timing.burst_cycle),
        refresh: scale * (idd5ab - idd3n) * cycles(p.t_rfc),
        refresh_bank: scale * (idd5ab - idd3n) * cycles(p.t_rfcb),
        act_standby: scale * idd3n,
        pre_standby: scale * idd2n,
        pre_power_down: scale * idd2p,
        self_refresh: scale * idd6x,
    }
}
