//! The immutable configuration snapshot.
//!
//! [`Config`] is built once from a configuration file (or any other
//! [`ConfigSource`]) and then only read. Construction runs every stage in
//! dependency order:
//! 1. **Protocol:** `dram_structure.protocol`, which gates everything after it.
//! 2. **Structure:** HMC links (HMC only), geometry, address widths and layout.
//! 3. **Policy and timing:** `[system]` and `[timing]`, then derived latencies.
//! 4. **Power:** Currents and the per-command energy increments.
//! 5. **Output:** Reporting cadence and file paths (plus thermal settings).
//! 6. **Sanity:** Cross-field checks; the snapshot is returned only if they pass.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::common::ConfigError;
use crate::geometry::{self, AddressLayout, AddressWidths, Geometry, GeometryInputs};
use crate::hmc::HmcParams;
use crate::loader::sections::DRAM_STRUCTURE;
use crate::loader::{ConfigSource, FieldLoader, IniSource};
use crate::output::OutputParams;
use crate::power::{self, EnergyIncrements, PowerInputs};
use crate::protocol::{self, DramProtocol};
use crate::sanity;
use crate::system::SystemParams;
#[cfg(feature = "thermal")]
use crate::thermal::ThermalParams;
use crate::timing::{self, Cycles, Timing, TimingInputs};

/// Every simulator-wide constant, derived and validated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    protocol: DramProtocol,
    geometry: Geometry,
    address_widths: AddressWidths,
    address_layout: AddressLayout,
    timing: Timing,
    power_inputs: PowerInputs,
    energy: EnergyIncrements,
    system: SystemParams,
    output: OutputParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    hmc: Option<HmcParams>,
    #[cfg(feature = "thermal")]
    thermal: ThermalParams,
}

impl Config {
    /// Loads `config_path` and derives the snapshot.
    ///
    /// # Arguments
    ///
    /// * `config_path` - INI file with the device description.
    /// * `output_dir` - Directory the statistics files are placed in. It is not created.
    ///
    /// # Errors
    ///
    /// [`ConfigError::File`] if the file is missing or malformed, otherwise any
    /// error [`Config::from_source`] reports.
    pub fn new(config_path: impl AsRef<Path>, output_dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = config_path.as_ref();
        let source = IniSource::from_file(path)?;
        debug!(path = %path.display(), "config file loaded");
        Self::from_source(&source, output_dir)
    }

    /// Derives the snapshot from an already loaded source.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] for a malformed value,
    /// [`ConfigError::InvalidProtocol`] for an unknown protocol and
    /// [`ConfigError::Validation`] when a cross-field check fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use dramcfg_core::Config;
    /// use dramcfg_core::loader::MapSource;
    ///
    /// let source = MapSource::new()
    ///     .with("dram_structure", "protocol", "DDR4")
    ///     .with("dram_structure", "bankgroups", 4)
    ///     .with("dram_structure", "banks_per_group", 4)
    ///     .with("dram_structure", "rows", 32768)
    ///     .with("system", "channel_size", 8192);
    /// let config = Config::from_source(&source, "out").unwrap();
    /// assert!(config.is_ddr4());
    /// assert_eq!(config.geometry().ranks, 2);
    /// ```
    pub fn from_source<S: ConfigSource>(source: S, output_dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let loader = FieldLoader::new(source);
        let output_dir = output_dir.as_ref();

        let protocol = protocol::resolve(&loader.string(DRAM_STRUCTURE, "protocol", DramProtocol::default().name())?)?;
        let hmc = if protocol.is_hmc() {
            Some(HmcParams::load(&loader)?)
        } else {
            None
        };

        let geometry = geometry::derive(&GeometryInputs::load(&loader, protocol, hmc.as_ref())?);
        let address_widths = AddressWidths::of(&geometry);
        let system = SystemParams::load(&loader, protocol)?;
        let address_layout = AddressLayout::new(&system.address_mapping, &geometry, &address_widths);

        let timing = timing::derive(protocol, &TimingInputs::load(&loader, protocol)?, geometry.burst_length);
        let power_inputs = PowerInputs::load(&loader, protocol)?;
        let energy = power::energy_increments(&power_inputs, &timing, &geometry);
        let output = OutputParams::load(&loader, output_dir)?;

        #[cfg(feature = "thermal")]
        let thermal = ThermalParams::load(&loader, &geometry, &timing, output_dir, &output.paths.output_prefix)?;

        let config = Self {
            protocol,
            geometry,
            address_widths,
            address_layout,
            timing,
            power_inputs,
            energy,
            system,
            output,
            hmc,
            #[cfg(feature = "thermal")]
            thermal,
        };
        sanity::check(&config)?;

        info!(
            protocol = %config.protocol,
            channels = config.geometry.channels,
            ranks = config.geometry.ranks,
            banks = config.geometry.banks,
            channel_size_mb = config.geometry.channel_size_mb,
            t_ck = config.timing.primitive.t_ck,
            "configuration ready"
        );
        Ok(config)
    }

    /// Pretty-printed JSON of the whole snapshot.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// DRAM standard.
    pub fn protocol(&self) -> DramProtocol {
        self.protocol
    }

    /// Device organisation.
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Bit widths of the address fields.
    pub fn address_widths(&self) -> &AddressWidths {
        &self.address_widths
    }

    /// Physical address partition for the configured mapping.
    pub fn address_layout(&self) -> &AddressLayout {
        &self.address_layout
    }

    /// Primitive and derived timings.
    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    /// Supply voltage and currents as configured.
    pub fn power_inputs(&self) -> &PowerInputs {
        &self.power_inputs
    }

    /// Per-command energy increments.
    pub fn energy(&self) -> &EnergyIncrements {
        &self.energy
    }

    /// Queueing and refresh policy.
    pub fn system(&self) -> &SystemParams {
        &self.system
    }

    /// Reporting cadence and output file locations.
    pub fn output(&self) -> &OutputParams {
        &self.output
    }

    /// HMC parameters; `None` unless the protocol is HMC.
    pub fn hmc(&self) -> Option<&HmcParams> {
        self.hmc.as_ref()
    }

    /// Thermal model settings.
    #[cfg(feature = "thermal")]
    pub fn thermal(&self) -> &ThermalParams {
        &self.thermal
    }

    /// GDDR5 or GDDR5X.
    pub fn is_gddr(&self) -> bool {
        self.protocol.is_gddr()
    }

    /// HBM or HBM2.
    pub fn is_hbm(&self) -> bool {
        self.protocol.is_hbm()
    }

    /// Hybrid Memory Cube.
    pub fn is_hmc(&self) -> bool {
        self.protocol.is_hmc()
    }

    /// DDR4.
    pub fn is_ddr4(&self) -> bool {
        self.protocol.is_ddr4()
    }

    /// Bytes moved by one request.
    pub fn request_size_bytes(&self) -> i64 {
        self.geometry.request_size_bytes()
    }

    /// Capacity of one channel in bytes.
    pub fn channel_size_bytes(&self) -> u128 {
        self.geometry.channel_size_bytes()
    }

    /// Clock period in ns.
    pub fn t_ck(&self) -> f64 {
        self.timing.primitive.t_ck
    }

    /// Read latency.
    pub fn rl(&self) -> Cycles {
        self.timing.rl
    }

    /// Write latency.
    pub fn wl(&self) -> Cycles {
        self.timing.wl
    }

    /// Cycles per data burst.
    pub fn burst_cycle(&self) -> Cycles {
        self.timing.burst_cycle
    }

    /// Read command to last data beat.
    pub fn read_delay(&self) -> Cycles {
        self.timing.read_delay
    }

    /// Write command to last data beat.
    pub fn write_delay(&self) -> Cycles {
        self.timing.write_delay
    }

    /// Precharge-to-precharge delay; 0 unless LPDDR4 or GDDR.
    pub fn t_ppd(&self) -> Cycles {
        self.timing.t_ppd()
    }

    /// 32-activate window; 0 unless GDDR.
    pub fn t_32aw(&self) -> Cycles {
        self.timing.t_32aw()
    }

    /// Activate-to-read delay.
    pub fn t_rcdrd(&self) -> Cycles {
        self.timing.t_rcdrd()
    }

    /// Activate-to-write delay.
    pub fn t_rcdwr(&self) -> Cycles {
        self.timing.t_rcdwr()
    }
}
