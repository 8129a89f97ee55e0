//! Cross-field validation of a fully derived snapshot.
//!
//! This is the only place derived values are rejected. Checks run in a fixed
//! order and the first violation is returned:
//! 1. **Geometry:** Positive counts, bus/device width divisibility, bank product.
//! 2. **Timing:** Non-negative cycle counts, positive clock, latency relations.
//! 3. **Power:** Required currents present, energies non-negative and finite.
//! 4. **Capacity:** Declared size against address widths and layout.
//! 5. **Policy:** Refresh compatibility, queue depths, reporting settings.
//! 6. **HMC and thermal:** Link and floorplan settings, when present.

use tracing::debug;

use crate::common::{ValidationError, pow2};
use crate::geometry::{Geometry, addressable_channel_bytes};
use crate::hmc::{BLOCK_SIZES, HmcParams, LINK_COUNTS, LINK_SPEEDS, LINK_WIDTHS};
use crate::snapshot::Config;
use crate::system::RefreshPolicy;

type Check = Result<(), ValidationError>;

/// Runs every check against `config`.
pub fn check(config: &Config) -> Check {
    check_geometry(config.geometry())?;
    check_timing(config)?;
    check_power(config)?;
    check_capacity(config)?;
    check_policy(config)?;
    if let Some(hmc) = config.hmc() {
        check_hmc(hmc)?;
    }
    #[cfg(feature = "thermal")]
    check_thermal(config.thermal())?;
    debug!("sanity checks passed");
    Ok(())
}

fn at_least_one(field: &'static str, value: i64) -> Check {
    if value >= 1 {
        Ok(())
    } else {
        Err(ValidationError::NonPositive { field, value })
    }
}

fn one_of(field: &'static str, value: i64, allowed: &[i64], text: &'static str) -> Check {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value,
            allowed: text,
        })
    }
}

fn check_geometry(g: &Geometry) -> Check {
    for (field, value) in [
        ("channel_size", g.channel_size_mb),
        ("channels", g.channels),
        ("ranks", g.ranks),
        ("bankgroups", g.bankgroups),
        ("banks_per_group", g.banks_per_group),
        ("banks", g.banks),
        ("rows", g.rows),
        ("columns", g.columns),
        ("device_width", g.device_width),
        ("bus_width", g.bus_width),
        ("BL", g.burst_length),
    ] {
        at_least_one(field, value)?;
    }

    if g.bus_width % 8 != 0 || g.bus_width % g.device_width != 0 {
        return Err(ValidationError::BusWidth {
            bus_width: g.bus_width,
            device_width: g.device_width,
        });
    }

    if g.bankgroups.checked_mul(g.banks_per_group) != Some(g.banks) {
        return Err(ValidationError::BankProduct {
            banks: g.banks,
            bankgroups: g.bankgroups,
            banks_per_group: g.banks_per_group,
        });
    }
    Ok(())
}

fn check_timing(config: &Config) -> Check {
    let timing = config.timing();
    let t_ck = timing.primitive.t_ck;
    if !(t_ck.is_finite() && t_ck > 0.0) {
        return Err(ValidationError::ClockPeriod(t_ck));
    }

    if let Some((field, value)) = timing.named_cycles().into_iter().find(|&(_, v)| v < 0) {
        return Err(ValidationError::NegativeTiming { field, value });
    }

    let p = &timing.primitive;
    let delay = |latency: Option<i64>, preamble: i64| {
        latency?
            .checked_add(timing.burst_cycle)?
            .checked_add(preamble.saturating_sub(1).max(0))
    };
    let rl = p.al.checked_add(p.cl);
    let wl = p.al.checked_add(p.cwl);
    for (field, relation, actual, expected) in [
        ("RL", "AL + CL", timing.rl, rl),
        ("WL", "AL + CWL", timing.wl, wl),
        ("tRC", "tRAS + tRP", timing.t_rc, p.t_ras.checked_add(p.t_rp)),
        ("read_delay", "RL + burst_cycle + tRPRE - 1", timing.read_delay, delay(rl, p.t_rpre)),
        ("write_delay", "WL + burst_cycle + tWPRE - 1", timing.write_delay, delay(wl, p.t_wpre)),
    ] {
        let Some(expected) = expected else {
            return Err(ValidationError::TimingOverflow { field, relation });
        };
        if actual != expected {
            return Err(ValidationError::LatencyRelation {
                field,
                relation,
                actual,
                expected,
            });
        }
    }
    Ok(())
}

fn check_power(config: &Config) -> Check {
    if let Some(&key) = config.power_inputs().missing().first() {
        return Err(ValidationError::MissingPowerInput {
            key,
            protocol: config.protocol().name(),
        });
    }

    match config
        .energy()
        .named()
        .into_iter()
        .find(|&(_, v)| !(v.is_finite() && v >= 0.0))
    {
        Some((field, value)) => Err(ValidationError::Energy { field, value }),
        None => Ok(()),
    }
}

fn check_capacity(config: &Config) -> Check {
    let g = config.geometry();
    let declared = g.channel_size_bytes();
    let physical = g
        .rank_bytes()
        .saturating_mul(u128::try_from(g.ranks).unwrap_or(0));
    if declared != physical {
        return Err(ValidationError::ChannelSize { declared, physical });
    }

    let addressable = addressable_channel_bytes(g, config.address_widths());
    if declared != addressable {
        return Err(ValidationError::Capacity {
            declared,
            addressable,
        });
    }

    let layout = config.address_layout();
    let total_bytes = declared.saturating_mul(u128::try_from(g.channels).unwrap_or(0));
    let request_bytes = u128::try_from(g.request_size_bytes()).unwrap_or(0);
    // The request offset must itself be a whole number of bits.
    if layout.addressable_bytes() != total_bytes || pow2(layout.shift_bits) != request_bytes {
        return Err(ValidationError::AddressCoverage {
            layout_bits: layout.field_bits(),
            shift_bits: layout.shift_bits,
            total_bytes,
        });
    }
    Ok(())
}

fn check_policy(config: &Config) -> Check {
    let system = config.system();
    let g = config.geometry();
    if system.refresh_policy == RefreshPolicy::BankLevelStaggered && g.banks <= 1 {
        return Err(ValidationError::RefreshPolicy {
            policy: system.refresh_policy.as_str(),
            reason: format!("a single bank per rank (banks = {})", g.banks),
        });
    }

    at_least_one("cmd_queue_size", system.cmd_queue_size)?;
    at_least_one("trans_queue_size", system.trans_queue_size)?;
    at_least_one("sref_threshold", system.sref_threshold)?;

    let output = config.output();
    at_least_one("epoch_period", output.epoch_period)?;
    if system.delay_queue_cycles < 0 {
        return Err(ValidationError::OutOfRange {
            field: "delay_queue_cycles",
            value: system.delay_queue_cycles,
            allowed: ">= 0",
        });
    }
    if !(-1..=2).contains(&output.output_level) {
        return Err(ValidationError::OutOfRange {
            field: "output_level",
            value: output.output_level,
            allowed: "-1..=2",
        });
    }
    Ok(())
}

fn check_hmc(hmc: &HmcParams) -> Check {
    one_of("link_width", hmc.link_width, &LINK_WIDTHS, "4, 8 or 16 lanes")?;
    one_of("link_speed", hmc.link_speed, &LINK_SPEEDS, "12, 15, 25, 28 or 30 Gbps")?;
    one_of("block_size", hmc.block_size, &BLOCK_SIZES, "32, 64, 128 or 256 bytes")?;
    one_of("num_links", hmc.num_links, &LINK_COUNTS, "2 or 4 links")?;
    at_least_one("xbar_queue_depth", hmc.xbar_queue_depth)?;
    at_least_one("num_dies", hmc.num_dies)
}

#[cfg(feature = "thermal")]
fn check_thermal(thermal: &crate::thermal::ThermalParams) -> Check {
    for (field, value) in [
        ("power_epoch_period", thermal.power_epoch_period),
        ("mat_dim_x", thermal.mat_dim_x),
        ("mat_dim_y", thermal.mat_dim_y),
        ("num_x_grids", thermal.num_x_grids),
        ("num_y_grids", thermal.num_y_grids),
        ("RowTile", thermal.row_tile),
        ("tile_row_num", thermal.tile_row_num),
    ] {
        at_least_one(field, value)?;
    }
    one_of("bank_order", thermal.bank_order, &[0, 1], "0 or 1")?;
    one_of("bank_layer_order", thermal.bank_layer_order, &[0, 1], "0 or 1")
}
