//! DRAM configuration CLI.
//!
//! This binary loads one device description and reports the derived snapshot. It performs:
//! 1. **Derivation:** Every stage of `dramcfg_core::Config::new`, including the sanity checks.
//! 2. **Summary:** A short human-readable report (default).
//! 3. **JSON:** The complete snapshot for scripting (`--json`).
//!
//! Any error is printed to stderr and the process exits with status 1.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use dramcfg_core::Config;

#[derive(Parser, Debug)]
#[command(
    name = "dramcfg",
    author,
    version,
    about = "Derive and validate a DRAM simulator configuration",
    long_about = "Reads an INI device description, derives timing, geometry, address layout and energy constants, and checks them for consistency.\n\nExamples:\n  dramcfg configs/DDR4_8Gb_x8_2400.ini\n  dramcfg configs/HBM2_4Gb_x128.ini -o results --json\n\nSet RUST_LOG=debug to trace each derivation stage."
)]
struct Cli {
    /// Device description (INI).
    config: PathBuf,

    /// Directory statistics files will be written to.
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Print the full snapshot as JSON instead of a summary.
    #[arg(long)]
    json: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match Config::new(&cli.config, &cli.output_dir) {
        Ok(config) => config,
        Err(e) => {
            error!(path = %cli.config.display(), "configuration rejected");
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    if cli.json {
        match config.to_json() {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("error: cannot serialize configuration: {e}");
                process::exit(1);
            }
        }
    } else {
        print_summary(&config);
    }
}

/// Prints the figures most often checked by hand.
fn print_summary(config: &Config) {
    let g = config.geometry();
    let w = config.address_widths();
    let t = config.timing();

    println!("Protocol: {}", config.protocol());
    println!(
        "  Channels: {}  Ranks: {}  Bankgroups: {}  Banks/group: {}  Banks: {}",
        g.channels, g.ranks, g.bankgroups, g.banks_per_group, g.banks
    );
    println!(
        "  Rows: {}  Columns: {}  Device width: {}  Bus width: {}  Devices/rank: {}",
        g.rows, g.columns, g.device_width, g.bus_width, g.devices_per_rank
    );
    println!(
        "  Channel size: {} MB  Request size: {} B",
        g.channel_size_mb,
        config.request_size_bytes()
    );
    println!();

    println!("Address ({}):", config.system().address_mapping);
    println!(
        "  Widths  ch:{} ra:{} bg:{} ba:{} ro:{} co:{}",
        w.channel, w.rank, w.bankgroup, w.bank, w.row, w.column
    );
    let layout = config.address_layout();
    let slots: Vec<String> = layout
        .slots
        .iter()
        .map(|s| format!("{}[{}+{}]", s.field.token(), s.position + layout.shift_bits, s.width))
        .collect();
    println!("  Layout  {}  offset:{}", slots.join(" "), layout.shift_bits);
    println!();

    println!("Timing (tCK = {} ns):", t.primitive.t_ck);
    println!(
        "  RL: {}  WL: {}  tRC: {}  burst: {}  read_delay: {}  write_delay: {}",
        t.rl, t.wl, t.t_rc, t.burst_cycle, t.read_delay, t.write_delay
    );
    println!();

    println!("Energy per command (pJ):");
    for (name, value) in config.energy().named() {
        println!("  {name:<20} {value:>14.3}");
    }
    println!();

    let system = config.system();
    println!(
        "Policy: {:?} / {:?} / {}  queues: cmd {} trans {}",
        system.queue_structure,
        system.row_buf_policy,
        system.refresh_policy,
        system.cmd_queue_size,
        system.trans_queue_size
    );
    if let Some(hmc) = config.hmc() {
        println!(
            "HMC: {} links x {} lanes @ {} Gbps ({:.1} GB/s), {} vaults",
            hmc.num_links,
            hmc.link_width,
            hmc.link_speed,
            hmc.link_bandwidth_gbps(),
            hmc.num_vaults
        );
    }
    println!("Stats: {}", config.output().paths.stats_file.display());
}
