use std::num::ParseIntError;
use std::path::PathBuf;
use std::time::Duration;

use structopt::StructOpt;

use crts_shared::link::DEFAULT_TIMEOUT;
use crts_shared::protocol::{PING_CODE, PRODUCT_ID, VENDOR_ID};
use crts_shared::{Proxy, UsbLink};

mod set;
mod status;
mod tree;

#[derive(Debug, StructOpt)]
#[structopt(name = "crts", about = "CrTreeStatus status light tool")]
struct Opt {
    /// USB vendor id (hex)
    #[structopt(long, default_value = "6666", parse(try_from_str = parse_hex))]
    vid: u16,
    /// USB product id (hex)
    #[structopt(long, default_value = "5110", parse(try_from_str = parse_hex))]
    pid: u16,
    /// Control transfer timeout in milliseconds
    #[structopt(long)]
    timeout: Option<u64>,
    /// Ping the device before the command, as on plug-in. Turns both LEDs off
    #[structopt(long)]
    attach: bool,
    #[structopt(short, long)]
    debug: bool,
    #[structopt(subcommand)]
    cmd: CliCommand,
}

#[derive(StructOpt, Debug)]
enum CliCommand {
    /// List attached devices
    List,
    /// Show the state of both LEDs
    Status,
    /// Write LED codes: one digit per LED, index * 4 + state
    /// (state 0 on, 1 off, 2 flash). "05" = green on, red off
    Set { codes: String },
    /// Ping the device. Turns both LEDs off
    Ping { code: Option<u8> },
    /// Show the tree status ({"general_state": ...}) on the LEDs.
    /// Read from <path> ("-" for stdin) or fetched from --url
    Tree {
        path: Option<PathBuf>,
        #[structopt(long, default_value = "http://chromium-status.appspot.com/current?format=json")]
        url: String,
    },
}

fn parse_hex(s: &str) -> Result<u16, ParseIntError> {
    u16::from_str_radix(s.trim_start_matches("0x"), 16)
}

fn main() -> anyhow::Result<()> {
    let opt = Opt::from_args();

    let loglevel = if opt.debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(loglevel)
        .parse_env("RUST_LOG")
        .init();

    if opt.vid != VENDOR_ID || opt.pid != PRODUCT_ID {
        log::debug!("Using device {:04x}:{:04x}", opt.vid, opt.pid);
    }

    let timeout = opt
        .timeout
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_TIMEOUT);

    if let CliCommand::List = opt.cmd {
        return status::command_list(opt.vid, opt.pid);
    }

    let link = UsbLink::open(opt.vid, opt.pid, timeout)?;
    let mut proxy = if opt.attach {
        Proxy::attach(link)
    } else {
        Proxy::new(link)
    };

    let res = match opt.cmd {
        CliCommand::List => Ok(()),
        CliCommand::Status => status::command_status(&mut proxy),
        CliCommand::Set { codes } => set::command_set(&mut proxy, &codes),
        CliCommand::Ping { code } => status::command_ping(&mut proxy, code.unwrap_or(PING_CODE)),
        CliCommand::Tree { path, url } => {
            let source = tree::Source::new(path, url, timeout);
            tree::command_tree(&mut proxy, &source)
        }
    };

    proxy.detach();
    res
}
