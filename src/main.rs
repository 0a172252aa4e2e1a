use blehil::protocol::EOL;
use blehil::{BleApi, BoardHandle, CommonApi, ConfigLoader, DeviceInventory, TestBench};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

// Command-line arguments
#[derive(Parser, Debug)]
#[command(
    version,
    about = "Bench bring-up tool for BLE modules driven over UART.",
    long_about = "Lists the device inventory, identifies a board, or sends a raw command line to it. Test suites use the library; this binary only checks that a bench is wired up."
)]
struct Args {
    /// Configuration file. Defaults to the usual search path.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Device inventory, overriding the configured path.
    #[arg(short, long, global = true)]
    inventory: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the devices in the inventory.
    Devices,

    /// Reset a board and print its identity.
    Identify {
        #[arg(short, long)]
        model: String,
        #[arg(short, long)]
        revision: String,
    },

    /// Send a raw command line and print everything received.
    Send {
        #[arg(short, long)]
        model: String,
        #[arg(short, long)]
        revision: String,
        /// How long to collect output, in milliseconds.
        #[arg(short, long, default_value_t = 1000)]
        wait_ms: u64,
        /// Command line, sent with the board's line terminator.
        line: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let loader = match &args.config {
        Some(path) => ConfigLoader::load_from(path)?,
        None => ConfigLoader::load()?,
    };
    let mut config = loader.into_config();
    if let Some(path) = args.inventory {
        config.inventory.path = path;
    }
    blehil::logging::init(&config.logging)?;

    let inventory = DeviceInventory::load(&config.inventory.path)?;

    match args.command {
        Command::Devices => {
            for record in inventory.records() {
                let state = if inventory.is_acquired(record) {
                    "in use"
                } else {
                    "free"
                };
                println!("{record} [{state}]");
            }
        }
        Command::Identify { model, revision } => {
            let mut bench = TestBench::acquire(&inventory, &model, &revision, &config)?;
            let board = bench.board_mut();
            let show = |value: Option<String>| value.unwrap_or_else(|| "?".to_string());
            println!("manufacturer: {}", show(board.manufacturer_id()));
            println!("model:        {}", show(board.model_id()));
            println!("revision:     {}", show(board.revision_id()));
            if let Some(local) = board.local_address() {
                println!("address:      {local}");
            }
        }
        Command::Send {
            model,
            revision,
            wait_ms,
            line,
        } => {
            let mut bench = TestBench::acquire(&inventory, &model, &revision, &config)?;
            let transport = bench.board_mut().core_mut().transport_mut();
            transport.clear();
            transport.write_str(&format!("{line}{EOL}"))?;
            thread::sleep(Duration::from_millis(wait_ms));
            let received = transport.snapshot().replace("\r\n", "\n").replace('\r', "\n");
            print!("{received}");
        }
    }

    Ok(())
}
