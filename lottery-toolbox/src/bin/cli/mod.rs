mod draw;
mod host;
mod markers;
mod pool;
mod records;

use color_eyre::Report;
use lottery_toolbox::storage::{FileStorage, MemoryStorage};
use lottery_toolbox::utils::now_millis;
use lottery_toolbox::{DrawSession, ToolboxConfig};
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
pub struct Cli {
    /// JSON configuration file
    #[structopt(long)]
    config: Option<PathBuf>,

    /// Directory holding the persisted state, overrides the configured one
    #[structopt(long)]
    data_dir: Option<PathBuf>,

    #[structopt(subcommand)]
    command: Command,
}

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
pub enum Command {
    /// Draw one prize
    Draw(draw::Draw),
    /// Inspect or edit the prize pool
    Pool(pool::Pool),
    /// Inspect, export or clear the draw history
    Records(records::Records),
    /// Host access management
    Host(host::Host),
    /// Travel map markers
    Markers(markers::Markers),
}

/// Settings shared by every command.
pub struct Context {
    pub config: ToolboxConfig,
}

impl Context {
    pub fn storage(&self) -> FileStorage {
        FileStorage::new(&self.config.data_dir)
    }

    /// Open the lottery. Each invocation is a fresh session, so host commands
    /// unlock it with the PIN given on the command line.
    pub fn open_session(&self, pin: Option<&str>) -> Result<DrawSession<FileStorage>, Report> {
        let mut session = DrawSession::open(
            self.storage(),
            MemoryStorage::new(),
            &self.config,
            now_millis(),
            &mut rand::thread_rng(),
        )?;
        if let Some(pin) = pin {
            session.unlock(pin)?;
        }
        Ok(session)
    }
}

impl Cli {
    pub fn exec(self) -> Result<(), Report> {
        let Self {
            config,
            data_dir,
            command,
        } = self;
        let mut config = ToolboxConfig::load(config.as_deref())?;
        if let Some(data_dir) = data_dir {
            config.data_dir = data_dir;
        }
        let context = Context { config };

        match command {
            Command::Draw(cmd) => cmd.exec(&context),
            Command::Pool(cmd) => cmd.exec(&context),
            Command::Records(cmd) => cmd.exec(&context),
            Command::Host(cmd) => cmd.exec(&context),
            Command::Markers(cmd) => cmd.exec(&context),
        }
    }
}
