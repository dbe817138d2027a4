use super::Context;
use color_eyre::Report;
use lottery_toolbox::records::ExportFormat;
use lottery_toolbox::utils::format_timestamp;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
pub enum Records {
    /// Print the draw history, newest first
    List {
        #[structopt(long)]
        pin: String,
    },
    /// Write the draw history to a file in `dir`
    Export {
        dir: PathBuf,

        /// json or csv
        #[structopt(long, default_value = "json")]
        format: ExportFormat,

        #[structopt(long)]
        pin: String,
    },
    /// Forget every draw
    Clear {
        #[structopt(long)]
        pin: String,
    },
}

impl Records {
    pub fn exec(self, context: &Context) -> Result<(), Report> {
        match self {
            Records::List { pin } => {
                let session = context.open_session(Some(&pin))?;
                let records = session.records();
                if records.is_empty() {
                    println!("还没有抽奖记录。");
                }
                for record in records.records() {
                    println!("{} 抽中「{}」", record.player_name, record.prize_name);
                    println!(
                        "  {} · 内容：{}",
                        format_timestamp(record.timestamp),
                        record.prize_detail
                    );
                }
            }
            Records::Export { dir, format, pin } => {
                let session = context.open_session(Some(&pin))?;
                let path = session.export_records(&dir, format, &chrono::Local::now())?;
                println!("{}", path.display());
            }
            Records::Clear { pin } => {
                let mut session = context.open_session(Some(&pin))?;
                session.clear_records()?;
            }
        }
        Ok(())
    }
}
