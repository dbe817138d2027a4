use super::Context;
use color_eyre::eyre::eyre;
use color_eyre::Report;
use lottery_toolbox::editor::PoolEdit;
use prize_pool_lib::PrizePool;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
pub enum Pool {
    /// Print every slot with its chance of being drawn
    Show {
        /// Host PIN, also prints the prize details
        #[structopt(long)]
        pin: Option<String>,
    },
    /// Change a single slot
    Set(SetSlot),
    /// Replace every slot with the content of a JSON file
    Import {
        /// List of `{name, detail, weight, enabled}` objects, one per slot
        file: PathBuf,

        #[structopt(long)]
        pin: String,
    },
    /// Go back to the default prizes
    Reset {
        #[structopt(long)]
        pin: String,
    },
}

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
pub struct SetSlot {
    /// Slot number, starting at 1
    slot: usize,

    #[structopt(long)]
    name: Option<String>,

    #[structopt(long)]
    detail: Option<String>,

    #[structopt(long)]
    weight: Option<f64>,

    #[structopt(long, conflicts_with = "disable")]
    enable: bool,

    #[structopt(long)]
    disable: bool,

    #[structopt(long)]
    pin: String,
}

impl Pool {
    pub fn exec(self, context: &Context) -> Result<(), Report> {
        match self {
            Pool::Show { pin } => {
                let session = context.open_session(pin.as_deref())?;
                print_pool(session.pool(), pin.is_some());
            }
            Pool::Set(set) => set.exec(context)?,
            Pool::Import { file, pin } => {
                let edits: Vec<PoolEdit> = serde_json::from_reader(std::fs::File::open(file)?)?;
                let mut session = context.open_session(Some(&pin))?;
                print_pool(session.save_pool(edits)?, true);
            }
            Pool::Reset { pin } => {
                let mut session = context.open_session(Some(&pin))?;
                print_pool(session.reset_pool()?, true);
            }
        }
        Ok(())
    }
}

impl SetSlot {
    fn exec(self, context: &Context) -> Result<(), Report> {
        let Self {
            slot,
            name,
            detail,
            weight,
            enable,
            disable,
            pin,
        } = self;
        let mut session = context.open_session(Some(&pin))?;
        let mut edits = PoolEdit::from_pool(session.pool());
        let edit = slot
            .checked_sub(1)
            .and_then(|index| edits.get_mut(index))
            .ok_or_else(|| eyre!("slot {} does not exist", slot))?;

        if let Some(name) = name {
            edit.name = name;
        }
        if let Some(detail) = detail {
            edit.detail = detail;
        }
        if let Some(weight) = weight {
            edit.weight = weight;
        }
        if enable {
            edit.enabled = true;
        }
        if disable {
            edit.enabled = false;
        }

        print_pool(session.save_pool(edits)?, true);
        Ok(())
    }
}

fn print_pool(pool: &PrizePool, with_details: bool) {
    let total = pool.total_weight();
    for (index, entry) in pool.entries().iter().enumerate() {
        let chance = if entry.is_drawable() && total > 0.0 {
            format!("{:5.1}%", entry.weight / total * 100.0)
        } else {
            "    -".to_string()
        };
        let state = if entry.enabled { "on " } else { "off" };
        println!(
            "{:>2}. [{}] {} w={:<4} {}",
            index + 1,
            state,
            chance,
            entry.weight,
            entry.name
        );
        if with_details {
            println!("      {}", entry.detail);
        }
    }
}
