use super::Context;
use color_eyre::Report;
use structopt::StructOpt;

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
pub enum Host {
    /// Check a PIN without changing anything
    Unlock {
        #[structopt(long)]
        pin: String,
    },
    /// Replace the host PIN
    ChangePin {
        /// At least 4 characters
        new_pin: String,

        /// Current PIN
        #[structopt(long)]
        pin: String,
    },
}

impl Host {
    pub fn exec(self, context: &Context) -> Result<(), Report> {
        match self {
            Host::Unlock { pin } => {
                context.open_session(Some(&pin))?;
                println!("已进入主持模式。");
            }
            Host::ChangePin { new_pin, pin } => {
                let mut session = context.open_session(Some(&pin))?;
                session.change_pin(&new_pin)?;
            }
        }
        Ok(())
    }
}
