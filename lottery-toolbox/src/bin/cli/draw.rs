use super::Context;
use color_eyre::Report;
use lottery_toolbox::draw::{parse_seed, seeded_rng, Seed};
use lottery_toolbox::utils::{format_timestamp, now_millis};
use lottery_toolbox::DrawOutcome;
use structopt::StructOpt;

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
pub struct Draw {
    /// Name written in the draw record
    #[structopt(long, default_value = "")]
    player: String,

    /// Hex encoded 32 byte seed, for reproducible draws
    #[structopt(long, parse(try_from_str = parse_seed))]
    seed: Option<Seed>,
}

impl Draw {
    pub fn exec(self, context: &Context) -> Result<(), Report> {
        let Self { player, seed } = self;
        let mut session = context.open_session(None)?;

        let outcome = match seed {
            Some(seed) => session.draw_once(&player, &mut seeded_rng(seed), now_millis())?,
            None => session.draw_once(&player, &mut rand::thread_rng(), now_millis())?,
        };
        match outcome {
            DrawOutcome::Unavailable => println!("奖池暂不可用"),
            DrawOutcome::Won { prize, record } => {
                println!("{}", prize.name);
                println!(
                    "{} · {}",
                    format_timestamp(record.timestamp),
                    record.player_name
                );
            }
        }
        Ok(())
    }
}
