use super::Context;
use color_eyre::Report;
use lottery_toolbox::markers::{Marker, MarkerBook, MarkerEdit, NominatimClient};
use lottery_toolbox::storage::FileStorage;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
pub enum Markers {
    /// Print every marker
    List,
    /// Pin a new place
    Add {
        #[structopt(allow_hyphen_values = true)]
        lat: f64,
        #[structopt(allow_hyphen_values = true)]
        lng: f64,

        #[structopt(long, default_value = "")]
        emoji: String,

        #[structopt(long, default_value = "")]
        title: String,
    },
    /// Change the text fields of a marker
    Edit {
        /// Marker number, as printed by `list`
        index: usize,

        #[structopt(flatten)]
        edit: EditFields,
    },
    /// Put a marker somewhere else
    Move {
        index: usize,
        #[structopt(allow_hyphen_values = true)]
        lat: f64,
        #[structopt(allow_hyphen_values = true)]
        lng: f64,
    },
    Remove {
        index: usize,
    },
    Clear,
    /// Write the stored markers to `dir/markers.json`
    Export {
        dir: PathBuf,
    },
    /// Replace every marker with the content of an exported file
    Import {
        file: PathBuf,
    },
    /// Look a place up and optionally pin the first hit
    Search {
        query: String,

        /// Add the first result as a marker
        #[structopt(long)]
        pin_first: bool,

        #[structopt(long, default_value = "")]
        emoji: String,
    },
}

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
pub struct EditFields {
    #[structopt(long)]
    title: Option<String>,
    #[structopt(long)]
    notes: Option<String>,
    /// Visit date, e.g. 2025-05-01
    #[structopt(long)]
    date: Option<String>,
    #[structopt(long)]
    photo_link: Option<String>,
    #[structopt(long)]
    emoji: Option<String>,
}

impl From<EditFields> for MarkerEdit {
    fn from(fields: EditFields) -> Self {
        Self {
            title: fields.title,
            notes: fields.notes,
            date: fields.date,
            photo_link: fields.photo_link,
            emoji: fields.emoji,
        }
    }
}

fn print_marker(index: usize, marker: &Marker) {
    println!(
        "{:>3}. {} {} ({})",
        index,
        marker.emoji,
        marker.title,
        marker.coordinates()
    );
    if !marker.date.is_empty() {
        println!("     日期: {}", marker.date);
    }
    if !marker.notes.is_empty() {
        println!("     {}", marker.notes);
    }
    if marker.has_photo() {
        println!("     照片: {}", marker.photo_link);
    }
}

impl Markers {
    pub fn exec(self, context: &Context) -> Result<(), Report> {
        let mut book: MarkerBook<FileStorage> = MarkerBook::load(context.storage())?;
        match self {
            Markers::List => {
                if book.is_empty() {
                    println!("还没有标记");
                }
                for (index, marker) in book.markers().iter().enumerate() {
                    print_marker(index, marker);
                }
            }
            Markers::Add {
                lat,
                lng,
                emoji,
                title,
            } => {
                let index = book.add(Marker::new(lat, lng, &emoji, &title)?)?;
                print_marker(index, &book.markers()[index]);
            }
            Markers::Edit { index, edit } => {
                print_marker(index, book.edit(index, edit.into())?);
            }
            Markers::Move { index, lat, lng } => {
                print_marker(index, book.move_to(index, lat, lng)?);
            }
            Markers::Remove { index } => {
                book.remove(index)?;
            }
            Markers::Clear => book.clear()?,
            Markers::Export { dir } => {
                println!("{}", book.export(&dir)?.display());
            }
            Markers::Import { file } => {
                let count = book.import(&std::fs::read_to_string(file)?)?;
                println!("{} markers imported", count);
            }
            Markers::Search {
                query,
                pin_first,
                emoji,
            } => {
                let client =
                    NominatimClient::new(&context.config.nominatim_url, &context.config.user_agent)?;
                let places = client.search(&query)?;
                if places.is_empty() {
                    println!("未找到");
                }
                for place in &places {
                    println!("{:.6}, {:.6}  {}", place.lat, place.lon, place.display_name);
                }
                if let Some(place) = places.first().filter(|_| pin_first) {
                    let marker = Marker::new(place.lat, place.lon, &emoji, &place.display_name)?;
                    let index = book.add(marker)?;
                    print_marker(index, &book.markers()[index]);
                }
            }
        }
        Ok(())
    }
}
