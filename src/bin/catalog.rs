use anime_finder::catalog::card::{render_choices, updated_line};
use anime_finder::catalog::{
    render_card, CardStyle, Catalog, CatalogView, FileHiddenStore, FranchiseGroup,
    EMPTY_VIEW_MESSAGE,
};
use anime_finder::cli::{CatalogArgs, CatalogCommand};
use anime_finder::logging::init_tracing_to_stderr;
use anime_finder::snapshot::Snapshot;
use anyhow::Result;
use chrono::{Datelike, Utc};
use clap::Parser;
use dotenvy::dotenv;
use tracing::{debug, info};

fn main() -> Result<()> {
    let loaded = dotenv();
    init_tracing_to_stderr();
    if let Ok(path) = loaded {
        debug!("Loaded environment from {:?}", path);
    }

    let args = CatalogArgs::parse();
    if matches!(args.command, Some(CatalogCommand::Choices)) {
        println!("{}", render_choices(Utc::now().year()));
        return Ok(());
    }

    let store = FileHiddenStore::new(
        args.hidden_store
            .clone()
            .unwrap_or_else(FileHiddenStore::default_path),
    );
    debug!("Hidden list at {}", store.path().display());

    let snapshot = Snapshot::load(&args.snapshot)?;
    let mut catalog = Catalog::open(snapshot, Box::new(store))?;

    match &args.command {
        Some(CatalogCommand::Hide { ids }) => {
            for &id in ids {
                if !catalog.hide(id)? {
                    info!("Anime {} was already hidden", id);
                }
            }
        }
        Some(CatalogCommand::Restore { ids }) => {
            for &id in ids {
                if !catalog.restore(id)? {
                    info!("Anime {} was not hidden", id);
                }
            }
        }
        Some(CatalogCommand::Hidden) => {
            let style = CardStyle {
                compact: true,
                expand: false,
            };
            for record in catalog.hidden_records() {
                let group = FranchiseGroup::single(record);
                println!("{}", render_card(&group, style));
            }
            println!("{} hidden", catalog.hidden().len());
        }
        Some(CatalogCommand::ClearHidden) => catalog.clear_hidden()?,
        // Answered before the snapshot is loaded.
        Some(CatalogCommand::Choices) => {}
        None => print_listing(&catalog, &args)?,
    }
    Ok(())
}

fn print_listing(catalog: &Catalog, args: &CatalogArgs) -> Result<()> {
    let state = args.list.to_filter_state()?;
    let view = catalog.view(&state);
    let style = CardStyle {
        compact: args.list.compact,
        expand: args.list.expand,
    };

    println!("{}", catalog.summary_line(&view));
    println!("{}", updated_line(catalog.last_updated()));
    println!();

    match &view {
        CatalogView::Empty => println!("{EMPTY_VIEW_MESSAGE}"),
        CatalogView::Entries(groups) => {
            let separator = if style.compact { "\n" } else { "\n\n" };
            let cards: Vec<String> = groups.iter().map(|g| render_card(g, style)).collect();
            println!("{}", cards.join(separator));
        }
    }
    Ok(())
}
