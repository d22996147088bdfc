//! CLI implementation for servicefinder.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use log::debug;
use std::path::PathBuf;
use std::sync::LazyLock;

use crate::catalogue::{CatalogueFile, GroupSource};
use crate::config::{self, FinderConfig};
use crate::dialog::SelectionDialog;
use crate::format;
use crate::listing::{self, ServiceListing};
use crate::picker::{PickerConfig, PickerOutcome, is_interactive, run_picker};
use crate::review::{Review, ReviewStatus, ReviewStore, average_rating};
use crate::session::EditorSession;
use crate::store::{FileListingStore, ListingStore};

/// Build version string with git info for local builds
static VERSION: LazyLock<String> = LazyLock::new(|| {
    let version = env!("CARGO_PKG_VERSION");

    let sha = option_env!("VERGEN_GIT_SHA").map(|s| &s[..7.min(s.len())]);
    let branch = option_env!("VERGEN_GIT_BRANCH").filter(|b| *b != "main" && *b != "master");
    let dirty = option_env!("VERGEN_GIT_DIRTY") == Some("true");

    match (sha, branch, dirty) {
        (Some(sha), Some(branch), true) => format!("{version} ({branch} {sha}-dirty)"),
        (Some(sha), Some(branch), false) => format!("{version} ({branch} {sha})"),
        (Some(sha), None, true) => format!("{version} ({sha}-dirty)"),
        (Some(sha), None, false) => format!("{version} ({sha})"),
        (None, _, _) => version.to_string(),
    }
});

/// Version plus build date, shown by `--version`
static LONG_VERSION: LazyLock<String> = LazyLock::new(|| {
    match option_env!("VERGEN_BUILD_TIMESTAMP") {
        Some(built) => format!("{}\nbuilt {built}", *VERSION),
        None => VERSION.clone(),
    }
});

fn version_string() -> &'static str {
    &VERSION
}

fn long_version_string() -> &'static str {
    &LONG_VERSION
}

/// Pick service catalogues and publish provider listings
#[derive(Parser)]
#[command(name = "servicefinder")]
#[command(version = version_string(), long_version = long_version_string(), about, long_about = None)]
struct Cli {
    /// Catalogue file (defaults to the configured one)
    #[arg(long, global = true, value_name = "FILE")]
    catalogue: Option<PathBuf>,

    /// Listing data directory (defaults to the configured one)
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Provider id to act as
    #[arg(long, global = true)]
    provider: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the available catalogues and their services
    Catalogue,

    /// Pick catalogues and services, then print the category string
    Select {
        /// Category string to start from
        ///
        /// Example: "Home Services: Plumbing | Automotive: Oil Change"
        #[arg(long)]
        initial: Option<String>,
    },

    /// Normalize a category string against the loaded catalogues
    Parse {
        /// Category string to parse
        text: String,
    },

    /// Save a listing for the signed-in provider
    ///
    /// Fields not given are taken from the latest saved listing.
    Save {
        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        pricing: Option<String>,

        /// Service area
        #[arg(long)]
        area: Option<String>,

        /// Available days, e.g. "Mon,Tue,Fri"
        #[arg(long)]
        days: Option<String>,

        /// Contact preference
        #[arg(long)]
        contact: Option<String>,

        /// Category string (opens the picker when omitted in a terminal)
        #[arg(long)]
        category: Option<String>,

        /// Image URL
        #[arg(long)]
        image: Option<String>,

        /// Save without asking for confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Show the provider's latest listing
    Draft,

    /// List saved listings
    List {
        /// List every provider's listings
        #[arg(long)]
        all: bool,
    },

    /// Search listings by title, description or category
    Search {
        query: String,
    },

    /// Show listings filed under a catalogue
    Filter {
        #[arg(id = "filter_catalogue", value_name = "CATALOGUE")]
        catalogue: String,
    },

    /// Rate providers and read their reviews
    Review {
        #[command(subcommand)]
        command: ReviewCommand,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand)]
enum ReviewCommand {
    /// Leave a review for a provider
    Add {
        /// Provider being reviewed
        provider_id: String,

        /// Stars from 1 to 5
        #[arg(long)]
        rating: u8,

        /// Reviewing customer's id
        #[arg(long)]
        customer: String,

        /// Name shown with the review
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        comment: Option<String>,

        /// Listing id the review is about
        #[arg(long)]
        service: Option<String>,
    },

    /// Show a provider's reviews and average rating
    List {
        /// Provider to show (defaults to the signed-in provider)
        provider_id: Option<String>,
    },

    /// Hide, flag or restore a review
    Status {
        provider_id: String,

        /// Review id
        id: String,

        /// active, hidden or flagged
        status: ReviewStatus,
    },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show config file location
    Path,

    /// Show the effective configuration
    Show,

    /// Write a config file from the given flags
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Form fields given on the command line.
#[derive(Default)]
struct ListingFields {
    title: Option<String>,
    description: Option<String>,
    pricing: Option<String>,
    area: Option<String>,
    days: Option<String>,
    contact: Option<String>,
    category: Option<String>,
    image: Option<String>,
}

impl ListingFields {
    fn apply_to(self, listing: &mut ServiceListing) {
        if let Some(title) = self.title {
            listing.title = title;
        }
        if let Some(description) = self.description {
            listing.description = description;
        }
        if let Some(pricing) = self.pricing {
            listing.pricing = pricing;
        }
        if let Some(area) = self.area {
            listing.service_area = area;
        }
        if let Some(days) = self.days {
            listing.set_days(&listing::parse_availability(&days));
        }
        if let Some(contact) = self.contact {
            listing.contact_preference = contact;
        }
        if let Some(image) = self.image {
            listing.image_url = Some(image).filter(|u| !u.trim().is_empty());
        }
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load_config()?.with_overrides(cli.catalogue, cli.data_dir, cli.provider);
    debug!("effective config: {config:?}");

    match cli.command {
        Commands::Catalogue => show_catalogues(&config)?,
        Commands::Select { initial } => select(&config, initial.as_deref())?,
        Commands::Parse { text } => parse_category(&config, &text)?,
        Commands::Save {
            title,
            description,
            pricing,
            area,
            days,
            contact,
            category,
            image,
            yes,
        } => {
            let fields = ListingFields {
                title,
                description,
                pricing,
                area,
                days,
                contact,
                category,
                image,
            };
            save_listing(&config, fields, yes)?;
        }
        Commands::Draft => show_draft(&config)?,
        Commands::List { all } => list_listings(&config, all)?,
        Commands::Search { query } => {
            let listings = open_store(&config)?.all()?;
            print_listings(&listing::search(&listings, &query));
        }
        Commands::Filter { catalogue } => {
            let listings = open_store(&config)?.all()?;
            print_listings(&listing::filter_by_catalogue(&listings, &catalogue));
        }
        Commands::Review { command } => handle_review_command(command, &config)?,
        Commands::Config { command } => handle_config_command(command, &config)?,
    }

    Ok(())
}

fn catalogue_source(config: &FinderConfig) -> Result<CatalogueFile> {
    Ok(CatalogueFile::new(config.catalogue_path()?))
}

fn open_store(config: &FinderConfig) -> Result<FileListingStore> {
    Ok(FileListingStore::new(config.data_path()?))
}

fn require_provider(config: &FinderConfig) -> Result<&str> {
    match config.provider() {
        Some(provider) => Ok(provider),
        None => bail!("Not signed in (pass --provider or set provider_id in the config)"),
    }
}

fn show_catalogues(config: &FinderConfig) -> Result<()> {
    let groups = catalogue_source(config)?.load_groups()?;

    if groups.is_empty() {
        println!("No catalogue data available");
        return Ok(());
    }

    for (name, services) in &groups {
        println!("{}", name.cyan().bold());
        for service in services {
            println!("  - {service}");
        }
    }
    Ok(())
}

fn select(config: &FinderConfig, initial: Option<&str>) -> Result<()> {
    let groups = catalogue_source(config)?.load_groups()?;
    let mut dialog = SelectionDialog::new(groups);
    if let Some(initial) = initial {
        dialog.restore_from_serialized(initial);
    }

    match run_picker(&mut dialog, &PickerConfig::default())? {
        PickerOutcome::Committed => println!("{}", dialog.selection().to_serialized()),
        PickerOutcome::Cancelled => eprintln!("{}", "Selection cancelled".yellow()),
    }
    Ok(())
}

fn parse_category(config: &FinderConfig, text: &str) -> Result<()> {
    let groups = catalogue_source(config)?.load_groups()?;
    let selection = format::parse(text, groups.keys().cloned());
    let normalized = format::serialize(&selection);

    if normalized.is_empty() {
        println!("{}", format::PLACEHOLDER.dimmed());
        return Ok(());
    }

    println!("{normalized}");
    for (group, items) in &selection {
        if items.is_empty() {
            continue;
        }
        println!(
            "  {} {}",
            format!("{group}:").cyan(),
            items.iter().cloned().collect::<Vec<_>>().join(format::ITEM_SEPARATOR)
        );
    }
    Ok(())
}

fn save_listing(config: &FinderConfig, mut fields: ListingFields, yes: bool) -> Result<()> {
    let provider = require_provider(config)?;
    let source = catalogue_source(config)?;
    let store = open_store(config)?;
    let mut session = EditorSession::load(&source, &store, provider)?;

    if let Some(category) = fields.category.take() {
        session.dialog_mut().restore_from_serialized(&category);
    } else if is_interactive() {
        let picker = PickerConfig {
            prompt: "Select catalogue & services for this listing".to_string(),
        };
        if run_picker(session.dialog_mut(), &picker)? == PickerOutcome::Cancelled {
            println!("{}", "Save cancelled".yellow());
            return Ok(());
        }
    }

    let mut listing = session.new_listing();
    fields.apply_to(&mut listing);

    if !listing.has_image() && !yes && is_interactive() {
        let proceed = dialoguer::Confirm::new()
            .with_prompt("Save without an image?")
            .default(false)
            .interact()
            .context("Failed to read confirmation")?;
        if !proceed {
            println!("{}", "Save cancelled".yellow());
            return Ok(());
        }
    }

    let saved = session.save(&store, listing)?;
    println!(
        "{} Saved listing {} ({})",
        "✓".green().bold(),
        saved.title.bold(),
        saved.id.as_deref().unwrap_or_default().dimmed()
    );
    println!("  {} {}", "Category:".bold(), saved.category);
    Ok(())
}

fn show_draft(config: &FinderConfig) -> Result<()> {
    let provider = require_provider(config)?;
    match open_store(config)?.latest(provider)? {
        Some(draft) => print_listing(&draft),
        None => println!("No saved listing for {}", provider.cyan()),
    }
    Ok(())
}

fn list_listings(config: &FinderConfig, all: bool) -> Result<()> {
    let store = open_store(config)?;
    let listings = if all {
        store.all()?
    } else {
        store.list(require_provider(config)?)?
    };
    print_listings(&listings.iter().collect::<Vec<_>>());
    Ok(())
}

fn print_listings(listings: &[&ServiceListing]) {
    if listings.is_empty() {
        println!("No listings found");
        return;
    }
    for (i, listing) in listings.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print_listing(listing);
    }
}

fn print_listing(listing: &ServiceListing) {
    println!(
        "{} {}",
        listing.title.bold(),
        format!("[{}]", listing.status).dimmed()
    );
    println!("  {} {}", "Provider:".bold(), listing.provider_id.cyan());
    let category = format::segments_with_items(&listing.category);
    if category.is_empty() {
        println!("  {} {}", "Category:".bold(), format::PLACEHOLDER.dimmed());
    } else {
        println!("  {} {}", "Category:".bold(), category);
    }
    if !listing.description.is_empty() {
        println!("  {} {}", "About:".bold(), listing.description);
    }
    println!("  {} {}", "Pricing:".bold(), listing.pricing);
    println!("  {} {}", "Area:".bold(), listing.service_area);
    println!("  {} {}", "Days:".bold(), listing.availability);
    println!("  {} {}", "Contact:".bold(), listing.contact_preference);
    if let Some(url) = listing.image_url.as_deref().filter(|u| !u.is_empty()) {
        println!("  {} {}", "Image:".bold(), url);
    }
    println!(
        "  {} {}",
        "Updated:".bold(),
        listing
            .updated_at
            .format("%Y-%m-%d %H:%M UTC")
            .to_string()
            .dimmed()
    );
}

fn handle_review_command(command: ReviewCommand, config: &FinderConfig) -> Result<()> {
    let store = open_store(config)?;

    match command {
        ReviewCommand::Add {
            provider_id,
            rating,
            customer,
            name,
            comment,
            service,
        } => {
            let mut review = Review::new(&provider_id, &customer, rating);
            review.customer_name = name.unwrap_or_default();
            review.comment = comment.unwrap_or_default();
            review.service_id = service.filter(|s| !s.trim().is_empty());

            let saved = store.save_review(review)?;
            println!(
                "{} Reviewed {} ({})",
                "✓".green().bold(),
                saved.provider_id.cyan(),
                saved.id.as_deref().unwrap_or_default().dimmed()
            );
            println!("  {} {}", "Rating:".bold(), store.average_rating(&saved.provider_id)?);
        }
        ReviewCommand::List { provider_id } => {
            let provider = match provider_id.as_deref() {
                Some(provider) => provider,
                None => require_provider(config)?,
            };
            let reviews = store.reviews_for_provider(provider)?;
            println!(
                "{} {}",
                provider.cyan().bold(),
                average_rating(&reviews)
            );
            if reviews.is_empty() {
                println!("No reviews yet");
            }
            for review in &reviews {
                print_review(review);
            }
        }
        ReviewCommand::Status {
            provider_id,
            id,
            status,
        } => {
            let updated = store.set_review_status(&provider_id, &id, status)?;
            println!(
                "{} Review {} is now {}",
                "✓".green().bold(),
                updated.id.as_deref().unwrap_or_default().dimmed(),
                updated.status
            );
        }
    }
    Ok(())
}

fn print_review(review: &Review) {
    let mut header = format!(
        "  {}/5 {} {}",
        review.rating,
        review.author().bold(),
        review.created_at.format("%Y-%m-%d").to_string().dimmed()
    );
    if review.status != ReviewStatus::Active {
        header.push_str(&format!(" [{}]", review.status).yellow().to_string());
    }
    println!("{header}");
    if !review.comment.is_empty() {
        println!("    {}", review.comment);
    }
    println!("    {}", review.id.as_deref().unwrap_or_default().dimmed());
}

fn handle_config_command(command: ConfigCommand, config: &FinderConfig) -> Result<()> {
    match command {
        ConfigCommand::Path => {
            println!("{}", config::global_config_path()?.display());
        }
        ConfigCommand::Show => {
            println!("{} {}", "Catalogue file:".bold(), config.catalogue_path()?.display());
            println!("{} {}", "Data directory:".bold(), config.data_path()?.display());
            println!(
                "{} {}",
                "Provider:".bold(),
                config.provider().unwrap_or("(not signed in)")
            );
        }
        ConfigCommand::Init { force } => {
            let path = config::global_config_path()?;
            if path.exists() && !force {
                bail!(
                    "Config file already exists: {}\nUse --force to overwrite.",
                    path.display()
                );
            }
            let path = config::save_config(config)?;
            println!(
                "{} Wrote config to {}",
                "✓".green().bold(),
                path.display()
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::sample_listing;

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "servicefinder",
            "list",
            "--provider",
            "provider1",
            "--data-dir",
            "/tmp/listings",
        ])
        .unwrap();

        assert_eq!(cli.provider.as_deref(), Some("provider1"));
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/listings")));
        assert!(matches!(cli.command, Commands::List { all: false }));
    }

    #[test]
    fn test_parse_save_flags() {
        let cli = Cli::try_parse_from([
            "servicefinder",
            "save",
            "--title",
            "Emergency Plumbing",
            "--days",
            "Mon,Fri",
            "-y",
        ])
        .unwrap();

        match cli.command {
            Commands::Save {
                title, days, yes, category, ..
            } => {
                assert_eq!(title.as_deref(), Some("Emergency Plumbing"));
                assert_eq!(days.as_deref(), Some("Mon,Fri"));
                assert!(yes);
                assert!(category.is_none());
            }
            _ => panic!("expected save command"),
        }
    }

    #[test]
    fn test_parse_requires_text() {
        assert!(Cli::try_parse_from(["servicefinder", "parse"]).is_err());
    }

    #[test]
    fn test_config_init_force_default() {
        let cli = Cli::try_parse_from(["servicefinder", "config", "init"]).unwrap();
        match cli.command {
            Commands::Config {
                command: ConfigCommand::Init { force },
            } => assert!(!force),
            _ => panic!("expected config init"),
        }
    }

    #[test]
    fn test_fields_override_draft() {
        let mut listing = sample_listing("provider1");
        ListingFields {
            pricing: Some("$95/hour".to_string()),
            days: Some("Sat,Sun".to_string()),
            image: Some("  ".to_string()),
            ..ListingFields::default()
        }
        .apply_to(&mut listing);

        assert_eq!(listing.pricing, "$95/hour");
        assert_eq!(listing.availability, "Sat, Sun");
        assert_eq!(listing.title, "Emergency Plumbing");
        assert!(listing.image_url.is_none());
    }

    #[test]
    fn test_parse_review_add() {
        let cli = Cli::try_parse_from([
            "servicefinder",
            "review",
            "add",
            "provider1",
            "--rating",
            "4",
            "--customer",
            "customer1",
        ])
        .unwrap();

        match cli.command {
            Commands::Review {
                command:
                    ReviewCommand::Add {
                        provider_id,
                        rating,
                        comment,
                        ..
                    },
            } => {
                assert_eq!(provider_id, "provider1");
                assert_eq!(rating, 4);
                assert!(comment.is_none());
            }
            _ => panic!("expected review add"),
        }
    }

    #[test]
    fn test_parse_review_status() {
        let cli = Cli::try_parse_from([
            "servicefinder",
            "review",
            "status",
            "provider1",
            "abc123",
            "hidden",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Review {
                command: ReviewCommand::Status {
                    status: ReviewStatus::Hidden,
                    ..
                }
            }
        ));

        assert!(
            Cli::try_parse_from(["servicefinder", "review", "status", "p", "id", "gone"]).is_err()
        );
    }

    #[test]
    fn test_version_string_starts_with_package_version() {
        assert!(version_string().starts_with(env!("CARGO_PKG_VERSION")));
    }
}
