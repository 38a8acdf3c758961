//! Command line front end driving the form and listing views.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::bail;
use clap::{Args, Parser, Subcommand};
use schoolhouse_model::Field;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::api::{ApiClient, DEFAULT_SERVER};
use crate::form::{ImagePreview, Route, SubmissionForm};
use crate::listing::ListingView;
use crate::render;

/// Submit and browse schools.
#[derive(Debug, Parser)]
#[command(name = "schoolhouse", version, about)]
pub struct Cli {
    /// Base URL of the schoolhouse service.
    #[arg(long, global = true, env = "SCHOOLHOUSE_SERVER", default_value = DEFAULT_SERVER)]
    pub server: String,

    /// More logging, repeat for more detail.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Errors only.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// What to do.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add a school.
    Add(AddArgs),
    /// Show the schools once.
    List {
        /// Only schools whose name contains this text.
        #[arg(long)]
        query: Option<String>,
        /// Terminal width used to lay out the cards.
        #[arg(long, env = "COLUMNS", default_value_t = 100)]
        width: usize,
    },
    /// Show the schools, then read one search query per input line.
    Browse {
        /// Terminal width used to lay out the cards.
        #[arg(long, env = "COLUMNS", default_value_t = 100)]
        width: usize,
    },
}

/// Fields of a new school.
#[derive(Debug, Clone, Args)]
pub struct AddArgs {
    /// School name.
    #[arg(long)]
    pub name: String,
    /// Contact email.
    #[arg(long)]
    pub email: String,
    /// Contact number, 7 to 15 digits.
    #[arg(long)]
    pub contact: String,
    /// Street address.
    #[arg(long)]
    pub address: String,
    /// City.
    #[arg(long)]
    pub city: String,
    /// State or region.
    #[arg(long)]
    pub state: String,
    /// Image file to upload.
    #[arg(long)]
    pub image: PathBuf,
    /// Go to the listing without asking once the school is added.
    #[arg(long)]
    pub yes: bool,
    /// Terminal width used to lay out the listing.
    #[arg(long, env = "COLUMNS", default_value_t = 100)]
    pub width: usize,
}

/// Installs the global subscriber on stderr. `RUST_LOG` takes precedence over the flags.
pub fn init_logging(quiet: bool, verbose: u8) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("schoolhouse_client={level},schoolhouse={level}")));
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Fills the form from `args`, submits it and follows the confirmation to the listing.
///
/// # Errors
///
/// Returns an error if the form is invalid, the image cannot be read, or the
/// service rejects the submission.
pub async fn add<R, W>(api: &ApiClient, args: AddArgs, mut input: R, out: &mut W) -> anyhow::Result<()>
where
    R: BufRead,
    W: Write,
{
    let mut form = SubmissionForm::new();
    for (field, value) in [
        (Field::Name, args.name),
        (Field::Email, args.email),
        (Field::Contact, args.contact),
        (Field::Address, args.address),
        (Field::City, args.city),
        (Field::State, args.state),
    ] {
        form.set(field, value);
    }
    let image = ImagePreview::load(&args.image).await?;
    writeln!(out, "Image: {}", render::render_preview(&image))?;
    form.select_image(Some(image));

    writeln!(out, "{}", form.submit_label())?;
    if !form.submit(api).await {
        writeln!(out, "{}", render::render_errors(&form))?;
        bail!("the form has invalid fields");
    }
    if let Some(alert) = form.take_alert() {
        writeln!(out, "{alert}")?;
        bail!(alert);
    }

    let Some(popup) = form.popup() else {
        bail!("submission did not complete");
    };
    if let Some(created) = form.last_created() {
        tracing::info!(id = created.id, image = %created.image_url, "school stored");
    }
    writeln!(out, "{}", render::render_popup(&popup))?;

    let confirmed = args.yes || {
        let mut line = String::new();
        input.read_line(&mut line)? > 0 && matches!(line.trim(), "" | "y" | "Y" | "yes")
    };
    if !confirmed {
        return Ok(());
    }
    if form.confirm() == Route::Listing {
        list(api, None, args.width, out).await?;
    }
    Ok(())
}

/// Fetches and renders the listing once.
///
/// # Errors
///
/// Returns an error only if writing to `out` fails; fetch failures render as the error state.
pub async fn list<W: Write>(api: &ApiClient, query: Option<&str>, width: usize, out: &mut W) -> anyhow::Result<()> {
    let mut view = ListingView::new();
    writeln!(out, "{}", render::render_listing(&view, width, |image| api.resolve(image)))?;
    view.load(api).await;
    if let Some(query) = query {
        view.set_query(query);
    }
    writeln!(out, "{}", render::render_listing(&view, width, |image| api.resolve(image)))?;
    Ok(())
}

/// Fetches the listing once, then re-renders it for every query line of `input`.
///
/// # Errors
///
/// Returns an error if reading `input` or writing `out` fails.
pub async fn browse<R, W>(api: &ApiClient, width: usize, input: R, out: &mut W) -> anyhow::Result<()>
where
    R: BufRead,
    W: Write,
{
    let mut view = ListingView::new();
    view.load(api).await;
    writeln!(out, "{}", render::render_listing(&view, width, |image| api.resolve(image)))?;
    for line in input.lines() {
        view.set_query(line?);
        writeln!(out, "{}", render::render_listing(&view, width, |image| api.resolve(image)))?;
    }
    Ok(())
}

/// Runs the parsed command line against stdin and stdout.
///
/// # Errors
///
/// Returns the first failure of the chosen command.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let api = ApiClient::new(&cli.server)?;
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    match cli.command {
        Command::Add(args) => add(&api, args, stdin.lock(), &mut stdout).await,
        Command::List { query, width } => list(&api, query.as_deref(), width, &mut stdout).await,
        Command::Browse { width } => browse(&api, width, stdin.lock(), &mut stdout).await,
    }
}
