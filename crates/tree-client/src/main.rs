//! Native client for the gratitude tree.
//!
//! Initializes the sync core against the backend (falling back to the
//! local snapshot when it is unreachable), then runs one subcommand.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tree_client::{HttpRemote, SnapshotStore, TerminalCanvas};
use tree_core::{ConnectivityMode, GratitudeTree, NoteId, RemoteStore, format_detail, render_all};

#[derive(Parser, Debug)]
#[command(name = "tree-client")]
#[command(about = "Post and browse gratitude notes")]
struct Cli {
    /// Base URL of the backend API
    #[arg(long, default_value = "http://localhost:3000/api", env = "TREE_API_URL")]
    api_url: String,

    /// Directory holding the local snapshot
    #[arg(long, default_value = ".gratitude-tree", env = "TREE_DATA_DIR")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a note to the tree
    Add {
        /// Who is thanking
        student: String,
        /// Who is being thanked
        teacher: String,
        /// The gratitude message
        message: String,
    },
    /// Render all leaves, newest first
    List,
    /// Show aggregate counts
    Stats,
    /// Show one leaf in detail
    Show {
        /// Note id (an integer or 'local-<uuid>')
        id: String,
    },
    /// Show connectivity and collection size
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    let remote = HttpRemote::new(&cli.api_url);
    let snapshot = SnapshotStore::new(&cli.data_dir);
    let mut tree = GratitudeTree::initialize(remote.clone(), snapshot).await;

    match cli.command {
        Command::Add {
            student,
            teacher,
            message,
        } => {
            let detail = match tree.add_note(&student, &teacher, &message).await {
                Ok(note) => format_detail(note),
                Err(err) => anyhow::bail!("{}", err),
            };
            if tree.len() == 1 {
                println!("You added the first leaf to the tree!");
            } else {
                println!(
                    "Your leaf joined the tree. {} leaves and counting.",
                    tree.len()
                );
            }
            println!("{}", detail);
        }

        Command::List => {
            let mut canvas = TerminalCanvas::new();
            render_all(&mut canvas, tree.notes());
            if tree.is_empty() {
                println!("The tree is empty. Add the first leaf!");
            } else {
                println!("{}", canvas.output());
            }
        }

        Command::Stats => {
            // Prefer the server-side aggregate (it includes the 24-hour
            // window); fall back to locally derived counts.
            let remote_stats = if tree.mode() == ConnectivityMode::Remote {
                remote.aggregate_counts().await.ok()
            } else {
                None
            };
            match remote_stats {
                Some(stats) => {
                    println!("Leaves:   {}", stats.total_leaves);
                    println!("Students: {}", stats.total_students);
                    println!("Teachers: {}", stats.total_teachers);
                    println!("Last 24h: {}", stats.recent_leaves);
                    println!("As of:    {}", stats.last_updated.format("%Y-%m-%d %H:%M UTC"));
                }
                None => {
                    let stats = tree.stats();
                    println!("Leaves:   {}", stats.total_leaves);
                    println!("Students: {}", stats.total_students);
                    println!("Teachers: {}", stats.total_teachers);
                }
            }
        }

        Command::Show { id } => {
            let id: NoteId = id.parse()?;
            match tree.note_by_id(&id) {
                Some(note) => println!("{}", format_detail(note)),
                None => anyhow::bail!("No leaf with id {}", id),
            }
        }

        Command::Status => {
            println!("{}", tree.mode());
            let stats = tree.stats();
            println!(
                "{} leaves from {} students to {} teachers",
                stats.total_leaves, stats.total_students, stats.total_teachers
            );
        }
    }

    Ok(())
}
