//! # Support Desk CLI (`desk`)
//!
//! Terminal client for the support-desk API. The session token is kept on
//! disk between invocations, so `desk login` once and the other commands
//! reuse it until `desk logout` or until the server rejects it.
//!
//! ## Usage
//!
//! ```bash
//! desk --config ./config/desk.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `desk login <username>` | Log in and show the dashboard |
//! | `desk register` | Create an account |
//! | `desk logout` | Forget the stored session |
//! | `desk whoami` | Show the logged-in profile |
//! | `desk tickets` | List tickets |
//! | `desk submit` | File a new ticket |
//! | `desk show <id>` | Show one ticket |
//! | `desk generate <id>` | Draft an AI response (agents and admins) |
//! | `desk similar <id>` | Tickets similar to one ticket |
//! | `desk reply <id> <text>` | Post a manual response |
//! | `desk stats` | System statistics (admins) |
//! | `desk users` | List accounts (admins) |
//! | `desk kb add` / `desk kb rm <id>` | Manage knowledge-base articles (admins) |
//! | `desk assign <ticket> <agent>` | Assign a ticket to an agent (admins) |
//! | `desk health` | Server health |
//!
//! Failures are reported through the configured notification sink and the
//! process exits with status 1. Set `RUST_LOG=debug` for request tracing.

use clap::{CommandFactory, Parser, Subcommand};
use std::convert::Infallible;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use support_desk::config;
use support_desk::desk::Desk;
use support_desk::render;
use support_desk::Screen;
use support_desk_core::models::{
    NewKnowledgeItem, Registration, TicketCategory, TicketPriority, TicketQuery, TicketStatus,
};

/// Support Desk CLI: file, browse and answer support tickets.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/desk.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "desk",
    about = "Support Desk: a terminal client for RAG-assisted customer support",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/desk.toml`. Built-in defaults are used when the
    /// file does not exist.
    #[arg(long, global = true, default_value = "./config/desk.toml")]
    config: PathBuf,

    /// Override `api.base_url` for this invocation.
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and list your tickets.
    ///
    /// The password is read from stdin when `--password` is not given.
    Login {
        username: String,

        #[arg(long)]
        password: Option<String>,
    },

    /// Create an account.
    Register {
        #[arg(long)]
        username: String,

        #[arg(long)]
        email: String,

        #[arg(long, default_value = "")]
        full_name: String,

        #[arg(long)]
        password: Option<String>,

        /// Log in right after registering.
        #[arg(long)]
        login: bool,
    },

    /// Forget the stored session.
    Logout,

    /// Show the logged-in profile.
    Whoami,

    /// List tickets visible to you.
    Tickets {
        /// open, in_progress, resolved, closed, escalated
        #[arg(long, value_parser = parse_wire::<TicketStatus>)]
        status: Option<TicketStatus>,

        /// technical, billing, account, product, general
        #[arg(long, value_parser = parse_wire::<TicketCategory>)]
        category: Option<TicketCategory>,

        #[arg(long)]
        skip: Option<u32>,

        #[arg(long)]
        limit: Option<u32>,
    },

    /// File a new ticket.
    ///
    /// Leave out `--category` to let the server categorize the ticket.
    Submit {
        #[arg(long)]
        title: String,

        #[arg(long)]
        description: String,

        /// low, medium, high, critical
        #[arg(long, default_value = "medium", value_parser = parse_wire::<TicketPriority>)]
        priority: TicketPriority,

        #[arg(long)]
        category: Option<String>,

        /// Comma-separated tags.
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
    },

    /// Show one ticket.
    Show { id: i64 },

    /// Draft an AI response for a ticket.
    Generate { id: i64 },

    /// List tickets similar to one ticket.
    Similar {
        id: i64,

        #[arg(long, default_value_t = 5)]
        limit: u32,
    },

    /// Post a manual response on a ticket.
    Reply { id: i64, content: String },

    /// Show system statistics (admins only).
    Stats,

    /// List accounts (admins only).
    Users {
        #[arg(long, default_value_t = 0)]
        skip: u32,

        #[arg(long, default_value_t = 100)]
        limit: u32,
    },

    /// Manage knowledge-base articles (admins only).
    Kb {
        #[command(subcommand)]
        action: KbAction,
    },

    /// Assign a ticket to an agent (admins only).
    Assign { ticket_id: i64, agent_id: i64 },

    /// Check that the server is up.
    Health,

    /// Print shell completions.
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum KbAction {
    /// Add an article.
    Add {
        #[arg(long)]
        title: String,

        #[arg(long)]
        content: String,

        #[arg(long)]
        category: Option<String>,

        /// Comma-separated tags.
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
    },

    /// Delete an article by id.
    Rm { id: i64 },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();

    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "desk", &mut io::stdout());
        return Ok(ExitCode::SUCCESS);
    }

    let cfg = config::override_base_url(config::load_or_default(&cli.config)?, cli.api_url)?;
    let mut desk = Desk::from_config(&cfg)?;

    // Controllers report their own failures through the notifier; those
    // arms return FAILURE instead of propagating so nothing prints twice.
    match cli.command {
        Commands::Login { username, password } => {
            let password = read_password(password)?;
            if desk.login(&username, &password).await.is_err() {
                return Ok(ExitCode::FAILURE);
            }
            if let Some(user) = desk.session().user() {
                print!("{}", render::user(user));
            }
            println!();
            print!("{}", render::ticket_list(&desk.tickets().view()));
        }
        Commands::Register {
            username,
            email,
            full_name,
            password,
            login,
        } => {
            let registration = Registration {
                email,
                username,
                password: read_password(password)?,
                full_name,
            };
            // Rejections are not notified; they surface as the command error.
            desk.register(&registration).await?;
            if login {
                if desk
                    .login(&registration.username, &registration.password)
                    .await
                    .is_err()
                {
                    return Ok(ExitCode::FAILURE);
                }
                print!("{}", render::ticket_list(&desk.tickets().view()));
            }
        }
        Commands::Logout => desk.logout(),
        Commands::Whoami => {
            require_login(&mut desk).await?;
            if let Some(user) = desk.session().user() {
                print!("{}", render::user(user));
            }
        }
        Commands::Tickets {
            status,
            category,
            skip,
            limit,
        } => {
            require_login(&mut desk).await?;
            desk.tickets_mut().set_query(TicketQuery {
                status,
                category,
                skip,
                limit,
            });
            if desk.load_tickets().await.is_err() {
                return Ok(ExitCode::FAILURE);
            }
            print!("{}", render::ticket_list(&desk.tickets().view()));
        }
        Commands::Submit {
            title,
            description,
            priority,
            category,
            tags,
        } => {
            require_login(&mut desk).await?;
            let form = desk.submission_mut().form_mut();
            form.fill(
                title,
                description,
                priority,
                category.as_deref(),
            );
            form.tags = tags;
            match desk.submit_ticket().await {
                Ok(ticket) => println!("Created ticket #{}", ticket.id),
                Err(_) => return Ok(ExitCode::FAILURE),
            }
            println!();
            print!("{}", render::ticket_list(&desk.tickets().view()));
        }
        Commands::Show { id } => {
            require_login(&mut desk).await?;
            if desk.open_ticket(id).await.is_err() {
                return Ok(ExitCode::FAILURE);
            }
            if let Some(view) = desk.detail().view(desk.session()) {
                print!("{}", render::ticket_detail(&view));
            }
        }
        Commands::Generate { id } => {
            require_login(&mut desk).await?;
            if !desk.session().can_generate_responses() {
                anyhow::bail!("only agents and admins can generate AI responses");
            }
            if desk.open_ticket(id).await.is_err() {
                return Ok(ExitCode::FAILURE);
            }
            if desk.generate_response().await.is_err() {
                return Ok(ExitCode::FAILURE);
            }
            if let Some(view) = desk.detail().response_view() {
                print!("{}", render::ai_response(&view));
            }
        }
        Commands::Similar { id, limit } => {
            require_login(&mut desk).await?;
            if desk.open_ticket(id).await.is_err() {
                return Ok(ExitCode::FAILURE);
            }
            match desk.similar_tickets(limit).await {
                Ok(similar) => print!("{}", render::similar_tickets(&similar)),
                Err(_) => return Ok(ExitCode::FAILURE),
            }
        }
        Commands::Reply { id, content } => {
            require_login(&mut desk).await?;
            if desk.open_ticket(id).await.is_err() {
                return Ok(ExitCode::FAILURE);
            }
            match desk.reply(&content).await {
                Ok(receipt) => println!("Response #{} added to ticket #{}", receipt.response_id, id),
                Err(_) => return Ok(ExitCode::FAILURE),
            }
        }
        Commands::Stats => {
            require_login(&mut desk).await?;
            let stats = desk.stats().await?;
            print!("{}", render::stats(&stats));
        }
        Commands::Users { skip, limit } => {
            require_login(&mut desk).await?;
            let users = desk.users(skip, limit).await?;
            print!("{}", render::users(&users));
        }
        Commands::Kb { action } => {
            require_login(&mut desk).await?;
            match action {
                KbAction::Add {
                    title,
                    content,
                    category,
                    tags,
                } => {
                    let item = NewKnowledgeItem {
                        title,
                        content,
                        category,
                        tags,
                    };
                    let receipt = desk.add_knowledge(&item).await?;
                    println!("Added knowledge base item #{}", receipt.id);
                }
                KbAction::Rm { id } => {
                    let receipt = desk.delete_knowledge(id).await?;
                    println!(
                        "{}",
                        receipt.message.as_deref().unwrap_or("Knowledge base item deleted")
                    );
                }
            }
        }
        Commands::Assign {
            ticket_id,
            agent_id,
        } => {
            require_login(&mut desk).await?;
            let receipt = desk.assign_ticket(ticket_id, agent_id).await?;
            println!(
                "{}",
                receipt.message.as_deref().unwrap_or("Ticket assigned successfully")
            );
        }
        Commands::Health => {
            let status = desk.health().await?;
            println!("{}", status);
        }
        Commands::Completions { .. } => unreachable!("handled before config load"),
    }

    Ok(ExitCode::SUCCESS)
}

/// Log to stderr; `RUST_LOG` overrides the default `warn` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .init();
}

/// Case-insensitive parse for the string-backed wire enums.
fn parse_wire<T: FromStr<Err = Infallible>>(s: &str) -> Result<T, Infallible> {
    s.parse()
}

async fn require_login(desk: &mut Desk) -> anyhow::Result<()> {
    if desk.restore().await != Screen::Dashboard {
        anyhow::bail!("not logged in; run `desk login <username>` first");
    }
    Ok(())
}

fn read_password(flag: Option<String>) -> anyhow::Result<String> {
    if let Some(password) = flag {
        return Ok(password);
    }
    if atty::is(atty::Stream::Stdin) {
        eprint!("Password: ");
    }
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
