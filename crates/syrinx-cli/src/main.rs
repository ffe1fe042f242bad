//! syrinx
//!
//! Runs one model operation per invocation against the configured backend.
//!
//! ```bash
//! syrinx register tuxie --password hunter2
//! syrinx remote nikola@twitter.com
//! syrinx follow tuxie nikola@twitter.com
//! syrinx following tuxie
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use syrinx_db::{Database, SqliteBackend};
use syrinx_models::backends::MemoryBackend;
use syrinx_models::{
    Account, Argon2Hasher, BackendSource, EntityKind, FollowCapability, Identity,
    ListOwnerCapability, LocalUser, ModelBackend, Notice, NoticeCapability, Persist, Record,
    RemoteUser, Resolver, Settings, UserList, builtin_registry,
};

#[derive(Parser)]
#[command(name = "syrinx")]
#[command(about = "Operate on a syrinx social graph", long_about = None)]
struct Cli {
    /// Backend module path, overriding SYRINX_MODEL_BACKEND
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a local account
    Register {
        username: String,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
    },
    /// Record an account hosted elsewhere
    Remote {
        /// username@server
        identity: Identity,
        #[arg(long)]
        name: Option<String>,
    },
    /// Follow an account
    Follow { actor: String, target: Identity },
    /// Stop following an account
    Unfollow { actor: String, target: Identity },
    /// List who follows a local account
    Followers { user: String },
    /// List who a local account follows
    Following { user: String },
    /// Post a notice
    Post { user: String, content: String },
    /// List a local account's notices, oldest first
    Notices { user: String },
    /// Create a list owned by a local account
    ListCreate { owner: String, name: String },
    /// Add an account to a list
    ListAdd {
        owner: String,
        list_id: String,
        member: Identity,
    },
    /// Print a stored account as JSON, secrets blanked
    Show { identity: Identity },
}

fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "syrinx=info",
        1 => "syrinx=debug",
        _ => "syrinx=trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .init();

    let mut settings = Settings::from_env();
    if let Some(backend) = cli.backend {
        settings.set(syrinx_models::settings::MODEL_BACKEND, backend);
    }
    if settings.model_backend().is_none() {
        settings.set(syrinx_models::settings::MODEL_BACKEND, syrinx_db::backend::MODULE_PATH);
    }

    let resolver = build_resolver(settings)?;
    run(cli.command, &resolver)
}

fn build_resolver(settings: Settings) -> Result<Resolver> {
    let mut registry = builtin_registry(&MemoryBackend::new());

    // Only touch the database file when it is the active backend
    if settings.model_backend() == Some(syrinx_db::backend::MODULE_PATH) {
        let db = Database::open(&PathBuf::from(settings.db_path()))?;
        registry = registry.register(SqliteBackend::module(Arc::new(db)));
    }

    debug!(
        backend = settings.model_backend().unwrap_or_default(),
        server = settings.server_uri().unwrap_or("-"),
        "settings loaded"
    );
    Ok(Resolver::new(registry, settings))
}

fn run(command: Commands, resolver: &Resolver) -> Result<()> {
    match command {
        Commands::Register {
            username,
            password,
            email,
            first_name,
            last_name,
        } => {
            match LocalUser::find(resolver, &username) {
                Ok(_) => bail!("`{username}` is already registered"),
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e.into()),
            }

            let mut builder = LocalUser::builder(&username);
            if let Some(password) = password {
                builder = builder.password(password);
            }
            if let Some(email) = email {
                builder = builder.email(email);
            }
            if let Some(first_name) = first_name {
                builder = builder.first_name(first_name);
            }
            if let Some(last_name) = last_name {
                builder = builder.last_name(last_name);
            }

            let user = builder.build(&Argon2Hasher::default())?.save(resolver)?;
            info!(user = %user.identity(), "registered");
            println!("{}", user.identity());
        }
        Commands::Remote { identity, name } => {
            let mut user = RemoteUser::new(identity.username(), identity.server())?;
            if let Some(name) = name {
                user = user.with_name(name);
            }
            let user = user.save(resolver)?;
            println!("{}", user.user);
        }
        Commands::Follow { actor, target } => {
            let actor = local_user(resolver, &actor)?;
            let target = account(resolver, &target)?;
            actor.follow(resolver, as_account(&target)?, None)?;
            println!("{} now follows {}", actor.identity(), target);
        }
        Commands::Unfollow { actor, target } => {
            let actor = local_user(resolver, &actor)?;
            let target = account(resolver, &target)?;
            actor.unfollow(resolver, as_account(&target)?)?;
            println!("{} no longer follows {}", actor.identity(), target);
        }
        Commands::Followers { user } => {
            for follower in local_user(resolver, &user)?.get_followers(resolver)? {
                println!("{follower}");
            }
        }
        Commands::Following { user } => {
            for (key, _) in local_user(resolver, &user)?.following().items(resolver)? {
                println!("{key}");
            }
        }
        Commands::Post { user, content } => {
            let notice = Notice::new(content);
            local_user(resolver, &user)?.post_notice(resolver, &notice)?;
            println!("{}", notice.id);
        }
        Commands::Notices { user } => {
            for record in local_user(resolver, &user)?.notices().values(resolver)? {
                if let Record::Notice(notice) = record {
                    println!(
                        "{} {} {}",
                        notice.date_publish.format("%Y-%m-%d %H:%M"),
                        notice.id,
                        notice.content
                    );
                }
            }
        }
        Commands::ListCreate { owner, name } => {
            let mut list = UserList::new(name);
            local_user(resolver, &owner)?.add_list(resolver, &mut list)?;
            println!("{}", list.id);
        }
        Commands::ListAdd {
            owner,
            list_id,
            member,
        } => {
            let owner = local_user(resolver, &owner)?;
            let list = UserList::find(resolver, &list_id)
                .with_context(|| format!("no list `{list_id}`"))?;
            let member = account(resolver, &member)?;
            owner.add_to_list(resolver, &list, as_account(&member)?)?;
            println!("{} added to {}", member, list);
        }
        Commands::Show { identity } => {
            let record = account(resolver, &identity)?;
            println!("{}", serde_json::to_string_pretty(&record.redacted())?);
        }
    }

    Ok(())
}

fn local_user(source: &dyn BackendSource, username: &str) -> Result<LocalUser> {
    LocalUser::find(source, username).with_context(|| format!("no local user `{username}`"))
}

/// Loads whichever account kind is stored under `identity`.
fn account(source: &dyn BackendSource, identity: &Identity) -> Result<Record> {
    source
        .backend_for(EntityKind::User)?
        .get(EntityKind::User, &identity.key())
        .with_context(|| format!("no account `{identity}`"))
}

fn as_account(record: &Record) -> Result<&dyn Account> {
    record
        .as_account()
        .with_context(|| format!("`{record}` is not an account"))
}
