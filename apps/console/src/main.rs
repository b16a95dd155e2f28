use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use twitter_config::load as load_config;
use twitter_database::SqlValue;
use twitter_identity::Session;
use twitter_runtime::{telemetry, BackendServices};
use twitter_users::RegisterDto;

#[derive(Parser)]
#[command(name = "twitter-console")]
#[command(about = "Administer Twitter backend accounts and follows")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply database migrations and exit
    Migrate,
    /// Create an account
    Register {
        user_name: String,
        email: String,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long)]
        password: String,
    },
    /// Show a profile summary by user name
    Profile { user_name: String },
    /// Show the editable profile of a user id
    User { id: i64 },
    /// Resolve a display name to a user id
    UserId { name: String },
    /// List a page of a user's followers
    Followers {
        id: i64,
        #[arg(long, default_value_t = 0)]
        page: u32,
    },
    /// List a page of the users a user follows
    Followings {
        id: i64,
        #[arg(long, default_value_t = 0)]
        page: u32,
    },
    /// Make one user follow another
    Follow { follower: i64, following: i64 },
    /// Remove a follow edge
    Unfollow { follower: i64, following: i64 },
    /// Delete users and everything they own
    DeleteUsers {
        #[arg(required = true)]
        ids: Vec<i64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    telemetry::init_tracing().context("failed to initialise tracing")?;
    let config = load_config().context("failed to load configuration")?;
    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    let users = &services.users;

    match cli.command {
        Commands::Migrate => {
            info!(url = %config.database.url, "database is up to date");
            Ok(())
        }
        Commands::Register {
            user_name,
            email,
            name,
            password,
        } => {
            let mut session = Session::Anonymous;
            let user = users
                .register(
                    &mut session,
                    RegisterDto {
                        user_name,
                        email,
                        name,
                        password,
                    },
                )
                .await
                .context("registration failed")?;
            print_json(&RegisterDto::from(user))
        }
        Commands::Profile { user_name } => print_json(&users.get_by_user_name(&user_name).await?),
        Commands::User { id } => print_json(&users.get_by_id(id).await?),
        Commands::UserId { name } => print_json(&users.get_user_id_from_name(&name).await?),
        Commands::Followers { id, page } => print_json(&users.users_followers(id, page).await?),
        Commands::Followings { id, page } => {
            print_json(&users.users_followings(id, page).await?)
        }
        Commands::Follow {
            follower,
            following,
        } => {
            let edge = users
                .follow_graph()
                .follow(follower, following)
                .await
                .with_context(|| format!("user {follower} could not follow {following}"))?;
            print_json(&twitter_users::FollowDto::from(edge))
        }
        Commands::Unfollow {
            follower,
            following,
        } => print_json(&users.follow_graph().unfollow(follower, following).await?),
        Commands::DeleteUsers { ids } => {
            let parameters: Vec<SqlValue> = ids.into_iter().map(SqlValue::from).collect();
            let deleted = users
                .delete_user(&parameters)
                .await
                .context("failed to delete users")?;
            print_json(&serde_json::json!({ "deleted": deleted }))
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render output")?;
    println!("{rendered}");
    Ok(())
}
