use clap::{
    Parser,
    Subcommand,
};
use pwpol::{
    Platform,
    notice::notice_message,
    platform::{
        Builder as PlatformBuilder,
        PolicyOutcome,
        PolicyUpdate,
    },
};
use pwpolcore::{
    display::format_timestamp,
    platform::{
        ConnectorOption,
        PlatformConnector,
    },
};
use pwpoldb_sqlite::SqliteBackend;

#[derive(Debug, Parser)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[clap(long, value_name = "PWPOL_DB_URL", env = "PWPOL_DB_URL")]
    pwpol_db_url: String,
    #[clap(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(arg_required_else_help = true)]
    Policy {
        #[command(subcommand)]
        cmd: PolicyCmd,
    },
    #[command(arg_required_else_help = true)]
    User {
        #[command(subcommand)]
        cmd: UserCmd,
    },
}

#[derive(Debug, Subcommand)]
enum PolicyCmd {
    /// Show the effective policy settings
    Show,
    /// Initialize any unset settings with their defaults
    Init,
    #[command(arg_required_else_help = true)]
    /// Validate and apply a full set of policy settings
    Apply {
        max_age_days: i64,
        #[clap(long, default_value_t = 7)]
        due_soon_days: i64,
        #[clap(long, default_value = "")]
        due_soon_message: String,
        #[clap(long, default_value = "")]
        overdue_message: String,
        #[clap(long, default_value = "edit_posts")]
        notice_audience: String,
    },
    #[command(arg_required_else_help = true)]
    /// Apply a JSON settings payload, best effort
    Sync {
        payload: String,
    },
}

#[derive(Debug, Subcommand)]
enum UserCmd {
    #[command(arg_required_else_help = true)]
    Create {
        name: String,
    },
    #[command(arg_required_else_help = true)]
    /// Report the user's password age status
    Status {
        id: i64,
    },
    #[command(arg_required_else_help = true)]
    Password {
        id: i64,
        #[command(subcommand)]
        cmd: PasswordCmd,
    },
}

#[derive(Debug, Subcommand)]
enum PasswordCmd {
    #[command(arg_required_else_help = true)]
    /// Run a profile update carrying a password field through the
    /// tracker: capture, store, compare
    Update {
        hash: String,
    },
    /// Run a profile save without a password change through the tracker
    Touch,
    #[command(arg_required_else_help = true)]
    /// Complete a password reset for the user
    Reset {
        hash: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Cli::parse();
    stderrlog::new()
        .module(module_path!())
        .module("pwpol")
        .module("pwpolcore")
        .module("pwpoldb_sqlite")
        .verbosity((args.verbose as usize) + 1)
        .timestamp(stderrlog::Timestamp::Second)
        .init()
        .unwrap();

    let platform = PlatformBuilder::new()
        .policy_platform(
            SqliteBackend::policy(
                ConnectorOption::from(args.pwpol_db_url)
                    .auto_create_db(true)
            )
                .await
                .map_err(anyhow::Error::from_boxed)?
        )
        .build();

    match args.command {
        Commands::Policy { cmd } => {
            parse_policy(&platform, cmd).await?;
        },
        Commands::User { cmd } => {
            parse_user(&platform, cmd).await?;
        },
    }

    Ok(())
}

fn print_policy(outcome: &PolicyOutcome) {
    let settings = &outcome.settings;
    println!("max_age_days: {}", settings.max_age_days);
    println!("due_soon_days: {}", settings.due_soon_days);
    println!("due_soon_message: {:?}", settings.due_soon_message);
    println!("overdue_message: {:?}", settings.overdue_message);
    println!("notice_audience: {}", settings.notice_audience);
    match outcome.policy_enabled_at {
        Some(ts) => println!(
            "policy_enabled_at: {} ({ts})",
            format_timestamp(Some(ts)),
        ),
        None => println!("policy_enabled_at: never"),
    }
}

async fn parse_policy(
    platform: &Platform,
    arg: PolicyCmd,
) -> anyhow::Result<()> {
    match arg {
        PolicyCmd::Show => {
            let outcome = platform.get_policy().await?;
            print_policy(&outcome);
        }
        PolicyCmd::Init => {
            platform.init_defaults().await?;
            println!("unset policy settings initialized with defaults");
        }
        PolicyCmd::Apply {
            max_age_days,
            due_soon_days,
            due_soon_message,
            overdue_message,
            notice_audience,
        } => {
            let outcome = platform.apply_policy(PolicyUpdate {
                max_age_days,
                due_soon_days,
                due_soon_message,
                overdue_message,
                notice_audience,
            }).await?;
            println!("policy updated");
            print_policy(&outcome);
        }
        PolicyCmd::Sync { payload } => {
            let payload = serde_json::from_str(&payload)?;
            platform.sync_policy(&payload).await?;
            println!("policy sync applied");
            print_policy(&platform.get_policy().await?);
        }
    }
    Ok(())
}

async fn parse_user(
    platform: &Platform,
    arg: UserCmd,
) -> anyhow::Result<()> {
    match arg {
        UserCmd::Create { name } => {
            let user = platform.create_user(&name).await?;
            let id = user.id();
            let name = user.name();
            println!("user {name:?} created with id {id}");
        }
        UserCmd::Status { id } => {
            let user = platform.get_user(id).await?
                .ok_or_else(|| anyhow::anyhow!("no such user: {id}"))?;
            let status = user.password_status().await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
            if let Some(due_time) = status.due_time {
                println!("due on: {}", format_timestamp(Some(due_time)));
            }
            let settings = platform.get_policy_settings().await?;
            if let Some(message) = notice_message(&status, &settings) {
                println!("notice: {message}");
            }
        }
        UserCmd::Password { id, cmd } => {
            parse_password(platform, id, cmd).await?;
        }
    }
    Ok(())
}

async fn parse_password(
    platform: &Platform,
    user_id: i64,
    arg: PasswordCmd,
) -> anyhow::Result<()> {
    match arg {
        PasswordCmd::Update { hash } => {
            // the host flow: capture fires before persistence, the
            // post-update event after, carrying the pre-update snapshot
            platform.on_password_field_submitted(user_id, &hash).await?;
            let old_hash = platform.get_user_password(user_id).await?;
            platform.store_user_password(user_id, &hash).await?;
            platform.on_update_completed(user_id, old_hash.as_deref()).await?;
            println!("password update completed for user {user_id}");
        }
        PasswordCmd::Touch => {
            let old_hash = platform.get_user_password(user_id).await?;
            platform.on_update_completed(user_id, old_hash.as_deref()).await?;
            println!("profile save completed for user {user_id}");
        }
        PasswordCmd::Reset { hash } => {
            platform.store_user_password(user_id, &hash).await?;
            platform.on_reset_completed(user_id).await?;
            println!("password reset completed for user {user_id}");
        }
    }
    Ok(())
}
