use std::error::Error;

use clap::{Args, Parser, Subcommand, ValueEnum};
use engine::{Engine, MoneyCents, Role};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "lectern_admin")]
#[command(about = "Admin utilities for Lectern (bootstrap users/courses, audit balances)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./lectern.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Course(Course),
    /// Compare stored balances with the ledger.
    Audit(AuditArgs),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
    Balance(UserBalanceArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RoleArg {
    Student,
    Instructor,
    Admin,
}

impl From<RoleArg> for Role {
    fn from(value: RoleArg) -> Self {
        match value {
            RoleArg::Student => Role::Student,
            RoleArg::Instructor => Role::Instructor,
            RoleArg::Admin => Role::Admin,
        }
    }
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    /// Identifier issued by the identity provider.
    #[arg(long)]
    id: String,
    #[arg(long)]
    name: String,
    #[arg(long, value_enum, default_value = "student")]
    role: RoleArg,
}

#[derive(Args, Debug)]
struct UserBalanceArgs {
    #[arg(long)]
    id: String,
}

#[derive(Args, Debug)]
struct Course {
    #[command(subcommand)]
    command: CourseCommand,
}

#[derive(Subcommand, Debug)]
enum CourseCommand {
    Create(CourseCreateArgs),
    Delete(CourseDeleteArgs),
}

#[derive(Args, Debug)]
struct CourseCreateArgs {
    #[arg(long)]
    instructor: String,
    #[arg(long)]
    title: String,
    /// Price as decimal text, e.g. `49.99`.
    #[arg(long)]
    price: MoneyCents,
}

#[derive(Args, Debug)]
struct CourseDeleteArgs {
    #[arg(long)]
    id: Uuid,
    /// Admin or owning instructor performing the deletion.
    #[arg(long)]
    requester: String,
}

#[derive(Args, Debug)]
struct AuditArgs {
    /// Audit a single user instead of every account.
    #[arg(long)]
    id: Option<String>,
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let user = engine
                .create_user(&args.id, &args.name, args.role.into())
                .await?;
            println!("created user: {} ({})", user.id, user.role.as_str());
        }
        Command::User(User {
            command: UserCommand::Balance(args),
        }) => {
            let balance = engine.balance(&args.id).await?;
            println!("{}: {balance}", args.id);
        }
        Command::Course(Course {
            command: CourseCommand::Create(args),
        }) => {
            let course = engine
                .create_course(&args.instructor, &args.title, args.price)
                .await?;
            println!("created course: {} ({})", course.id, course.price);
        }
        Command::Course(Course {
            command: CourseCommand::Delete(args),
        }) => {
            engine.delete_course(args.id, &args.requester).await?;
            println!("deleted course: {}", args.id);
        }
        Command::Audit(args) => {
            let ids = match args.id {
                Some(id) => vec![id],
                None => engine.users().await?.into_iter().map(|u| u.id).collect(),
            };

            let mut drifted = 0usize;
            for id in ids {
                let audit = engine.audit_balance(&id).await?;
                if audit.is_consistent() {
                    println!("ok      {id}: {}", audit.recorded);
                } else {
                    drifted += 1;
                    println!(
                        "DRIFT   {id}: recorded {} expected {} ({})",
                        audit.recorded,
                        audit.expected,
                        audit.drift()
                    );
                }
            }
            println!(
                "unsettled platform share: {}",
                engine.unsettled_platform_total().await?
            );
            if drifted > 0 {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
