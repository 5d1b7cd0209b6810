use clap::Parser;
use sqlx::sqlite::SqlitePoolOptions;

use bulletin::{
    domain::{AnnouncementKind, CreateUserRequest, NewAnnouncement, NewResponse, UserRole},
    repository::{
        AnnouncementRepository, ResponseRepository, SqliteAnnouncementRepository,
        SqliteResponseRepository, SqliteUserRepository, UserRepository,
    },
};

/// Creates the initial admin account and, optionally, sample content.
#[derive(Parser)]
struct Args {
    /// Database to seed; falls back to DATABASE_URL, then sqlite:bulletin.db
    #[arg(long)]
    database_url: Option<String>,

    #[arg(long, default_value = "admin")]
    admin_username: String,

    #[arg(long, default_value = "admin@bulletin.local")]
    admin_email: String,

    #[arg(long, default_value = "admin123")]
    admin_password: String,

    /// Also create a handful of sample users, announcements and responses
    #[arg(long)]
    samples: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    println!("Starting database seeding...");

    let database_url = args
        .database_url
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| "sqlite:bulletin.db".to_string());

    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    println!("Running migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await?;

    let user_repo = SqliteUserRepository::new(db_pool.clone());
    let announcement_repo = SqliteAnnouncementRepository::new(db_pool.clone());
    let response_repo = SqliteResponseRepository::new(db_pool.clone());

    if user_repo.find_by_username(&args.admin_username).await?.is_some() {
        println!("Admin user '{}' already exists, skipping", args.admin_username);
    } else {
        user_repo
            .create(CreateUserRequest {
                username: args.admin_username.clone(),
                email: args.admin_email.clone(),
                password: args.admin_password.clone(),
                full_name: "Administrator".to_string(),
                role: UserRole::Admin,
                is_active: true,
            })
            .await?;
        println!(
            "Created admin user ({} / {})",
            args.admin_username, args.admin_password
        );
    }

    if args.samples {
        println!("Creating sample users...");

        for (username, email, full_name) in [
            ("alice", "alice@example.com", "Alice Johnson"),
            ("bob", "bob@example.com", "Bob Smith"),
        ] {
            if user_repo.find_by_username(username).await?.is_some() {
                continue;
            }
            let user = user_repo
                .create(CreateUserRequest {
                    username: username.to_string(),
                    email: email.to_string(),
                    password: "password123".to_string(),
                    full_name: full_name.to_string(),
                    role: UserRole::User,
                    is_active: false,
                })
                .await?;
            user_repo.set_active(user.id, true).await?;
        }

        println!("Creating sample announcements...");

        let welcome = announcement_repo
            .create(NewAnnouncement {
                title: "Welcome to the bulletin board".to_string(),
                content: "Post announcements here and collect responses from colleagues."
                    .to_string(),
                kind: AnnouncementKind::Announcement,
                file_key: None,
                file_name: None,
            })
            .await?;

        let lunch = announcement_repo
            .create(NewAnnouncement {
                title: "Team lunch options".to_string(),
                content: "Where should we go for the quarterly team lunch?".to_string(),
                kind: AnnouncementKind::Inquiry,
                file_key: None,
                file_name: None,
            })
            .await?;

        response_repo
            .create(NewResponse {
                announcement_id: lunch.id,
                colleague_name: "Alice Johnson".to_string(),
                content: "The noodle place next door gets my vote.".to_string(),
                file_key: None,
                file_name: None,
            })
            .await?;

        println!(
            "Created sample content (announcements {} and {})",
            welcome.id, lunch.id
        );
    }

    println!("Seeding complete");

    Ok(())
}
