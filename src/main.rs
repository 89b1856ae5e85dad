use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use carbook::{App, ClientError, Config, Navigation};

#[derive(Parser, Debug)]
#[command(name = "carbook", about = "Car rental booking client")]
struct Cli {
    /// Gateway root; overrides `CARBOOK_BASE_URL`.
    #[arg(long)]
    base_url: Option<String>,

    /// Session file; overrides `CARBOOK_SESSION_FILE`.
    #[arg(long)]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and store the session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "CARBOOK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account.
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "CARBOOK_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, default_value = "user")]
        role: String,
    },
    /// Drop the stored session.
    Logout,
    /// Show the current identity.
    Whoami,
    /// Resolve a path against the current session.
    Open { path: String },
    Cars(CarsCommand),
    /// Book a car.
    Book {
        #[arg(long)]
        car_id: String,
        #[arg(long, help = "YYYY-MM-DD")]
        start: String,
        #[arg(long, help = "YYYY-MM-DD")]
        end: String,
    },
}

#[derive(Args, Debug)]
struct CarsCommand {
    #[command(subcommand)]
    command: CarsSubcommand,
}

#[derive(Subcommand, Debug)]
enum CarsSubcommand {
    List,
    Add {
        #[arg(long)]
        name: String,
        #[arg(long = "type")]
        car_type: String,
        #[arg(long)]
        price: String,
    },
    Update {
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long = "type")]
        car_type: String,
        #[arg(long)]
        price: String,
    },
    Delete {
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url);
    }
    if let Some(session_file) = cli.session_file {
        config = config.with_session_file(session_file);
    }

    let app = App::from_config(&config)?;
    match run(&app, cli.command).await {
        Err(ClientError::Redirected { to, .. }) => {
            println!("{to}");
            Ok(())
        }
        other => other,
    }
}

async fn run(app: &App, command: Command) -> Result<(), ClientError> {
    match command {
        Command::Login { email, password } => {
            let landing = app.login(&email, &password).await?;
            print_navigation(&landing);
        }
        Command::Register {
            name,
            email,
            password,
            role,
        } => {
            app.register(&name, &email, &password, &role).await?;
            println!("registered");
        }
        Command::Logout => {
            let landing = app.logout()?;
            print_navigation(&landing);
        }
        Command::Whoami => match app.session() {
            Some(session) => println!("{}", session.role()),
            None => println!("anonymous"),
        },
        Command::Open { path } => print_navigation(&app.navigate(&path)),
        Command::Cars(cars) => run_cars(app, cars).await?,
        Command::Book { car_id, start, end } => {
            let confirmation = app.book(&car_id, &start, &end).await?;
            print_json(&confirmation)?;
        }
    }
    Ok(())
}

async fn run_cars(app: &App, cars: CarsCommand) -> Result<(), ClientError> {
    match cars.command {
        CarsSubcommand::List => print_json(&app.list_cars().await?),
        CarsSubcommand::Add {
            name,
            car_type,
            price,
        } => print_json(&app.add_car(&name, &car_type, &price).await?),
        CarsSubcommand::Update {
            id,
            name,
            car_type,
            price,
        } => print_json(&app.update_car(&id, &name, &car_type, &price).await?),
        CarsSubcommand::Delete { id } => print_json(&app.delete_car(&id).await?),
    }
}

fn print_navigation(navigation: &Navigation) {
    println!("{}", navigation.landed);
}

fn print_json(value: &impl Serialize) -> Result<(), ClientError> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|error| ClientError::InvalidResponse(error.to_string()))?;
    println!("{rendered}");
    Ok(())
}
