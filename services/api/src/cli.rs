use crate::commands::{
    run_change_rate, run_list_rates, run_notify, run_recount, NotifyArgs, RateChangeArgs,
    RecountArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use property_register::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Property Register",
    about = "Assess property taxes, recount owner debts and notify debtors",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run one debt recount over the demo population and print the balances
    Recount(RecountArgs),
    /// Recount the demo population, then notify its debtors
    Notify(NotifyArgs),
    /// Inspect or change the tax rate table
    Rates {
        #[command(subcommand)]
        command: RatesCommand,
    },
}

#[derive(Subcommand, Debug)]
enum RatesCommand {
    /// Print the active rate per property type
    List,
    /// Change one rate and print the resulting table
    Change(RateChangeArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Seed the demo owners regardless of REGISTER_SEED_DEMO
    #[arg(long)]
    pub(crate) seed_demo: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Recount(args) => run_recount(args),
        Command::Notify(args) => run_notify(args),
        Command::Rates {
            command: RatesCommand::List,
        } => run_list_rates(),
        Command::Rates {
            command: RatesCommand::Change(args),
        } => run_change_rate(args),
    }
}
