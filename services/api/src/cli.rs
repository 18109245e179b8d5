use crate::console::{run_customers, run_recommend, CustomersArgs, RecommendArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use strategy_agent::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Strategy Agent",
    about = "Generate cross-sell and upsell recommendations for catalogue customers",
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
    /// Run the recommendation pipeline for one customer and save the report
    Recommend(RecommendArgs),
    /// List customers with their classification
    Customers(CustomersArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Recommend(args) => run_recommend(args).await,
        Command::Customers(args) => run_customers(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recommend_parses_flags() {
        let cli = Cli::try_parse_from([
            "strategy-agent",
            "recommend",
            "--customer-id",
            "c001",
            "--no-upsell",
            "--json",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Recommend(args)) => {
                assert_eq!(args.customer_id, "c001");
                assert!(args.no_upsell);
                assert!(args.json);
                assert!(args.data_dir.is_none());
            }
            other => panic!("expected recommend command, got {other:?}"),
        }
    }

    #[test]
    fn no_subcommand_defaults_to_serve() {
        let cli = Cli::try_parse_from(["strategy-agent"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn recommend_requires_customer_id() {
        assert!(Cli::try_parse_from(["strategy-agent", "recommend"]).is_err());
    }
}
