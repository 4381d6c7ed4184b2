use crate::report::{run_calculation, run_treatment_listing, CalculationArgs, TreatmentListArgs};
use crate::server;
use aprovechamiento::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Aprovechamiento",
    about = "Serve and run POT buildability calculations from the command line",
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
    /// Calculate the buildability of a lot against the configured catalog
    Calcular(CalculationArgs),
    /// List the treatments available in the configured catalog
    Tratamientos(TreatmentListArgs),
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
        Command::Calcular(args) => run_calculation(args).await,
        Command::Tratamientos(args) => run_treatment_listing(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_serve_without_subcommand() {
        let cli = Cli::try_parse_from(["aprovechamiento-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_calculation_arguments() {
        let cli = Cli::try_parse_from([
            "aprovechamiento-api",
            "calcular",
            "--tratamiento",
            "CN1",
            "--area",
            "200",
            "--tipologia",
            "unifamiliar",
            "--json",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Calcular(args)) => {
                assert_eq!(args.tratamiento, "CN1");
                assert_eq!(args.area, 200.0);
                assert_eq!(args.tipologia.as_deref(), Some("unifamiliar"));
                assert!(args.json);
            }
            other => panic!("expected calcular command, got {other:?}"),
        }
    }
}
