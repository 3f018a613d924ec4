mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sweep")]
#[command(version)]
#[command(about = "テストで残ったクラウドリソースをまとめて削除する", long_about = None)]
struct Cli {
    /// 詳細なログを出力 (debug レベル)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// スイーパーを実行
    Run(commands::run::RunArgs),
    /// 登録済みスイーパーを実行順に表示
    List {
        /// 対象のスイーパー名 (依存先も含めて表示)
        #[arg(long = "sweep-run", value_delimiter = ',')]
        sweep_run: Vec<String>,
    },
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,sweepkit={level},sweepkit_core={level},sweepkit_config={level},sweepkit_appsync={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run(args) => {
            let success = commands::run::handle(args).await?;
            if !success {
                std::process::exit(1);
            }
        }
        Commands::List { sweep_run } => {
            commands::list::handle(sweep_run)?;
        }
    }

    Ok(())
}
