//! sweep run コマンドハンドラ

use clap::Args;
use colored::Colorize;
use serde_json::json;
use sweepkit_appsync::AppSyncClientFactory;
use sweepkit_config::SweepConfig;
use sweepkit_core::{Scope, SweepCounts, SweepError, SweepReport};
use tracing::warn;

type RegionResult = (Scope, Result<SweepReport, SweepError>);

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// 対象リージョン (複数指定可、設定ファイルと SWEEP_REGIONS より優先)
    #[arg(short, long = "region", value_delimiter = ',')]
    pub regions: Vec<String>,

    /// 実行するスイーパー名 (依存先も実行される)
    #[arg(long = "sweep-run", value_delimiter = ',')]
    pub sweep_run: Vec<String>,

    /// 削除せず対象の表示のみ行う
    #[arg(long)]
    pub dry_run: bool,

    /// 結果を JSON で出力
    #[arg(long)]
    pub json: bool,

    /// 同時に削除するリソース数の上限
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// 一覧取得のページ数上限
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// API 呼び出し 1 回あたりのタイムアウト (秒)
    #[arg(long = "timeout")]
    pub timeout_secs: Option<u64>,
}

impl RunArgs {
    /// コマンドライン引数で設定を上書き
    fn apply(&self, config: &mut SweepConfig) {
        if !self.regions.is_empty() {
            config.regions = self.regions.clone();
        }
        if !self.sweep_run.is_empty() {
            config.sweep_run = self.sweep_run.clone();
        }
        if self.dry_run {
            config.dry_run = true;
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(max_pages) = self.max_pages {
            config.max_pages = max_pages;
        }
        if let Some(timeout) = self.timeout_secs {
            config.call_timeout_secs = timeout;
        }
    }
}

/// sweep run: 全リージョンでスイーパーを実行
///
/// 失敗が 1 件もなければ `true`
pub async fn handle(args: RunArgs) -> anyhow::Result<bool> {
    let mut config = SweepConfig::load()?;
    args.apply(&mut config);
    config.validate()?;

    let registry = super::build_registry()?;
    let selector = config.selector();
    let ordered = registry.order(&selector)?;

    let options = config.sweep_options();
    let cancel = options.cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, no further deletions will be started");
            cancel.cancel();
        }
    });

    if !args.json {
        println!("{}", "スイープを開始します".green());
        println!("リージョン: {}", config.regions.join(", ").cyan());
        println!(
            "スイーパー: {}",
            ordered
                .iter()
                .map(|e| e.name())
                .collect::<Vec<_>>()
                .join(" → ")
                .cyan()
        );
        if config.dry_run {
            println!("{}", "[DRY RUN] リソースは削除されません".yellow());
        }
    }

    let factory = AppSyncClientFactory::from_env().await;
    let results = registry
        .run_scopes(&factory, &config.scopes(), &selector, &options)
        .await;

    let success = results
        .iter()
        .all(|(_, result)| matches!(result, Ok(report) if report.is_success()));

    if args.json {
        print_json(&results, success)?;
    } else {
        for (scope, result) in &results {
            print_region(scope, result);
        }
        print_totals(&results, success);
    }

    Ok(success)
}

fn print_json(results: &[RegionResult], success: bool) -> anyhow::Result<()> {
    let regions: Vec<_> = results
        .iter()
        .map(|(scope, result)| match result {
            Ok(report) => json!({
                "region": scope,
                "success": report.is_success(),
                "report": report.summary(),
            }),
            Err(err) => json!({
                "region": scope,
                "success": false,
                "error": err.to_string(),
            }),
        })
        .collect();

    let output = json!({ "success": success, "regions": regions });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_region(scope: &Scope, result: &Result<SweepReport, SweepError>) {
    println!();
    let report = match result {
        Ok(report) => report,
        Err(err) => {
            println!("{} {}", "✗".red().bold(), scope.to_string().cyan().bold());
            println!("  {}", err.to_string().red());
            return;
        }
    };

    let mark = if report.is_success() {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!(
        "{} {} {}",
        mark,
        scope.to_string().cyan().bold(),
        format!("({} ms)", report.duration_ms).dimmed()
    );

    for t in report.types() {
        let line = format_counts(&t.resource_type, &t.counts);
        if t.counts.failed > 0 {
            println!("{}", line.red());
        } else {
            println!("{}", line);
        }
        if let Some(reason) = &t.discovery_skipped {
            println!("      {} {}", "スキップ:".yellow(), reason.dimmed());
        }
    }

    for line in report.failure_lines() {
        println!("  {} {}", "•".red(), line);
    }
}

fn format_counts(resource_type: &str, counts: &SweepCounts) -> String {
    format!(
        "  {:<44} 検出 {:>3}  削除 {:>3}  スキップ {:>3}  失敗 {:>3}",
        resource_type, counts.discovered, counts.deleted, counts.skipped, counts.failed
    )
}

fn print_totals(results: &[RegionResult], success: bool) {
    let mut totals = SweepCounts::default();
    let mut aborted = 0;
    for (_, result) in results {
        match result {
            Ok(report) => totals.add(&report.totals()),
            Err(_) => aborted += 1,
        }
    }

    println!();
    println!("{}", format_counts("合計", &totals).bold());
    if aborted > 0 {
        println!(
            "{}",
            format!("  {} リージョンでスイープを実行できませんでした", aborted).red()
        );
    }
    if success {
        println!("{}", "✓ スイープが完了しました".green());
    } else {
        println!("{}", "✗ 失敗したリソースがあります".red().bold());
    }
}
