//! sweep list コマンドハンドラ

use colored::Colorize;
use sweepkit_core::Selector;

/// sweep list: 実行順 (依存先が先) にスイーパーを表示
pub fn handle(sweep_run: Vec<String>) -> anyhow::Result<()> {
    let registry = super::build_registry()?;
    let ordered = registry.order(&Selector::from_names(sweep_run))?;

    println!("{}", "Sweepers (実行順):".bold());
    for (i, entry) in ordered.iter().enumerate() {
        let deps = if entry.dependencies().is_empty() {
            "-".to_string()
        } else {
            entry.dependencies().join(", ")
        };
        println!(
            "  {:>2}. {:<44} {} {}",
            i + 1,
            entry.name().green(),
            "依存:".dimmed(),
            deps.dimmed()
        );
    }

    Ok(())
}
