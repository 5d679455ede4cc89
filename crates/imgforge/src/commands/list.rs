use colored::Colorize;
use imgforge_build::BuildSettings;

/// 検出したレシピと導出されるイメージ名を表示
pub fn handle(settings: BuildSettings, json: bool) -> anyhow::Result<()> {
    let plan = settings
        .plan()
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    if plan.is_empty() {
        println!("{}", "レシピが見つかりません".yellow());
        return Ok(());
    }

    println!("{}", format!("レシピ ({} 個):", plan.len()).bold());
    for planned in &plan {
        let name = planned
            .recipe
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match &planned.descriptor {
            Some(descriptor) => println!(
                "  • {} → {} ({})",
                name,
                descriptor.image_name.cyan(),
                descriptor.build_file_name
            ),
            None => println!(
                "  • {} → {}",
                name,
                "イメージ名を導出できません".yellow()
            ),
        }
    }

    Ok(())
}
