// src/commands/show.rs

//! Show the reconciliation preview of one recipe

use super::{bioc_versions, open_index};
use anyhow::{Context, Result};
use bioarch_sync::archive::is_archived;
use bioarch_sync::batch::RecipeFiles;
use bioarch_sync::recipe::{pkgbuild, RecipeWriter};
use bioarch_sync::repository::MirrorClient;
use bioarch_sync::{Config, Reconciler};

/// Print upstream provenance, current and reconciled dependencies of `package`
pub fn cmd_show(config: &Config, package: &str, live: bool) -> Result<()> {
    let files = RecipeFiles::open(&config.bioarch_path, package)
        .with_context(|| format!("Failed to load recipe for {}", package))?;
    let upstream = pkgbuild::upstream_name(&files.pkgbuild)
        .with_context(|| format!("{} has no _pkgname assignment", files.dir.display()))?;

    let client = MirrorClient::new()?;
    let versions = bioc_versions(config, Some(&client))?;
    let index = open_index(config, live, &versions)?;
    let plan = Reconciler::new(index.as_ref()).plan(&files.pkgbuild, &upstream)?;

    println!("Recipe: {}", files.dir.display());
    println!("Upstream: {}", upstream);

    let Some(entry) = &plan.entry else {
        println!("  Not found in {}", index.describe());
        println!("  Archived: yes");
        return Ok(());
    };

    println!("  Origin: {}", entry.origin);
    if let Some(ver) = entry.bioc_ver {
        println!(
            "  Bioconductor: {} ({})",
            ver,
            entry.bioc_category.as_deref().unwrap_or("unknown")
        );
    }
    if let Some(desc) = &plan.descriptor {
        println!("  Version: {}", desc.version.as_deref().unwrap_or("unknown"));
        if let Some(needs) = desc.needs_compilation {
            println!("  NeedsCompilation: {}", if needs { "yes" } else { "no" });
        }
    }
    println!("  Archived: {}", if is_archived(Some(entry), &versions) { "yes" } else { "no" });

    println!("\nCurrent depends:");
    for dep in &plan.state.depends {
        println!("  {}", dep);
    }
    println!("Current optdepends:");
    for opt in &plan.state.optdepends {
        println!("  {}", opt);
    }

    let Some(result) = &plan.result else {
        return Ok(());
    };

    if !result.is_changed() {
        println!("\nUp to date");
        return Ok(());
    }

    let mut preview = files.pkgbuild.clone();
    RecipeWriter::apply(&mut preview, result)?;
    println!(
        "\nReconciled (depends {}, optdepends {}):",
        if result.depends_changed { "changed" } else { "unchanged" },
        if result.optdepends_changed { "changed" } else { "unchanged" }
    );
    print!("{}", preview.to_text());

    if !result.added_dependencies.is_empty() {
        println!("\nNewly required upstream packages:");
        for name in &result.added_dependencies {
            println!("  {}", name);
        }
    }
    Ok(())
}
