//! `nextyou doctor` — Diagnose system health.

use nextyou_config::AppConfig;
use nextyou_core::{ChatLog, Provider};
use nextyou_safety::SafetyFilter;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 NextYou Doctor — System Diagnostics");
    println!("======================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if !config_path.exists() {
        println!("  ⚠️  No config file — using defaults (run `nextyou onboard`)");
        issues += 1;
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!("\n  ⚠️  1 blocking issue found. Fix the config and re-run.");
            return Ok(());
        }
    };

    println!(
        "  ✅ Safety filter: {} keyword(s)",
        SafetyFilter::from_config(&config.safety).keywords().len()
    );
    if config.faq.enabled {
        match nextyou_coach::FaqCatalog::from_config(&config.faq) {
            Ok(catalog) => println!("  ✅ FAQ catalog: {} entries", catalog.len()),
            Err(e) => {
                println!("  ❌ FAQ catalog: {e}");
                issues += 1;
            }
        }
    } else {
        println!("  ✅ FAQ enrichment disabled");
    }

    // Chat log
    match nextyou_chatlog::open_from_config(&config.chat_log).await {
        Ok(log) => match log.count().await {
            Ok(n) => println!("  ✅ Chat log ({}): {n} row(s)", log.name()),
            Err(e) => {
                println!("  ❌ Chat log ({}) unreadable: {e}", log.name());
                issues += 1;
            }
        },
        Err(e) => {
            println!("  ❌ Chat log failed to open: {e}");
            issues += 1;
        }
    }

    // Provider
    if nextyou_providers::requires_api_key(&config) && !config.has_api_key() {
        println!("  ⚠️  No API key configured — set GROQ_API_KEY or add api_key to config.toml");
        issues += 1;
    } else {
        println!("  ✅ API key configured (or not required)");
        let router = nextyou_providers::build_from_config(&config);
        match router.default() {
            Some(provider) => match provider.health_check().await {
                Ok(true) => {
                    println!("  ✅ Provider '{}' reachable", provider.name());
                    issues += check_model(provider.as_ref(), &nextyou_providers::default_model_for(&config)).await;
                }
                Ok(false) => {
                    println!("  ❌ Provider '{}' rejected the request", provider.name());
                    issues += 1;
                }
                Err(e) => {
                    println!("  ❌ Provider '{}' unreachable: {e}", provider.name());
                    issues += 1;
                }
            },
            None => {
                println!("  ❌ Provider '{}' not available", config.default_provider);
                issues += 1;
            }
        }
    }

    // Summary
    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}

/// Confirm the configured model is served. Returns the number of issues found.
async fn check_model(provider: &dyn Provider, model: &str) -> usize {
    match provider.list_models().await {
        Ok(models) if models.is_empty() => {
            println!("  ⚠️  Provider '{}' did not list its models", provider.name());
            0
        }
        Ok(models) if models.iter().any(|m| m == model) => {
            println!("  ✅ Model '{model}' available");
            0
        }
        Ok(models) => {
            println!("  ❌ Model '{model}' not offered ({} model(s) listed)", models.len());
            1
        }
        Err(e) => {
            println!("  ❌ Could not list models: {e}");
            1
        }
    }
}
