//! Check command implementation.
//!
//! Resolves the target JVM and verifies that jstat is available.

use crate::config::{validate_effective_config, Config};
use crate::locator::{JpsLocator, Locate};

/// Runs the checks and exits with code 1 if any fails.
pub async fn command_check(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 jstat-exporter - System Check");
    println!("================================");

    let mut all_ok = true;

    println!("\n⚙️  Checking configuration...");
    match validate_effective_config(config) {
        Ok(_) => println!("   ✅ Configuration is valid"),
        Err(e) => {
            println!("   ❌ Configuration invalid: {}", e);
            all_ok = false;
        }
    }

    println!("\n☕ Checking jstat...");
    let jstat = config.jstat_path();
    if jstat.is_file() {
        println!("   ✅ jstat found at {}", jstat.display());
    } else {
        println!("   ❌ jstat not found at {}", jstat.display());
        all_ok = false;
    }

    println!("\n🎯 Locating target JVM...");
    let locator = JpsLocator::new(config.jps_path(), config.target.clone());
    match locator.locate().await {
        Ok(pid) => println!(
            "   ✅ Target {} has pid {}",
            locator.target().unwrap_or("<first JVM>"),
            pid
        ),
        Err(e) => {
            println!("   ❌ {}", e);
            all_ok = false;
        }
    }

    println!("\n📋 Summary:");
    if all_ok {
        println!("   ✅ All checks passed - exporter is ready");
        Ok(())
    } else {
        println!("   ❌ Some checks failed - please review warnings");
        std::process::exit(1);
    }
}
