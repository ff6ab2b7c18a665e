//! Basic usage example of renewable.

use renewable::{
    config::StrategyConfig, error::Result, must, CancellationToken, Periods, RenewableBuilder,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Example upstream: an auth server that hands out short-lived tokens and
/// fails every third request.
struct TokenServer {
    issued: AtomicU32,
}

impl TokenServer {
    fn issue(&self, ctx: &CancellationToken) -> std::result::Result<String, String> {
        if ctx.is_cancelled() {
            return Err("shutting down".to_string());
        }

        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        println!("  [AUTH] Issuing token #{}", n);
        thread::sleep(Duration::from_millis(20));

        if n % 3 == 0 {
            Err(format!("auth server busy (request #{})", n))
        } else {
            Ok(format!("token-{:04}", n))
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Debug)
        .try_init()
        .ok();

    println!("\n=== Renewable - Basic Example ===\n");

    let server = Arc::new(TokenServer {
        issued: AtomicU32::new(0),
    });

    // 1. On-demand: produce inline once the outcome expired
    println!("1. On-demand renewable (success 100ms, error 50ms):");
    let ctx = CancellationToken::new();
    let on_demand = RenewableBuilder::new()
        .with_context(ctx.clone())
        .with_producer({
            let server = Arc::clone(&server);
            move |ctx: &CancellationToken| server.issue(ctx)
        })
        .on_demand(Periods::new(
            Duration::from_millis(100),
            Duration::from_millis(50),
        ))?;

    println!("   first get:  {:?}", on_demand.get());
    println!("   cached get: {:?}", on_demand.get());
    thread::sleep(Duration::from_millis(120));
    println!("   after 120ms: {:?}\n", on_demand.get());

    // 2. Soft/hard: serve the stale token while a background refresh runs
    println!("2. Soft/hard renewable (soft 50ms, hard 500ms):");
    let soft_hard = RenewableBuilder::new()
        .with_background_context()
        .with_producer({
            let server = Arc::clone(&server);
            move |ctx: &CancellationToken| server.issue(ctx)
        })
        .soft_hard(
            Periods::same(Duration::from_millis(50)),
            Periods::same(Duration::from_millis(500)),
        )?;

    println!("   first get:  {:?}", soft_hard.get());
    thread::sleep(Duration::from_millis(60));
    println!(
        "   stale get:  {:?} (refreshing: {})",
        soft_hard.get(),
        soft_hard.is_refreshing()
    );
    thread::sleep(Duration::from_millis(40));
    println!("   after refresh: {:?}\n", soft_hard.get());

    // 3. Strategy from configuration
    println!("3. Strategy from JSON configuration:");
    let config = StrategyConfig::from_json(
        r#"{ "strategy": "on_demand", "periods": { "success_ms": 1000, "error_ms": 100 } }"#,
    )?;
    println!("   config: {}", config.to_json()?);

    let configured = RenewableBuilder::new()
        .with_background_context()
        .with_producer(|_: &CancellationToken| Ok::<_, String>("static-token".to_string()))
        .build(&config)?;
    println!("   must(): {}\n", must(&configured));

    // 4. Cancelling the context reaches the production function
    println!("4. Cancelling the context:");
    ctx.cancel();
    thread::sleep(Duration::from_millis(120));
    println!("   after cancel: {:?}", on_demand.get());

    println!("\n=== Example Complete ===\n");
    Ok(())
}
