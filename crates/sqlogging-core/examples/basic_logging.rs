//! Example of using sqlogging-core directly from Rust.

use sqlogging_core::{Level, Logger, LoggerConfig, Value};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Declare the table once
    let config = LoggerConfig::new("training", "./logs")
        .with_level(Level::Info)
        .with_columns(["ts", "iter", "loss", "note"]);

    let mut logger = Logger::create(config)?;
    println!("Logging to {}", logger.path().display());

    // 2. Write partial rows; missing columns are stored as NULL
    for i in 0..20i64 {
        let loss = 1.0 / (i as f64 + 1.0);
        logger.info([
            ("ts", Value::from(chrono::Utc::now())),
            ("iter", Value::from(i)),
            ("loss", Value::from(loss)),
        ])?;
        // Below the threshold: dropped
        logger.debug([("iter", i)])?;
    }
    logger.warning([("note", "learning rate decayed")])?;

    // 3. Ad-hoc SQL over the log
    let best = logger.query("SELECT iter, loss FROM training ORDER BY loss ASC LIMIT 1")?;
    println!("Best row: {:?}", best);

    // 4. Keep the data on disk
    logger.close()?;

    Ok(())
}
