use resprefix::{Config, gradle};

pub fn run_gradle_command(config: Config, dry_run: bool) -> Result<(), String> {
    let update = gradle::configure(&config.root, &config.prefix, dry_run)
        .map_err(|e| format!("Gradle setup failed: {}", e))?;

    if dry_run {
        println!("(dry run) {}", update);
    } else {
        println!("{}", update);
    }

    if update.is_ok() {
        Ok(())
    } else {
        Err(format!("resourcePrefix \"{}\" was not configured", config.prefix))
    }
}
