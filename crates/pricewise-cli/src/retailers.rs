use pricewise_core::AppConfig;

/// Prints the retailer table in use.
///
/// # Errors
///
/// Returns an error if a configured retailer file cannot be loaded.
pub(crate) fn run_retailers(config: &AppConfig) -> anyhow::Result<()> {
    let retailers = super::load_retailer_table(config)?;

    println!("{:<18}{:<20}{:<22}LOGO", "ID", "NAME", "DOMAIN");
    for retailer in &retailers {
        println!(
            "{:<18}{:<20}{:<22}{}",
            retailer.id,
            retailer.name,
            retailer.domain,
            retailer.logo.as_deref().unwrap_or("")
        );
    }
    Ok(())
}
