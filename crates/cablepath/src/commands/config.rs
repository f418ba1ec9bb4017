use colored::Colorize;

use cablepath::config::Config;

use crate::cli::ConfigCommands;

pub fn run(command: ConfigCommands) -> anyhow::Result<()> {
    match command {
        ConfigCommands::Show => {
            let config = Config::load_or_default();
            let options = config.routing_options();
            println!("{}", "Routing".bold());
            println!("  connection_tolerance  {}", options.connection_tolerance);
            println!("  jump_split_distance   {}", options.jump_split_distance);
            println!("  branch_code_len       {}", options.branch_code_len);
            println!(
                "  max_expansion_depth   {}",
                options
                    .max_expansion_depth
                    .map_or_else(|| "none".to_string(), |d| d.to_string())
            );
            println!("{}", "Report".bold());
            println!("  length_scale          {}", config.length_scale());
            if let Ok(path) = Config::path() {
                println!();
                println!("{}", format!("Config file: {}", path.display()).dimmed());
            }
            Ok(())
        }
        ConfigCommands::Set { key, value } => {
            let mut config = Config::load_or_default();
            config.set(&key, &value)?;
            let path = config.save()?;
            println!("{}", format!("Set {key} = {value} in {}", path.display()).green());
            Ok(())
        }
    }
}
